//! HTML rendering for public pages.

mod seo;

pub use seo::{TemplateRenderError, render_seo_html};
