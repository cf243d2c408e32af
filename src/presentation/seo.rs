use askama::{Error as AskamaError, Template};
use axum::http::StatusCode;
use thiserror::Error;

use crate::application::{error::HttpError, seo::SeoDocument};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

#[derive(Template)]
#[template(path = "seo/page.html")]
struct SeoPageTemplate<'a> {
    lang: &'a str,
    doc: &'a SeoDocument,
    keywords: String,
    json_ld: Vec<String>,
    root_id: &'a str,
    spa_entry: &'a str,
}

/// Render the crawlable HTML page for `doc`.
///
/// Text and attribute values are HTML-escaped. JSON-LD blocks are emitted as
/// raw JSON, with `</` written as `<\/` so a value cannot close its script.
pub fn render_seo_html(
    doc: &SeoDocument,
    spa_entry: &str,
    root_id: &str,
    locale: &str,
) -> Result<String, TemplateRenderError> {
    let template = SeoPageTemplate {
        lang: primary_subtag(locale),
        doc,
        keywords: doc.keywords.join(", "),
        json_ld: doc
            .json_ld
            .iter()
            .map(|value| value.to_string().replace("</", "<\\/"))
            .collect(),
        root_id,
        spa_entry,
    };

    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::seo::render_seo_html",
            "Template rendering failed",
            err,
        )
    })
}

fn primary_subtag(locale: &str) -> &str {
    locale
        .split('-')
        .next()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .unwrap_or(crate::application::seo::route::DEFAULT_LOCALE)
}
