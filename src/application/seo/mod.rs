//! Public-page SEO generation.
//!
//! A request is parsed into a [`route::PublicRoute`], resolved against the
//! business directory by [`SeoService`], and turned into a [`SeoDocument`] by
//! the category's [`SeoStrategy`].

pub mod barberias;
pub mod route;
pub mod schema;
mod service;
mod strategy;
pub mod templates;
mod types;

pub use service::{SeoService, latest_update};
pub use strategy::{SeoStrategy, StrategyInput, StrategyRegistry};
pub use types::{
    Breadcrumb, DEFAULT_OG_IMAGE, DEFAULT_ROBOTS, OpenGraph, RouteDescriptor, SeoDocument,
    TwitterCard,
};
