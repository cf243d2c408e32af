use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_ROBOTS: &str = "index, follow";
pub const DEFAULT_OG_IMAGE: &str = "/og-default.jpg";
pub const SITE_NAME: &str = "pymerp";
pub const OG_LOCALE: &str = "es_CL";
pub const TWITTER_CARD: &str = "summary_large_image";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub image: String,
    pub site_name: String,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

/// Everything needed to render one public page's head and crawlable body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoDocument {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical: String,
    pub robots: String,
    pub h1: String,
    #[serde(default)]
    pub h2: Option<String>,
    pub body_text: String,
    pub og: OpenGraph,
    pub twitter: TwitterCard,
    #[serde(default)]
    pub json_ld: Vec<Value>,
    #[serde(default)]
    pub breadcrumbs: Vec<Breadcrumb>,
}

/// Parsed public route plus the request-derived context needed to build SEO data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub slug: String,
    pub service_slug: Option<String>,
    pub locale: String,
    /// Absolute origin without trailing slash, e.g. `https://example.com`.
    pub base_url: String,
    /// Decoded request path used for canonical URLs and breadcrumbs.
    pub path: String,
}

impl RouteDescriptor {
    pub fn canonical_url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
