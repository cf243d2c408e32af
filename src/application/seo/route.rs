//! Public URL parsing and request-derived context (base URL, locale).

use axum::http::{HeaderMap, header};
use percent_encoding::percent_decode_str;

use super::{strategy::StrategyRegistry, types::RouteDescriptor};

pub const DEFAULT_LOCALE: &str = "es";
const SERVICES_SEGMENT: &str = "servicios";
const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";
const DEFAULT_SCHEME: &str = "https";

/// A matched public page path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicRoute {
    pub slug: String,
    pub category: &'static str,
    pub service_slug: Option<String>,
}

impl PublicRoute {
    /// Match a raw request path against every registered category.
    ///
    /// Accepts `/{slug}/{category}` and `/{slug}/{category}/servicios/{service}`,
    /// with an optional trailing slash. Undecodable paths never match.
    pub fn parse(raw_path: &str, registry: &StrategyRegistry) -> Option<Self> {
        let decoded = percent_decode_str(raw_path).decode_utf8().ok()?;
        let trimmed = decoded.strip_prefix('/')?;
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return None;
        }

        let (slug, category, service_slug) = match segments.as_slice() {
            [slug, category] => (*slug, *category, None),
            [slug, category, SERVICES_SEGMENT, service] => (*slug, *category, Some(*service)),
            _ => return None,
        };

        let category = registry.categories().find(|known| *known == category)?;
        Some(Self {
            slug: slug.to_string(),
            category,
            service_slug: service_slug.map(str::to_string),
        })
    }

    /// Canonical decoded path, without trailing slash.
    pub fn path(&self) -> String {
        match &self.service_slug {
            Some(service) => format!(
                "/{}/{}/{SERVICES_SEGMENT}/{service}",
                self.slug, self.category
            ),
            None => format!("/{}/{}", self.slug, self.category),
        }
    }

    pub fn descriptor(&self, base_url: String, locale: String) -> RouteDescriptor {
        RouteDescriptor {
            slug: self.slug.clone(),
            service_slug: self.service_slug.clone(),
            locale,
            base_url,
            path: self.path(),
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim())
        .filter(|value| !value.is_empty())
}

/// Configured override wins; otherwise rebuild the origin from proxy headers.
///
/// A header-derived host is only trusted when it appears in `allowed_hosts`.
/// `None` means the request names a host this server does not answer for.
pub fn resolve_base_url(
    override_url: Option<&str>,
    allowed_hosts: &[String],
    headers: &HeaderMap,
) -> Option<String> {
    if let Some(configured) = override_url
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return Some(configured.trim_end_matches('/').to_string());
    }

    let host = header_value(headers, FORWARDED_HOST)
        .or_else(|| header_value(headers, header::HOST))?
        .to_ascii_lowercase();
    if !host_allowed(&host, allowed_hosts) {
        return None;
    }

    let scheme = header_value(headers, FORWARDED_PROTO)
        .map(str::to_ascii_lowercase)
        .filter(|scheme| matches!(scheme.as_str(), "http" | "https"))
        .unwrap_or_else(|| DEFAULT_SCHEME.to_string());
    Some(format!("{scheme}://{host}"))
}

/// Exact match, or match on the host name with its port dropped.
fn host_allowed(host: &str, allowed_hosts: &[String]) -> bool {
    let name = host
        .rsplit_once(':')
        .filter(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
        .map_or(host, |(name, _)| name);
    allowed_hosts
        .iter()
        .any(|allowed| allowed == host || allowed == name)
}

/// `lang` query parameter, then the first `Accept-Language` tag, then `es`.
pub fn resolve_locale(query: Option<&str>, headers: &HeaderMap) -> String {
    let from_query = query.and_then(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "lang")
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    });
    if let Some(locale) = from_query {
        return locale;
    }

    header_value(headers, header::ACCEPT_LANGUAGE)
        .and_then(|first| first.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}
