//! Cache key definitions.
//!
//! Keys embed a content fingerprint so any change to the company or one of
//! its services produces a new key; stale entries simply age out.

use std::fmt;

use sha2::{Digest, Sha256};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

const NO_TIMESTAMP: &str = "0";

/// SHA-256 hex over `{company_id}:{latest update | "0"}:{path}`.
pub fn content_fingerprint(
    company_id: &str,
    latest_update: Option<OffsetDateTime>,
    path: &str,
) -> String {
    let stamp = latest_update
        .map(|at| {
            at.format(&Rfc3339)
                .unwrap_or_else(|_| at.unix_timestamp_nanos().to_string())
        })
        .unwrap_or_else(|| NO_TIMESTAMP.to_string());

    let mut hasher = Sha256::new();
    hasher.update(format!("{company_id}:{stamp}:{path}").as_bytes());
    hex::encode(hasher.finalize())
}

/// `seo:{company}:{category}:{locale}:{fingerprint}:{path}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeoCacheKey {
    pub company_id: String,
    pub category: String,
    pub locale: String,
    pub fingerprint: String,
    pub path: String,
}

impl fmt::Display for SeoCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seo:{}:{}:{}:{}:{}",
            self.company_id, self.category, self.locale, self.fingerprint, self.path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn fingerprint_is_sha256_hex() {
        let value = content_fingerprint("c1", None, "/a/barberias");
        assert_eq!(value.len(), 64);
        assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(value, content_fingerprint("c1", None, "/a/barberias"));
    }

    #[test]
    fn fingerprint_changes_with_timestamp_and_path() {
        let base = content_fingerprint("c1", Some(datetime!(2024-05-01 10:00 UTC)), "/a/barberias");
        let later =
            content_fingerprint("c1", Some(datetime!(2024-05-01 10:01 UTC)), "/a/barberias");
        let other_path = content_fingerprint(
            "c1",
            Some(datetime!(2024-05-01 10:00 UTC)),
            "/a/barberias/servicios/corte",
        );
        assert_ne!(base, later);
        assert_ne!(base, other_path);
        assert_ne!(base, content_fingerprint("c1", None, "/a/barberias"));
    }

    #[test]
    fn key_renders_all_parts_in_order() {
        let key = SeoCacheKey {
            company_id: "c1".into(),
            category: "barberias".into(),
            locale: "es".into(),
            fingerprint: "abc".into(),
            path: "/a/barberias".into(),
        };
        assert_eq!(key.to_string(), "seo:c1:barberias:es:abc:/a/barberias");
    }
}
