//! Discovery of the client application's bootstrap script.
//!
//! The crawlable page ends with a `<script type="module">` that boots the
//! interactive app. Its hashed path is read from the app's `index.html` and
//! memoized; every failure falls back to [`FALLBACK_SPA_ENTRY`].
//!
//! The index is only ever fetched from a configured origin, never from one
//! derived from request headers.

use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use lol_html::{RewriteStrSettings, element, rewrite_str};
use metrics::counter;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::PublicSettings;

pub const FALLBACK_SPA_ENTRY: &str = "/assets/main.js";
const METRIC_SPA_ENTRY_FALLBACK: &str = "vitrina_spa_entry_fallback_total";

#[derive(Debug, Error)]
pub enum SpaEntryError {
    #[error("http client unavailable")]
    NoClient,
    #[error("failed to fetch SPA index: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("SPA index has no module script")]
    MissingScript,
    #[error("SPA index points at a foreign script `{0}`")]
    ForeignScript(String),
}

#[derive(Debug, Clone)]
struct Memo {
    entry: String,
    resolved_at: Instant,
}

pub struct SpaEntryResolver {
    configured: Option<String>,
    origin: Option<String>,
    client: Option<Client>,
    ttl: Duration,
    memo: RwLock<Option<Memo>>,
}

impl SpaEntryResolver {
    pub fn new(settings: &PublicSettings) -> Self {
        let client = match Client::builder()
            .user_agent(user_agent())
            .timeout(settings.spa_fetch_timeout)
            .build()
        {
            Ok(client) => Some(client),
            Err(err) => {
                warn!(
                    target = "vitrina::spa_entry",
                    error = %err,
                    "SPA entry discovery disabled"
                );
                None
            }
        };

        Self {
            configured: settings.spa_entry_path.clone(),
            origin: settings
                .spa_origin
                .clone()
                .or_else(|| settings.base_url.clone()),
            client,
            ttl: settings.spa_entry_ttl,
            memo: RwLock::new(None),
        }
    }

    /// Resolver that always answers `entry`, without network access.
    pub fn fixed(entry: impl Into<String>) -> Self {
        Self {
            configured: Some(entry.into()),
            origin: None,
            client: None,
            ttl: Duration::ZERO,
            memo: RwLock::new(None),
        }
    }

    /// Bootstrap script path. Never fails.
    pub async fn resolve(&self) -> String {
        if let Some(entry) = &self.configured {
            return entry.clone();
        }

        if let Some(memo) = self.memo.read().await.as_ref()
            && memo.resolved_at.elapsed() < self.ttl
        {
            return memo.entry.clone();
        }

        let Some(origin) = self.origin.as_deref() else {
            counter!(METRIC_SPA_ENTRY_FALLBACK).increment(1);
            debug!(
                target = "vitrina::spa_entry",
                "No SPA origin configured, using default entry"
            );
            return FALLBACK_SPA_ENTRY.to_string();
        };

        match self.discover(origin).await {
            Ok(entry) => {
                *self.memo.write().await = Some(Memo {
                    entry: entry.clone(),
                    resolved_at: Instant::now(),
                });
                entry
            }
            Err(err) => {
                counter!(METRIC_SPA_ENTRY_FALLBACK).increment(1);
                debug!(
                    target = "vitrina::spa_entry",
                    error = %err,
                    origin,
                    "Falling back to default SPA entry"
                );
                FALLBACK_SPA_ENTRY.to_string()
            }
        }
    }

    async fn discover(&self, origin: &str) -> Result<String, SpaEntryError> {
        let client = self.client.as_ref().ok_or(SpaEntryError::NoClient)?;
        let url = format!("{}/index.html", origin.trim_end_matches('/'));
        let html = client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let src = extract_module_script(&html).ok_or(SpaEntryError::MissingScript)?;
        if !is_same_origin_path(&src) {
            return Err(SpaEntryError::ForeignScript(src));
        }
        Ok(src)
    }
}

fn user_agent() -> &'static str {
    concat!("vitrina-seo-renderer/", env!("CARGO_PKG_VERSION"))
}

/// Absolute path on the serving origin: `/x`, but not `//host/x` or `/\host/x`.
fn is_same_origin_path(src: &str) -> bool {
    src.starts_with('/') && !src.starts_with("//") && !src.contains('\\')
}

/// `src` of the first `<script type="module" src="...">` in `html`.
pub fn extract_module_script(html: &str) -> Option<String> {
    let found: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("script[src]", {
                let found = Rc::clone(&found);
                move |el| {
                    let is_module = el
                        .get_attribute("type")
                        .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("module"));
                    if is_module && found.borrow().is_none() {
                        *found.borrow_mut() = el
                            .get_attribute("src")
                            .map(|src| src.trim().to_string())
                            .filter(|src| !src.is_empty());
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    );
    if result.is_err() {
        return None;
    }

    found.borrow_mut().take()
}
