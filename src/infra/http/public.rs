use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{
        HeaderMap, HeaderValue, StatusCode, Uri,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    application::{
        error::HttpError,
        seo::{
            SeoService,
            route::{PublicRoute, resolve_base_url, resolve_locale},
        },
    },
    infra::spa_entry::SpaEntryResolver,
    presentation::render_seo_html,
};

use super::middleware::{log_responses, require_get, set_request_context, trace_requests};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const PAGE_CACHE_CONTROL: &str = "public, max-age=3600, stale-while-revalidate=86400";

#[derive(Clone)]
pub struct HttpState {
    pub seo: Arc<SeoService>,
    pub spa_entry: Arc<SpaEntryResolver>,
    /// Configured public origin; request headers are used when unset.
    pub base_url: Option<String>,
    /// Hosts whose request headers may stand in for `base_url`.
    pub allowed_hosts: Arc<[String]>,
    pub root_id: String,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(seo_page)
        .with_state(state)
        .layer(middleware::from_fn(require_get))
        .layer(middleware::from_fn(trace_requests))
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn health() -> &'static str {
    "ok"
}

async fn seo_page(State(state): State<HttpState>, uri: Uri, headers: HeaderMap) -> Response {
    const SOURCE: &str = "infra::http::public::seo_page";

    let Some(route) = PublicRoute::parse(uri.path(), state.seo.strategies()) else {
        return HttpError::not_found(SOURCE, format!("no public page at `{}`", uri.path()))
            .into_response();
    };

    let Some(base_url) =
        resolve_base_url(state.base_url.as_deref(), &state.allowed_hosts, &headers)
    else {
        return HttpError::new(
            SOURCE,
            StatusCode::MISDIRECTED_REQUEST,
            "Misdirected request",
            "request host is not an allowed public host",
        )
        .into_response();
    };
    let locale = resolve_locale(uri.query(), &headers);
    let descriptor = route.descriptor(base_url, locale.clone());

    let document = match state
        .seo
        .build_seo_data(
            &route.slug,
            route.category,
            &descriptor,
            route.service_slug.as_deref(),
        )
        .await
    {
        Ok(Some(document)) => document,
        Ok(None) => {
            return HttpError::not_found(SOURCE, format!("no public page for `{}`", route.path()))
                .into_response();
        }
        Err(err) => return err.into_response(),
    };

    let spa_entry = state.spa_entry.resolve().await;
    match render_seo_html(&document, &spa_entry, &state.root_id, &locale) {
        Ok(html) => (
            StatusCode::OK,
            [
                (CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE)),
                (CACHE_CONTROL, HeaderValue::from_static(PAGE_CACHE_CONTROL)),
            ],
            html,
        )
            .into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}
