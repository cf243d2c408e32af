use std::{fmt, time::Instant};

use axum::{
    body::Body,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, field, info_span, warn};
use uuid::Uuid;

use crate::application::{
    error::{ErrorReport, HttpError},
    trace::with_span,
};

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "vitrina::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "vitrina::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "client request error",
            );
        }
    }

    response
}

/// Reject everything but GET before any route, `/health` included.
pub async fn require_get(request: Request<Body>, next: Next) -> Response {
    if request.method() != Method::GET {
        return HttpError::method_not_allowed(
            "infra::http::middleware::require_get",
            format!("method {} is not accepted", request.method()),
        )
        .into_response();
    }
    next.run(request).await
}

/// A 5xx response travelling through [`with_span`] as its error arm.
struct ServerFailure(Response);

impl fmt::Display for ServerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = self
            .0
            .extensions()
            .get::<ErrorReport>()
            .and_then(|report| report.messages.first())
            .map(String::as_str)
            .unwrap_or("no diagnostic available");
        write!(f, "{}: {detail}", self.0.status())
    }
}

/// Wrap each request in a `publicweb_seo.request` span marked `ERROR` on 5xx.
pub async fn trace_requests(request: Request<Body>, next: Next) -> Response {
    let span = info_span!(
        "publicweb_seo.request",
        http.method = %request.method(),
        url.path = %request.uri().path(),
        http.status_code = field::Empty,
        otel.status_code = field::Empty,
    );

    let outcome = with_span(span.clone(), async move {
        let response = next.run(request).await;
        if response.status().is_server_error() {
            Err(ServerFailure(response))
        } else {
            Ok(response)
        }
    })
    .await;

    let response = match outcome {
        Ok(response) | Err(ServerFailure(response)) => response,
    };
    span.record("http.status_code", response.status().as_u16());
    response
}
