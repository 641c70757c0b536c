//! Request completion reporting.

use crate::base::apierror::ApiError;
use crate::http::response::ResponseMeta;
use crate::http::wire::WireRequest;

/// Receives one report per request attempt, successful or not.
///
/// Called on the request path right before the outcome is returned, so
/// implementations must be cheap and must not panic; hand heavy work off to
/// a channel or background task.
pub trait RequestObserver: Send + Sync {
    fn did_complete(
        &self,
        request: &WireRequest,
        response: Option<&ResponseMeta>,
        error: Option<&ApiError>,
    );
}

/// Default observer that writes each attempt to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn did_complete(
        &self,
        request: &WireRequest,
        response: Option<&ResponseMeta>,
        error: Option<&ApiError>,
    ) {
        let status = response.and_then(|r| r.status).map(|s| s.as_u16());
        match error {
            None => tracing::debug!(
                method = %request.method,
                url = %request.url,
                status = ?status,
                "request completed"
            ),
            Some(e) => tracing::warn!(
                method = %request.method,
                url = %request.url,
                status = ?status,
                error = %e,
                "request failed"
            ),
        }
    }
}

/// Observer that drops every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RequestObserver for NullObserver {
    fn did_complete(&self, _: &WireRequest, _: Option<&ResponseMeta>, _: Option<&ApiError>) {}
}
