//! Retry hints for transient store conflicts.

use salvo::{
    http::header::{HeaderValue, RETRY_AFTER},
    prelude::*,
};

const RETRY_AFTER_SECONDS: &str = "1";

/// Error returned when a transaction kept conflicting until its retry budget ran out.
pub(crate) fn transient_conflict(what: &str) -> StatusError {
    StatusError::service_unavailable()
        .brief(format!("{what} is busy"))
        .detail("Concurrent activity prevented the change; retry the request")
}

/// Attach `Retry-After` to every 503 response.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    ctrl.call_next(req, depot, res).await;

    if res.status_code == Some(StatusCode::SERVICE_UNAVAILABLE) {
        res.headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECONDS));
    }
}
