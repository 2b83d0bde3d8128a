//! Outcome classification for completed HTTP exchanges.

use serde_json::Value;
use shared_types::{ApiErrorCode, HttpResponse};

/// Marker some endpoints put in a 200 body instead of failing the status.
const UNAUTHORIZED_MARKER: &str = "Unauthorized";

/// Classify a completed credentialed call.
///
/// Rules, first match wins:
/// 1. 401, 403, or 200 with `Unauthorized` in the body: `AuthInvalid`
/// 2. any other non-200: `HttpError(status)`
/// 3. 200 with a body that is not JSON: `ParseError`
/// 4. otherwise the parsed body
pub fn classify(response: &HttpResponse) -> Result<Value, ApiErrorCode> {
    if is_auth_rejection(response) {
        return Err(ApiErrorCode::AuthInvalid);
    }
    if !response.is_ok() {
        return Err(ApiErrorCode::HttpError(response.status));
    }
    serde_json::from_str(&response.body).map_err(|_| ApiErrorCode::ParseError)
}

pub fn is_auth_rejection(response: &HttpResponse) -> bool {
    matches!(response.status, 401 | 403)
        || (response.is_ok() && response.body.contains(UNAUTHORIZED_MARKER))
}

/// Price endpoints are judged on the body alone; the status is ignored.
pub fn parse_price_body(response: &HttpResponse) -> Option<Value> {
    serde_json::from_str(&response.body).ok()
}
