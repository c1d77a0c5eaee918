use axum::http::{header::InvalidHeaderValue, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Cross-origin policy for a single trusted origin, credentials included.
/// Returns `None` when no origin is configured, which leaves CORS disabled.
/// Requests from any other origin get no `Access-Control-Allow-Origin`.
///
/// Methods and headers mirror the preflight request: a literal `*` is not
/// allowed alongside credentials.
pub fn layer(allowed_origin: Option<&str>) -> Result<Option<CorsLayer>, InvalidHeaderValue> {
    let Some(origin) = allowed_origin else {
        return Ok(None);
    };

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([HeaderValue::from_str(origin)?]))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Ok(Some(cors))
}
