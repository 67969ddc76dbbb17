//! Response header stages applied to every route

use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    response::Response,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

/// How long browsers may cache a preflight answer (6 hours)
pub const CORS_MAX_AGE: Duration = Duration::from_secs(21600);

const CACHE_CONTROL: &str =
    "no-store, no-cache, must-revalidate, post-check=0, pre-check=0, max-age=0";

/// Any origin may read the API; preflight requests are answered here
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS, Method::POST])
        .allow_headers(Any)
        .max_age(CORS_MAX_AGE)
}

/// Fixed headers forbidding caching; module state changes every second
pub fn no_cache_layers() -> [SetResponseHeaderLayer<HeaderValue>; 3] {
    let fixed = |name: HeaderName, value: &'static str| {
        SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
    };
    [
        fixed(header::CACHE_CONTROL, CACHE_CONTROL),
        fixed(header::PRAGMA, "no-cache"),
        fixed(header::EXPIRES, "-1"),
    ]
}

/// `Last-Modified` is always "now"
pub fn last_modified_layer() -> SetResponseHeaderLayer<fn(&Response) -> Option<HeaderValue>> {
    SetResponseHeaderLayer::overriding(header::LAST_MODIFIED, last_modified_now)
}

fn last_modified_now(_: &Response) -> Option<HeaderValue> {
    let now = chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S GMT");
    HeaderValue::from_str(&now.to_string()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_modified_is_http_date() {
        let value = last_modified_now(&Response::default()).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.ends_with(" GMT"));
        assert!(chrono::NaiveDateTime::parse_from_str(value, "%a, %d %b %Y %H:%M:%S GMT").is_ok());
    }
}
