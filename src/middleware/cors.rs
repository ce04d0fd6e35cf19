use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tracing::warn;
use url::Url;

use crate::config::CorsConfig;

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Parse configured origins, dropping entries that are not `scheme://host[:port]`.
pub fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|raw| {
            let parsed = match Url::parse(raw) {
                Ok(u) if u.has_host() && matches!(u.scheme(), "http" | "https") => u,
                Ok(_) | Err(_) => {
                    warn!(origin = %raw, "ignoring invalid CORS origin");
                    return None;
                }
            };
            // Url::origin drops any path and keeps an explicit non-default port.
            let origin = parsed.origin().ascii_serialization();
            match HeaderValue::from_str(&origin) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(origin = %raw, error = %e, "ignoring invalid CORS origin");
                    None
                }
            }
        })
        .collect()
}

/// Build the CORS layer for the API.
///
/// Wildcards are not allowed together with credentials, so a credentialed
/// configuration mirrors the request's origin and headers instead.
pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(ALLOWED_METHODS);

    let origin = if cfg.allow_all_origins {
        if cfg.allow_credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::from(Any)
        }
    } else {
        AllowOrigin::list(parse_origins(&cfg.allowed_origins))
    };

    if cfg.allow_credentials {
        layer
            .allow_origin(origin)
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        layer.allow_origin(origin).allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_origins_are_skipped() {
        let origins = parse_origins(&[
            "http://localhost:3000".to_string(),
            "not a url".to_string(),
            "ftp://files.example.com".to_string(),
            "https://app.example.com/some/path".to_string(),
        ]);
        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("https://app.example.com"),
            ]
        );
    }
}
