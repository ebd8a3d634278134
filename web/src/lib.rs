use axum::http::{header, HeaderValue, Method};
use log::*;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{Error, Result};
pub use service::AppState;

mod controller;
mod error;
mod params;
mod response;
mod router;
mod sse;

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let bind_address = app_state.config.bind_address();
    info!(
        "Server starting... listening for connections on http://{bind_address} ({})",
        app_state.config.runtime_env()
    );

    let listener = TcpListener::bind(&bind_address).await?;
    let cors_layer = cors_layer(&app_state.config.allowed_origins);

    // Open event streams keep the server busy until the process is stopped,
    // so there is no graceful shutdown signal to wait on.
    axum::serve(listener, router::define_routes(app_state).layer(cors_layer)).await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();
    debug!("CORS allowed origins: {origins:?}");

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_credentials(true)
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::CACHE_CONTROL])
        .allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn app(origins: &[&str]) -> Router {
        let origins: Vec<String> = origins.iter().map(|o| o.to_string()).collect();
        Router::new()
            .route("/health", get(|| async { "healthy" }))
            .layer(cors_layer(&origins))
    }

    #[tokio::test]
    async fn test_allowed_origin_is_echoed() {
        let response = app(&["http://localhost:3000"])
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_unknown_origin_gets_no_cors_header() {
        let response = app(&["http://localhost:3000", "not a\nheader"])
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
