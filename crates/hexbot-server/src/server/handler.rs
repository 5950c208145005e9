//! HTTP surface of the color service.
//!
//! ## Responsibilities
//!
//! - Decode and validate query parameters into a [`GenerationRequest`].
//! - Hand the request to the shared [`ColorService`], which picks the
//!   synchronous or parallel path.
//! - Serialize the [`AggregateResult`] as JSON. Compression and panic
//!   recovery are applied as router layers.

use super::{config::ServerConfig, error::ApiError, request::GenerationRequest};
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use hexbot::{AggregateResult, ColorService};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer};

#[derive(Clone)]
pub struct AppState {
    service: Arc<ColorService>,
    max_count: usize,
}

impl AppState {
    pub fn new(service: Arc<ColorService>, config: &ServerConfig) -> Self {
        Self {
            service,
            max_count: config.max_count,
        }
    }
}

/// Builds the router with gzip compression and panic recovery applied to
/// every route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(generate_colors))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::new())
}

/// `GET /?count=&width=&height=&seed=`
#[tracing::instrument(skip_all, fields(count))]
async fn generate_colors(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<AggregateResult>, ApiError> {
    if state.service.is_shut_down() {
        return Err(ApiError::ServiceShutdown);
    }

    let request = match GenerationRequest::from_query(&pairs, state.max_count) {
        Ok(request) => request,
        Err(e) => {
            tracing::info!("Rejected request: {e}");
            return Err(e);
        }
    };
    tracing::Span::current().record("count", request.count);

    let start = std::time::Instant::now();
    let result = state.service.generate(&request.into_config()).await;

    match &result.warning {
        Some(warning) => tracing::warn!(
            "Returning {} colors in {:?} with warning: {warning}",
            result.colors.len(),
            start.elapsed()
        ),
        None => tracing::info!(
            "Returning {} colors in {:?}",
            result.colors.len(),
            start.elapsed()
        ),
    }

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use core::time::Duration;
    use hexbot::GeneratorOptions;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(max_count: usize) -> (Router, Arc<ColorService>) {
        let service = Arc::new(
            ColorService::new(GeneratorOptions {
                num_workers: 4,
                worker_timeout: Duration::from_secs(10),
                ..GeneratorOptions::default()
            })
            .unwrap(),
        );
        let state = AppState {
            service: Arc::clone(&service),
            max_count,
        };
        (router(state), service)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn is_hex_color(value: &Value) -> bool {
        value.as_str().is_some_and(|v| {
            v.len() == 7 && v.starts_with('#') && v[1..].bytes().all(|b| b.is_ascii_hexdigit())
        })
    }

    #[tokio::test]
    async fn default_request_returns_one_color() {
        let (app, _) = app(1000);
        let (status, body) = get_json(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        let colors = body["colors"].as_array().unwrap();
        assert_eq!(colors.len(), 1);
        assert!(is_hex_color(&colors[0]["value"]));
        assert!(colors[0].get("coordinates").is_none());
        assert!(body.get("warning").is_none());
    }

    #[tokio::test]
    async fn coordinates_and_seeds_flow_through() {
        let (app, _) = app(1000);
        let (status, body) = get_json(app, "/?count=600&width=5&height=5&seed=abc123,zzz,AABBCC").await;
        assert_eq!(status, StatusCode::OK);
        let colors = body["colors"].as_array().unwrap();
        assert_eq!(colors.len(), 600);
        for color in colors {
            assert!(is_hex_color(&color["value"]));
            assert!(color["coordinates"]["x"].as_u64().unwrap() < 5);
            assert!(color["coordinates"]["y"].as_u64().unwrap() < 5);
        }
    }

    #[tokio::test]
    async fn invalid_count_is_a_bad_request() {
        let (app, _) = app(1000);
        let (status, body) = get_json(app.clone(), "/?count=-3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("-3"));

        let (status, _) = get_json(app, "/?count=1001").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn responses_are_gzipped_on_request() {
        let (app, _) = app(1000);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?count=50")
                    .header(header::ACCEPT_ENCODING, "gzip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_ENCODING).unwrap(),
            "gzip"
        );
    }

    #[tokio::test]
    async fn refuses_work_after_shutdown() {
        let (app, service) = app(1000);
        service.shutdown();
        let (status, _) = get_json(app, "/?count=5").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
