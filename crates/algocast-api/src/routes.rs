//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{get_file, healthz, readyz, render};
use crate::metrics::metrics_middleware;
use crate::middleware::{request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let job_routes = Router::new()
        .route("/render", post(render))
        .route("/files/:name", get(get_file));

    let health_routes = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(job_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::{header as header_is, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use algocast_storage::TransferConfig;
    use algocast_worker::RenderConfig;

    use crate::config::ApiConfig;

    const TOKEN: &str = "render-secret";

    struct Harness {
        server: MockServer,
        out_dir: TempDir,
    }

    impl Harness {
        async fn new() -> Self {
            Self {
                server: MockServer::start().await,
                out_dir: TempDir::new().unwrap(),
            }
        }

        fn router(&self) -> Router {
            let config = ApiConfig {
                render_token: TOKEN.to_string(),
                ..ApiConfig::default()
            };
            let render = RenderConfig {
                local_output_dir: self.out_dir.path().to_path_buf(),
                ..RenderConfig::default()
            };
            let transfer = TransferConfig {
                backend_base_url: self.server.uri(),
                callback_token: "cb-secret".to_string(),
                ..TransferConfig::default()
            };
            create_router(AppState::new(config, render, transfer).unwrap(), None)
        }

        fn payload(&self) -> Value {
            let base = self.server.uri();
            json!({
                "jobId": "job-1",
                "assets": {
                    "eventsUrl": format!("{}/events.json", base),
                    "narrationUrl": format!("{}/narration.json", base),
                    "complexityUrl": format!("{}/complexity.json", base),
                    "audioUrls": [format!("{}/audio/000.mp3", base)]
                },
                "stream": {}
            })
        }
    }

    fn render_request(auth: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/render")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let harness = Harness::new().await;
        let response = tokio_test::assert_ok!(harness.router().oneshot(get_request("/healthz")).await);

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-Request-ID"));
        let body = json_body(response).await;
        assert_eq!(body["ok"], true);
        assert!(body["time"].as_i64().unwrap() > 1_600_000_000);
    }

    #[tokio::test]
    async fn test_readyz_reports_ok_flag() {
        let harness = Harness::new().await;
        let response = harness.router().oneshot(get_request("/readyz")).await.unwrap();

        let status = response.status();
        let body = json_body(response).await;
        let ok = body["ok"].as_bool().unwrap();
        assert_eq!(status == StatusCode::OK, ok);
    }

    #[tokio::test]
    async fn test_render_requires_bearer() {
        let harness = Harness::new().await;
        let body = harness.payload().to_string();

        let response = harness
            .router()
            .oneshot(render_request(None, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["detail"], "missing bearer");

        let response = harness
            .router()
            .oneshot(render_request(Some("Bearer wrong"), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["detail"], "bad bearer");
    }

    #[tokio::test]
    async fn test_render_rejects_malformed_body() {
        let harness = Harness::new().await;
        let auth = format!("Bearer {}", TOKEN);
        let response = harness
            .router()
            .oneshot(render_request(Some(&auth), "{\"jobId\": ".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_render_without_upload_url_reports_failure() {
        let harness = Harness::new().await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/job-1/callback"))
            .and(header_is("authorization", "Bearer cb-secret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&harness.server)
            .await;

        let auth = format!("Bearer {}", TOKEN);
        let response = harness
            .router()
            .oneshot(render_request(Some(&auth), harness.payload().to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["detail"], "VALIDATION_ERROR: stream.uploadURL missing");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_files_serves_local_output() {
        let harness = Harness::new().await;
        std::fs::write(harness.out_dir.path().join("job-1.mp4"), b"mp4 bytes").unwrap();

        let response = harness.router().oneshot(get_request("/files/job-1.mp4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"mp4 bytes");
    }

    #[tokio::test]
    async fn test_files_missing_and_invalid() {
        let harness = Harness::new().await;

        let response = harness.router().oneshot(get_request("/files/nope.mp4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["detail"], "not found");

        let response = harness.router().oneshot(get_request("/files/.env")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_metrics_route_absent_when_disabled() {
        let harness = Harness::new().await;
        let response = harness.router().oneshot(get_request("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
