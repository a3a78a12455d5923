//! Backend job callbacks.

use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use algocast_models::CallbackPayload;

use crate::config::TransferConfig;
use crate::error::{StorageError, StorageResult};

/// Reports job outcomes to the backend.
#[derive(Clone)]
pub struct CallbackClient {
    http: Client,
    config: TransferConfig,
}

impl CallbackClient {
    pub fn new(config: TransferConfig) -> StorageResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("algocast-storage/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StorageError::Network)?;
        Ok(Self { http, config })
    }

    /// POST the payload; any status >= 300 is an error.
    pub async fn send(&self, job_id: &str, payload: &CallbackPayload) -> StorageResult<()> {
        let url = self.config.callback_url(job_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.callback_token)
            .json(payload)
            .timeout(self.config.callback_timeout)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 300 {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::callback_failed(format!(
                "callback failed {}: {}",
                status.as_u16(),
                body
            )));
        }

        info!(job_id = %job_id, status = ?payload.status, "Callback delivered");
        Ok(())
    }

    /// Like [`send`](Self::send) but only logs failures. Returns whether it was delivered.
    pub async fn send_safe(&self, job_id: &str, payload: &CallbackPayload) -> bool {
        match self.send(job_id, payload).await {
            Ok(()) => true,
            Err(e) => {
                warn!(job_id = %job_id, "Callback failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CallbackClient {
        CallbackClient::new(TransferConfig {
            backend_base_url: server.uri(),
            callback_token: "cb-secret".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_done_callback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/job-7/callback"))
            .and(header("authorization", "Bearer cb-secret"))
            .and(body_json(json!({
                "status": "done",
                "message": "ok",
                "streamUid": "uid9",
                "playbackUrl": "https://watch.cloudflarestream.com/uid9"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .send("job-7", &CallbackPayload::done("uid9"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let callbacks = client(&server);
        let payload = CallbackPayload::failed("FETCH_ERROR: audio HEAD failed");
        let err = tokio_test::assert_err!(callbacks.send("job-7", &payload).await);
        assert!(matches!(err, StorageError::CallbackFailed(_)));
        assert!(!callbacks.send_safe("job-7", &payload).await);
    }
}
