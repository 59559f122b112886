//! HTTP client for the pedal's session endpoints.

use super::{
    Ack, FailureBody, JoinSessionRequest, LoopRequest, NewSessionRequest, ServiceError,
    ServiceResult, SessionService, SessionSnapshot,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Client for the pedal session service.
#[derive(Clone)]
pub struct PedalClient {
    base_url: String,
    client: reqwest::Client,
}

impl PedalClient {
    /// Create a client with the given base URL and per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Get the base URL for the pedal.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let url = self.url(path);
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let response = check_status(response).await?;

        response.json::<T>().await.map_err(|e| {
            tracing::debug!("Failed to parse {} response: {}", path, e);
            ServiceError::Decode(e.to_string())
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ServiceResult<Ack> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("Network request to {} failed: {}", url, e);
                ServiceError::Network(e.to_string())
            })?;

        let response = check_status(response).await?;

        // Ack bodies are opaque; keep a JSON string around as the message
        let text = response.text().await.unwrap_or_default();
        Ok(Ack {
            message: serde_json::from_str::<String>(&text).ok(),
        })
    }
}

/// Turn any non-success status into a rejection carrying the body's code
async fn check_status(response: reqwest::Response) -> ServiceResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let code = FailureBody::code_from(&text);
    tracing::debug!("HTTP {} from pedal: {}", status.as_u16(), code.as_str());
    Err(ServiceError::rejected(status.as_u16(), code))
}

/// Empty JSON object body for commands without arguments
#[derive(Serialize)]
struct Empty {}

impl SessionService for PedalClient {
    async fn get_session(&self) -> ServiceResult<SessionSnapshot> {
        self.get("getsession").await
    }

    async fn get_members(&self) -> ServiceResult<Vec<String>> {
        self.get("getmembers").await
    }

    async fn get_loops(&self) -> ServiceResult<Vec<u32>> {
        self.get("getloops").await
    }

    async fn new_session(&self, nickname: &str) -> ServiceResult<Ack> {
        let request = NewSessionRequest {
            nickname: nickname.to_string(),
        };
        self.post("newsession", &request).await
    }

    async fn join_session(&self, session_id: &str, nickname: &str) -> ServiceResult<Ack> {
        let request = JoinSessionRequest {
            session_id: session_id.to_string(),
            nickname: nickname.to_string(),
        };
        self.post("joinsession", &request).await
    }

    async fn end_session(&self) -> ServiceResult<Ack> {
        self.post("endsession", &Empty {}).await
    }

    async fn leave_session(&self) -> ServiceResult<Ack> {
        self.post("leavesession", &Empty {}).await
    }

    async fn start_playback(&self, loop_index: u32) -> ServiceResult<Ack> {
        self.post("startplayback", &LoopRequest { loop_index }).await
    }

    async fn stop_playback(&self) -> ServiceResult<Ack> {
        self.post("stopplayback", &Empty {}).await
    }

    async fn remove_loop(&self, loop_index: u32) -> ServiceResult<Ack> {
        self.post("removeloop", &LoopRequest { loop_index }).await
    }

    async fn toggle_recording(&self) -> ServiceResult<Ack> {
        self.post("toggleloop", &Empty {}).await
    }
}
