//! Scout endpoint backend.
//!
//! Talks to the standalone agent server: `POST {base}/scout` with the prompt
//! and roster, answered by `{"agentMessage": "..."}`.

use async_trait::async_trait;
use reqwest::{header, Client};
use roster::FreelancerRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::*;

/// Backend for the agent server's `/scout` route.
pub struct EndpointBackend {
    client: Client,
    base_url: String,
    id: String,
}

impl EndpointBackend {
    /// Create a backend for the agent server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            id: format!("scout-endpoint:{}", base_url),
            base_url,
        })
    }

    /// Agent server on localhost.
    pub fn local() -> Result<Self, BackendError> {
        Self::new("http://localhost:8000")
    }

    fn scout_url(&self) -> String {
        format!("{}/scout", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ScoutBody<'a> {
    prompt: &'a str,
    freelancers: &'a [FreelancerRecord],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoutResponse {
    agent_message: Option<String>,
}

#[async_trait]
impl ScoutBackend for EndpointBackend {
    fn id(&self) -> &str {
        &self.id
    }

    /// The agent server has no health route; failures surface on `reply`.
    async fn is_available(&self) -> bool {
        true
    }

    async fn reply(&self, request: ReplyRequest<'_>) -> Result<AgentReply, BackendError> {
        let body = ScoutBody {
            prompt: request.prompt,
            freelancers: request.roster,
        };

        let response = self
            .client
            .post(self.scout_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(BackendError::RateLimited { retry_after_ms: None });
            }
            return Err(BackendError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ScoutResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        let content = parsed
            .agent_message
            .ok_or_else(|| BackendError::ParseError("Missing agentMessage".to_string()))?;

        debug!(backend = %self.id, chars = content.len(), "Scout endpoint replied");
        Ok(AgentReply::text(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = EndpointBackend::new("http://agent.internal:8000/").unwrap();
        assert_eq!(backend.scout_url(), "http://agent.internal:8000/scout");
        assert_eq!(backend.id(), "scout-endpoint:http://agent.internal:8000");
    }
}
