//! Mock Scout backend for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::traits::*;

/// Mock backend for testing.
///
/// Configurable replies, failures and latency for unit tests.
pub struct MockBackend {
    id: String,
    available: AtomicBool,
    response_content: String,
    failure: Option<String>,
    delay: Option<Duration>,
    call_count: AtomicU32,
    last_prompt: Mutex<Option<String>>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            available: AtomicBool::new(true),
            response_content: "Mock response".to_string(),
            failure: None,
            delay: None,
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Set the reply content.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.response_content = content.into();
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Fail every reply with `RequestFailed(reason)`.
    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Sleep before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times reply was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompt of the most recent reply call.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-scout")
    }
}

#[async_trait]
impl ScoutBackend for MockBackend {
    fn id(&self) -> &str {
        &self.id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn reply(&self, request: ReplyRequest<'_>) -> Result<AgentReply, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(request.prompt.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if !self.available.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("Mock backend disabled".to_string()));
        }

        if let Some(reason) = &self.failure {
            return Err(BackendError::RequestFailed(reason.clone()));
        }

        // Estimate token counts
        let prompt_tokens = request.prompt.len() as u32 / 4;
        let completion_tokens = self.response_content.len() as u32 / 4;

        Ok(AgentReply {
            content: self.response_content.clone(),
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
        })
    }
}
