//! ScoutService - main entry point for scout turns.
//!
//! Calls the first available backend under a deadline and turns its reply
//! into a shortlist. Backend failures never escape: the client sees a fixed
//! apology and a rating-based shortlist instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use roster::{NameExtractor, Roster, ScoutPick};
use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, AuditLog, AuditStats};
use crate::backend::traits::{AgentReply, BackendError, ReplyRequest, ScoutBackend};
use crate::request::ScoutRequest;
use crate::response::ScoutAnswer;

/// Opening line of a Scout conversation.
pub const GREETING: &str =
    "Hi! I'm Scout, your AI assistant. Ask me to find the best freelancers for your needs!";

/// Shown when no backend could answer.
pub const APOLOGY: &str =
    "Sorry, I couldn't process your request right now. Please try again later.";

/// Error types for the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No backend available
    #[error("No scout backend available")]
    NoBackendAvailable,

    /// Backend error
    #[error("Backend error: {0}")]
    BackendError(#[from] BackendError),
}

/// Configuration for the ScoutService.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Deadline for one backend reply (ms)
    pub timeout_ms: u64,
    /// Whether to log all turns
    pub audit_enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            audit_enabled: true,
        }
    }
}

/// Main entry point for Scout.
pub struct ScoutService {
    /// Configuration
    config: ServiceConfig,
    /// Backends in order of preference
    backends: Vec<Arc<dyn ScoutBackend>>,
    /// Audit log
    audit: Arc<AuditLog>,
}

impl ScoutService {
    /// Create a new service with the given backends.
    pub fn new(backends: Vec<Arc<dyn ScoutBackend>>) -> Self {
        Self {
            config: ServiceConfig::default(),
            backends,
            audit: Arc::new(AuditLog::new()),
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Opening line for a new conversation.
    pub fn greeting(&self) -> &'static str {
        GREETING
    }

    /// Answer a prompt. Never fails.
    pub async fn ask(&self, request: &ScoutRequest, roster: &Roster) -> ScoutAnswer {
        let entry_id = if self.config.audit_enabled {
            Some(self.audit.log_request(request, &roster.fingerprint()).await)
        } else {
            None
        };

        debug!(
            request_id = %request.request_id,
            requester = %request.requester_id,
            "Processing scout prompt"
        );

        let answer = match self.generate(&request.prompt, roster).await {
            Ok((backend_id, reply)) => {
                let shortlist = Self::shortlist(&request.prompt, &reply.content, roster);
                info!(
                    request_id = %request.request_id,
                    backend = %backend_id,
                    shortlisted = shortlist.len(),
                    "Scout answered"
                );
                ScoutAnswer::answered(
                    &request.request_id,
                    backend_id,
                    reply.content,
                    shortlist,
                    reply.usage,
                )
            }
            Err(e) => {
                warn!(request_id = %request.request_id, error = %e, "Scout degraded to apology");
                ScoutAnswer::degraded(&request.request_id, APOLOGY, roster.score(&request.prompt))
            }
        };

        if let Some(entry_id) = entry_id {
            self.audit.log_answer(&entry_id, &answer).await;
        }

        answer
    }

    /// Names mentioned in the reply, falling back to prompt scoring.
    pub fn shortlist(prompt: &str, reply: &str, roster: &Roster) -> Vec<ScoutPick> {
        let named = NameExtractor::shortlist(reply, roster.records());
        if named.is_empty() {
            roster.score(prompt)
        } else {
            named
        }
    }

    /// Get recent audit entries.
    pub async fn get_audit_log(&self, limit: usize) -> Vec<AuditEntry> {
        self.audit.recent(limit).await
    }

    /// Audit statistics.
    pub async fn audit_stats(&self) -> AuditStats {
        self.audit.stats().await
    }

    /// Select the first available backend.
    async fn select_backend(&self) -> Result<Arc<dyn ScoutBackend>, ServiceError> {
        for backend in &self.backends {
            if backend.is_available().await {
                return Ok(Arc::clone(backend));
            }
        }
        Err(ServiceError::NoBackendAvailable)
    }

    /// Call the selected backend under the configured deadline.
    async fn generate(
        &self,
        prompt: &str,
        roster: &Roster,
    ) -> Result<(String, AgentReply), ServiceError> {
        let backend = self.select_backend().await?;
        let start = Instant::now();

        let reply = tokio::time::timeout(
            Duration::from_millis(self.config.timeout_ms),
            backend.reply(ReplyRequest::new(prompt, roster.records())),
        )
        .await
        .map_err(|_| BackendError::Timeout {
            after_ms: self.config.timeout_ms,
        })??;

        if reply.content.trim().is_empty() {
            return Err(BackendError::ParseError("Empty reply".to_string()).into());
        }

        debug!(
            backend = backend.id(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Backend replied"
        );

        Ok((backend.id().to_string(), reply))
    }
}
