//! Configuration for the marketplace desk.

use std::sync::Arc;
use std::time::Duration;

use roster::{Roster, RosterError};
use scout_agent::backend::{EndpointBackend, OpenAiBackend};
use scout_agent::{BackendError, ScoutBackend, ServiceConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::payment::{ScriptReleaser, DEFAULT_SCRIPT, EXPLORER_BASE_URL};
use crate::store::supabase::DEFAULT_TABLE;
use crate::store::{MemoryStore, MessageStore, StoreError, SupabaseStore};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster: {0}")]
    Roster(#[from] RosterError),

    #[error("Scout backend: {0}")]
    Backend(#[from] BackendError),

    #[error("Message store: {0}")]
    Store(#[from] StoreError),
}

/// Configuration for a marketplace deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Scout backend
    pub agent: AgentConfig,
    /// Message store
    pub datastore: DatastoreConfig,
    /// Fund release
    pub payments: PaymentsConfig,
    /// General settings
    pub general: GeneralConfig,
}

impl MarketplaceConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load config from a YAML file.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Serialize to YAML. Secrets are never written out.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply deployment environment variables on top of the file settings.
    pub fn with_env_overrides(self) -> Self {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("NEXT_PUBLIC_SUPABASE_URL") {
            self.datastore.url = Some(url);
        }
        if let Some(key) = lookup("NEXT_PUBLIC_SUPABASE_ANON_KEY") {
            self.datastore.anon_key = Some(key);
        }
        if let Some(key) = lookup("UMI_PRIVATE_KEY") {
            self.payments.signer_key = Some(key);
        }
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.agent.api_key = Some(key);
        }
        if let Some(url) = lookup("SCOUT_BACKEND_URL") {
            self.agent.base_url = Some(url);
        }
        self
    }

    /// Load the roster named by `general.roster_path`, or the built-in one.
    pub fn load_roster(&self) -> Result<Roster, ConfigError> {
        Ok(match &self.general.roster_path {
            Some(path) => Roster::from_path(path)?,
            None => Roster::builtin()?,
        })
    }

    /// Build the configured Scout backend.
    pub fn build_backend(&self) -> Result<Arc<dyn ScoutBackend>, ConfigError> {
        let agent = &self.agent;
        let backend: Arc<dyn ScoutBackend> = match agent.kind {
            BackendKind::Endpoint => Arc::new(EndpointBackend::new(agent.base_url())?),
            BackendKind::OpenAi => {
                let mut backend =
                    OpenAiBackend::new(agent.base_url(), agent.model.clone(), agent.api_key.clone())?;
                if let Some(max) = agent.max_tokens {
                    backend = backend.with_max_tokens(max);
                }
                if let Some(temp) = agent.temperature {
                    backend = backend.with_temperature(temp);
                }
                Arc::new(backend)
            }
        };
        Ok(backend)
    }

    /// Service settings for Scout.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            timeout_ms: self.agent.timeout_ms,
            audit_enabled: self.general.audit_enabled,
        }
    }

    /// Build the message store. Without datastore credentials the desk runs
    /// on an in-process store.
    pub fn build_store(&self) -> Result<Arc<dyn MessageStore>, ConfigError> {
        let datastore = &self.datastore;
        match (&datastore.url, &datastore.anon_key) {
            (Some(url), Some(key)) => Ok(Arc::new(SupabaseStore::new(url, key, &datastore.table)?)),
            _ => {
                warn!("No datastore credentials configured, messages are kept in memory");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }

    /// Build the payment script runner.
    pub fn build_releaser(&self) -> ScriptReleaser {
        let payments = &self.payments;
        ScriptReleaser::new(payments.interpreter.clone(), payments.script_path.clone())
            .with_signer_key(payments.signer_key.clone())
            .with_timeout(Duration::from_secs(payments.timeout_secs))
    }
}

/// Which kind of Scout backend to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Standalone agent server with a `/scout` route
    #[default]
    Endpoint,
    /// OpenAI-compatible chat completions (Groq, Ollama)
    OpenAi,
}

/// Scout backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub kind: BackendKind,
    /// Base URL; defaults per backend kind
    pub base_url: Option<String>,
    /// Model for chat-completion backends
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Completion cap for chat-completion backends
    pub max_tokens: Option<u32>,
    /// Sampling temperature, clamped to 0..=2
    pub temperature: Option<f32>,
    /// Deadline for one reply (ms)
    pub timeout_ms: u64,
}

impl AgentConfig {
    /// Configured base URL, or the default for the backend kind.
    pub fn base_url(&self) -> String {
        match (&self.base_url, self.kind) {
            (Some(url), _) => url.clone(),
            (None, BackendKind::Endpoint) => "http://localhost:8000".to_string(),
            (None, BackendKind::OpenAi) => scout_agent::backend::openai::GROQ_BASE_URL.to_string(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Endpoint,
            base_url: None,
            model: scout_agent::backend::openai::GROQ_MODEL.to_string(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            timeout_ms: 30_000,
        }
    }
}

/// Message store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatastoreConfig {
    /// Supabase project URL
    pub url: Option<String>,
    #[serde(skip_serializing)]
    pub anon_key: Option<String>,
    pub table: String,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

/// Fund release configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub interpreter: String,
    pub script_path: String,
    #[serde(skip_serializing)]
    pub signer_key: Option<String>,
    pub explorer_base_url: String,
    /// Script deadline (seconds)
    pub timeout_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            script_path: DEFAULT_SCRIPT.to_string(),
            signer_key: None,
            explorer_base_url: EXPLORER_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }
}

/// General configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Roster file (YAML or JSON); the built-in roster when unset
    pub roster_path: Option<String>,
    /// Account id used for scout turns when none is given
    pub originator: String,
    /// Enable audit logging
    pub audit_enabled: bool,
    /// Log level
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            roster_path: None,
            originator: "anonymous".to_string(),
            audit_enabled: true,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = MarketplaceConfig::default();
        assert_eq!(config.agent.kind, BackendKind::Endpoint);
        assert_eq!(config.agent.base_url(), "http://localhost:8000");
        assert_eq!(config.agent.model, "llama3-70b-8192");
        assert_eq!(config.datastore.table, "messages");
        assert_eq!(config.payments.interpreter, "python");
        assert!(config.general.audit_enabled);
    }

    #[test]
    fn test_partial_yaml() {
        let config = MarketplaceConfig::from_yaml(
            "agent:\n  kind: openai\n  timeout_ms: 5000\ngeneral:\n  log_level: debug\n",
        )
        .unwrap();
        assert_eq!(config.agent.kind, BackendKind::OpenAi);
        assert_eq!(config.agent.base_url(), "https://api.groq.com/openai/v1");
        assert_eq!(config.service_config().timeout_ms, 5000);
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.payments.timeout_secs, 120);
        assert!(config.agent.max_tokens.is_none());
    }

    #[test]
    fn test_sampling_knobs() {
        let config = MarketplaceConfig::from_yaml(
            "agent:\n  kind: openai\n  max_tokens: 256\n  temperature: 0.5\n",
        )
        .unwrap();
        assert_eq!(config.agent.max_tokens, Some(256));
        assert_eq!(config.agent.temperature, Some(0.5));
        assert_eq!(config.build_backend().unwrap().id(), "llama3-70b-8192");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("NEXT_PUBLIC_SUPABASE_URL", "https://project.supabase.co"),
            ("NEXT_PUBLIC_SUPABASE_ANON_KEY", "anon"),
            ("UMI_PRIVATE_KEY", "0xsigner"),
            ("GROQ_API_KEY", "gsk"),
            ("SCOUT_BACKEND_URL", ""),
        ]
        .into_iter()
        .collect();

        let config =
            MarketplaceConfig::default().apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.datastore.url.as_deref(), Some("https://project.supabase.co"));
        assert_eq!(config.datastore.anon_key.as_deref(), Some("anon"));
        assert_eq!(config.payments.signer_key.as_deref(), Some("0xsigner"));
        assert_eq!(config.agent.api_key.as_deref(), Some("gsk"));
        // Blank values do not override
        assert!(config.agent.base_url.is_none());
    }

    #[test]
    fn test_secrets_not_serialized() {
        let config = MarketplaceConfig::default().apply_env(|key| match key {
            "UMI_PRIVATE_KEY" => Some("0xsigner".to_string()),
            "NEXT_PUBLIC_SUPABASE_ANON_KEY" => Some("anon-secret".to_string()),
            _ => None,
        });
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("0xsigner"));
        assert!(!yaml.contains("anon-secret"));

        let parsed = MarketplaceConfig::from_yaml(&yaml).unwrap();
        assert!(parsed.payments.signer_key.is_none());
    }

    #[test]
    fn test_builds_collaborators() {
        let config = MarketplaceConfig::default();
        assert_eq!(config.load_roster().unwrap().len(), 15);
        assert_eq!(config.build_store().unwrap().id(), "memory");
        assert_eq!(
            config.build_backend().unwrap().id(),
            "scout-endpoint:http://localhost:8000"
        );
    }
}
