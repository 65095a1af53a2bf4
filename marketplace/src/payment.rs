//! Fund release: "Work done release <amount> eth" runs the payment script
//! and reports the resulting transaction.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Block explorer transaction page prefix.
pub const EXPLORER_BASE_URL: &str = "https://devnet.explorer.moved.network/transaction/";

/// Payment script shipped alongside the marketplace.
pub const DEFAULT_SCRIPT: &str = "cdp-sdk/examples/python/evm/send_umi_work_done.py";

/// Fund release errors
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("Missing required fields.")]
    InvalidRequest,

    #[error("Server misconfigured: missing private key.")]
    MissingSigner,

    #[error("Failed to start payment script: {0}")]
    Spawn(String),

    #[error("Payment script timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("{0}")]
    ScriptFailed(String),
}

/// What the payment script reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseReceipt {
    /// Full standard output
    pub output: String,
    pub hash: Option<String>,
    pub explorer_url: Option<String>,
}

impl ReleaseReceipt {
    /// Scan script output for the transaction hash and explorer link.
    pub fn from_output(output: String) -> Self {
        let hash = capture(hash_pattern(), &output);
        let explorer_url = capture(explorer_pattern(), &output);
        Self {
            output,
            hash,
            explorer_url,
        }
    }

    /// Chat notice posted after the release attempt.
    pub fn notice(&self) -> String {
        match &self.hash {
            Some(hash) => format!("Funds sent! Tx Hash: {hash}"),
            None => failure_notice("Unknown error"),
        }
    }
}

/// Chat notice for a failed release.
pub fn failure_notice(reason: &str) -> String {
    format!("Fund release failed: {reason}")
}

fn release_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)^Work done release ([0-9.]+) eth$").ok())
        .as_ref()
}

fn hash_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"Hash: (0x[0-9a-fA-F]+)").ok())
        .as_ref()
}

fn explorer_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"Block Explorer URL: (https?://\S+)").ok())
        .as_ref()
}

fn tx_hash_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"0x[0-9a-fA-F]{64}").ok())
        .as_ref()
}

fn capture(pattern: Option<&Regex>, text: &str) -> Option<String> {
    pattern?
        .captures(text)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

/// Amount named by a release request, if `text` is one.
///
/// A zero or unparsable amount is not a release request.
pub fn parse_release(text: &str) -> Option<f64> {
    // Whole-token parse: a malformed amount such as "1.2.3" is rejected
    // instead of being truncated to its leading "1.2"
    let amount: f64 = capture(release_pattern(), text.trim())?.parse().ok()?;
    (amount > 0.0).then_some(amount)
}

/// Explorer URLs for every transaction hash in `text`, in order of
/// appearance, without duplicates.
pub fn explorer_links(text: &str, base_url: &str) -> Vec<String> {
    let Some(pattern) = tx_hash_pattern() else {
        return Vec::new();
    };
    let mut links: Vec<String> = Vec::new();
    for hash in pattern.find_iter(text) {
        let link = format!("{}{}", base_url, hash.as_str());
        if !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

/// Moves escrowed funds from a client to a freelancer.
#[async_trait]
pub trait FundReleaser: Send + Sync {
    async fn release(&self, from: &str, to: &str, amount: f64) -> Result<ReleaseReceipt, ReleaseError>;
}

/// Releaser that runs the payment script with an interpreter:
/// `<interpreter> <script> <from> <to> <amount> <signer-key>`.
pub struct ScriptReleaser {
    interpreter: String,
    script: PathBuf,
    signer_key: Option<String>,
    timeout: Duration,
}

impl ScriptReleaser {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            signer_key: None,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_signer_key(mut self, key: Option<String>) -> Self {
        self.signer_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl FundReleaser for ScriptReleaser {
    async fn release(&self, from: &str, to: &str, amount: f64) -> Result<ReleaseReceipt, ReleaseError> {
        if from.is_empty() || to.is_empty() || amount <= 0.0 {
            return Err(ReleaseError::InvalidRequest);
        }
        let signer_key = self.signer_key.as_deref().ok_or(ReleaseError::MissingSigner)?;

        debug!(%from, %to, amount, script = %self.script.display(), "Running payment script");

        let output = timeout(
            self.timeout,
            Command::new(&self.interpreter)
                .arg(&self.script)
                .arg(from)
                .arg(to)
                .arg(amount.to_string())
                .arg(signer_key)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ReleaseError::Timeout {
            secs: self.timeout.as_secs(),
        })?
        .map_err(|e| ReleaseError::Spawn(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = ?output.status.code(), "Payment script failed");
            return Err(ReleaseError::ScriptFailed(if stderr.is_empty() {
                "script failed".to_string()
            } else {
                stderr
            }));
        }

        let receipt = ReleaseReceipt::from_output(String::from_utf8_lossy(&output.stdout).into_owned());
        info!(hash = ?receipt.hash, "Payment script finished");
        Ok(receipt)
    }
}
