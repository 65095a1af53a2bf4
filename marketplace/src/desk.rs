//! MarketplaceDesk - entry point for client and freelancer turns.
//!
//! Scout turns run the proposal dialogue first and fall through to the
//! agent. Chat turns persist direct messages and handle fund release
//! requests.

use std::sync::Arc;

use dashmap::DashMap;
use roster::{FreelancerRecord, Roster, ScoutPick};
use scout_agent::{AnswerStatus, ScoutRequest, ScoutService, APOLOGY};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, MarketplaceConfig};
use crate::payment::{failure_notice, parse_release, FundReleaser, ReleaseReceipt};
use crate::proposal::{try_start_or_advance, Outbound, ProposalSession, TurnOutcome};
use crate::store::{ChatMessage, MessageStore, StoreError};

/// Which side of the marketplace an account is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Freelancer,
}

/// How a scout turn was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// Blank utterance
    Ignored,
    /// Proposal intent recognised, waiting for details
    DetailsRequested,
    /// Proposal delivered
    ProposalSent,
    /// Proposal could not be delivered
    ProposalFailed,
    /// Scout answered from a backend
    Answered,
    /// Scout fell back to the apology
    Degraded,
}

/// What Scout shows after one utterance.
#[derive(Debug, Clone)]
pub struct ScoutTurn {
    pub kind: TurnKind,
    /// Scout's messages, in display order
    pub replies: Vec<String>,
    /// Freelancers to feature; empty for proposal turns
    pub shortlist: Vec<ScoutPick>,
}

impl ScoutTurn {
    fn proposal(kind: TurnKind, replies: Vec<String>) -> Self {
        Self {
            kind,
            replies,
            shortlist: Vec::new(),
        }
    }
}

/// Result of a direct chat message.
#[derive(Debug)]
pub enum ChatOutcome {
    /// Blank message, nothing stored
    Ignored,
    /// Message stored
    Sent(ChatMessage),
    /// Release request processed; `notice` was posted to the conversation
    Release {
        amount: f64,
        receipt: Option<ReleaseReceipt>,
        notice: String,
    },
    /// The store refused the message
    Failed(StoreError),
}

/// Coordinates proposal sessions, Scout, messaging and fund release.
pub struct MarketplaceDesk {
    roster: Arc<Roster>,
    scout: Arc<ScoutService>,
    store: Arc<dyn MessageStore>,
    releaser: Arc<dyn FundReleaser>,
    /// Proposal session per originator
    sessions: DashMap<String, ProposalSession>,
}

impl MarketplaceDesk {
    pub fn new(
        roster: Arc<Roster>,
        scout: Arc<ScoutService>,
        store: Arc<dyn MessageStore>,
        releaser: Arc<dyn FundReleaser>,
    ) -> Self {
        Self {
            roster,
            scout,
            store,
            releaser,
            sessions: DashMap::new(),
        }
    }

    /// Assemble a desk from configuration.
    pub fn from_config(config: &MarketplaceConfig) -> Result<Self, ConfigError> {
        let roster = Arc::new(config.load_roster()?);
        let scout = ScoutService::new(vec![config.build_backend()?])
            .with_config(config.service_config());
        let store = config.build_store()?;
        let releaser = Arc::new(config.build_releaser());

        info!(
            freelancers = roster.len(),
            store = %store.id(),
            "Marketplace desk ready"
        );
        Ok(Self::new(roster, Arc::new(scout), store, releaser))
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn scout(&self) -> &ScoutService {
        &self.scout
    }

    /// Opening line of the Scout conversation.
    pub fn greeting(&self) -> &'static str {
        self.scout.greeting()
    }

    /// Current proposal session of an originator.
    pub fn session(&self, originator: &str) -> ProposalSession {
        self.sessions
            .get(originator)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    /// Roster entry paid at `account`, if the account is a freelancer's.
    pub fn freelancer_for(&self, account: &str) -> Option<&FreelancerRecord> {
        self.roster.by_wallet(account)
    }

    /// Client sidebar filter.
    pub fn search(&self, query: &str) -> Vec<&FreelancerRecord> {
        self.roster.search(query)
    }

    /// Handle one utterance typed to Scout.
    pub async fn scout_turn(&self, originator: &str, utterance: &str) -> ScoutTurn {
        if utterance.trim().is_empty() {
            return ScoutTurn::proposal(TurnKind::Ignored, Vec::new());
        }

        // Transitions are synchronous; the entry guard is released before
        // any store call
        let turn = {
            let mut entry = self.sessions.entry(originator.to_string()).or_default();
            let session = std::mem::take(entry.value_mut());
            let (next, turn) = try_start_or_advance(session, utterance, originator, &self.roster);
            *entry.value_mut() = next;
            turn
        };
        self.sessions.remove_if(originator, |_, session| session.is_empty());

        let kind = match turn.outcome {
            TurnOutcome::Unhandled => return self.ask_scout(originator, utterance).await,
            TurnOutcome::DetailsRequested => TurnKind::DetailsRequested,
            TurnOutcome::Dispatched => TurnKind::ProposalSent,
            TurnOutcome::MissingPaymentAddress => TurnKind::ProposalFailed,
        };

        let mut replies = Vec::new();
        for outbound in turn.outbound {
            match outbound {
                Outbound::Reply(text) => replies.push(text),
                Outbound::Deliver {
                    sender,
                    recipient,
                    text,
                } => {
                    if let Err(e) = self.store.send(&sender, &recipient, &text).await {
                        warn!(%sender, %recipient, error = %e, "Proposal delivery failed");
                        replies.push(APOLOGY.to_string());
                        return ScoutTurn::proposal(TurnKind::ProposalFailed, replies);
                    }
                    info!(%sender, %recipient, "Proposal delivered");
                }
            }
        }

        ScoutTurn::proposal(kind, replies)
    }

    async fn ask_scout(&self, originator: &str, utterance: &str) -> ScoutTurn {
        let request = ScoutRequest::new(originator, utterance);
        let answer = self.scout.ask(&request, &self.roster).await;

        let kind = match answer.status {
            AnswerStatus::Answered => TurnKind::Answered,
            AnswerStatus::Degraded => TurnKind::Degraded,
        };
        ScoutTurn {
            kind,
            replies: vec![answer.message],
            shortlist: answer.shortlist,
        }
    }

    /// Handle a direct chat message from `from` to `to`.
    ///
    /// Release requests from clients are persisted, then run through the
    /// fund releaser; the outcome is posted back into the conversation.
    pub async fn chat_turn(&self, role: Role, from: &str, to: &str, text: &str) -> ChatOutcome {
        if text.trim().is_empty() {
            return ChatOutcome::Ignored;
        }

        let release = match role {
            Role::Client => parse_release(text),
            Role::Freelancer => None,
        };

        let message = match self.store.send(from, to, text).await {
            Ok(message) => message,
            Err(e) => {
                warn!(%from, %to, error = %e, "Chat message not stored");
                return ChatOutcome::Failed(e);
            }
        };

        let Some(amount) = release else {
            return ChatOutcome::Sent(message);
        };

        info!(%from, %to, amount, "Fund release requested");
        let (receipt, notice) = match self.releaser.release(from, to, amount).await {
            Ok(receipt) => {
                let notice = receipt.notice();
                (Some(receipt), notice)
            }
            Err(e) => {
                warn!(error = %e, "Fund release failed");
                (None, failure_notice(&e.to_string()))
            }
        };

        if let Err(e) = self.store.send(from, to, &notice).await {
            warn!(error = %e, "Release notice not stored");
        }

        ChatOutcome::Release {
            amount,
            receipt,
            notice,
        }
    }

    /// Conversation between two accounts, oldest first. Empty when the
    /// store cannot be reached.
    pub async fn history(&self, account: &str, peer: &str) -> Vec<ChatMessage> {
        match self.store.history(account, peer).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(%account, %peer, error = %e, "History unavailable");
                Vec::new()
            }
        }
    }

    /// The client who first wrote to a freelancer account, if any.
    pub async fn discover_client(&self, freelancer: &str) -> Option<String> {
        let first = match self.store.first_inbound(freelancer).await {
            Ok(first) => first,
            Err(e) => {
                warn!(%freelancer, error = %e, "Client discovery failed");
                None
            }
        };
        debug!(%freelancer, found = first.is_some(), "Client discovery");
        first.map(|m| m.sender)
    }
}
