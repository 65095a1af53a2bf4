//! Per-conversation proposal session.
//!
//! The session is passed in and returned explicitly; the caller owns where
//! it lives. Transitions are synchronous, so the outbound effects are
//! returned for the caller to perform.

use roster::{FreelancerRecord, Roster};
use tracing::{debug, info, warn};

use super::intent::ProposalIntentParser;
use crate::store::PROPOSAL_PREFIX;

/// Where a proposal dialogue currently stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProposalSession {
    /// No proposal in progress
    #[default]
    Empty,
    /// Target resolved, waiting for the originator's next message
    AwaitingDetails {
        target: FreelancerRecord,
        originator: String,
    },
    /// Details captured, proposal about to be dispatched
    Ready {
        target: FreelancerRecord,
        originator: String,
        details: String,
    },
    /// Proposal handed off for delivery
    Sent { target: FreelancerRecord },
}

/// Stage label for a session, used to report transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalStage {
    Empty,
    AwaitingDetails,
    Ready,
    Sent,
}

impl ProposalSession {
    pub fn stage(&self) -> ProposalStage {
        match self {
            Self::Empty => ProposalStage::Empty,
            Self::AwaitingDetails { .. } => ProposalStage::AwaitingDetails,
            Self::Ready { .. } => ProposalStage::Ready,
            Self::Sent { .. } => ProposalStage::Sent,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The freelancer this session is addressed to, if any.
    pub fn target(&self) -> Option<&FreelancerRecord> {
        match self {
            Self::Empty => None,
            Self::AwaitingDetails { target, .. }
            | Self::Ready { target, .. }
            | Self::Sent { target } => Some(target),
        }
    }
}

/// An effect the caller must perform, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Text Scout shows to the originator
    Reply(String),
    /// Message to persist in the store
    Deliver {
        sender: String,
        recipient: String,
        text: String,
    },
}

/// How a turn was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Not part of a proposal dialogue; handle the message normally
    Unhandled,
    /// Intent recognised, details requested
    DetailsRequested,
    /// Proposal composed and queued for delivery
    Dispatched,
    /// Target has no payment address; nothing delivered
    MissingPaymentAddress,
}

/// Result of one proposal turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalTurn {
    pub outcome: TurnOutcome,
    pub outbound: Vec<Outbound>,
    /// Stages entered during the turn, in order
    pub transitions: Vec<ProposalStage>,
}

impl ProposalTurn {
    fn unhandled() -> Self {
        Self {
            outcome: TurnOutcome::Unhandled,
            outbound: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn is_handled(&self) -> bool {
        self.outcome != TurnOutcome::Unhandled
    }
}

/// Text of a delivered proposal.
pub fn proposal_text(details: &str, originator: &str) -> String {
    format!("{PROPOSAL_PREFIX}{details}\n\nSent via Scout on behalf of {originator}")
}

fn details_prompt(target: &FreelancerRecord) -> String {
    format!(
        "Great! What project details would you like to send to {}?",
        target.name
    )
}

fn confirmation(target: &FreelancerRecord) -> String {
    format!("Your project proposal has been sent to {}!", target.name)
}

fn missing_wallet(target: &FreelancerRecord) -> String {
    format!(
        "I couldn't send your proposal: {} has no payment address on file.",
        target.name
    )
}

/// Advance a proposal dialogue by one utterance.
///
/// From `Empty`, an utterance that names a roster freelancer opens the
/// dialogue; anything else is left unhandled. While awaiting details the
/// next utterance is taken verbatim as the project details, even when it
/// is itself another intent. A dispatched session always ends back at
/// `Empty`.
pub fn try_start_or_advance(
    session: ProposalSession,
    utterance: &str,
    originator: &str,
    roster: &Roster,
) -> (ProposalSession, ProposalTurn) {
    match session {
        ProposalSession::Empty => start(utterance, originator, roster),
        ProposalSession::AwaitingDetails { target, originator } => {
            dispatch(target, originator, utterance.to_string())
        }
        ProposalSession::Ready {
            target,
            originator,
            details,
        } => dispatch(target, originator, details),
        // Sent is terminal within a turn; a stored one is stale
        ProposalSession::Sent { .. } => start(utterance, originator, roster),
    }
}

fn start(utterance: &str, originator: &str, roster: &Roster) -> (ProposalSession, ProposalTurn) {
    let Some(target) = ProposalIntentParser::resolve(utterance, roster) else {
        return (ProposalSession::Empty, ProposalTurn::unhandled());
    };

    debug!(target = %target.username, %originator, "Proposal dialogue opened");

    let turn = ProposalTurn {
        outcome: TurnOutcome::DetailsRequested,
        outbound: vec![Outbound::Reply(details_prompt(target))],
        transitions: vec![ProposalStage::AwaitingDetails],
    };
    let session = ProposalSession::AwaitingDetails {
        target: target.clone(),
        originator: originator.to_string(),
    };
    (session, turn)
}

fn dispatch(
    target: FreelancerRecord,
    originator: String,
    details: String,
) -> (ProposalSession, ProposalTurn) {
    if !target.has_wallet() {
        warn!(target = %target.username, "Proposal target has no payment address");
        let turn = ProposalTurn {
            outcome: TurnOutcome::MissingPaymentAddress,
            outbound: vec![Outbound::Reply(missing_wallet(&target))],
            transitions: vec![ProposalStage::Ready, ProposalStage::Empty],
        };
        return (ProposalSession::Empty, turn);
    }

    let outbound = vec![
        Outbound::Deliver {
            sender: originator.clone(),
            recipient: target.wallet.clone(),
            text: proposal_text(&details, &originator),
        },
        Outbound::Reply(confirmation(&target)),
    ];

    info!(target = %target.username, %originator, "Proposal dispatched");
    let sent = ProposalSession::Sent { target };

    let turn = ProposalTurn {
        outcome: TurnOutcome::Dispatched,
        outbound,
        transitions: vec![
            ProposalStage::Ready,
            sent.stage(),
            ProposalStage::Empty,
        ],
    };
    (ProposalSession::Empty, turn)
}
