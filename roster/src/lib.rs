//! Freelancer Roster for CryptoTasks
//!
//! The read-only list of freelancers a client can scout, message and send
//! proposals to, together with the pure text logic that ranks it:
//!
//! - [`Tokenizer`]: lowercase alphanumeric tokens shared by prompts, roles
//!   and descriptions
//! - [`MatchScorer`]: token-overlap ranking with a rating tie-break chain
//! - [`NameExtractor`]: maps names mentioned in free text back to roster
//!   entries (best-effort, UI hint only)
//! - [`Roster`]: validated, ordered collection loaded from YAML or JSON
//!
//! # Example
//!
//! ```ignore
//! use roster::{MatchScorer, Roster};
//!
//! let roster = Roster::builtin()?;
//! let picks = MatchScorer::score_freelancers("need a react frontend dev", roster.records());
//! assert!(picks.len() <= 3);
//! ```

pub mod names;
pub mod roster;
pub mod scorer;
pub mod tokenizer;
pub mod types;

// Re-export main types
pub use names::NameExtractor;
pub use roster::{Roster, RosterError};
pub use scorer::{MatchScorer, SHORTLIST_LEN};
pub use tokenizer::Tokenizer;
pub use types::*;
