//! Validation and invariant errors.
//!
//! All input validation happens in `PreferenceRegistry::build`, before
//! the proposal loop starts. Once the loop runs, the only reachable
//! variant is `Invariant`, which indicates a bug rather than bad input.

use thiserror::Error;

use crate::types::Side;

/// Errors surfaced by registry construction and the engine loop.
///
/// Offending agents are rendered via their `Debug` form so the error
/// type stays non-generic.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    /// The same agent appears twice as a key on one side
    #[error("duplicate {side} key {agent}")]
    DuplicateAgent {
        /// Side whose key set contains the duplicate
        side: Side,
        /// The duplicated agent
        agent: String,
    },

    /// An agent appears in both universes
    #[error("agent {agent} appears as both a proposer and a receiver")]
    SidesOverlap {
        /// The overlapping agent
        agent: String,
    },

    /// A preference list ranks the same target twice
    #[error("{side} {agent} ranks {target} more than once")]
    DuplicatePreference {
        /// Side the malformed list belongs to
        side: Side,
        /// Owner of the list
        agent: String,
        /// The repeated entry
        target: String,
    },

    /// A proposer ranks a receiver with no registry entry
    #[error("proposer {proposer} ranks unknown receiver {receiver}")]
    UnknownReceiver {
        /// Owner of the list
        proposer: String,
        /// The missing receiver
        receiver: String,
    },

    /// A receiver ranks a proposer with no registry entry
    #[error("receiver {receiver} ranks unknown proposer {proposer}")]
    UnknownProposer {
        /// Owner of the list
        receiver: String,
        /// The missing proposer
        proposer: String,
    },

    /// A proposer lists a receiver that does not rank it back
    #[error("receiver {receiver} does not rank proposer {proposer}, which lists it")]
    UnrankedPartner {
        /// Receiver whose list is incomplete
        receiver: String,
        /// Proposer that would propose to it
        proposer: String,
    },

    /// Internal invariant violation; unreachable on validated input
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}
