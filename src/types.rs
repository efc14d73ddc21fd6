//! Agent-facing data model: sides, proposal events, run statistics,
//! and the final matching.
//!
//! Events are the observable trace of one engine run.
//! The `Matching` is its result.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Which universe an agent belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Agents that initiate offers, consuming their list front-to-back
    Proposer = 0,
    /// Agents that hold or refuse offers based on their own ranking
    Receiver = 1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Proposer => Side::Receiver,
            Side::Receiver => Side::Proposer,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Proposer => f.write_str("proposer"),
            Side::Receiver => f.write_str("receiver"),
        }
    }
}

// ============================================================================
// Run Trace
// ============================================================================

/// One resolved proposal (or list exhaustion) in the run trace
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchEvent<A> {
    /// An unmatched receiver accepted the proposal
    Engaged {
        /// Proposer that made the offer
        proposer: A,
        /// Receiver that accepted it
        receiver: A,
    },
    /// The receiver dropped its partner for a strictly better proposer
    Displaced {
        /// Receiver that switched
        receiver: A,
        /// Proposer now holding the engagement
        incoming: A,
        /// Proposer sent back to the free queue
        displaced: A,
    },
    /// The receiver kept its current partner
    Refused {
        /// Proposer whose offer was turned down
        proposer: A,
        /// Receiver that refused it
        receiver: A,
    },
    /// The proposer ran out of untried receivers and left the run
    Exhausted {
        /// Proposer with an empty remaining list
        proposer: A,
    },
}

/// Summary counters for one engine run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    /// Proposals resolved (one per consumed preference entry)
    pub proposals: u64,
    /// Proposals accepted by an unmatched receiver
    pub engagements: u64,
    /// Proposals that displaced a previously engaged proposer
    pub displacements: u64,
    /// Proposals refused in favor of the incumbent
    pub refusals: u64,
    /// Proposers dropped after exhausting their list unmatched
    pub exhausted: u64,
}

// ============================================================================
// Result
// ============================================================================

/// The assignment produced by a run.
///
/// Keyed receiver -> proposer, with the inverse maintained for O(1)
/// reverse lookup. Receivers that never accepted a proposal and
/// proposers that exhausted their list are absent.
#[derive(Clone, Debug)]
pub struct Matching<A> {
    by_receiver: FxHashMap<A, A>,
    by_proposer: FxHashMap<A, A>,
}

impl<A: Clone + Eq + Hash> Matching<A> {
    /// Build a matching from `(receiver, proposer)` pairs.
    pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (A, A)>) -> Self {
        let mut by_receiver = FxHashMap::default();
        let mut by_proposer = FxHashMap::default();
        for (receiver, proposer) in pairs {
            by_proposer.insert(proposer.clone(), receiver.clone());
            by_receiver.insert(receiver, proposer);
        }
        Self {
            by_receiver,
            by_proposer,
        }
    }

    /// The proposer a receiver ended up engaged to
    #[inline]
    pub fn receiver_partner(&self, receiver: &A) -> Option<&A> {
        self.by_receiver.get(receiver)
    }

    /// The receiver a proposer ended up engaged to
    #[inline]
    pub fn proposer_partner(&self, proposer: &A) -> Option<&A> {
        self.by_proposer.get(proposer)
    }

    /// Iterate `(receiver, proposer)` pairs in unspecified order
    pub fn pairs(&self) -> impl Iterator<Item = (&A, &A)> {
        self.by_receiver.iter()
    }

    /// Number of engaged pairs
    #[inline]
    pub fn len(&self) -> usize {
        self.by_receiver.len()
    }

    /// Whether no pair was formed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_receiver.is_empty()
    }

    /// Consume the matching into the receiver -> proposer map
    pub fn into_map(self) -> FxHashMap<A, A> {
        self.by_receiver
    }
}

impl<A: Eq + Hash> PartialEq for Matching<A> {
    fn eq(&self, other: &Self) -> bool {
        // by_proposer is derived from by_receiver
        self.by_receiver == other.by_receiver
    }
}

impl<A: Eq + Hash> Eq for Matching<A> {}

/// Everything one engine run produces
#[derive(Clone, Debug)]
pub struct MatchReport<A> {
    /// The resulting assignment
    pub matching: Matching<A>,
    /// Proposal-by-proposal trace in resolution order
    pub events: Vec<MatchEvent<A>>,
    /// Summary counters
    pub stats: MatchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Proposer.opposite(), Side::Receiver);
        assert_eq!(Side::Receiver.opposite(), Side::Proposer);
    }

    #[test]
    fn test_matching_lookup_both_directions() {
        let matching = Matching::from_pairs(vec![("X", "A"), ("Y", "B")]);

        assert_eq!(matching.len(), 2);
        assert_eq!(matching.receiver_partner(&"X"), Some(&"A"));
        assert_eq!(matching.receiver_partner(&"Y"), Some(&"B"));
        assert_eq!(matching.proposer_partner(&"A"), Some(&"X"));
        assert_eq!(matching.proposer_partner(&"B"), Some(&"Y"));
        assert_eq!(matching.receiver_partner(&"A"), None);
        assert_eq!(matching.proposer_partner(&"X"), None);
    }

    #[test]
    fn test_empty_matching() {
        let matching: Matching<&str> = Matching::from_pairs(vec![]);
        assert!(matching.is_empty());
        assert_eq!(matching.len(), 0);
        assert!(matching.into_map().is_empty());
    }

    #[test]
    fn test_matching_equality_ignores_pair_order() {
        let a = Matching::from_pairs(vec![("X", "A"), ("Y", "B")]);
        let b = Matching::from_pairs(vec![("Y", "B"), ("X", "A")]);
        assert_eq!(a, b);

        let c = Matching::from_pairs(vec![("X", "B"), ("Y", "A")]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_into_map_is_keyed_by_receiver() {
        let matching = Matching::from_pairs(vec![("X", "A")]);
        let map = matching.into_map();
        assert_eq!(map.get(&"X"), Some(&"A"));
    }
}
