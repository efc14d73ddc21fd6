//! Preference Registry - interned agents, validated preference lists,
//! and precomputed rank tables.
//!
//! Construction performs all input validation eagerly: duplicate keys,
//! overlapping universes, duplicate or unknown list entries, and
//! receivers that fail to rank a proposer listing them. Once built, the
//! proposal loop cannot encounter a missing key, so the engine needs no
//! skip paths.
//!
//! Receiver rankings are compiled into dense reverse lookup tables
//! (proposer index -> rank) so rank comparisons are O(1) instead of a
//! linear scan of the receiver's list.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::MatchError;
use crate::types::Side;

/// Sentinel rank meaning "not ranked by this receiver"
pub const RANK_NONE: u32 = u32::MAX;

/// Dense agent pool for one side: caller agents interned to `u32`
/// indices in insertion order.
#[derive(Clone, Debug)]
struct AgentPool<A> {
    index: FxHashMap<A, u32>,
    agents: Vec<A>,
}

impl<A: Clone + Eq + Hash + fmt::Debug> AgentPool<A> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            agents: Vec::with_capacity(capacity),
        }
    }

    /// Assign the next dense index to `agent`.
    fn intern(&mut self, agent: A, side: Side) -> Result<u32, MatchError> {
        if self.index.contains_key(&agent) {
            return Err(MatchError::DuplicateAgent {
                side,
                agent: format!("{agent:?}"),
            });
        }
        let idx = self.agents.len() as u32;
        self.index.insert(agent.clone(), idx);
        self.agents.push(agent);
        Ok(idx)
    }

    #[inline]
    fn lookup(&self, agent: &A) -> Option<u32> {
        self.index.get(agent).copied()
    }

    #[inline]
    fn contains(&self, agent: &A) -> bool {
        self.index.contains_key(agent)
    }

    #[inline]
    fn resolve(&self, idx: u32) -> &A {
        &self.agents[idx as usize]
    }

    #[inline]
    fn len(&self) -> usize {
        self.agents.len()
    }
}

/// Per-proposer working list: receiver indices plus a consumption
/// cursor. The cursor is this run's "pop front" - the caller's data is
/// never handed back, so nothing observable is destroyed.
#[derive(Clone, Debug)]
struct ProposerList {
    prefs: Vec<u32>,
    cursor: usize,
}

/// Immutable-for-the-run view of both ranked preference relations.
///
/// Proposer lists are consumed front-to-back through `next_preference`;
/// receiver rankings are read-only and consulted through `rank_of`.
#[derive(Clone, Debug)]
pub struct PreferenceRegistry<A> {
    proposers: AgentPool<A>,
    receivers: AgentPool<A>,
    lists: Vec<ProposerList>,
    /// ranks[r][p] = position of proposer p in receiver r's list
    ranks: Vec<Vec<u32>>,
    total_prefs: usize,
}

impl<A: Clone + Eq + Hash + fmt::Debug> PreferenceRegistry<A> {
    /// Build and validate a registry from caller-supplied preference
    /// data.
    ///
    /// `receiver_prefs` keys are the receiver universe and
    /// `proposer_prefs` keys the proposer universe; each value ranks
    /// the opposite side most-preferred first. Entry order fixes the
    /// dense index assignment and therefore the order in which free
    /// proposers take their turns.
    ///
    /// Fails on the first malformed entry; no partially built registry
    /// is ever returned.
    pub fn build(
        receiver_prefs: Vec<(A, Vec<A>)>,
        proposer_prefs: Vec<(A, Vec<A>)>,
    ) -> Result<Self, MatchError> {
        // Intern keys on both sides first so list entries can be
        // resolved regardless of declaration order.
        let mut proposers = AgentPool::with_capacity(proposer_prefs.len());
        let mut receivers = AgentPool::with_capacity(receiver_prefs.len());

        for (agent, _) in &proposer_prefs {
            proposers.intern(agent.clone(), Side::Proposer)?;
        }
        for (agent, _) in &receiver_prefs {
            if proposers.contains(agent) {
                return Err(MatchError::SidesOverlap {
                    agent: format!("{agent:?}"),
                });
            }
            receivers.intern(agent.clone(), Side::Receiver)?;
        }

        // Compile receiver lists into dense rank tables.
        let mut ranks = vec![vec![RANK_NONE; proposers.len()]; receivers.len()];
        for (r, (agent, list)) in receiver_prefs.iter().enumerate() {
            for (position, target) in list.iter().enumerate() {
                let p = proposers
                    .lookup(target)
                    .ok_or_else(|| MatchError::UnknownProposer {
                        receiver: format!("{agent:?}"),
                        proposer: format!("{target:?}"),
                    })?;
                if ranks[r][p as usize] != RANK_NONE {
                    return Err(MatchError::DuplicatePreference {
                        side: Side::Receiver,
                        agent: format!("{agent:?}"),
                        target: format!("{target:?}"),
                    });
                }
                ranks[r][p as usize] = position as u32;
            }
        }

        // Compile proposer lists, checking that every listed receiver
        // ranks the proposer back (it may have to judge its proposal).
        let mut lists = Vec::with_capacity(proposer_prefs.len());
        let mut total_prefs = 0usize;
        for (p, (agent, list)) in proposer_prefs.iter().enumerate() {
            let mut prefs = Vec::with_capacity(list.len());
            let mut seen = vec![false; receivers.len()];
            for target in list {
                let r = receivers
                    .lookup(target)
                    .ok_or_else(|| MatchError::UnknownReceiver {
                        proposer: format!("{agent:?}"),
                        receiver: format!("{target:?}"),
                    })?;
                if seen[r as usize] {
                    return Err(MatchError::DuplicatePreference {
                        side: Side::Proposer,
                        agent: format!("{agent:?}"),
                        target: format!("{target:?}"),
                    });
                }
                seen[r as usize] = true;
                if ranks[r as usize][p] == RANK_NONE {
                    return Err(MatchError::UnrankedPartner {
                        receiver: format!("{target:?}"),
                        proposer: format!("{agent:?}"),
                    });
                }
                prefs.push(r);
            }
            total_prefs += prefs.len();
            lists.push(ProposerList { prefs, cursor: 0 });
        }

        Ok(Self {
            proposers,
            receivers,
            lists,
            ranks,
            total_prefs,
        })
    }

    // ========================================================================
    // Universe Access
    // ========================================================================

    /// Number of proposers
    #[inline]
    pub fn proposer_count(&self) -> usize {
        self.proposers.len()
    }

    /// Number of receivers
    #[inline]
    pub fn receiver_count(&self) -> usize {
        self.receivers.len()
    }

    /// Sum of all proposer list lengths (the proposal budget)
    #[inline]
    pub fn total_preferences(&self) -> usize {
        self.total_prefs
    }

    /// Resolve a dense proposer index back to the caller's agent
    #[inline]
    pub fn proposer(&self, idx: u32) -> &A {
        self.proposers.resolve(idx)
    }

    /// Resolve a dense receiver index back to the caller's agent
    #[inline]
    pub fn receiver(&self, idx: u32) -> &A {
        self.receivers.resolve(idx)
    }

    // ========================================================================
    // Proposer Lists
    // ========================================================================

    /// Pop the highest-ranked receiver this proposer has not yet tried.
    ///
    /// Destructive for the run: the cursor advances, so a proposer is
    /// never offered the same receiver twice.
    ///
    /// # Returns
    /// `None` once the list is exhausted.
    pub fn next_preference(&mut self, proposer: u32) -> Option<u32> {
        let list = &mut self.lists[proposer as usize];
        let next = list.prefs.get(list.cursor).copied();
        if next.is_some() {
            list.cursor += 1;
        }
        next
    }

    /// Whether the proposer still has untried receivers.
    #[inline]
    pub fn has_untried(&self, proposer: u32) -> bool {
        let list = &self.lists[proposer as usize];
        list.cursor < list.prefs.len()
    }

    // ========================================================================
    // Receiver Ranks
    // ========================================================================

    /// The receiver's rank for a proposer; lower is better.
    ///
    /// # Returns
    /// `RANK_NONE` if the receiver does not rank the proposer. With
    /// validation in place this is unreachable during a run.
    #[inline]
    pub fn rank_of(&self, receiver: u32, proposer: u32) -> u32 {
        self.ranks[receiver as usize][proposer as usize]
    }

    /// Whether the receiver strictly prefers `challenger` over
    /// `incumbent`.
    #[inline]
    pub fn prefers(&self, receiver: u32, challenger: u32, incumbent: u32) -> bool {
        self.rank_of(receiver, challenger) < self.rank_of(receiver, incumbent)
    }
}
