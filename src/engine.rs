//! Matching Engine - the proposal/acceptance loop.
//!
//! Repeatedly pops a free proposer, resolves its next proposal against
//! the engagement ledger (engage, displace, or refuse), and re-enqueues
//! displaced or refused proposers that still have untried receivers.
//!
//! Termination: every resolved proposal permanently consumes one
//! preference entry, and the total entry count is finite, so the loop
//! runs at most that many productive iterations before every proposer
//! is engaged or exhausted. On complete, strictly ranked instances the
//! result is the proposer-optimal (receiver-pessimal) stable matching.

use std::fmt;
use std::hash::Hash;

use log::{debug, trace};

use crate::error::MatchError;
use crate::ledger::EngagementLedger;
use crate::queue::FreeQueue;
use crate::registry::PreferenceRegistry;
use crate::types::{MatchEvent, MatchReport, MatchStats, Matching};

/// Drives one run of the proposal loop over a validated registry.
///
/// The engine exclusively owns its registry, ledger, and queue; a run
/// consumes the engine and returns the assembled report.
pub struct MatchingEngine<A> {
    registry: PreferenceRegistry<A>,
    ledger: EngagementLedger,
    queue: FreeQueue,
    events: Vec<MatchEvent<A>>,
    stats: MatchStats,
}

impl<A: Clone + Eq + Hash + fmt::Debug> MatchingEngine<A> {
    /// Create an engine with every proposer seeded into the free queue
    /// in registry order.
    pub fn new(registry: PreferenceRegistry<A>) -> Self {
        let proposer_count = registry.proposer_count();
        Self {
            ledger: EngagementLedger::new(proposer_count, registry.receiver_count()),
            queue: FreeQueue::seeded(proposer_count),
            events: Vec::with_capacity(registry.total_preferences()),
            stats: MatchStats::default(),
            registry,
        }
    }

    /// Run the loop to completion and assemble the matching.
    pub fn run(mut self) -> Result<MatchReport<A>, MatchError> {
        // Circuit breaker against queue-discipline bugs: each dequeue
        // either consumes a preference entry or exhausts a proposer, so
        // this budget cannot be reached from well-formed state.
        let budget =
            (self.registry.total_preferences() + self.registry.proposer_count()) as u64;
        let mut steps = 0u64;

        while let Some(proposer) = self.queue.pop_front() {
            steps += 1;
            if steps > budget {
                return Err(MatchError::Invariant(format!(
                    "proposal loop exceeded its budget of {budget} steps"
                )));
            }
            self.step(proposer)?;
        }

        debug!(
            "matching complete: {} engaged, {} proposals, {} displacements, {} exhausted",
            self.ledger.engaged_count(),
            self.stats.proposals,
            self.stats.displacements,
            self.stats.exhausted,
        );

        let matching = Matching::from_pairs(self.ledger.pairs().map(|(receiver, proposer)| {
            (
                self.registry.receiver(receiver).clone(),
                self.registry.proposer(proposer).clone(),
            )
        }));

        Ok(MatchReport {
            matching,
            events: self.events,
            stats: self.stats,
        })
    }

    /// Resolve one free proposer's next proposal.
    fn step(&mut self, proposer: u32) -> Result<(), MatchError> {
        let Some(receiver) = self.registry.next_preference(proposer) else {
            self.drop_exhausted(proposer);
            return Ok(());
        };
        self.stats.proposals += 1;

        match self.ledger.partner_of_receiver(receiver) {
            None => {
                self.ledger.engage(receiver, proposer);
                self.stats.engagements += 1;
                trace!(
                    "{:?} engaged to {:?}",
                    self.registry.receiver(receiver),
                    self.registry.proposer(proposer),
                );
                self.events.push(MatchEvent::Engaged {
                    proposer: self.registry.proposer(proposer).clone(),
                    receiver: self.registry.receiver(receiver).clone(),
                });
            }
            Some(incumbent) if self.registry.prefers(receiver, proposer, incumbent) => {
                self.ledger.engage(receiver, proposer);
                self.stats.displacements += 1;
                trace!(
                    "{:?} switched from {:?} to {:?}",
                    self.registry.receiver(receiver),
                    self.registry.proposer(incumbent),
                    self.registry.proposer(proposer),
                );
                self.events.push(MatchEvent::Displaced {
                    receiver: self.registry.receiver(receiver).clone(),
                    incoming: self.registry.proposer(proposer).clone(),
                    displaced: self.registry.proposer(incumbent).clone(),
                });
                self.requeue(incumbent)?;
            }
            Some(_) => {
                self.stats.refusals += 1;
                trace!(
                    "{:?} refused {:?}",
                    self.registry.receiver(receiver),
                    self.registry.proposer(proposer),
                );
                self.events.push(MatchEvent::Refused {
                    proposer: self.registry.proposer(proposer).clone(),
                    receiver: self.registry.receiver(receiver).clone(),
                });
                self.requeue(proposer)?;
            }
        }
        Ok(())
    }

    /// Put a free proposer back in line, or drop it if its list is dry.
    fn requeue(&mut self, proposer: u32) -> Result<(), MatchError> {
        if !self.registry.has_untried(proposer) {
            self.drop_exhausted(proposer);
            return Ok(());
        }
        if !self.queue.push_back(proposer) {
            return Err(MatchError::Invariant(
                "free queue overflow: a proposer was enqueued twice".to_string(),
            ));
        }
        Ok(())
    }

    /// Record a proposer leaving the run with no receivers left to try.
    fn drop_exhausted(&mut self, proposer: u32) {
        self.stats.exhausted += 1;
        trace!(
            "{:?} exhausted its preference list",
            self.registry.proposer(proposer),
        );
        self.events.push(MatchEvent::Exhausted {
            proposer: self.registry.proposer(proposer).clone(),
        });
    }
}

/// Compute the proposer-optimal stable matching for one instance.
///
/// `receiver_prefs` keys are the receiver universe and `proposer_prefs`
/// keys the proposer universe; each value ranks the opposite side
/// most-preferred first. Entry order fixes the deterministic order in
/// which free proposers take their turns.
///
/// Inputs are validated eagerly and taken by value; no partial matching
/// is ever returned on malformed data. Well-formed but degenerate input
/// (empty universes, empty lists) yields an empty matching.
///
/// # Returns
/// The receiver -> proposer assignment. Receivers that never accepted a
/// proposal and proposers that exhausted their list are absent.
pub fn compute_stable_matching<A: Clone + Eq + Hash + fmt::Debug>(
    receiver_prefs: Vec<(A, Vec<A>)>,
    proposer_prefs: Vec<(A, Vec<A>)>,
) -> Result<Matching<A>, MatchError> {
    let registry = PreferenceRegistry::build(receiver_prefs, proposer_prefs)?;
    let report = MatchingEngine::new(registry).run()?;
    Ok(report.matching)
}
