//! Engagement Ledger - the tentative receiver/proposer pairing.
//!
//! Densely indexed on both sides: receiver -> proposer for proposal
//! resolution, proposer -> receiver so displacement can free the old
//! partner in O(1). Entries are added or replaced during a run, never
//! removed; a receiver is either unmatched or engaged to exactly one
//! proposer.

/// Tracks current engagements over dense agent indices.
#[derive(Clone, Debug)]
pub struct EngagementLedger {
    by_receiver: Vec<Option<u32>>,
    by_proposer: Vec<Option<u32>>,
}

impl EngagementLedger {
    /// Create an empty ledger for the given universe sizes.
    pub fn new(proposer_count: usize, receiver_count: usize) -> Self {
        Self {
            by_receiver: vec![None; receiver_count],
            by_proposer: vec![None; proposer_count],
        }
    }

    /// Current partner of a receiver, if engaged.
    #[inline]
    pub fn partner_of_receiver(&self, receiver: u32) -> Option<u32> {
        self.by_receiver[receiver as usize]
    }

    /// Current partner of a proposer, if engaged.
    #[inline]
    pub fn partner_of_proposer(&self, proposer: u32) -> Option<u32> {
        self.by_proposer[proposer as usize]
    }

    /// Engage a receiver to a proposer, replacing any current partner.
    ///
    /// # Returns
    /// The displaced proposer if the receiver was already engaged.
    pub fn engage(&mut self, receiver: u32, proposer: u32) -> Option<u32> {
        let displaced = self.by_receiver[receiver as usize].replace(proposer);
        if let Some(old) = displaced {
            self.by_proposer[old as usize] = None;
        }
        self.by_proposer[proposer as usize] = Some(receiver);
        displaced
    }

    /// Number of currently engaged receivers.
    pub fn engaged_count(&self) -> usize {
        self.by_receiver.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterate engaged `(receiver, proposer)` index pairs in receiver
    /// index order.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.by_receiver
            .iter()
            .enumerate()
            .filter_map(|(receiver, slot)| slot.map(|proposer| (receiver as u32, proposer)))
    }
}
