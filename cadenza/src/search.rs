//! Beam search over transition systems.

pub(crate) mod agenda;
pub(crate) mod beam;

pub use agenda::Agenda;
pub use beam::{Beam, Derivation, EarlyUpdate};

use crate::system::Configuration;

/// A candidate expansion of a beam slot: the transition to apply, the
/// cumulative score of the resulting derivation, and the slot it expands.
///
/// A candidate is *unexpanded* until the search selects it: the resulting
/// configuration is only materialized for beam survivors, so pruned
/// candidates never pay for a clone.
#[derive(Clone, Debug)]
pub struct ScoredCandidate {
    score: i64,
    transition: u32,
    slot: usize,
    config: Option<Configuration>,
}

impl ScoredCandidate {
    pub(crate) const fn unexpanded(score: i64, transition: u32, slot: usize) -> Self {
        Self {
            score,
            transition,
            slot,
            config: None,
        }
    }

    /// Returns the cumulative derivation score.
    #[inline]
    pub const fn score(&self) -> i64 {
        self.score
    }

    /// Returns the transition this candidate applies.
    #[inline]
    pub const fn transition(&self) -> u32 {
        self.transition
    }

    /// Returns the beam slot this candidate expands.
    #[inline]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Returns the materialized configuration, if the candidate was
    /// expanded.
    #[inline]
    pub fn config(&self) -> Option<&Configuration> {
        self.config.as_ref()
    }

    pub(crate) fn expand(&mut self, config: Configuration) {
        self.config = Some(config);
    }
}

/// Candidate equality is derivation equality: two expanded candidates are
/// equal when their transition histories agree; unexpanded candidates
/// compare by (slot, transition), i.e. same predecessor and same edit.
/// Scores never take part in equality.
impl PartialEq for ScoredCandidate {
    fn eq(&self, other: &Self) -> bool {
        match (&self.config, &other.config) {
            (Some(a), Some(b)) => a.history() == b.history(),
            _ => self.slot == other.slot && self.transition == other.transition,
        }
    }
}
