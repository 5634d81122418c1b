//! Transition systems: parser state machines and their oracles.

pub(crate) mod arc_eager;
pub(crate) mod arc_standard;
pub(crate) mod config;
pub(crate) mod transition;

pub use arc_eager::ArcEager;
pub use arc_standard::ArcStandard;
pub use config::{Configuration, NodeInfo};
pub use transition::{TransitionKind, TransitionTable, POP_ROOT, REDUCE, SHIFT};

use std::str::FromStr;

use bincode::{Decode, Encode};

use crate::errors::{CadenzaError, Result};
use crate::graph::DependencyGraph;
use crate::numberer::Numberer;
use crate::sentence::Sentence;

/// Identifies a state machine, e.g. in a persisted model.
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, PartialEq)]
pub enum SystemKind {
    /// The stack-queue system attaching dependents bottom-up.
    ArcStandard,

    /// The eager system attaching right dependents as early as possible.
    ArcEager,
}

impl SystemKind {
    /// Returns the canonical name of the system.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ArcStandard => "arc-standard",
            Self::ArcEager => "arc-eager",
        }
    }

    /// Instantiates the state machine over the given transition table.
    pub fn build(self, table: TransitionTable) -> Box<dyn TransitionSystem> {
        match self {
            Self::ArcStandard => Box::new(ArcStandard::new(table)),
            Self::ArcEager => Box::new(ArcEager::new(table)),
        }
    }
}

impl FromStr for SystemKind {
    type Err = CadenzaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "arc-standard" => Ok(Self::ArcStandard),
            "arc-eager" => Ok(Self::ArcEager),
            _ => Err(CadenzaError::invalid_argument(
                "system",
                format!("unknown transition system: {s}"),
            )),
        }
    }
}

/// A parsing state machine: the legal-transition generator, the transition
/// application function, the terminal test, and the oracle that reproduces a
/// gold derivation.
pub trait TransitionSystem: Sync {
    /// Returns the transition code table.
    fn table(&self) -> &TransitionTable;

    /// Creates the initial configuration of a sentence.
    fn init(
        &self,
        sentence: &Sentence,
        forms: &Numberer<String>,
        pos_tags: &Numberer<String>,
    ) -> Configuration;

    /// Checks if the configuration is terminal.
    fn is_terminal(&self, config: &Configuration) -> bool;

    /// Appends the codes of all transitions legal in `config` to `out`.
    fn legal(&self, config: &Configuration, out: &mut Vec<u32>);

    /// Applies a transition, returning the successor configuration. The
    /// predecessor is never mutated.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the transition's preconditions are
    /// violated; this signals a broken derivation and aborts the decode.
    fn apply(&self, config: &Configuration, transition: u32) -> Result<Configuration>;

    /// Returns the transition the gold graph prescribes for `config`.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when no action is applicable, which
    /// cannot happen on a well-formed projective gold graph and therefore
    /// signals an invariant violation.
    fn oracle_transition(
        &self,
        gold: &DependencyGraph,
        config: &Configuration,
    ) -> Result<u32>;
}

/// Replays the oracle from the initial configuration of `sentence` to a
/// terminal one, returning the gold transition sequence.
///
/// # Errors
///
/// [`CadenzaError`] is returned when the oracle gets stuck, a prescribed
/// transition fails, the derivation exceeds the 2 × nodes round bound, or
/// the terminal arc set differs from the gold arcs. A non-projective gold
/// graph hits the last case: the oracle shifts through the crossing region
/// and terminates with arcs missing.
pub fn derive_gold_sequence<S>(
    system: &S,
    gold: &DependencyGraph,
    sentence: &Sentence,
    forms: &Numberer<String>,
    pos_tags: &Numberer<String>,
) -> Result<Vec<u32>>
where
    S: TransitionSystem + ?Sized,
{
    let mut config = system.init(sentence, forms, pos_tags);
    let bound = 2 * config.num_nodes();
    for _ in 0..bound {
        if system.is_terminal(&config) {
            break;
        }
        let t = system.oracle_transition(gold, &config)?;
        config = system.apply(&config, t)?;
    }
    if !system.is_terminal(&config) {
        return Err(CadenzaError::invalid_derivation(
            "oracle",
            format!("derivation did not terminate within {bound} transitions"),
        ));
    }
    if !config.arcs().same_arcs(gold.arcs()) {
        return Err(CadenzaError::invalid_derivation(
            "oracle",
            "terminal derivation did not reproduce the gold arcs",
        ));
    }
    Ok(config.history().to_vec())
}

/// Checks if every gold dependent of `node` is already attached in `config`.
pub(crate) fn gold_dependents_attached(
    gold: &DependencyGraph,
    config: &Configuration,
    node: usize,
) -> bool {
    gold.arcs()
        .dependents(node)
        .all(|a| config.has_head(a.modifier))
}
