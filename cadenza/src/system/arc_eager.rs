use crate::common::ROOT_NODE;
use crate::errors::{CadenzaError, Result};
use crate::graph::DependencyGraph;
use crate::numberer::Numberer;
use crate::sentence::Sentence;
use crate::system::config::Configuration;
use crate::system::transition::{TransitionKind, TransitionTable, POP_ROOT, REDUCE, SHIFT};
use crate::system::{gold_dependents_attached, TransitionSystem};

/// The arc-eager system with an explicit POP-ROOT transition.
///
/// The synthetic root never enters the queue; the final stack element is
/// attached to it by POP-ROOT. RIGHT-ARC attaches the queue front eagerly
/// and moves it onto the stack; REDUCE pops attached stack elements once
/// they are complete.
pub struct ArcEager {
    table: TransitionTable,
}

impl ArcEager {
    /// Creates an arc-eager system over the given transition table.
    pub const fn new(table: TransitionTable) -> Self {
        Self { table }
    }

    /// The legality precondition of REDUCE: the stack top already has a head
    /// (or the queue is exhausted), and popping it leaves the stack
    /// non-empty. The oracle applies its own, stricter check.
    fn reduce_legal(config: &Configuration) -> bool {
        if config.stack_len() < 2 {
            return false;
        }
        match config.stack_top() {
            Some(s0) => config.has_head(s0) || config.queue_len() == 0,
            None => false,
        }
    }
}

impl TransitionSystem for ArcEager {
    fn table(&self) -> &TransitionTable {
        &self.table
    }

    fn init(
        &self,
        sentence: &Sentence,
        forms: &Numberer<String>,
        pos_tags: &Numberer<String>,
    ) -> Configuration {
        Configuration::init(sentence, forms, pos_tags, false)
    }

    fn is_terminal(&self, config: &Configuration) -> bool {
        config.queue_len() == 0 && config.stack_len() == 0
    }

    fn legal(&self, config: &Configuration, out: &mut Vec<u32>) {
        let queue_nonempty = config.queue_len() > 0;
        if queue_nonempty && config.last_transition() != Some(REDUCE) {
            out.push(SHIFT);
        }
        if Self::reduce_legal(config) {
            out.push(REDUCE);
        }
        if config.queue_len() == 0 && config.stack_len() == 1 {
            out.push(POP_ROOT);
        }
        if let Some(s0) = config.stack_top() {
            if queue_nonempty {
                let headless = !config.has_head(s0);
                for r in 0..self.table.num_relations() {
                    if headless {
                        out.push(self.table.left_arc(r));
                    }
                    out.push(self.table.right_arc(r));
                }
            }
        }
    }

    fn apply(&self, config: &Configuration, transition: u32) -> Result<Configuration> {
        let kind = self.table.kind(transition)?;
        let mut next = config.clone();
        match kind {
            TransitionKind::Shift => {
                let node = next.pop_queue().ok_or_else(|| {
                    CadenzaError::invalid_derivation(kind.family(), "the queue is empty")
                })?;
                next.push_stack(node);
            }
            TransitionKind::LeftArc(relation) => {
                let s0 = next.pop_stack().ok_or_else(|| {
                    CadenzaError::invalid_derivation(kind.family(), "the stack is empty")
                })?;
                let q0 = next.queue_front().ok_or_else(|| {
                    CadenzaError::invalid_derivation(kind.family(), "the queue is empty")
                })?;
                next.attach(q0, relation, s0)?;
            }
            TransitionKind::RightArc(relation) => {
                let q0 = next.pop_queue().ok_or_else(|| {
                    CadenzaError::invalid_derivation(kind.family(), "the queue is empty")
                })?;
                let s0 = next.stack_top().ok_or_else(|| {
                    CadenzaError::invalid_derivation(kind.family(), "the stack is empty")
                })?;
                next.attach(s0, relation, q0)?;
                next.push_stack(q0);
            }
            TransitionKind::Reduce => {
                let s0 = next.stack_top().ok_or_else(|| {
                    CadenzaError::invalid_derivation(kind.family(), "the stack is empty")
                })?;
                if !next.has_head(s0) && next.queue_len() > 0 {
                    return Err(CadenzaError::invalid_derivation(
                        kind.family(),
                        format!("node {s0} has no head"),
                    ));
                }
                next.pop_stack();
            }
            TransitionKind::PopRoot => {
                if next.queue_len() > 0 || next.stack_len() != 1 {
                    return Err(CadenzaError::invalid_derivation(
                        kind.family(),
                        "applicable only when the queue is empty and one stack element remains",
                    ));
                }
                let s0 = next.pop_stack().unwrap();
                next.attach(ROOT_NODE, self.table.root_relation(), s0)?;
            }
        }
        next.record(transition);
        Ok(next)
    }

    fn oracle_transition(
        &self,
        gold: &DependencyGraph,
        config: &Configuration,
    ) -> Result<u32> {
        let Some(q0) = config.queue_front() else {
            // End game: reduce attached leftovers, then pop the root child.
            return match config.stack_len() {
                0 => Err(CadenzaError::invalid_derivation(
                    "oracle",
                    "no action is applicable to a terminal configuration",
                )),
                1 => Ok(POP_ROOT),
                _ => Ok(REDUCE),
            };
        };

        if let Some(s0) = config.stack_top() {
            if !config.has_head(s0) {
                if let Some(arc) = gold.arcs().matching(Some(q0), None, Some(s0)).next() {
                    return Ok(self.table.left_arc(arc.relation));
                }
            }
            if let Some(arc) = gold.arcs().matching(Some(s0), None, Some(q0)).next() {
                return Ok(self.table.right_arc(arc.relation));
            }
            // Reduce only when the queue front relates to the root or to a
            // node strictly below the stack top; a completed top is then in
            // the way. This never prescribes REDUCE directly before SHIFT.
            if config.has_head(s0) && gold_dependents_attached(gold, config, s0) {
                let below = |k: usize| {
                    gold.arcs().matching(Some(k), None, Some(q0)).next().is_some()
                        || gold.arcs().matching(Some(q0), None, Some(k)).next().is_some()
                };
                let mut stack_below = (1..config.stack_len()).map(|i| {
                    config.stack_item(i).unwrap()
                });
                if below(ROOT_NODE) || stack_below.any(below) {
                    return Ok(REDUCE);
                }
            }
        }
        Ok(SHIFT)
    }
}
