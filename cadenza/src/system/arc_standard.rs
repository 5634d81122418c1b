use crate::common::ROOT_NODE;
use crate::errors::{CadenzaError, Result};
use crate::graph::DependencyGraph;
use crate::numberer::Numberer;
use crate::sentence::Sentence;
use crate::system::config::Configuration;
use crate::system::transition::{TransitionKind, TransitionTable, SHIFT};
use crate::system::{gold_dependents_attached, TransitionSystem};

/// The arc-standard system in the stack/queue formulation of Nivre (2004).
///
/// The synthetic root is node 0 and enters the queue like any other node.
/// LEFT-ARC attaches the stack top to the queue front and pops it;
/// RIGHT-ARC attaches the queue front to the stack top, removes it from the
/// queue, and puts the stack top back at the queue front. A derivation is
/// terminal when the queue is empty.
pub struct ArcStandard {
    table: TransitionTable,
}

impl ArcStandard {
    /// Creates an arc-standard system over the given transition table.
    pub const fn new(table: TransitionTable) -> Self {
        Self { table }
    }
}

impl TransitionSystem for ArcStandard {
    fn table(&self) -> &TransitionTable {
        &self.table
    }

    fn init(
        &self,
        sentence: &Sentence,
        forms: &Numberer<String>,
        pos_tags: &Numberer<String>,
    ) -> Configuration {
        Configuration::init(sentence, forms, pos_tags, true)
    }

    fn is_terminal(&self, config: &Configuration) -> bool {
        config.queue_len() == 0
    }

    fn legal(&self, config: &Configuration, out: &mut Vec<u32>) {
        if config.queue_len() == 0 {
            return;
        }
        out.push(SHIFT);
        if let Some(s0) = config.stack_top() {
            for r in 0..self.table.num_relations() {
                // The root never receives a head.
                if s0 != ROOT_NODE {
                    out.push(self.table.left_arc(r));
                }
                out.push(self.table.right_arc(r));
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
                if s0 == ROOT_NODE {
                    return Err(CadenzaError::invalid_derivation(
                        kind.family(),
                        "the root cannot be attached to a head",
                    ));
                }
                next.attach(q0, relation, s0)?;
            }
            TransitionKind::RightArc(relation) => {
                let q0 = next.pop_queue().ok_or_else(|| {
                    CadenzaError::invalid_derivation(kind.family(), "the queue is empty")
                })?;
                let s0 = next.pop_stack().ok_or_else(|| {
                    CadenzaError::invalid_derivation(kind.family(), "the stack is empty")
                })?;
                next.attach(s0, relation, q0)?;
                next.push_queue_front(s0);
            }
            TransitionKind::Reduce | TransitionKind::PopRoot => {
                return Err(CadenzaError::invalid_derivation(
                    kind.family(),
                    "not part of the arc-standard system",
                ));
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
        let q0 = config.queue_front().ok_or_else(|| {
            CadenzaError::invalid_derivation(
                "oracle",
                "no action is applicable to a terminal configuration",
            )
        })?;
        if let Some(s0) = config.stack_top() {
            if let Some(arc) = gold.arcs().matching(Some(q0), None, Some(s0)).next() {
                if gold_dependents_attached(gold, config, s0) {
                    return Ok(self.table.left_arc(arc.relation));
                }
            }
            if let Some(arc) = gold.arcs().matching(Some(s0), None, Some(q0)).next() {
                if gold_dependents_attached(gold, config, q0) {
                    return Ok(self.table.right_arc(arc.relation));
                }
            }
        }
        Ok(SHIFT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Arc, ArcSet};
    use crate::sentence::Word;
    use crate::system::derive_gold_sequence;

    fn fixtures() -> (ArcStandard, Sentence, Numberer<String>, Numberer<String>) {
        let mut relations = Numberer::new();
        for r in ["ATT", "SBJ", "OBJ"] {
            relations.number(&r.to_string());
        }
        let table = TransitionTable::new(relations, "ROOT").unwrap();
        let system = ArcStandard::new(table);

        let sentence = Sentence::new(vec![
            Word::new("Economic", "JJ"),
            Word::new("news", "NN"),
            Word::new("had", "VBD"),
            Word::new("little", "JJ"),
            Word::new("effect", "NN"),
        ]);
        let mut forms = Numberer::new();
        let mut pos = Numberer::new();
        for w in sentence.words() {
            forms.number(&w.form().to_string());
            pos.number(&w.pos().to_string());
        }
        (system, sentence, forms, pos)
    }

    fn gold(system: &ArcStandard) -> DependencyGraph {
        let rel = |label: &str| {
            system
                .table()
                .relations()
                .lookup(&label.to_string())
                .unwrap()
        };
        let mut arcs = ArcSet::new();
        arcs.push(Arc::new(2, rel("ATT"), 1));
        arcs.push(Arc::new(3, rel("SBJ"), 2));
        arcs.push(Arc::new(5, rel("ATT"), 4));
        arcs.push(Arc::new(3, rel("OBJ"), 5));
        arcs.push(Arc::new(0, rel("ROOT"), 3));
        DependencyGraph::new(6, arcs)
    }

    #[test]
    fn test_oracle_round_trip() {
        let (system, sentence, forms, pos) = fixtures();
        let gold = gold(&system);

        let seq = derive_gold_sequence(&system, &gold, &sentence, &forms, &pos).unwrap();

        let mut config = system.init(&sentence, &forms, &pos);
        for &t in &seq {
            config = system.apply(&config, t).unwrap();
        }
        assert!(system.is_terminal(&config));
        assert!(config.arcs().same_arcs(gold.arcs()));
    }

    #[test]
    fn test_arc_count_invariant() {
        let (system, sentence, forms, pos) = fixtures();
        let gold = gold(&system);
        let seq = derive_gold_sequence(&system, &gold, &sentence, &forms, &pos).unwrap();

        let mut config = system.init(&sentence, &forms, &pos);
        for &t in &seq {
            config = system.apply(&config, t).unwrap();
            assert!(config.arcs().len() <= config.num_nodes() - 1);
            // No node is a modifier of two distinct arcs.
            for arc in config.arcs().arcs() {
                assert_eq!(
                    config
                        .arcs()
                        .matching(None, None, Some(arc.modifier))
                        .count(),
                    1
                );
            }
        }
    }

    #[test]
    fn test_shift_only_legal_with_queue() {
        let (system, sentence, forms, pos) = fixtures();
        let config = system.init(&sentence, &forms, &pos);

        let mut legal = vec![];
        system.legal(&config, &mut legal);
        // Empty stack: only SHIFT.
        assert_eq!(legal, vec![SHIFT]);

        let config = system.apply(&config, SHIFT).unwrap();
        legal.clear();
        system.legal(&config, &mut legal);
        // Stack top is the root: SHIFT plus the RIGHT-ARC family.
        assert_eq!(legal.len(), 1 + 4);
    }

    #[test]
    fn test_left_arc_never_attaches_root() {
        let (system, sentence, forms, pos) = fixtures();
        let table = system.table();
        let mut config = system.init(&sentence, &forms, &pos);
        // Shift the root and the first word.
        config = system.apply(&config, SHIFT).unwrap();
        config = system.apply(&config, SHIFT).unwrap();
        let la = table.left_arc(0);
        let attached = system.apply(&config, la).unwrap();
        // The stack top is now the root, which may not become a modifier.
        assert!(system.apply(&attached, la).is_err());
    }

    #[test]
    fn test_non_projective_gold_is_rejected() {
        let (system, sentence, forms, pos) = fixtures();
        let rel = |label: &str| {
            system
                .table()
                .relations()
                .lookup(&label.to_string())
                .unwrap()
        };
        // The arcs 3 -> 1 and 4 -> 2 cross, so no derivation exists. The
        // oracle shifts through the crossing region and terminates with
        // arcs missing, which must surface as an error.
        let mut arcs = ArcSet::new();
        arcs.push(Arc::new(3, rel("ATT"), 1));
        arcs.push(Arc::new(4, rel("ATT"), 2));
        arcs.push(Arc::new(0, rel("ROOT"), 3));
        arcs.push(Arc::new(3, rel("OBJ"), 4));
        arcs.push(Arc::new(3, rel("OBJ"), 5));
        let gold = DependencyGraph::new(6, arcs);

        let err = derive_gold_sequence(&system, &gold, &sentence, &forms, &pos).unwrap_err();
        assert!(err.is_derivation_error());
    }
}
