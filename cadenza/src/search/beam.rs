use rayon::prelude::*;

use crate::errors::{CadenzaError, Result};
use crate::features::FeatureExtract;
use crate::model::LinearModel;
use crate::search::{Agenda, ScoredCandidate};
use crate::system::{Configuration, TransitionSystem};

/// A completed (or halted) derivation: the final configuration and its
/// cumulative score. The transition sequence is the configuration's history.
#[derive(Clone, Debug)]
pub struct Derivation {
    config: Configuration,
    score: i64,
}

impl Derivation {
    /// Returns the transition sequence from the initial configuration.
    #[inline]
    pub fn transitions(&self) -> &[u32] {
        self.config.history()
    }

    /// Returns the final configuration.
    #[inline]
    pub const fn config(&self) -> &Configuration {
        &self.config
    }

    /// Returns the cumulative score.
    #[inline]
    pub const fn score(&self) -> i64 {
        self.score
    }
}

/// The outcome of an early-update decode: the best beam derivation and the
/// gold derivation at the same depth.
///
/// `early_update` is `Some(k - 1)` when the gold derivation left the beam at
/// round `k` (the predicted derivation then has exactly `k` transitions),
/// and `None` when the gold derivation survived to the end of the search.
#[derive(Clone, Debug)]
pub struct EarlyUpdate {
    /// The best beam derivation at the halting depth.
    pub predicted: Derivation,

    /// The gold-sequence derivation at the same depth.
    pub gold: Derivation,

    /// The divergence round minus one, if the search halted early.
    pub early_update: Option<usize>,
}

struct BeamItem {
    config: Configuration,
    score: i64,
}

/// Best-first beam search over a transition system.
///
/// Each round expands every surviving derivation by all its legal
/// transitions, scores the expansions in bulk, keeps the top `width`, and
/// stops when the best derivation is terminal or the round bound of
/// 2 × nodes is reached. With `parallel` set, per-slot expansion fans out
/// over rayon; the merge into the agenda stays slot-major either way, so
/// the set of candidates considered per round does not depend on the mode.
pub struct Beam<'a, S, F>
where
    S: TransitionSystem + ?Sized,
    F: FeatureExtract,
{
    system: &'a S,
    model: &'a LinearModel,
    extractor: &'a F,
    width: usize,
    parallel: bool,
}

impl<'a, S, F> Beam<'a, S, F>
where
    S: TransitionSystem + ?Sized,
    F: FeatureExtract,
{
    /// Creates a beam of the given width.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the width is zero.
    pub fn new(
        system: &'a S,
        model: &'a LinearModel,
        extractor: &'a F,
        width: usize,
    ) -> Result<Self> {
        if width == 0 {
            return Err(CadenzaError::invalid_argument(
                "width",
                "the beam width must be positive",
            ));
        }
        Ok(Self {
            system,
            model,
            extractor,
            width,
            parallel: false,
        })
    }

    /// Enables parallel candidate expansion. Default to false; the
    /// sequential mode is the correctness baseline.
    pub const fn parallel(mut self, yes: bool) -> Self {
        self.parallel = yes;
        self
    }

    fn expand_slot(&self, slot: usize, item: &BeamItem) -> Vec<ScoredCandidate> {
        let mut features = vec![];
        self.extractor.features(&item.config, &mut features);
        let mut scores = vec![];
        self.model.transition_scores(&features, &mut scores);

        let mut legal = vec![];
        self.system.legal(&item.config, &mut legal);
        legal
            .into_iter()
            .map(|t| {
                ScoredCandidate::unexpanded(item.score + scores[t as usize], t, slot)
            })
            .collect()
    }

    fn expand_all(&self, beam: &[BeamItem]) -> Vec<Vec<ScoredCandidate>> {
        if self.parallel {
            beam.par_iter()
                .enumerate()
                .map(|(slot, item)| self.expand_slot(slot, item))
                .collect()
        } else {
            beam.iter()
                .enumerate()
                .map(|(slot, item)| self.expand_slot(slot, item))
                .collect()
        }
    }

    /// Selects the round's survivors from the agenda and materializes their
    /// configurations; index 0 is the round best.
    fn select(
        &self,
        agenda: &mut Agenda,
        beam: &[BeamItem],
    ) -> Result<(Vec<BeamItem>, Vec<ScoredCandidate>)> {
        agenda.sort();
        let mut selected = agenda.take_items();
        let mut next = Vec::with_capacity(selected.len());
        for cand in &mut selected {
            let config = self.system.apply(&beam[cand.slot()].config, cand.transition())?;
            next.push(BeamItem {
                config: config.clone(),
                score: cand.score(),
            });
            cand.expand(config);
        }
        Ok((next, selected))
    }

    fn best_of(mut beam: Vec<BeamItem>) -> Derivation {
        let best = beam
            .iter()
            .enumerate()
            .max_by_key(|(_, item)| item.score)
            .map(|(i, _)| i)
            .unwrap();
        let item = beam.swap_remove(best);
        Derivation {
            config: item.config,
            score: item.score,
        }
    }

    /// Decodes from the given initial configuration, returning the best
    /// terminal derivation (or the best derivation at the round bound).
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when a selected transition fails to
    /// apply, which signals an inconsistency between the legal-transition
    /// generator and the application function.
    pub fn decode(&self, init: Configuration) -> Result<Derivation> {
        let bound = 2 * init.num_nodes();
        let mut beam = vec![BeamItem {
            config: init,
            score: 0,
        }];
        if self.system.is_terminal(&beam[0].config) {
            return Ok(Self::best_of(beam));
        }
        let mut agenda = Agenda::new();

        for _round in 0..bound {
            agenda.clear();
            for candidates in self.expand_all(&beam) {
                for candidate in candidates {
                    agenda.insert_bounded(candidate, self.width);
                }
            }
            if agenda.is_empty() {
                // Every derivation is stuck; the round bound semantics
                // apply.
                break;
            }
            let (next, _) = self.select(&mut agenda, &beam)?;
            let best_terminal = self.system.is_terminal(&next[0].config);
            beam = next;
            if best_terminal {
                break;
            }
        }
        Ok(Self::best_of(beam))
    }

    /// Decodes with early-update semantics against a gold transition
    /// sequence: the search halts the moment the gold derivation is no
    /// longer among the survivors (or the gold sequence is exhausted) and
    /// returns the best beam derivation paired with the gold derivation at
    /// that depth, neither of which needs to be terminal.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when a transition fails to apply,
    /// including the gold transitions themselves (a malformed gold
    /// sequence).
    pub fn decode_early_update(
        &self,
        init: Configuration,
        gold_seq: &[u32],
    ) -> Result<EarlyUpdate> {
        let bound = (2 * init.num_nodes()).max(gold_seq.len());
        let mut gold_config = init.clone();
        let mut gold_score = 0i64;
        // Beam slot holding the gold prefix, while it survives.
        let mut gold_slot = Some(0usize);

        let mut beam = vec![BeamItem {
            config: init,
            score: 0,
        }];
        let mut agenda = Agenda::new();
        let mut features = vec![];
        let mut scores = vec![];

        for round in 1..=bound {
            let gold_next = if round <= gold_seq.len() {
                Some(gold_seq[round - 1])
            } else {
                None
            };
            let Some(gold_next) = gold_next else {
                // Gold exhausted: halt and compare at this depth.
                return Ok(EarlyUpdate {
                    predicted: Self::best_of(beam),
                    gold: Derivation {
                        config: gold_config,
                        score: gold_score,
                    },
                    early_update: None,
                });
            };

            agenda.clear();
            for candidates in self.expand_all(&beam) {
                for candidate in candidates {
                    agenda.insert_bounded(candidate, self.width);
                }
            }

            // Advance the gold derivation regardless of the beam.
            features.clear();
            self.extractor.features(&gold_config, &mut features);
            self.model.transition_scores(&features, &mut scores);
            gold_score += scores[gold_next as usize];
            gold_config = self.system.apply(&gold_config, gold_next)?;

            if agenda.is_empty() {
                return Ok(EarlyUpdate {
                    predicted: Self::best_of(beam),
                    gold: Derivation {
                        config: gold_config,
                        score: gold_score,
                    },
                    early_update: Some(round - 1),
                });
            }

            let (next, selected) = self.select(&mut agenda, &beam)?;
            let new_gold_slot = gold_slot.and_then(|gs| {
                selected
                    .iter()
                    .position(|c| c.slot() == gs && c.transition() == gold_next)
            });
            let best_terminal = self.system.is_terminal(&next[0].config);
            beam = next;
            gold_slot = new_gold_slot;

            if gold_slot.is_none() {
                // The gold derivation fell off the beam at this round.
                return Ok(EarlyUpdate {
                    predicted: Self::best_of(beam),
                    gold: Derivation {
                        config: gold_config,
                        score: gold_score,
                    },
                    early_update: Some(round - 1),
                });
            }
            if best_terminal {
                return Ok(EarlyUpdate {
                    predicted: Self::best_of(beam),
                    gold: Derivation {
                        config: gold_config,
                        score: gold_score,
                    },
                    early_update: None,
                });
            }
        }

        Ok(EarlyUpdate {
            predicted: Self::best_of(beam),
            gold: Derivation {
                config: gold_config,
                score: gold_score,
            },
            early_update: None,
        })
    }

    /// The standalone deterministic classifier: repeatedly applies the
    /// highest-scoring legal transition. Beam search with width 1 reduces
    /// to this decoder.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when a legal transition fails to apply.
    pub fn greedy(&self, init: Configuration) -> Result<Derivation> {
        let bound = 2 * init.num_nodes();
        let mut config = init;
        let mut total = 0i64;
        let mut features = vec![];
        let mut scores = vec![];
        let mut legal = vec![];

        for _round in 0..bound {
            if self.system.is_terminal(&config) {
                break;
            }
            legal.clear();
            self.system.legal(&config, &mut legal);
            if legal.is_empty() {
                break;
            }
            features.clear();
            self.extractor.features(&config, &mut features);
            self.model.transition_scores(&features, &mut scores);

            // On ties the first legal transition wins, matching the
            // strict-eviction policy of a width-1 beam.
            let mut best = legal[0];
            for &t in &legal[1..] {
                if scores[t as usize] > scores[best as usize] {
                    best = t;
                }
            }
            total += scores[best as usize];
            config = self.system.apply(&config, best)?;
        }
        Ok(Derivation {
            config,
            score: total,
        })
    }
}
