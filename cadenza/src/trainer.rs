//! Structured-perceptron training with beam search and early updates.

pub(crate) mod corpus;

pub use corpus::{read_conll, Instance};

use crate::errors::{CadenzaError, Result};
use crate::features::{FeatureExtract, HashedExtractor};
use crate::model::{LinearModel, Model};
use crate::numberer::Numberer;
use crate::search::Beam;
use crate::system::{
    derive_gold_sequence, Configuration, SystemKind, TransitionSystem, TransitionTable,
};

/// Default number of passes over the corpus.
pub const DEFAULT_ITERATIONS: usize = 10;

/// Default beam width.
pub const DEFAULT_BEAM_WIDTH: usize = 8;

/// Relation label of the arc POP-ROOT draws from the artificial root.
pub const DEFAULT_ROOT_LABEL: &str = "ROOT";

/// A trainer of beam-search parsing models.
///
/// Training runs the early-update beam search over every instance and
/// applies a structured perceptron update whenever the predicted
/// derivation diverges from the gold one. Weight cells carry the update
/// generation, so averaging needs no per-instance pass over the weights.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use std::io::BufReader;
///
/// use cadenza::{read_conll, SystemKind, Trainer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let instances = read_conll(BufReader::new(File::open("train.conll")?))?;
/// let model = Trainer::new(SystemKind::ArcEager)
///     .iterations(5)?
///     .beam_width(16)?
///     .train(&instances)?;
/// model.write(File::create("parser.model")?)?;
/// # Ok(())
/// # }
/// ```
pub struct Trainer {
    system: SystemKind,
    iterations: usize,
    beam_width: usize,
    feature_dim: u32,
    root_label: String,
    parallel: bool,
    skip_invalid: bool,
}

impl Trainer {
    /// Creates a trainer for the given transition system with default
    /// settings.
    pub fn new(system: SystemKind) -> Self {
        Self {
            system,
            iterations: DEFAULT_ITERATIONS,
            beam_width: DEFAULT_BEAM_WIDTH,
            feature_dim: HashedExtractor::default().dim(),
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            parallel: false,
            skip_invalid: false,
        }
    }

    /// Sets the number of passes over the corpus.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the count is zero.
    pub fn iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations == 0 {
            return Err(CadenzaError::invalid_argument(
                "iterations",
                "the number of iterations must be positive",
            ));
        }
        self.iterations = iterations;
        Ok(self)
    }

    /// Sets the beam width.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the width is zero.
    pub fn beam_width(mut self, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(CadenzaError::invalid_argument(
                "width",
                "the beam width must be positive",
            ));
        }
        self.beam_width = width;
        Ok(self)
    }

    /// Sets the feature-space size, rounded down to a power of two.
    pub fn feature_dim(mut self, dim: u32) -> Self {
        self.feature_dim = dim;
        self
    }

    /// Sets the relation label of the root arc.
    pub fn root_label<S>(mut self, label: S) -> Self
    where
        S: Into<String>,
    {
        self.root_label = label.into();
        self
    }

    /// Enables parallel candidate expansion during the beam search.
    /// Weight updates stay sequential either way.
    pub const fn parallel(mut self, yes: bool) -> Self {
        self.parallel = yes;
        self
    }

    /// Skips instances whose gold graph the oracle cannot derive, e.g.
    /// non-projective sentences, instead of aborting.
    pub const fn skip_invalid(mut self, yes: bool) -> Self {
        self.skip_invalid = yes;
        self
    }

    /// Trains a model on the given instances.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the corpus is empty, when an
    /// oracle derivation fails and skipping is disabled, or when the
    /// search breaks down on an instance.
    pub fn train(&self, instances: &[Instance]) -> Result<Model> {
        if instances.is_empty() {
            return Err(CadenzaError::invalid_argument(
                "instances",
                "the training corpus is empty",
            ));
        }

        // Vocabulary pass. Relation labels go through the transition
        // table so the root label gets a code as well.
        let mut forms = Numberer::new();
        let mut pos_tags = Numberer::new();
        let mut relations = Numberer::new();
        for instance in instances {
            for word in instance.sentence().words() {
                forms.number(&word.form().to_string());
                pos_tags.number(&word.pos().to_string());
            }
            for relation in instance.relations() {
                relations.number(relation);
            }
        }
        let table = TransitionTable::new(relations, &self.root_label)?;
        forms.freeze();
        pos_tags.freeze();

        let system = self.system.build(table.clone());
        let extractor = HashedExtractor::new(self.feature_dim);
        let mut linear = LinearModel::new(table.len());

        // Oracle pass: derive the gold transition sequence of every
        // instance once, dropping (or aborting on) the non-derivable ones.
        let mut prepared = vec![];
        for (i, instance) in instances.iter().enumerate() {
            let gold = instance.gold_graph(table.relations())?;
            match derive_gold_sequence(
                system.as_ref(),
                &gold,
                instance.sentence(),
                &forms,
                &pos_tags,
            ) {
                Ok(gold_seq) => prepared.push((instance, gold_seq)),
                Err(e) if self.skip_invalid && e.is_derivation_error() => {
                    eprintln!("Skipping instance {i}: {e}");
                }
                Err(e) => {
                    return Err(CadenzaError::invalid_derivation(
                        "oracle",
                        format!("instance {i}: {e}"),
                    ));
                }
            }
        }
        if prepared.is_empty() {
            return Err(CadenzaError::invalid_argument(
                "instances",
                "no instance has a derivable gold graph",
            ));
        }

        let mut generation = 0u32;
        for iteration in 1..=self.iterations {
            let mut correct = 0usize;
            let mut early = 0usize;

            for (i, (instance, gold_seq)) in prepared.iter().enumerate() {
                generation = generation.checked_add(1).ok_or_else(|| {
                    CadenzaError::invalid_argument(
                        "iterations",
                        "the update generation counter overflowed",
                    )
                })?;

                let init = system.init(instance.sentence(), &forms, &pos_tags);
                let beam =
                    Beam::new(system.as_ref(), &linear, &extractor, self.beam_width)?
                        .parallel(self.parallel);
                let outcome = beam
                    .decode_early_update(init.clone(), gold_seq)
                    .map_err(|e| {
                        CadenzaError::invalid_derivation(
                            "decode",
                            format!("instance {i}: {e}"),
                        )
                    })?;

                if outcome.early_update.is_some() {
                    early += 1;
                }
                let predicted = outcome.predicted.transitions();
                let gold = outcome.gold.transitions();
                if predicted == gold {
                    correct += 1;
                    continue;
                }

                let skip = common_prefix(predicted, gold);
                replay_update(
                    system.as_ref(),
                    &extractor,
                    &mut linear,
                    &init,
                    gold,
                    skip,
                    generation,
                    1,
                )?;
                replay_update(
                    system.as_ref(),
                    &extractor,
                    &mut linear,
                    &init,
                    predicted,
                    skip,
                    generation,
                    -1,
                )?;
            }

            eprintln!(
                "Iteration {iteration}/{}: {correct}/{} derivations correct, {early} early updates",
                self.iterations,
                prepared.len(),
            );
        }

        linear.finalize(generation);
        Ok(Model {
            linear,
            system: self.system,
            table,
            forms,
            pos_tags,
            feature_dim: extractor.dim(),
            beam_width: self.beam_width,
        })
    }
}

/// Returns the length of the longest common prefix of two transition
/// sequences. The shared prefix visits identical configurations, so its
/// positive and negative updates would cancel.
fn common_prefix(a: &[u32], b: &[u32]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Replays a transition sequence from the initial configuration and adds
/// `amount` to the weights of every (feature, transition) pair from step
/// `skip` on.
#[allow(clippy::too_many_arguments)]
fn replay_update(
    system: &dyn TransitionSystem,
    extractor: &HashedExtractor,
    linear: &mut LinearModel,
    init: &Configuration,
    transitions: &[u32],
    skip: usize,
    generation: u32,
    amount: i64,
) -> Result<()> {
    let mut config = init.clone();
    let mut features = vec![];
    for (i, &t) in transitions.iter().enumerate() {
        if i >= skip {
            features.clear();
            extractor.features(&config, &mut features);
            linear.update(generation, t, &features, amount)?;
        }
        if i + 1 < transitions.len() {
            config = system.apply(&config, t)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_corpus_is_rejected() {
        assert!(Trainer::new(SystemKind::ArcEager).train(&[]).is_err());
    }

    #[test]
    fn test_non_projective_instance_aborts_or_skips() {
        // Crossing arcs: 1 -> 3 and 2 -> 4 cannot be derived projectively.
        let corpus = "\
1\ta\t_\tX\tX\t_\t3\tDEP\t_\t_
2\tb\t_\tX\tX\t_\t4\tDEP\t_\t_
3\tc\t_\tX\tX\t_\t0\tROOT\t_\t_
4\td\t_\tX\tX\t_\t3\tDEP\t_\t_
";
        let instances = read_conll(corpus.as_bytes()).unwrap();
        assert!(Trainer::new(SystemKind::ArcStandard)
            .train(&instances)
            .is_err());
        // With skipping enabled the lone instance is dropped and the
        // corpus becomes effectively empty.
        assert!(Trainer::new(SystemKind::ArcStandard)
            .skip_invalid(true)
            .train(&instances)
            .is_err());
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(&[1, 2, 3], &[1, 2, 4]), 2);
        assert_eq!(common_prefix(&[1, 2], &[1, 2, 4]), 2);
        assert_eq!(common_prefix(&[], &[1]), 0);
        assert_eq!(common_prefix(&[5], &[6]), 0);
    }
}
