//! Linear scoring model and its persisted form.

pub(crate) mod history;
pub(crate) mod weights;

pub use history::HistoryValue;
pub use weights::WeightStore;

use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::common;
use crate::errors::Result;
use crate::numberer::Numberer;
use crate::system::{SystemKind, TransitionTable};

/// A sparse linear scorer over discrete features.
///
/// The score of a transition is the sum, over the extracted features, of the
/// (feature, transition) weights. Scoring fills the whole per-transition
/// score vector in one pass over the features.
#[derive(Clone, Debug, Decode, Encode)]
pub struct LinearModel {
    weights: WeightStore,
}

impl LinearModel {
    /// Creates a zero model scoring `num_transitions` transitions.
    pub fn new(num_transitions: usize) -> Self {
        Self {
            weights: WeightStore::new(num_transitions),
        }
    }

    /// Returns the number of scored transitions.
    #[inline]
    pub const fn num_transitions(&self) -> usize {
        self.weights.num_transitions()
    }

    /// Returns the underlying weight store.
    #[inline]
    pub const fn weights(&self) -> &WeightStore {
        &self.weights
    }

    /// Fills `scores` with one score per transition for the given feature
    /// vector.
    pub fn transition_scores(&self, features: &[u32], scores: &mut Vec<i64>) {
        scores.clear();
        scores.resize(self.num_transitions(), 0);
        for &feature in features {
            self.weights.accumulate(feature, scores);
        }
    }

    /// Returns the score of a single transition for the feature vector.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`](crate::errors::CadenzaError) is returned when the
    /// transition index is outside the scored range.
    pub fn score(&self, features: &[u32], transition: u32) -> Result<i64> {
        let mut score = 0;
        for &feature in features {
            score += self.weights.value(transition, feature)?;
        }
        Ok(score)
    }

    /// Adds `amount` to the cells of every (feature, transition) pair of the
    /// feature vector, at `generation`.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`](crate::errors::CadenzaError) is returned when the
    /// transition index is outside the scored range.
    pub fn update(
        &mut self,
        generation: u32,
        transition: u32,
        features: &[u32],
        amount: i64,
    ) -> Result<()> {
        for &feature in features {
            self.weights.add(generation, transition, feature, amount)?;
        }
        Ok(())
    }

    /// Integrates all weights at `generation`, turning the raw perceptron
    /// weights into time-weighted sums. Called once after training with
    /// generation = iterations × instances; argmax decoding with the sums
    /// equals decoding with the averaged weights.
    pub fn finalize(&mut self, generation: u32) {
        self.weights.integrate(generation);
    }
}

/// A trained, self-contained parsing model: the integrated linear weights
/// plus the frozen enumeration tables they were trained against.
#[derive(Decode, Encode)]
pub struct Model {
    pub(crate) linear: LinearModel,
    pub(crate) system: SystemKind,
    pub(crate) table: TransitionTable,
    pub(crate) forms: Numberer<String>,
    pub(crate) pos_tags: Numberer<String>,
    pub(crate) feature_dim: u32,
    pub(crate) beam_width: usize,
}

impl Model {
    /// Returns the linear scorer.
    #[inline]
    pub const fn linear(&self) -> &LinearModel {
        &self.linear
    }

    /// Returns the transition system the model was trained with.
    #[inline]
    pub const fn system(&self) -> SystemKind {
        self.system
    }

    /// Returns the transition table.
    #[inline]
    pub const fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns the frozen form table.
    #[inline]
    pub const fn forms(&self) -> &Numberer<String> {
        &self.forms
    }

    /// Returns the frozen part-of-speech table.
    #[inline]
    pub const fn pos_tags(&self) -> &Numberer<String> {
        &self.pos_tags
    }

    /// Returns the feature-space size the model was trained with.
    #[inline]
    pub const fn feature_dim(&self) -> u32 {
        self.feature_dim
    }

    /// Returns the beam width used during training.
    #[inline]
    pub const fn beam_width(&self) -> usize {
        self.beam_width
    }

    /// Exports the model data.
    ///
    /// # Errors
    ///
    /// When bincode generates an error, it will be returned as is.
    pub fn write<W>(&self, mut wtr: W) -> Result<usize>
    where
        W: Write,
    {
        let num_bytes =
            bincode::encode_into_std_write(self, &mut wtr, common::bincode_config())?;
        Ok(num_bytes)
    }

    /// Creates a model from a reader.
    ///
    /// # Errors
    ///
    /// When bincode generates an error, it will be returned as is.
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let data = bincode::decode_from_std_read(&mut rdr, common::bincode_config())?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_scores_match_pointwise() {
        let mut m = LinearModel::new(3);
        m.update(1, 0, &[4, 5], 2).unwrap();
        m.update(1, 2, &[5], -1).unwrap();

        let features = [4, 5, 6];
        let mut scores = vec![];
        m.transition_scores(&features, &mut scores);
        for t in 0..3u32 {
            assert_eq!(scores[t as usize], m.score(&features, t).unwrap());
        }
        assert_eq!(scores, vec![4, 0, -1]);
    }

    #[test]
    fn test_finalize_integrates() {
        let mut m = LinearModel::new(2);
        for _ in 0..4 {
            m.update(2, 1, &[0], 1).unwrap();
        }
        m.finalize(4);
        assert_eq!(m.score(&[0], 1).unwrap(), 8);
    }

    #[test]
    fn test_model_round_trip() {
        let mut relations = Numberer::new();
        relations.number(&"SBJ".to_string());
        let table = TransitionTable::new(relations, "ROOT").unwrap();

        let mut forms = Numberer::new();
        forms.number(&"had".to_string());
        forms.freeze();
        let mut pos_tags = Numberer::new();
        pos_tags.number(&"VBD".to_string());
        pos_tags.freeze();

        let mut linear = LinearModel::new(table.len());
        linear.update(1, 0, &[3], 7).unwrap();
        linear.finalize(2);

        let model = Model {
            linear,
            system: SystemKind::ArcEager,
            table,
            forms,
            pos_tags,
            feature_dim: 1 << 12,
            beam_width: 8,
        };

        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        let restored = Model::read(buf.as_slice()).unwrap();

        assert_eq!(restored.system(), SystemKind::ArcEager);
        assert_eq!(restored.feature_dim(), 1 << 12);
        assert_eq!(restored.beam_width(), 8);
        assert!(restored.forms().is_frozen());
        assert_eq!(restored.table().len(), model.table().len());
        assert_eq!(
            restored.linear().score(&[3], 0).unwrap(),
            model.linear().score(&[3], 0).unwrap()
        );
    }
}
