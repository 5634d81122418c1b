use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use hashbrown::HashMap;

use crate::errors::{CadenzaError, Result};
use crate::model::history::HistoryValue;

/// The sparse per-feature, per-transition weight table.
///
/// The outer map is keyed by feature identifier; each entry owns a dense
/// per-transition row of [`HistoryValue`] cells, grown on demand. Rows are
/// disjoint, so updates to different features never touch the same cell.
#[derive(Clone, Debug)]
pub struct WeightStore {
    table: HashMap<u32, Vec<HistoryValue>>,
    num_transitions: usize,
}

impl WeightStore {
    /// Creates an empty store scoring `num_transitions` transitions.
    pub fn new(num_transitions: usize) -> Self {
        Self {
            table: HashMap::new(),
            num_transitions,
        }
    }

    /// Returns the number of transitions each row scores.
    #[inline]
    pub const fn num_transitions(&self) -> usize {
        self.num_transitions
    }

    /// Returns the number of features with a materialized row.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.table.len()
    }

    fn check_transition(&self, transition: u32) -> Result<usize> {
        let t = transition as usize;
        if t >= self.num_transitions {
            return Err(CadenzaError::invalid_argument(
                "transition",
                format!(
                    "index {t} is outside the scored range of {} transitions",
                    self.num_transitions
                ),
            ));
        }
        Ok(t)
    }

    /// Adds `amount` to the (feature, transition) cell at `generation`,
    /// materializing the row and the cell lazily.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the transition index is outside the
    /// scored range; this indicates a configuration bug and is never
    /// defaulted.
    pub fn add(
        &mut self,
        generation: u32,
        transition: u32,
        feature: u32,
        amount: i64,
    ) -> Result<()> {
        let t = self.check_transition(transition)?;
        let row = self
            .table
            .entry(feature)
            .or_insert_with(Vec::new);
        if row.len() <= t {
            row.resize_with(self.num_transitions, HistoryValue::new);
        }
        row[t].add(generation, amount);
        Ok(())
    }

    /// Returns the current raw value of the (feature, transition) cell.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the transition index is outside the
    /// scored range.
    pub fn value(&self, transition: u32, feature: u32) -> Result<i64> {
        let t = self.check_transition(transition)?;
        Ok(self
            .table
            .get(&feature)
            .and_then(|row| row.get(t))
            .map_or(0, HistoryValue::value))
    }

    /// Adds the whole per-transition row of `feature` into `scores`.
    ///
    /// This is the bulk path of the scorer: one lookup per feature instead
    /// of one per (feature, transition) pair.
    #[inline]
    pub fn accumulate(&self, feature: u32, scores: &mut [i64]) {
        debug_assert_eq!(scores.len(), self.num_transitions);
        if let Some(row) = self.table.get(&feature) {
            for (score, cell) in scores.iter_mut().zip(row.iter()) {
                *score += cell.value();
            }
        }
    }

    /// Integrates every cell at `generation`, collapsing all snapshot
    /// chains into time-weighted sums.
    pub fn integrate(&mut self, generation: u32) {
        for row in self.table.values_mut() {
            for cell in row.iter_mut() {
                cell.integrate(generation);
            }
        }
    }
}

// The map is flattened to feature-sorted pairs so that encoding the same
// store always produces the same bytes.
impl Encode for WeightStore {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        let mut entries: Vec<(&u32, &Vec<HistoryValue>)> = self.table.iter().collect();
        entries.sort_unstable_by_key(|(&feature, _)| feature);

        (self.num_transitions as u64).encode(encoder)?;
        (entries.len() as u64).encode(encoder)?;
        for (feature, row) in entries {
            feature.encode(encoder)?;
            row.encode(encoder)?;
        }
        Ok(())
    }
}

impl Decode for WeightStore {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let num_transitions = u64::decode(decoder)? as usize;
        let num_entries = u64::decode(decoder)? as usize;
        let mut table = HashMap::with_capacity(num_entries);
        for _ in 0..num_entries {
            let feature = u32::decode(decoder)?;
            let row = Vec::<HistoryValue>::decode(decoder)?;
            table.insert(feature, row);
        }
        Ok(Self {
            table,
            num_transitions,
        })
    }
}

bincode::impl_borrow_decode!(WeightStore);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_value() {
        let mut w = WeightStore::new(4);
        w.add(1, 2, 10, 1).unwrap();
        w.add(1, 2, 10, 1).unwrap();
        w.add(1, 3, 10, -1).unwrap();
        assert_eq!(w.value(2, 10).unwrap(), 2);
        assert_eq!(w.value(3, 10).unwrap(), -1);
        assert_eq!(w.value(0, 10).unwrap(), 0);
        assert_eq!(w.value(2, 99).unwrap(), 0);
        assert_eq!(w.num_features(), 1);
    }

    #[test]
    fn test_transition_out_of_range() {
        let mut w = WeightStore::new(4);
        assert!(w.add(1, 4, 0, 1).is_err());
        assert!(w.value(4, 0).is_err());
    }

    #[test]
    fn test_accumulate() {
        let mut w = WeightStore::new(3);
        w.add(1, 0, 7, 5).unwrap();
        w.add(1, 2, 7, -2).unwrap();
        w.add(1, 1, 8, 4).unwrap();

        let mut scores = vec![0i64; 3];
        w.accumulate(7, &mut scores);
        w.accumulate(8, &mut scores);
        w.accumulate(999, &mut scores);
        assert_eq!(scores, vec![5, 4, -2]);
    }

    #[test]
    fn test_integrate_all_cells() {
        let mut w = WeightStore::new(2);
        for _ in 0..4 {
            w.add(2, 1, 0, 1).unwrap();
        }
        w.integrate(4);
        // The collapsed sum: 4 occurrences live for 2 generations.
        assert_eq!(w.value(1, 0).unwrap(), 8);
    }

    #[test]
    fn test_encode_decode_preserves_generations() {
        let mut w = WeightStore::new(2);
        w.add(3, 0, 5, 2).unwrap();
        w.add(5, 1, 6, -1).unwrap();

        let bytes = bincode::encode_to_vec(&w, crate::common::bincode_config()).unwrap();
        let (mut r, _): (WeightStore, usize) =
            bincode::decode_from_slice(&bytes, crate::common::bincode_config()).unwrap();
        assert_eq!(r.num_transitions(), 2);
        assert_eq!(r.value(0, 5).unwrap(), 2);
        // Generation counters survive the round trip: integration behaves
        // as it would have on the original.
        r.integrate(6);
        assert_eq!(r.value(0, 5).unwrap(), 2 * 3);
        assert_eq!(r.value(1, 6).unwrap(), -1);
    }
}
