use bincode::{Decode, Encode};

/// A lazily-integrated scalar weight.
///
/// The cell keeps the generation of its last change, its current raw value,
/// and a chain of historical snapshots, one per earlier generation the value
/// changed in. Increments are O(1); [`HistoryValue::integrate()`] collapses
/// the chain once into the time-weighted sum, which is mathematically
/// equivalent to re-adding the value at every intervening generation but
/// costs only the number of changes, not the number of rounds.
#[derive(Clone, Debug, Default, Decode, Encode, PartialEq)]
pub struct HistoryValue {
    generation: u32,
    value: i64,
    snapshots: Vec<(u32, i64)>,
}

impl HistoryValue {
    /// Creates a zero cell at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current raw value.
    ///
    /// During training this is the value to score with; it is only
    /// meaningful as an average after [`HistoryValue::integrate()`].
    #[inline]
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// Returns the generation of the last change.
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Adds `amount` at `generation`. If the cell last changed in an earlier
    /// generation, the current value is first preserved as a snapshot under
    /// that generation.
    pub fn add(&mut self, generation: u32, amount: i64) {
        if generation > self.generation {
            self.snapshots.push((self.generation, self.value));
            self.generation = generation;
        }
        self.value += amount;
    }

    /// Collapses the snapshot chain at `generation`: the cell's value
    /// becomes `Σ vᵢ × (gᵢ₊₁ − gᵢ)`, each version weighted by the number of
    /// generations it was live. Returns the time average, the collapsed sum
    /// divided by `generation` (0.0 when no generation has elapsed).
    pub fn integrate(&mut self, generation: u32) -> f64 {
        debug_assert!(generation >= self.generation);
        let mut total = 0i64;
        let mut chain = self.snapshots.drain(..).peekable();
        while let Some((g, v)) = chain.next() {
            let next_g = chain.peek().map_or(self.generation, |&(g, _)| g);
            total += v * i64::from(next_g - g);
        }
        total += self.value * i64::from(generation.saturating_sub(self.generation));
        self.value = total;
        self.generation = generation;
        if generation == 0 {
            0.0
        } else {
            total as f64 / f64::from(generation)
        }
    }
}
