//! Feature extraction boundary.
//!
//! The search engine only sees opaque feature identifiers; the extractor
//! that produces them is pluggable. [`HashedExtractor`] is the built-in
//! template extractor over a fixed hashed feature space.

use crate::system::Configuration;

/// A pure mapping from a configuration to an ordered sequence of feature
/// identifiers.
///
/// Implementations must be `Sync`: the beam engine extracts features from
/// several candidates concurrently.
pub trait FeatureExtract: Sync {
    /// Appends the feature identifiers of `config` to `out`. Every
    /// identifier must be smaller than [`FeatureExtract::dim()`].
    fn features(&self, config: &Configuration, out: &mut Vec<u32>);

    /// Returns the size of the feature space.
    fn dim(&self) -> u32;
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[inline]
const fn fnv1a(mut hash: u64, value: u32) -> u64 {
    let bytes = value.to_le_bytes();
    let mut i = 0;
    while i < 4 {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// The built-in template extractor.
///
/// Templates combine cached form, tag and relation codes of the top stack
/// and queue nodes; each template instance is hashed (FNV-1a, stable across
/// runs and platforms) into a power-of-two feature space, so extraction
/// needs no interning table and no locks. Distinct template instances may
/// collide and share a weight; with the default space of 2^22 this is rare
/// and is the standard trade-off of hashed linear models.
#[derive(Clone, Debug)]
pub struct HashedExtractor {
    dim: u32,
}

impl Default for HashedExtractor {
    fn default() -> Self {
        Self::new(1 << 22)
    }
}

impl HashedExtractor {
    /// Creates an extractor over a feature space of `dim` identifiers,
    /// rounded down to a power of two.
    pub fn new(dim: u32) -> Self {
        let dim = if dim.is_power_of_two() {
            dim
        } else {
            (dim / 2).next_power_of_two()
        };
        Self { dim: dim.max(2) }
    }

    #[inline]
    fn emit(&self, template: u32, codes: &[u32], out: &mut Vec<u32>) {
        let mut hash = fnv1a(FNV_OFFSET, template);
        for &c in codes {
            hash = fnv1a(hash, c);
        }
        out.push((hash as u32) & (self.dim - 1));
    }
}

// Sentinels for absent nodes; distinct from both the unknown and root codes.
const NONE_CODE: u32 = u32::MAX - 2;

fn form(config: &Configuration, node: Option<usize>) -> u32 {
    node.and_then(|n| config.node(n))
        .map_or(NONE_CODE, |n| n.form())
}

fn pos(config: &Configuration, node: Option<usize>) -> u32 {
    node.and_then(|n| config.node(n))
        .map_or(NONE_CODE, |n| n.pos())
}

fn head_relation(config: &Configuration, node: Option<usize>) -> u32 {
    node.and_then(|n| config.head_of(n))
        .map_or(NONE_CODE, |(_, rel)| rel)
}

fn dep_relation(config: &Configuration, node: Option<usize>, last: bool) -> u32 {
    let deps = match node.and_then(|n| config.node(n)) {
        Some(info) => info.deps(),
        None => return NONE_CODE,
    };
    let dep = if last { deps.last() } else { deps.first() };
    dep.copied()
        .and_then(|d| config.head_of(d))
        .map_or(NONE_CODE, |(_, rel)| rel)
}

impl FeatureExtract for HashedExtractor {
    fn features(&self, config: &Configuration, out: &mut Vec<u32>) {
        let s0 = config.stack_top();
        let s1 = config.stack_item(1);
        let q0 = config.queue_front();
        let q1 = config.queue_item(1);
        let q2 = config.queue_item(2);

        let s0f = form(config, s0);
        let s0p = pos(config, s0);
        let q0f = form(config, q0);
        let q0p = pos(config, q0);

        // Unigrams.
        self.emit(0, &[s0f], out);
        self.emit(1, &[s0p], out);
        self.emit(2, &[s0f, s0p], out);
        self.emit(3, &[q0f], out);
        self.emit(4, &[q0p], out);
        self.emit(5, &[q0f, q0p], out);
        self.emit(6, &[pos(config, q1)], out);
        self.emit(7, &[pos(config, q2)], out);
        self.emit(8, &[pos(config, s1)], out);

        // Bigrams over the stack top and the queue front.
        self.emit(9, &[s0f, q0f], out);
        self.emit(10, &[s0p, q0p], out);
        self.emit(11, &[s0f, q0p], out);
        self.emit(12, &[s0p, q0f], out);

        // Trigrams.
        self.emit(13, &[s0p, q0p, pos(config, q1)], out);
        self.emit(14, &[pos(config, s1), s0p, q0p], out);

        // Structure around the stack top.
        self.emit(15, &[head_relation(config, s0)], out);
        self.emit(16, &[s0p, dep_relation(config, s0, false)], out);
        self.emit(17, &[s0p, dep_relation(config, s0, true)], out);
        self.emit(18, &[q0p, dep_relation(config, q0, false)], out);

        // State shape: degree of emptiness near the boundary.
        let stack_depth = config.stack_len().min(3) as u32;
        self.emit(19, &[stack_depth, q0p], out);
    }

    fn dim(&self) -> u32 {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numberer::Numberer;
    use crate::sentence::{Sentence, Word};

    fn config() -> Configuration {
        let sent = Sentence::new(vec![Word::new("news", "NN"), Word::new("had", "VBD")]);
        let mut forms = Numberer::new();
        let mut pos = Numberer::new();
        for w in sent.words() {
            forms.number(&w.form().to_string());
            pos.number(&w.pos().to_string());
        }
        Configuration::init(&sent, &forms, &pos, false)
    }

    #[test]
    fn test_deterministic_and_bounded() {
        let ex = HashedExtractor::new(1 << 12);
        let c = config();
        let mut a = vec![];
        let mut b = vec![];
        ex.features(&c, &mut a);
        ex.features(&c, &mut b);
        assert_eq!(a, b);
        assert!(!a.is_empty());
        assert!(a.iter().all(|&f| f < ex.dim()));
    }

    #[test]
    fn test_distinguishes_states() {
        let ex = HashedExtractor::default();
        let c = config();
        let mut before = vec![];
        ex.features(&c, &mut before);

        let mut shifted = c.clone();
        let node = shifted.pop_queue().unwrap();
        shifted.push_stack(node);
        let mut after = vec![];
        ex.features(&shifted, &mut after);
        assert_ne!(before, after);
    }

    #[test]
    fn test_dim_rounding() {
        assert_eq!(HashedExtractor::new(1 << 10).dim(), 1 << 10);
        assert_eq!(HashedExtractor::new(1000).dim(), 512);
        assert!(HashedExtractor::new(0).dim() >= 2);
    }

    #[test]
    fn test_sentinels_are_distinct() {
        assert_ne!(NONE_CODE, crate::common::UNKNOWN_CODE);
        assert_ne!(NONE_CODE, crate::common::ROOT_CODE);
    }
}
