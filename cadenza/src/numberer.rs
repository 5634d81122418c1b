//! Bidirectional mapping between values and dense integer codes.

use core::hash::Hash;

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use hashbrown::HashMap;

/// Bidirectional mapping between hashable values and dense `u32` codes.
///
/// The table grows on demand until [`Numberer::freeze()`] is called; a frozen
/// table only answers lookups. Codes are assigned contiguously from zero in
/// first-seen order.
#[derive(Clone, Debug, Default)]
pub struct Numberer<T>
where
    T: Clone + Eq + Hash,
{
    index: HashMap<T, u32>,
    items: Vec<T>,
    frozen: bool,
}

impl<T> Numberer<T>
where
    T: Clone + Eq + Hash,
{
    /// Creates an empty, unfrozen table.
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            items: vec![],
            frozen: false,
        }
    }

    /// Returns the code of `value`, assigning the next free code if the value
    /// is unseen and the table is not frozen. Returns `None` for an unseen
    /// value on a frozen table.
    pub fn number(&mut self, value: &T) -> Option<u32> {
        if let Some(&code) = self.index.get(value) {
            return Some(code);
        }
        if self.frozen {
            return None;
        }
        let code = u32::try_from(self.items.len()).ok()?;
        self.index.insert(value.clone(), code);
        self.items.push(value.clone());
        Some(code)
    }

    /// Returns the code of `value` without growing the table.
    #[inline]
    pub fn lookup(&self, value: &T) -> Option<u32> {
        self.index.get(value).copied()
    }

    /// Returns the value assigned to `code`.
    #[inline]
    pub fn value(&self, code: u32) -> Option<&T> {
        self.items.get(code as usize)
    }

    /// Returns the number of assigned codes.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if no code has been assigned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stops the table from growing. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Checks if the table is frozen.
    #[inline]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }
}

// Only the item vector and the frozen flag are persisted; the inner map is
// rebuilt on decode.
impl Encode for Numberer<String> {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.items.encode(encoder)?;
        self.frozen.encode(encoder)
    }
}

impl Decode for Numberer<String> {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let items = Vec::<String>::decode(decoder)?;
        let frozen = bool::decode(decoder)?;
        let mut index = HashMap::with_capacity(items.len());
        for (code, item) in items.iter().enumerate() {
            index.insert(item.clone(), code as u32);
        }
        Ok(Self {
            index,
            items,
            frozen,
        })
    }
}

bincode::impl_borrow_decode!(Numberer<String>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_and_lookup() {
        let mut n = Numberer::new();
        assert_eq!(n.number(&"nsubj".to_string()), Some(0));
        assert_eq!(n.number(&"obj".to_string()), Some(1));
        assert_eq!(n.number(&"nsubj".to_string()), Some(0));
        assert_eq!(n.lookup(&"obj".to_string()), Some(1));
        assert_eq!(n.value(1), Some(&"obj".to_string()));
        assert_eq!(n.len(), 2);
    }

    #[test]
    fn test_freeze() {
        let mut n = Numberer::new();
        n.number(&"det".to_string());
        n.freeze();
        assert!(n.is_frozen());
        assert_eq!(n.number(&"det".to_string()), Some(0));
        assert_eq!(n.number(&"amod".to_string()), None);
        assert_eq!(n.lookup(&"amod".to_string()), None);
        assert_eq!(n.len(), 1);
    }

    #[test]
    fn test_encode_decode() {
        let mut n = Numberer::new();
        n.number(&"det".to_string());
        n.number(&"amod".to_string());
        n.freeze();

        let bytes =
            bincode::encode_to_vec(&n, crate::common::bincode_config()).unwrap();
        let (m, _): (Numberer<String>, usize) =
            bincode::decode_from_slice(&bytes, crate::common::bincode_config()).unwrap();
        assert!(m.is_frozen());
        assert_eq!(m.lookup(&"amod".to_string()), Some(1));
        assert_eq!(m.value(0), Some(&"det".to_string()));
    }
}
