use bincode::{Decode, Encode};

use crate::errors::{CadenzaError, Result};
use crate::numberer::Numberer;

/// Code of the SHIFT transition.
pub const SHIFT: u32 = 0;

/// Code of the REDUCE transition.
pub const REDUCE: u32 = 1;

/// Code of the POP-ROOT transition.
pub const POP_ROOT: u32 = 2;

const NUM_FIXED: u32 = 3;

/// A transition code resolved to its family and relation label.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransitionKind {
    /// Moves the queue front onto the stack.
    Shift,

    /// Pops the stack top.
    Reduce,

    /// Attaches the last stack element to the synthetic root.
    PopRoot,

    /// Creates an arc from the queue front to the stack top.
    LeftArc(u32),

    /// Creates an arc from the stack top to the queue front.
    RightArc(u32),
}

impl TransitionKind {
    /// Returns the family name used in error reports.
    pub const fn family(&self) -> &'static str {
        match self {
            Self::Shift => "SHIFT",
            Self::Reduce => "REDUCE",
            Self::PopRoot => "POP-ROOT",
            Self::LeftArc(_) => "LEFT-ARC",
            Self::RightArc(_) => "RIGHT-ARC",
        }
    }
}

/// The set of transition codes over a fixed relation inventory.
///
/// Codes are laid out in contiguous per-family ranges so that family tests
/// are range checks: `0..3` are SHIFT, REDUCE and POP-ROOT, `[3, 3 + R)` are
/// the LEFT-ARC transitions (one per relation), and `[3 + R, 3 + 2R)` the
/// RIGHT-ARC transitions.
#[derive(Clone, Debug, Decode, Encode)]
pub struct TransitionTable {
    relations: Numberer<String>,
    root_relation: u32,
}

impl TransitionTable {
    /// Creates a table over the given relation inventory. The root label is
    /// added to the inventory if absent and is used by POP-ROOT arcs.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the root label is missing from a
    /// frozen inventory.
    pub fn new(mut relations: Numberer<String>, root_label: &str) -> Result<Self> {
        let root_relation = relations.number(&root_label.to_string()).ok_or_else(|| {
            CadenzaError::invalid_argument(
                "root_label",
                format!("{root_label} is not in the frozen relation inventory"),
            )
        })?;
        Ok(Self {
            relations,
            root_relation,
        })
    }

    /// Returns the relation inventory.
    #[inline]
    pub const fn relations(&self) -> &Numberer<String> {
        &self.relations
    }

    /// Returns the relation code of POP-ROOT arcs.
    #[inline]
    pub const fn root_relation(&self) -> u32 {
        self.root_relation
    }

    /// Returns the number of relation labels.
    #[inline]
    pub fn num_relations(&self) -> u32 {
        u32::try_from(self.relations.len()).unwrap()
    }

    /// Returns the total number of transition codes.
    #[inline]
    pub fn len(&self) -> usize {
        (NUM_FIXED + 2 * self.num_relations()) as usize
    }

    /// Checks if the table has no relation labels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Returns the code of LEFT-ARC with the given relation.
    #[inline]
    pub fn left_arc(&self, relation: u32) -> u32 {
        debug_assert!(relation < self.num_relations());
        NUM_FIXED + relation
    }

    /// Returns the code of RIGHT-ARC with the given relation.
    #[inline]
    pub fn right_arc(&self, relation: u32) -> u32 {
        debug_assert!(relation < self.num_relations());
        NUM_FIXED + self.num_relations() + relation
    }

    /// Resolves a code to its family and relation.
    ///
    /// # Errors
    ///
    /// [`CadenzaError`] is returned when the code is outside the table.
    pub fn kind(&self, code: u32) -> Result<TransitionKind> {
        let r = self.num_relations();
        match code {
            SHIFT => Ok(TransitionKind::Shift),
            REDUCE => Ok(TransitionKind::Reduce),
            POP_ROOT => Ok(TransitionKind::PopRoot),
            c if c < NUM_FIXED + r => Ok(TransitionKind::LeftArc(c - NUM_FIXED)),
            c if c < NUM_FIXED + 2 * r => Ok(TransitionKind::RightArc(c - NUM_FIXED - r)),
            c => Err(CadenzaError::invalid_derivation(
                "transition",
                format!("code {c} is outside the table of {} transitions", self.len()),
            )),
        }
    }

    /// Renders the display name of a code, e.g. `SH` or `LA-ATT`.
    pub fn name(&self, code: u32) -> String {
        match self.kind(code) {
            Ok(TransitionKind::Shift) => "SH".to_string(),
            Ok(TransitionKind::Reduce) => "RE".to_string(),
            Ok(TransitionKind::PopRoot) => "PR".to_string(),
            Ok(TransitionKind::LeftArc(r)) => {
                format!("LA-{}", self.relations.value(r).map_or("?", String::as_str))
            }
            Ok(TransitionKind::RightArc(r)) => {
                format!("RA-{}", self.relations.value(r).map_or("?", String::as_str))
            }
            Err(_) => format!("?{code}"),
        }
    }
}
