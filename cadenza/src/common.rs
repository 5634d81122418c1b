use bincode::config::{self, Fixint, LittleEndian};

/// Index of the synthetic root node in every configuration's node table.
pub const ROOT_NODE: usize = 0;

/// Code assigned to forms and tags never seen during training.
pub const UNKNOWN_CODE: u32 = u32::MAX;

/// Code carried by the synthetic root node in place of a form or tag.
pub const ROOT_CODE: u32 = u32::MAX - 1;

pub fn bincode_config() -> config::Configuration<LittleEndian, Fixint> {
    config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}
