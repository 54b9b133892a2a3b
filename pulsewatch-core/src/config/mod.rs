//! Configuration types
//!
//! Calibration and timing parameters for both channels, the text format
//! they are written in, the binary record they are stored as, and the
//! boot-time choice between the two.

pub mod parse;
#[cfg(feature = "serde")]
pub mod select;
#[cfg(feature = "serde")]
pub mod stored;
pub mod types;

pub use parse::{parse_config, ParseError};
#[cfg(feature = "serde")]
pub use select::{select_config, ConfigSource, Selection, TextError};
#[cfg(feature = "serde")]
pub use stored::{
    StoreError, StoredConfig, CONFIG_MAGIC, CONFIG_VERSION, MAX_STORED_CONFIG_LEN,
};
pub use types::*;
