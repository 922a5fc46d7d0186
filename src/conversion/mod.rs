//! JSON to TOON conversion module
//!
//! This module contains the codec capability, its options, batch handling,
//! and size statistics.

pub mod batch;
pub mod config;
pub mod engine;
pub mod limits;
pub mod stats;

pub use batch::{encode_batch, BatchItemResult, BatchOutcome};
pub use config::{
    ConversionOptions, DecodeOptions, DelimiterType, EncodeOptions, KeyFoldingMode,
    PathExpansionMode,
};
pub use engine::{Codec, ToonCodec};
pub use stats::{canonical_json, char_len, ConversionStats};
