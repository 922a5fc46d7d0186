//! Codec capability and the built-in TOON codec

use crate::conversion::config::ConversionOptions;
use crate::error::ToonResult;
use crate::formatter::format_to_toon;
use crate::parser::parse_toon;
use serde_json::Value;

/// Two-way conversion between a JSON model and TOON text.
///
/// Implementations must be safe to share between request handlers; the
/// gateway holds one behind an `Arc` and calls it synchronously.
pub trait Codec: Send + Sync {
    /// Serialise `data` as TOON text
    fn encode(&self, data: &Value, options: &ConversionOptions) -> ToonResult<String>;

    /// Parse TOON text back into a JSON model
    fn decode(&self, toon: &str, options: &ConversionOptions) -> ToonResult<Value>;
}

/// Built-in codec backed by [`ToonFormatter`](crate::formatter::ToonFormatter)
/// and [`ToonParser`](crate::parser::ToonParser)
#[derive(Debug, Clone, Copy, Default)]
pub struct ToonCodec;

impl ToonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for ToonCodec {
    fn encode(&self, data: &Value, options: &ConversionOptions) -> ToonResult<String> {
        let options = options.encode_options()?;
        format_to_toon(data, &options)
    }

    fn decode(&self, toon: &str, options: &ConversionOptions) -> ToonResult<Value> {
        let options = options.decode_options()?;
        parse_toon(toon, &options)
    }
}
