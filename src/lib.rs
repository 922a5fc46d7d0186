//! TOON (Token-Oriented Object Notation) Converter gateway
//!
//! An HTTP service that converts JSON to TOON and back, reports the size
//! reduction, and encodes batches with per-item failure isolation. The
//! codec sits behind the [`Codec`] trait; [`ToonCodec`] is the built-in
//! implementation.

pub mod config;
pub mod conversion;
pub mod error;
pub mod formatter;
pub mod gateway;
pub mod observability;
pub mod parser;

// Re-export commonly used types
pub use config::GatewayConfig;
pub use conversion::{Codec, ConversionOptions, DecodeOptions, EncodeOptions, ToonCodec};
pub use error::{GatewayError, ToonError, ToonResult};
pub use formatter::ToonFormatter;
pub use gateway::{build_router, AppState, HttpServer};
pub use parser::ToonParser;

/// Convert JSON data to TOON format with default options
pub fn encode_json(json: &serde_json::Value) -> ToonResult<String> {
    formatter::format_to_toon(json, &EncodeOptions::default())
}

/// Parse TOON text into JSON with default options
pub fn decode_toon(toon: &str) -> ToonResult<serde_json::Value> {
    parser::parse_toon(toon, &DecodeOptions::default())
}
