//! Request and response bodies for the conversion endpoints

use crate::conversion::{BatchOutcome, ConversionOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /encode`
#[derive(Debug, Default, Deserialize)]
pub struct EncodeRequest {
    /// `null` counts as missing
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub options: Option<ConversionOptions>,
}

/// `POST /decode`. `toon` stays untyped so a non-string can be reported
/// separately from a missing field.
#[derive(Debug, Default, Deserialize)]
pub struct DecodeRequest {
    #[serde(default)]
    pub toon: Option<Value>,
    #[serde(default)]
    pub options: Option<ConversionOptions>,
}

/// `POST /encode-batch`
#[derive(Debug, Default, Deserialize)]
pub struct BatchEncodeRequest {
    #[serde(default)]
    pub items: Option<Value>,
    #[serde(default)]
    pub options: Option<ConversionOptions>,
}

/// `POST /encode-advanced`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedEncodeRequest {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_key_folding")]
    pub key_folding: String,
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_key_folding() -> String {
    "off".to_string()
}

fn default_indent() -> usize {
    2
}

impl AdvancedEncodeRequest {
    /// Options bag handed to the codec
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions::new()
            .with("delimiter", self.delimiter.clone())
            .with("keyFolding", self.key_folding.clone())
            .with("indent", self.indent)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeResponse {
    pub success: bool,
    pub toon: String,
    pub original_size: usize,
    pub toon_size: usize,
    pub savings: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeResponse {
    pub success: bool,
    pub data: Value,
    pub toon_size: usize,
    pub json_size: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchEncodeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedStats {
    pub json_tokens: usize,
    pub toon_tokens: usize,
    pub token_savings: String,
    pub delimiter: String,
}

#[derive(Debug, Serialize)]
pub struct AdvancedEncodeResponse {
    pub success: bool,
    pub toon: String,
    pub stats: AdvancedStats,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}
