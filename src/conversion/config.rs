//! Configuration options for JSON <-> TOON conversion

use crate::error::{ToonError, ToonResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Largest indentation the codec accepts, in spaces per level
pub const MAX_INDENT: usize = 16;

/// Array delimiter options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DelimiterType {
    /// Comma delimiter (,)
    #[default]
    Comma,
    /// Tab delimiter (\t)
    Tab,
    /// Pipe delimiter (|)
    Pipe,
    /// Any other single non-structural character
    Other(char),
}

impl DelimiterType {
    pub fn as_char(&self) -> char {
        match self {
            DelimiterType::Comma => ',',
            DelimiterType::Tab => '\t',
            DelimiterType::Pipe => '|',
            DelimiterType::Other(c) => *c,
        }
    }

    /// Marker written inside array length brackets. Comma is implicit.
    pub fn header_marker(&self) -> Option<char> {
        match self {
            DelimiterType::Comma => None,
            other => Some(other.as_char()),
        }
    }

    /// Human label reported in conversion stats
    pub fn label(&self) -> String {
        match self {
            DelimiterType::Comma => "comma".to_string(),
            DelimiterType::Tab => "tab".to_string(),
            DelimiterType::Pipe => "pipe".to_string(),
            DelimiterType::Other(c) => c.to_string(),
        }
    }

    pub fn from_char(c: char) -> Result<Self, String> {
        match c {
            ',' => Ok(DelimiterType::Comma),
            '\t' => Ok(DelimiterType::Tab),
            '|' => Ok(DelimiterType::Pipe),
            c if is_reserved_delimiter(c) => Err(format!(
                "Invalid delimiter {:?}. Use ',', '\\t', '|' or another non-structural character",
                c
            )),
            c => Ok(DelimiterType::Other(c)),
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "comma" => return Ok(DelimiterType::Comma),
            "tab" => return Ok(DelimiterType::Tab),
            "pipe" => return Ok(DelimiterType::Pipe),
            _ => {}
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Err(format!(
                "Invalid delimiter {:?}. A delimiter must be a single character",
                s
            )),
        }
    }
}

/// Characters that would make delimited rows ambiguous
fn is_reserved_delimiter(c: char) -> bool {
    c.is_alphanumeric()
        || (c.is_whitespace() && c != '\t')
        || (c.is_control() && c != '\t')
        || matches!(c, ':' | '[' | ']' | '{' | '}' | '"' | '\\' | '-' | '.' | '#' | '_')
}

impl TryFrom<String> for DelimiterType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<DelimiterType> for String {
    fn from(value: DelimiterType) -> Self {
        value.as_char().to_string()
    }
}

impl fmt::Display for DelimiterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Key folding mode for single-key object chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFoldingMode {
    #[default]
    Off,
    /// Fold `a: {b: {c: 1}}` into `a.b.c: 1` when every segment is a plain
    /// identifier and the folded key does not collide with a sibling
    Safe,
}

/// Dotted-key expansion mode used when decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathExpansionMode {
    #[default]
    Off,
    Safe,
}

/// Options understood by the encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncodeOptions {
    /// Spaces per indentation level
    pub indent: usize,
    /// Array delimiter
    pub delimiter: DelimiterType,
    /// Key folding mode
    pub key_folding: KeyFoldingMode,
    /// Maximum number of segments folded into one key (unlimited when absent)
    pub flatten_depth: Option<usize>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            delimiter: DelimiterType::Comma,
            key_folding: KeyFoldingMode::Off,
            flatten_depth: None,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_delimiter(mut self, delimiter: DelimiterType) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_key_folding(mut self, mode: KeyFoldingMode) -> Self {
        self.key_folding = mode;
        self
    }

    pub fn with_flatten_depth(mut self, depth: Option<usize>) -> Self {
        self.flatten_depth = depth;
        self
    }

    pub fn validate(&self) -> ToonResult<()> {
        if self.indent > MAX_INDENT {
            return Err(ToonError::invalid_options(format!(
                "indent must be 0-{} spaces",
                MAX_INDENT
            )));
        }
        Ok(())
    }
}

/// Options understood by the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeOptions {
    /// Spaces per indentation level
    pub indent: usize,
    /// Reject length mismatches and malformed indentation
    pub strict: bool,
    /// Dotted-key expansion mode
    pub expand_paths: PathExpansionMode,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            strict: true,
            expand_paths: PathExpansionMode::Off,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_expand_paths(mut self, mode: PathExpansionMode) -> Self {
        self.expand_paths = mode;
        self
    }

    pub fn validate(&self) -> ToonResult<()> {
        if self.indent == 0 || self.indent > MAX_INDENT {
            return Err(ToonError::invalid_options(format!(
                "indent must be 1-{} spaces when decoding",
                MAX_INDENT
            )));
        }
        Ok(())
    }
}

/// Opaque options bag passed through to the codec
///
/// The gateway never inspects the keys; the codec turns the bag into
/// [`EncodeOptions`] or [`DecodeOptions`], ignoring keys it does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionOptions(Map<String, Value>);

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn encode_options(&self) -> ToonResult<EncodeOptions> {
        let options: EncodeOptions = serde_json::from_value(Value::Object(self.0.clone()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn decode_options(&self) -> ToonResult<DecodeOptions> {
        let options: DecodeOptions = serde_json::from_value(Value::Object(self.0.clone()))?;
        options.validate()?;
        Ok(options)
    }
}

impl From<&EncodeOptions> for ConversionOptions {
    fn from(options: &EncodeOptions) -> Self {
        match serde_json::to_value(options) {
            Ok(Value::Object(mut map)) => {
                map.retain(|_, v| !v.is_null());
                Self(map)
            }
            _ => Self::default(),
        }
    }
}
