//! Size statistics for conversion operations
//!
//! Sizes are character counts (Unicode scalar values), not bytes. The JSON
//! side is always measured on the compact rendering of the model,
//! serialised once per request so the size fields and the savings percentage
//! can never disagree.

use std::io;

use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter};
use serde_json::{Serializer, Value};

/// Count characters the way sizes are reported to callers
pub fn char_len(text: &str) -> usize {
    // Astral characters such as emoji count once, not as two UTF-16 units
    text.chars().count()
}

/// Canonical compact JSON text of a model
///
/// Numbers are written the way JavaScript's `JSON.stringify` writes them:
/// integral floats lose their fraction (`1.0` -> `1`), magnitudes from `1e21`
/// up or below `1e-6` use a signed exponent (`1e+21`, `1.5e-7`) and `-0` is `0`.
pub fn canonical_json(value: &Value) -> String {
    let mut buf = Vec::with_capacity(128);
    let mut serializer = Serializer::with_formatter(&mut buf, JsNumberFormatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        // Writing into a Vec does not fail
        Err(_) => value.to_string(),
    }
}

/// Compact formatter with JavaScript number rendering for floats
struct JsNumberFormatter;

impl Formatter for JsNumberFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !value.is_finite() {
            return CompactFormatter.write_null(writer);
        }
        writer.write_all(js_number_text(value).as_bytes())
    }
}

fn js_number_text(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let text = format!("{:e}", value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        };
    }

    // Display prints the shortest round-trip digits without a trailing `.0`
    value.to_string()
}

/// Size comparison between a JSON rendering and its TOON rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Characters in the canonical JSON text
    pub json_size: usize,
    /// Characters in the TOON text
    pub toon_size: usize,
}

impl ConversionStats {
    pub fn new(json_size: usize, toon_size: usize) -> Self {
        Self {
            json_size,
            toon_size,
        }
    }

    /// Measure both renderings of one conversion
    pub fn measure(json_text: &str, toon_text: &str) -> Self {
        Self::new(char_len(json_text), char_len(toon_text))
    }

    /// Percentage reduction from JSON to TOON. Negative when TOON is larger.
    pub fn savings_percent(&self) -> f64 {
        if self.json_size == 0 {
            return 0.0;
        }
        (self.json_size as f64 - self.toon_size as f64) / self.json_size as f64 * 100.0
    }

    /// Savings formatted with one decimal place, e.g. `"40.0%"`
    pub fn savings_label(&self) -> String {
        format_percent(self.savings_percent())
    }
}

fn format_percent(value: f64) -> String {
    // Ties round away from zero: 12.25 -> 12.3, -12.25 -> -12.3
    let rounded = (value * 10.0).round() / 10.0;
    let formatted = format!("{:.1}", rounded);
    // Tiny negative reductions round to "-0.0"
    if formatted == "-0.0" {
        return "0.0%".to_string();
    }
    format!("{}%", formatted)
}
