//! TOON formatting module
//!
//! Walks a `serde_json::Value` and writes TOON lines:
//!
//! - objects as `key: value` lines, nested objects indented one level
//! - primitive arrays inline: `tags[3]: a,b,c`
//! - uniform object arrays as tables: `users[2]{id,name}:` plus one row each
//! - everything else as expanded `- ` lists
//!
//! Non-comma delimiters are declared inside the length brackets (`[3|]`) so
//! the decoder never needs to be told which delimiter was used.

pub mod quotes;

use crate::conversion::config::{EncodeOptions, KeyFoldingMode};
use crate::conversion::limits::check_encode_depth;
use crate::error::ToonResult;
use quotes::QuoteEngine;
use serde_json::{Map, Number, Value};

/// Main TOON formatter
pub struct ToonFormatter {
    options: EncodeOptions,
    quotes: QuoteEngine,
    lines: Vec<String>,
}

impl ToonFormatter {
    /// Create a new formatter with the given options
    pub fn new(options: EncodeOptions) -> Self {
        let quotes = QuoteEngine::new(options.delimiter.as_char())
            .with_dotted_keys_quoted(options.key_folding == KeyFoldingMode::Safe);
        Self {
            options,
            quotes,
            lines: Vec::new(),
        }
    }

    /// Format a JSON value as TOON
    pub fn format(mut self, value: &Value) -> ToonResult<String> {
        match value {
            Value::Object(map) => self.write_fields(map, 0)?,
            Value::Array(items) => self.write_array(0, 1, "", items)?,
            primitive => {
                let token = self.format_primitive(primitive);
                self.push_line(0, token);
            }
        }
        Ok(self.lines.join("\n"))
    }

    /// Write every field of an object at `depth`
    fn write_fields(&mut self, map: &Map<String, Value>, depth: usize) -> ToonResult<()> {
        check_encode_depth(depth)?;
        for (key, value) in map {
            let (key_text, value) = self.fold_key(key, value, map);
            self.write_field(depth, depth + 1, "", &key_text, value)?;
        }
        Ok(())
    }

    /// Write one `key: value` field. `lead` precedes the key on its line
    /// ("- " for the first field of a list item) and nested content goes to
    /// `child_depth`.
    fn write_field(
        &mut self,
        depth: usize,
        child_depth: usize,
        lead: &str,
        key: &str,
        value: &Value,
    ) -> ToonResult<()> {
        match value {
            Value::Object(map) => {
                self.push_line(depth, format!("{}{}:", lead, key));
                if !map.is_empty() {
                    self.write_fields(map, child_depth)?;
                }
            }
            Value::Array(items) => {
                let prefix = format!("{}{}", lead, key);
                self.write_array(depth, child_depth, &prefix, items)?;
            }
            primitive => {
                let token = self.format_primitive(primitive);
                self.push_line(depth, format!("{}{}: {}", lead, key, token));
            }
        }
        Ok(())
    }

    /// Write an array with its length header. `prefix` is the key (plus any
    /// list marker) written before the brackets.
    fn write_array(
        &mut self,
        depth: usize,
        child_depth: usize,
        prefix: &str,
        items: &[Value],
    ) -> ToonResult<()> {
        check_encode_depth(child_depth)?;
        let header = self.array_header(prefix, items.len());

        if items.is_empty() {
            self.push_line(depth, format!("{}:", header));
            return Ok(());
        }

        if items.iter().all(is_primitive) {
            let values = self.join_primitives(items.iter());
            self.push_line(depth, format!("{}: {}", header, values));
            return Ok(());
        }

        if let Some(fields) = tabular_fields(items) {
            let delimiter = self.delimiter_str();
            let field_list = fields
                .iter()
                .map(|f| self.quotes.format_key(f))
                .collect::<Vec<_>>()
                .join(&delimiter);
            self.push_line(depth, format!("{}{{{}}}:", header, field_list));

            for item in items {
                if let Value::Object(row) = item {
                    let values = self.join_primitives(fields.iter().filter_map(|f| row.get(*f)));
                    self.push_line(child_depth, values);
                }
            }
            return Ok(());
        }

        self.push_line(depth, format!("{}:", header));
        for item in items {
            self.write_list_item(child_depth, item)?;
        }
        Ok(())
    }

    /// Write one element of an expanded list
    fn write_list_item(&mut self, depth: usize, item: &Value) -> ToonResult<()> {
        match item {
            Value::Object(map) if map.is_empty() => self.push_line(depth, "-".to_string()),
            Value::Object(map) => {
                // The first field shares the hyphen line; its nested content
                // sits two levels in, the remaining fields one level in.
                for (i, (key, value)) in map.iter().enumerate() {
                    let (key_text, value) = self.fold_key(key, value, map);
                    if i == 0 {
                        self.write_field(depth, depth + 2, "- ", &key_text, value)?;
                    } else {
                        self.write_field(depth + 1, depth + 2, "", &key_text, value)?;
                    }
                }
            }
            Value::Array(inner) => self.write_array(depth, depth + 1, "- ", inner)?,
            primitive => {
                let token = self.format_primitive(primitive);
                self.push_line(depth, format!("- {}", token));
            }
        }
        Ok(())
    }

    /// Collapse a chain of single-key objects into one dotted key when key
    /// folding is enabled. Returns the key text and the value to write under it.
    fn fold_key<'v>(
        &self,
        key: &str,
        value: &'v Value,
        siblings: &Map<String, Value>,
    ) -> (String, &'v Value) {
        let unfolded = || (self.quotes.format_key(key), value);

        if self.options.key_folding == KeyFoldingMode::Off || !quotes::is_identifier_segment(key) {
            return unfolded();
        }

        let limit = self.options.flatten_depth.unwrap_or(usize::MAX);
        let mut segments = vec![key];
        let mut current = value;

        while segments.len() < limit {
            let Value::Object(map) = current else { break };
            if map.len() != 1 {
                break;
            }
            let Some((next_key, next_value)) = map.iter().next() else {
                break;
            };
            if !quotes::is_identifier_segment(next_key) {
                break;
            }
            segments.push(next_key.as_str());
            current = next_value;
        }

        if segments.len() < 2 {
            return unfolded();
        }

        let folded = segments.join(".");
        if siblings.contains_key(&folded) {
            return unfolded();
        }
        (folded, current)
    }

    fn array_header(&self, prefix: &str, len: usize) -> String {
        match self.options.delimiter.header_marker() {
            Some(marker) => format!("{}[{}{}]", prefix, len, marker),
            None => format!("{}[{}]", prefix, len),
        }
    }

    fn join_primitives<'v>(&self, values: impl Iterator<Item = &'v Value>) -> String {
        values
            .map(|v| self.format_primitive(v))
            .collect::<Vec<_>>()
            .join(&self.delimiter_str())
    }

    fn delimiter_str(&self) -> String {
        self.options.delimiter.as_char().to_string()
    }

    /// Format a null, boolean, number or string token
    fn format_primitive(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(n),
            Value::String(s) => self.quotes.format_value(s),
            // Containers never reach here; callers dispatch them first
            Value::Array(_) | Value::Object(_) => String::new(),
        }
    }

    fn push_line(&mut self, depth: usize, content: String) {
        let mut line = " ".repeat(depth * self.options.indent);
        line.push_str(&content);
        self.lines.push(line);
    }
}

/// Canonical number text: no exponent, no trailing zeros, `-0` as `0`
fn format_number(value: &Number) -> String {
    if value.is_i64() || value.is_u64() {
        return value.to_string();
    }

    match value.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        // f64's Display never uses exponent notation and prints the shortest
        // representation that round-trips
        Some(f) => f.to_string(),
        None => value.to_string(),
    }
}

fn is_primitive(value: &Value) -> bool {
    !value.is_array() && !value.is_object()
}

/// Field names for tabular layout: every element is a non-empty object with
/// the same keys as the first, and every value is a primitive
fn tabular_fields(items: &[Value]) -> Option<Vec<&str>> {
    let first = items.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }

    let uniform = items.iter().all(|item| match item {
        Value::Object(obj) => {
            obj.len() == first.len()
                && first.keys().all(|k| obj.contains_key(k))
                && obj.values().all(is_primitive)
        }
        _ => false,
    });

    if uniform {
        Some(first.keys().map(|k| k.as_str()).collect())
    } else {
        None
    }
}

/// Convenience function to format JSON as TOON
pub fn format_to_toon(value: &Value, options: &EncodeOptions) -> ToonResult<String> {
    ToonFormatter::new(options.clone()).format(value)
}
