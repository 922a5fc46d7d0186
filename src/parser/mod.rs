//! TOON parsing module
//!
//! Turns TOON text back into a `serde_json::Value`. Parsing happens in two
//! passes: the text is first split into [`Line`]s carrying their nesting
//! depth, then a recursive descent walks those lines. Array headers carry
//! their own delimiter, so decoding never depends on encoder options.

use crate::conversion::config::{DecodeOptions, PathExpansionMode};
use crate::conversion::limits::check_decode_depth;
use crate::error::{ToonError, ToonResult};
use crate::formatter::quotes::{find_closing_quote, is_identifier_segment, unescape};
use serde_json::{Map, Number, Value};

/// One non-blank source line
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// 1-based line number in the input
    number: usize,
    depth: usize,
    content: &'a str,
}

/// Parsed `[N]`, `[N|]{a|b}:` or `[N]: v1,v2` header
#[derive(Debug)]
struct ArrayHeader<'a> {
    len: usize,
    delimiter: char,
    fields: Option<Vec<FieldName>>,
    inline: Option<&'a str>,
}

#[derive(Debug, Clone)]
struct FieldName {
    name: String,
    quoted: bool,
}

/// Key at the start of a line and what follows it
#[derive(Debug)]
struct KeyParts<'a> {
    key: FieldName,
    rest: &'a str,
}

/// Recursive descent parser over pre-scanned lines
pub struct ToonParser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    options: DecodeOptions,
}

impl<'a> ToonParser<'a> {
    /// Scan `text` into lines, checking indentation against `options`
    pub fn new(text: &'a str, options: DecodeOptions) -> ToonResult<Self> {
        options.validate()?;
        let lines = scan_lines(text, &options)?;
        Ok(Self {
            lines,
            pos: 0,
            options,
        })
    }

    /// Parse the whole document
    pub fn parse(mut self) -> ToonResult<Value> {
        let Some(first) = self.lines.first().copied() else {
            return Ok(Value::Object(Map::new()));
        };

        if first.content.starts_with('[') {
            if let Some(header) = parse_array_header(first.content, first.number)? {
                self.pos = 1;
                let value = self.parse_array_body(&header, first, 1)?;
                if let Some(extra) = self.peek() {
                    return Err(ToonError::parse(
                        extra.number,
                        "Unexpected content after root array",
                    ));
                }
                return Ok(value);
            }
        }

        if self.lines.len() == 1 && split_key(first.content, first.number)?.is_none() {
            return parse_primitive_token(first.content, first.number);
        }

        let mut map = Map::new();
        self.parse_fields_into(&mut map, 0)?;
        if let Some(extra) = self.peek() {
            return Err(ToonError::parse(extra.number, "Unexpected indentation"));
        }
        Ok(Value::Object(map))
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    /// Parse `key: value` lines at exactly `depth` into `map`
    fn parse_fields_into(&mut self, map: &mut Map<String, Value>, depth: usize) -> ToonResult<()> {
        while let Some(line) = self.peek() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                if self.options.strict {
                    return Err(ToonError::parse(line.number, "Unexpected indentation"));
                }
                self.pos += 1;
                continue;
            }

            let parts = split_key(line.content, line.number)?
                .ok_or_else(|| ToonError::parse(line.number, "Expected a key-value pair"))?;
            self.pos += 1;
            self.parse_field_value(map, parts, line, depth + 1)?;
        }
        Ok(())
    }

    /// Parse what follows a key and insert it. Nested content lives at
    /// `child_depth`.
    fn parse_field_value(
        &mut self,
        map: &mut Map<String, Value>,
        parts: KeyParts<'a>,
        line: Line<'a>,
        child_depth: usize,
    ) -> ToonResult<()> {
        let value = if parts.rest.starts_with('[') {
            let header = parse_array_header(parts.rest, line.number)?
                .ok_or_else(|| ToonError::parse(line.number, "Invalid array header"))?;
            self.parse_array_body(&header, line, child_depth)?
        } else if let Some(tail) = parts.rest.strip_prefix(':') {
            let tail = tail.trim_matches(' ');
            if !tail.is_empty() {
                parse_primitive_token(tail, line.number)?
            } else if self.peek().is_some_and(|next| next.depth >= child_depth) {
                check_decode_depth(child_depth, line.number)?;
                let mut nested = Map::new();
                self.parse_fields_into(&mut nested, child_depth)?;
                Value::Object(nested)
            } else {
                Value::Object(Map::new())
            }
        } else {
            return Err(ToonError::parse(line.number, "Expected ':' after key"));
        };

        self.insert_field(map, parts.key, value, line.number)
    }

    /// Parse the body of an array whose header sits on `line`
    fn parse_array_body(
        &mut self,
        header: &ArrayHeader<'a>,
        line: Line<'a>,
        child_depth: usize,
    ) -> ToonResult<Value> {
        check_decode_depth(child_depth, line.number)?;

        if let Some(inline) = header.inline {
            let values = split_delimited(inline, header.delimiter, line.number)?
                .into_iter()
                .map(|token| parse_primitive_token(token, line.number))
                .collect::<ToonResult<Vec<_>>>()?;
            self.check_length(header.len, values.len(), line.number)?;
            return Ok(Value::Array(values));
        }

        if let Some(fields) = &header.fields {
            let rows = self.parse_tabular_rows(header, fields, child_depth)?;
            self.check_length(header.len, rows.len(), line.number)?;
            return Ok(Value::Array(rows));
        }

        if header.len == 0 {
            return Ok(Value::Array(Vec::new()));
        }

        let mut items = Vec::new();
        while let Some(next) = self.peek() {
            if next.depth != child_depth || !is_list_item(next.content) {
                break;
            }
            items.push(self.parse_list_item(next, child_depth)?);
        }
        self.check_length(header.len, items.len(), line.number)?;
        Ok(Value::Array(items))
    }

    fn parse_tabular_rows(
        &mut self,
        header: &ArrayHeader<'a>,
        fields: &[FieldName],
        child_depth: usize,
    ) -> ToonResult<Vec<Value>> {
        let mut rows = Vec::new();
        while let Some(next) = self.peek() {
            if next.depth < child_depth {
                break;
            }
            if next.depth > child_depth && self.options.strict {
                return Err(ToonError::parse(next.number, "Unexpected indentation"));
            }
            self.pos += 1;

            let tokens = split_delimited(next.content, header.delimiter, next.number)?;
            if self.options.strict && tokens.len() != fields.len() {
                return Err(ToonError::parse(
                    next.number,
                    format!(
                        "Expected {} values in tabular row, found {}",
                        fields.len(),
                        tokens.len()
                    ),
                ));
            }

            let mut row = Map::new();
            for (field, token) in fields.iter().zip(tokens) {
                let value = parse_primitive_token(token, next.number)?;
                self.insert_field(&mut row, field.clone(), value, next.number)?;
            }
            rows.push(Value::Object(row));
        }
        Ok(rows)
    }

    /// Parse one `- ` item at `depth`
    fn parse_list_item(&mut self, line: Line<'a>, depth: usize) -> ToonResult<Value> {
        self.pos += 1;
        if line.content == "-" {
            return Ok(Value::Object(Map::new()));
        }
        let body = line.content[2..].trim_start_matches(' ');

        if body.starts_with('[') {
            if let Some(header) = parse_array_header(body, line.number)? {
                return self.parse_array_body(&header, line, depth + 1);
            }
        }

        if let Some(parts) = split_key(body, line.number)? {
            let mut map = Map::new();
            self.parse_field_value(&mut map, parts, line, depth + 2)?;
            check_decode_depth(depth + 1, line.number)?;
            self.parse_fields_into(&mut map, depth + 1)?;
            return Ok(Value::Object(map));
        }

        parse_primitive_token(body, line.number)
    }

    fn check_length(&self, expected: usize, found: usize, line: usize) -> ToonResult<()> {
        if self.options.strict && expected != found {
            return Err(ToonError::parse(
                line,
                format!("Expected {} array items, found {}", expected, found),
            ));
        }
        Ok(())
    }

    /// Insert a decoded field, expanding dotted keys when enabled
    fn insert_field(
        &self,
        map: &mut Map<String, Value>,
        key: FieldName,
        value: Value,
        line: usize,
    ) -> ToonResult<()> {
        let expand = self.options.expand_paths == PathExpansionMode::Safe
            && !key.quoted
            && key.name.contains('.')
            && key.name.split('.').all(is_identifier_segment);

        if !expand {
            return self.merge_into(map, key.name, value, line);
        }

        let segments: Vec<&str> = key.name.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return self.merge_into(map, key.name.clone(), value, line);
        };

        let mut current = map;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                if self.options.strict {
                    return Err(path_conflict(segment, line));
                }
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(nested) => nested,
                _ => return Err(path_conflict(segment, line)),
            };
        }

        self.merge_into(current, last.to_string(), value, line)
    }

    /// Insert `value` under `key`. With path expansion on, objects merge deeply
    /// and other collisions are conflicts in strict mode.
    fn merge_into(
        &self,
        map: &mut Map<String, Value>,
        key: String,
        value: Value,
        line: usize,
    ) -> ToonResult<()> {
        if self.options.expand_paths == PathExpansionMode::Off {
            map.insert(key, value);
            return Ok(());
        }

        match map.get_mut(&key) {
            Some(Value::Object(existing)) if value.is_object() => {
                if let Value::Object(incoming) = value {
                    for (k, v) in incoming {
                        self.merge_into(existing, k, v, line)?;
                    }
                }
                Ok(())
            }
            Some(_) if self.options.strict => Err(path_conflict(&key, line)),
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => {
                map.insert(key, value);
                Ok(())
            }
        }
    }
}

fn path_conflict(key: &str, line: usize) -> ToonError {
    ToonError::parse(line, format!("Path expansion conflict at key '{}'", key))
}

/// Split input into non-blank lines with their depth
fn scan_lines<'a>(text: &'a str, options: &DecodeOptions) -> ToonResult<Vec<Line<'a>>> {
    let mut lines = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let number = i + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let content = raw.trim_start_matches(|c: char| c == ' ' || c == '\t');
        let leading = &raw[..raw.len() - content.len()];
        let tabs = leading.chars().filter(|c| *c == '\t').count();
        let spaces = leading.len() - tabs;

        if options.strict {
            if tabs > 0 {
                return Err(ToonError::parse(number, "Tabs are not allowed in indentation"));
            }
            if spaces % options.indent != 0 {
                return Err(ToonError::parse(
                    number,
                    format!(
                        "Indentation must be a multiple of {} spaces",
                        options.indent
                    ),
                ));
            }
        }

        lines.push(Line {
            number,
            depth: (spaces + tabs * options.indent) / options.indent,
            content: content.trim_end_matches(' '),
        });
    }

    // Lenient mode tolerates a document that starts indented
    if !options.strict {
        if let Some(base) = lines.iter().map(|l| l.depth).min() {
            for line in &mut lines {
                line.depth -= base;
            }
        }
    }

    Ok(lines)
}

fn is_list_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// Split a key off the start of `content`. Returns `None` when the content
/// is not a key-value line.
fn split_key(content: &str, line: usize) -> ToonResult<Option<KeyParts<'_>>> {
    if content.starts_with('"') {
        let end = find_closing_quote(content, 1)
            .ok_or_else(|| ToonError::parse(line, "Unterminated quoted string"))?;
        let rest = &content[end + 1..];
        if !(rest.starts_with(':') || rest.starts_with('[')) {
            return Ok(None);
        }
        let name = unescape(&content[1..end]).map_err(|e| ToonError::parse(line, e))?;
        return Ok(Some(KeyParts {
            key: FieldName { name, quoted: true },
            rest,
        }));
    }

    let Some(end) = content.find(|c: char| c == ':' || c == '[') else {
        return Ok(None);
    };
    let name = content[..end].trim_end_matches(' ');
    if name.is_empty() {
        return Ok(None);
    }

    Ok(Some(KeyParts {
        key: FieldName {
            name: name.to_string(),
            quoted: false,
        },
        rest: &content[end..],
    }))
}

/// Parse an array header starting at `[`. Returns `None` when the text is
/// not a header at all.
fn parse_array_header(text: &str, line: usize) -> ToonResult<Option<ArrayHeader<'_>>> {
    let Some(inner_start) = text.strip_prefix('[') else {
        return Ok(None);
    };
    let Some(close) = inner_start.find(']') else {
        return Ok(None);
    };

    let bracket = inner_start[..close].trim_start_matches('#');
    let digits_end = bracket
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(bracket.len());
    if digits_end == 0 {
        return Ok(None);
    }
    let Ok(len) = bracket[..digits_end].parse::<usize>() else {
        return Ok(None);
    };

    let mut marker = bracket[digits_end..].chars();
    let delimiter = match (marker.next(), marker.next()) {
        (None, _) => ',',
        (Some(c), None) => c,
        _ => return Ok(None),
    };

    let mut after = &inner_start[close + 1..];
    let mut fields = None;

    if after.starts_with('{') {
        let close_brace = find_unquoted(after, '}')
            .ok_or_else(|| ToonError::parse(line, "Unterminated field list in array header"))?;
        let names = split_delimited(&after[1..close_brace], delimiter, line)?
            .into_iter()
            .map(|raw| parse_field_name(raw, line))
            .collect::<ToonResult<Vec<_>>>()?;
        fields = Some(names);
        after = &after[close_brace + 1..];
    }

    let Some(tail) = after.strip_prefix(':') else {
        return Ok(None);
    };
    let tail = tail.trim_start_matches(' ');

    let inline = if tail.is_empty() {
        None
    } else if fields.is_some() {
        return Err(ToonError::parse(
            line,
            "Tabular array header cannot carry inline values",
        ));
    } else {
        Some(tail)
    };

    Ok(Some(ArrayHeader {
        len,
        delimiter,
        fields,
        inline,
    }))
}

fn parse_field_name(raw: &str, line: usize) -> ToonResult<FieldName> {
    let raw = raw.trim_matches(' ');
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        let name = unescape(&raw[1..raw.len() - 1]).map_err(|e| ToonError::parse(line, e))?;
        return Ok(FieldName { name, quoted: true });
    }
    Ok(FieldName {
        name: raw.to_string(),
        quoted: false,
    })
}

/// Byte index of the first `target` outside quotes
fn find_unquoted(text: &str, target: char) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == target {
            return Some(i);
        }
    }
    None
}

/// Split delimited values, keeping delimiters inside quotes
fn split_delimited(text: &str, delimiter: char, line: usize) -> ToonResult<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == delimiter {
            tokens.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }

    if in_quotes {
        return Err(ToonError::parse(line, "Unterminated quoted string"));
    }
    tokens.push(&text[start..]);
    Ok(tokens)
}

/// Parse a scalar token: quoted string, null, boolean, number, or bare string
fn parse_primitive_token(token: &str, line: usize) -> ToonResult<Value> {
    let token = token.trim_matches(' ');

    if token.starts_with('"') {
        let end = find_closing_quote(token, 1)
            .ok_or_else(|| ToonError::parse(line, "Unterminated quoted string"))?;
        if end != token.len() - 1 {
            return Err(ToonError::parse(
                line,
                "Unexpected characters after closing quote",
            ));
        }
        let text = unescape(&token[1..end]).map_err(|e| ToonError::parse(line, e))?;
        return Ok(Value::String(text));
    }

    Ok(match token {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => parse_number(token).unwrap_or_else(|| Value::String(token.to_string())),
    })
}

/// Parse `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`. Anything else,
/// including leading zeros like `05`, stays a string.
fn parse_number(token: &str) -> Option<Value> {
    let bytes = token.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };

    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    let int_len = digits(&mut i);
    if int_len == 0 || (int_len > 1 && bytes[int_start] == b'0') {
        return None;
    }

    let mut is_float = false;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if digits(&mut i) == 0 {
            return None;
        }
        is_float = true;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return None;
        }
        is_float = true;
    }
    if i != bytes.len() {
        return None;
    }

    if !is_float {
        if let Ok(n) = token.parse::<i64>() {
            return Some(Value::Number(n.into()));
        }
        if let Ok(n) = token.parse::<u64>() {
            return Some(Value::Number(n.into()));
        }
    }

    let f: f64 = token.parse().ok()?;
    if f == 0.0 {
        return Some(Value::Number(0.into()));
    }
    Number::from_f64(f).map(Value::Number)
}

/// Convenience function to decode TOON text
pub fn parse_toon(text: &str, options: &DecodeOptions) -> ToonResult<Value> {
    ToonParser::new(text, options.clone())?.parse()
}
