//! Smart string quoting logic for TOON
//!
//! TOON quotes strings only when leaving them bare would change how they
//! decode. The same rules decide whether object keys can stay unquoted.

/// Smart quoting engine for TOON strings
#[derive(Debug, Clone, Copy)]
pub struct QuoteEngine {
    delimiter: char,
    quote_dotted_keys: bool,
}

impl QuoteEngine {
    /// Create a new quote engine for the active delimiter
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            quote_dotted_keys: false,
        }
    }

    /// Quote literal dotted keys so they survive path expansion on decode
    pub fn with_dotted_keys_quoted(mut self, enabled: bool) -> Self {
        self.quote_dotted_keys = enabled;
        self
    }

    /// Determine if a string value needs quoting
    ///
    /// Quoting rules:
    /// 1. Empty strings and strings with leading or trailing whitespace
    /// 2. Literals that would decode as something else: true, false, null
    /// 3. Anything that looks like a number
    /// 4. A leading hyphen, which reads as a list marker
    /// 5. Structural characters, control characters, or the active delimiter
    pub fn needs_quoting(&self, value: &str) -> bool {
        if value.is_empty() || value.trim() != value {
            return true;
        }

        if matches!(value, "true" | "false" | "null") {
            return true;
        }

        if looks_like_number(value) {
            return true;
        }

        if value.starts_with('-') {
            return true;
        }

        value.chars().any(|c| {
            matches!(c, ':' | '"' | '\\' | '[' | ']' | '{' | '}')
                || c.is_control()
                || c == self.delimiter
        })
    }

    /// Format a string value, quoting only when necessary
    pub fn format_value(&self, value: &str) -> String {
        if self.needs_quoting(value) {
            quote(value)
        } else {
            value.to_string()
        }
    }

    /// Format an object key, quoting anything that is not a plain key
    pub fn format_key(&self, key: &str) -> String {
        let bare = is_valid_unquoted_key(key) && !(self.quote_dotted_keys && key.contains('.'));
        if bare {
            key.to_string()
        } else {
            quote(key)
        }
    }
}

/// Wrap a string in quotes, escaping backslash, quote, and line control characters
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');

    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }

    quoted.push('"');
    quoted
}

/// Reverse of [`quote`] for the text between the quotes
pub fn unescape(inner: &str) -> Result<String, String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => return Err(format!("Invalid escape sequence \\{}", other)),
            None => return Err("Unterminated escape sequence".to_string()),
        }
    }

    Ok(out)
}

/// Position of the closing quote of a string whose opening quote precedes
/// `start`, skipping escaped characters
pub fn find_closing_quote(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Keys matching `[A-Za-z_][A-Za-z0-9_.]*` can be written bare
pub fn is_valid_unquoted_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Segments matching `[A-Za-z_][A-Za-z0-9_]*` can take part in key folding
/// and path expansion
pub fn is_identifier_segment(segment: &str) -> bool {
    is_valid_unquoted_key(segment) && !segment.contains('.')
}

/// Conservative check for strings a decoder could read as a number
fn looks_like_number(value: &str) -> bool {
    if value.parse::<f64>().is_ok() {
        return true;
    }

    let digits = value.strip_prefix('-').unwrap_or(value);
    digits.starts_with(|c: char| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}
