//! Header block codec for contact files.
//!
//! A contact file starts with a `---` line, followed by YAML, followed by another `---`
//! line. Everything after the closing marker is the body and is carried through untouched.

use crate::error::CoreError;
use serde_yaml::{Mapping, Value};

pub const MARKER: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStatus {
    /// No header block at the top of the file.
    Missing,
    /// A header block exists but is not a YAML mapping.
    Malformed,
    Parsed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub header: Mapping,
    pub body: String,
    pub status: HeaderStatus,
}

/// Splits `raw` into header mapping and body. Never fails: a broken header decodes as an
/// empty mapping with [`HeaderStatus::Malformed`].
pub fn decode(raw: &str) -> Document {
    let Some((block, body)) = split_header(raw) else {
        return Document {
            header: Mapping::new(),
            body: raw.to_string(),
            status: HeaderStatus::Missing,
        };
    };

    let (header, status) = parse_block(block);
    Document {
        header,
        body: body.to_string(),
        status,
    }
}

pub fn encode(header: &Mapping, body: &str) -> Result<String, CoreError> {
    let mut out = String::with_capacity(body.len() + 64);
    out.push_str(MARKER);
    out.push('\n');
    if !header.is_empty() {
        let yaml = serde_yaml::to_string(header).map_err(|err| CoreError::Encode(err.to_string()))?;
        out.push_str(&yaml);
        if !yaml.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(MARKER);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}

fn split_header(raw: &str) -> Option<(&str, &str)> {
    let mut lines = raw.split_inclusive('\n');
    let first = lines.next()?;
    if strip_eol(first) != MARKER {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if strip_eol(line) == MARKER {
            return Some((&raw[start..offset], &raw[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn parse_block(block: &str) -> (Mapping, HeaderStatus) {
    if block.trim().is_empty() {
        return (Mapping::new(), HeaderStatus::Parsed);
    }
    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Mapping(mut mapping)) => {
            keep_scalar_spelling(&mut mapping, block);
            (mapping, HeaderStatus::Parsed)
        }
        Ok(Value::Null) => (Mapping::new(), HeaderStatus::Parsed),
        Ok(_) | Err(_) => (Mapping::new(), HeaderStatus::Malformed),
    }
}

/// Top-level numbers and booleans whose written form would change on re-encoding
/// (`1.10`, `0x1F`, `True`) are kept as the text found in the file.
fn keep_scalar_spelling(mapping: &mut Mapping, block: &str) {
    for line in block.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let plain_key = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !plain_key {
            continue;
        }
        let written = rest.split(" #").next().unwrap_or_default().trim();
        if written.is_empty() {
            continue;
        }
        let Some(value) = mapping.get_mut(key) else {
            continue;
        };
        let rendered = match value {
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => continue,
        };
        if rendered != written {
            *value = Value::String(written.to_string());
        }
    }
}

/// Renders a scalar header value as text. Sequences, mappings and nulls yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, scalar_to_string, HeaderStatus};
    use serde_yaml::{Mapping, Value};

    #[test]
    fn decode_splits_header_and_body() {
        let doc = decode("---\nname: Ada\nbirthday: 1990-06-15\n---\n# Ada\n\nnotes here\n");
        assert_eq!(doc.status, HeaderStatus::Parsed);
        assert_eq!(
            doc.header.get("name").and_then(scalar_to_string).as_deref(),
            Some("Ada")
        );
        assert_eq!(
            doc.header.get("birthday").and_then(scalar_to_string).as_deref(),
            Some("1990-06-15")
        );
        assert_eq!(doc.body, "# Ada\n\nnotes here\n");
    }

    #[test]
    fn decode_without_header_keeps_text_as_body() {
        let raw = "just some text\n---\nnot a header\n";
        let doc = decode(raw);
        assert_eq!(doc.status, HeaderStatus::Missing);
        assert!(doc.header.is_empty());
        assert_eq!(doc.body, raw);
    }

    #[test]
    fn decode_unterminated_header_is_missing() {
        let doc = decode("---\nname: Ada\n");
        assert_eq!(doc.status, HeaderStatus::Missing);
        assert_eq!(doc.body, "---\nname: Ada\n");
    }

    #[test]
    fn decode_malformed_yaml_yields_empty_header() {
        let doc = decode("---\nname: [unclosed\n---\nbody\n");
        assert_eq!(doc.status, HeaderStatus::Malformed);
        assert!(doc.header.is_empty());
        assert_eq!(doc.body, "body\n");

        let scalar = decode("---\njust a string\n---\n");
        assert_eq!(scalar.status, HeaderStatus::Malformed);
    }

    #[test]
    fn decode_accepts_crlf_and_empty_header() {
        let doc = decode("---\r\nname: Ada\r\n---\r\nbody\r\n");
        assert_eq!(doc.status, HeaderStatus::Parsed);
        assert_eq!(
            doc.header.get("name").and_then(scalar_to_string).as_deref(),
            Some("Ada")
        );
        assert_eq!(doc.body, "body\r\n");

        let empty = decode("---\n---\n");
        assert_eq!(empty.status, HeaderStatus::Parsed);
        assert!(empty.header.is_empty());
        assert_eq!(empty.body, "");
    }

    #[test]
    fn encode_then_decode_preserves_header_and_body() {
        let mut header = Mapping::new();
        header.insert(Value::from("name"), Value::from("Grace Hopper"));
        header.insert(Value::from("relationship"), Value::from("colleague"));
        let body = "\n## Log\n\n- met at the conference\n---\ntrailing marker in body\n";

        let raw = encode(&header, body).expect("encode");
        assert!(raw.starts_with("---\nname: Grace Hopper\n"));

        let doc = decode(&raw);
        assert_eq!(doc.header, header);
        assert_eq!(doc.body, body);
    }

    #[test]
    fn encode_empty_header() {
        let raw = encode(&Mapping::new(), "body").expect("encode");
        assert_eq!(raw, "---\n---\nbody");
    }

    #[test]
    fn decode_keeps_number_spelling_that_would_not_survive() {
        let doc = decode("---\nname: Ada\nversion: 1.10\ncode: 0x1F\nvip: True\nage: 42\nscore: 2.5 # rough\n---\n");
        assert_eq!(doc.header.get("version"), Some(&Value::from("1.10")));
        assert_eq!(doc.header.get("code"), Some(&Value::from("0x1F")));
        assert_eq!(doc.header.get("vip"), Some(&Value::from("True")));
        assert_eq!(doc.header.get("age"), Some(&Value::from(42)));
        assert_eq!(doc.header.get("score"), Some(&Value::from(2.5)));

        let raw = encode(&doc.header, "").expect("encode");
        let again = decode(&raw);
        assert_eq!(
            again.header.get("version").and_then(scalar_to_string).as_deref(),
            Some("1.10")
        );
        assert_eq!(again.header.get("age"), Some(&Value::from(42)));
    }

    #[test]
    fn scalar_to_string_handles_numbers() {
        assert_eq!(scalar_to_string(&Value::from(5551234)).as_deref(), Some("5551234"));
        assert_eq!(scalar_to_string(&Value::Null), None);
    }
}
