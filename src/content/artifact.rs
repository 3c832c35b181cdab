//! Generated content artifact
//!
//! The bundle is written as a single script (`window.<name> = { ... };`) or a
//! JSON object. Entries are emitted in key order with no timestamps, so an
//! unchanged content tree always produces byte-identical output.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{ContentBundle, ContentEntry};
use crate::config::ArtifactFormat;

const JS_HEADER: &str = "// Generated by folio-rs from the content directory. Do not edit.\n";

/// Artifact encoding and decoding errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Invalid global name '{0}': expected a JavaScript identifier")]
    InvalidGlobal(String),

    #[error("Malformed artifact at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Serialize a bundle in the given format
pub fn encode(
    bundle: &ContentBundle,
    format: ArtifactFormat,
    global_name: &str,
) -> Result<String, ArtifactError> {
    match format {
        ArtifactFormat::Js => encode_js(bundle, global_name),
        ArtifactFormat::Json => {
            let map: BTreeMap<&str, &str> = bundle
                .iter()
                .map(|e| (e.key.as_str(), e.text.as_str()))
                .collect();
            let mut out = serde_json::to_string_pretty(&map)?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn encode_js(bundle: &ContentBundle, global_name: &str) -> Result<String, ArtifactError> {
    if !is_js_identifier(global_name) {
        return Err(ArtifactError::InvalidGlobal(global_name.to_string()));
    }

    let mut out = String::from(JS_HEADER);
    out.push_str(&format!("window.{} = {{\n", global_name));
    for entry in bundle {
        out.push_str(&format!(
            "    '{}': '{}',\n",
            escape_js(&entry.key),
            escape_js(&entry.text)
        ));
    }
    out.push_str("};\n");
    Ok(out)
}

/// Parse an artifact produced by [`encode`]
pub fn decode(source: &str, format: ArtifactFormat) -> Result<ContentBundle, ArtifactError> {
    match format {
        ArtifactFormat::Js => decode_js(source),
        ArtifactFormat::Json => {
            let map: BTreeMap<String, String> = serde_json::from_str(source)?;
            Ok(map
                .into_iter()
                .map(|(key, text)| ContentEntry { key, text })
                .collect())
        }
    }
}

fn decode_js(source: &str) -> Result<ContentBundle, ArtifactError> {
    let mut entries = Vec::new();
    let mut in_body = false;

    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();

        if !in_body {
            if trimmed.starts_with("window.") && trimmed.ends_with("= {") {
                in_body = true;
            }
            continue;
        }

        if trimmed == "};" {
            return Ok(entries.into_iter().collect());
        }
        if trimmed.is_empty() {
            continue;
        }

        let parse_err = |message: &str| ArtifactError::Parse {
            line: line_no,
            message: message.to_string(),
        };

        let (key, rest) = read_js_literal(trimmed).ok_or_else(|| parse_err("expected quoted key"))?;
        let rest = rest
            .strip_prefix(':')
            .ok_or_else(|| parse_err("expected ':' after key"))?;
        let (text, rest) =
            read_js_literal(rest.trim_start()).ok_or_else(|| parse_err("expected quoted text"))?;
        if rest.trim() != "," {
            return Err(parse_err("expected ',' after text"));
        }

        entries.push(ContentEntry { key, text });
    }

    Err(ArtifactError::Parse {
        line: source.lines().count(),
        message: "content map is not terminated".to_string(),
    })
}

/// Read one quoted literal from the start of `s`, returning it and the remainder
fn read_js_literal(s: &str) -> Option<(String, &str)> {
    let mut chars = s.char_indices();
    let (_, quote) = chars.next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }

    let mut out = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'u' => {
                        let hex: String = (0..4).filter_map(|_| chars.next()).map(|(_, c)| c).collect();
                        let code = u32::from_str_radix(&hex, 16).ok()?;
                        out.push(char::from_u32(code)?);
                    }
                    other => out.push(other),
                }
            }
            c if c == quote => return Some((out, &s[i + c.len_utf8()..])),
            c => out.push(c),
        }
    }
    None
}

/// Escape text for a single- or double-quoted JavaScript string literal
pub fn escape_js(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Write an encoded artifact, creating parent directories
pub fn write(path: &Path, contents: &str) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}

/// Read and decode an artifact from disk
pub fn read(path: &Path, format: ArtifactFormat) -> Result<ContentBundle, ArtifactError> {
    let source = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&source, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContentBundle {
        vec![
            ContentEntry::new("notes/学习之道", "# 学习之道\n\n- 专注\n- 发散"),
            ContentEntry::new(
                "articles/tricky",
                "quotes ' \" back\\slash\r\n\ttab `tick` ${x} \u{2028} end",
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_escape_js() {
        assert_eq!(escape_js(r#"a\b'c"d"#), r#"a\\b\'c\"d"#);
        assert_eq!(escape_js("x\ny\rz\tw"), "x\\ny\\rz\\tw");
    }

    #[test]
    fn test_js_layout() {
        let bundle: ContentBundle = vec![ContentEntry::new("a", "it's")].into_iter().collect();
        let js = encode(&bundle, ArtifactFormat::Js, "markdownContent").unwrap();
        assert_eq!(
            js,
            format!(
                "{}window.markdownContent = {{\n    'a': 'it\\'s',\n}};\n",
                JS_HEADER
            )
        );
    }

    #[test]
    fn test_js_round_trip() {
        let bundle = sample();
        let js = encode(&bundle, ArtifactFormat::Js, "markdownContent").unwrap();
        // One line per entry
        assert_eq!(js.lines().count(), 2 + bundle.len() + 1);
        assert_eq!(decode(&js, ArtifactFormat::Js).unwrap(), bundle);
    }

    #[test]
    fn test_json_round_trip() {
        let bundle = sample();
        let json = encode(&bundle, ArtifactFormat::Json, "unused").unwrap();
        assert_eq!(decode(&json, ArtifactFormat::Json).unwrap(), bundle);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = encode(&sample(), ArtifactFormat::Js, "c").unwrap();
        let b = encode(&sample(), ArtifactFormat::Js, "c").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_global_rejected() {
        let err = encode(&sample(), ArtifactFormat::Js, "bad-name").unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidGlobal(_)));
    }

    #[test]
    fn test_decode_reports_line() {
        let js = "window.c = {\n    'ok': 'fine',\n    oops\n};\n";
        match decode(js, ArtifactFormat::Js).unwrap_err() {
            ArtifactError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {}", other),
        }

        let unterminated = "window.c = {\n    'ok': 'fine',\n";
        assert!(decode(unterminated, ArtifactFormat::Js).is_err());
    }

    #[test]
    fn test_write_and_read() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("js").join("content-data.js");
        let js = encode(&sample(), ArtifactFormat::Js, "markdownContent").unwrap();
        write(&path, &js).unwrap();
        assert_eq!(read(&path, ArtifactFormat::Js).unwrap(), sample());
    }
}
