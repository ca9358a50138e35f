//! Registry artifact loading.
//!
//! The registry is a script-like file in the working directory that exports
//! one object literal mapping subdomain keys to targets:
//!
//! ```text
//! var cnames_active = {
//!     "": "registry-root.example.com",
//!     "alpha": "alpha.example.net",  // comment
//!     "beta": "https://beta.example.net",
//! }
//! ```
//!
//! Loading is two-phase: a syntactic well-formedness pre-check over the
//! object body, then structural extraction of the entries in file order.
//! Both phases report against the artifact path so a human can find the
//! line to fix.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;

use crate::{PreflightError, Record};

/// One `"key": "target"` pair, optionally with trailing comma and comment.
const ENTRY_PATTERN: &str = r#"^"([a-z0-9-]*)"\s*:\s*"([^"]*)"\s*,?\s*(?://.*)?$"#;

/// Load and parse the registry artifact.
///
/// Fails with [`PreflightError::MissingArtifact`] when the file is absent and
/// [`PreflightError::ParseError`] for anything structurally wrong, including
/// duplicate keys.
pub fn load(path: &Path) -> Result<Vec<Record>, PreflightError> {
    let shown = path.display().to_string();

    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PreflightError::MissingArtifact { path: shown });
        }
        Err(e) => {
            return Err(PreflightError::ParseError {
                path: shown,
                message: e.to_string(),
            });
        }
    };

    parse(&source, &shown)
}

/// Parse registry source text into records.
///
/// Split out from [`load`] so tests and embedders can parse without a file.
pub fn parse(source: &str, path: &str) -> Result<Vec<Record>, PreflightError> {
    let (body, first_line) = object_body(source).ok_or_else(|| PreflightError::ParseError {
        path: path.to_string(),
        message: "no registry object literal found".to_string(),
    })?;

    let entry = Regex::new(ENTRY_PATTERN).expect("entry pattern is valid");

    let mut records = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (offset, raw) in body.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || is_inert_line(line) {
            continue;
        }

        let caps = match entry.captures(line) {
            Some(caps) => caps,
            None => {
                return Err(PreflightError::ParseError {
                    path: path.to_string(),
                    message: format!(
                        "unrecognized registry line {}: '{}'",
                        first_line + offset,
                        line
                    ),
                });
            }
        };

        let key = caps.get(1).map_or("", |m| m.as_str());
        let target = caps.get(2).map_or("", |m| m.as_str());

        if !seen.insert(key) {
            return Err(PreflightError::ParseError {
                path: path.to_string(),
                message: format!("duplicate key '{}'", key),
            });
        }

        records.push(Record::new(key, target));
    }

    Ok(records)
}

/// Extract the text between the first `{` and the last `}`, along with the
/// 1-based file line the body starts on. The body's first `lines()` element
/// is the tail of the line holding the opening brace, so line numbers
/// reported against the body stay aligned with the file.
fn object_body(source: &str) -> Option<(&str, usize)> {
    let open = source.find('{')?;
    let close = source.rfind('}')?;
    if close <= open {
        return None;
    }
    let first_line = source[..open].matches('\n').count() + 1;
    Some((&source[open + 1..close], first_line))
}

/// Lines the pre-check accepts without treating them as entries.
fn is_inert_line(line: &str) -> bool {
    line.starts_with("//")
        || line.starts_with("/*")
        || line.starts_with('*')
        || line == "{"
        || line == "}"
        || line == "};"
        || line == ","
}
