//! Reserved-name blocklist matching.
//!
//! The blocklist is a flat list of pattern expressions. Four grammars are
//! recognized; every expression is tested against all of them, and an
//! expression shaped like none of them is inert:
//!
//! - `(1/2/3/...)` — the literal sentinel; matches any key that parses
//!   entirely as a base-10 integer
//! - `<stem>(s)` — matches `<stem>` and `<stem>s`
//! - `<stem>(y/ies)` — matches `<stem>y` and `<stem>ies`
//! - `<stem>(1/2)` — matches `<stem>1` and `<stem>2`
//!
//! Any match is fatal to the whole run, so evaluation short-circuits on the
//! first matching expression. Expressions are evaluated in list order to
//! keep error messages reproducible.

use std::path::Path;

use crate::PreflightError;

/// Built-in reserved names, used when no blocklist file is supplied.
const DEFAULT_BLOCKLIST: &[&str] = &[
    "(1/2/3/...)",
    "api(s)",
    "blog(s)",
    "cdn(s)",
    "doc(s)",
    "download(s)",
    "forum(s)",
    "mail(s)",
    "registr(y/ies)",
    "stat(s)",
    "status(1/2)",
    "wiki(s)",
];

/// The default expression list as owned strings.
pub fn default_blocklist() -> Vec<String> {
    DEFAULT_BLOCKLIST.iter().map(|s| s.to_string()).collect()
}

/// Read a blocklist file: one expression per line, `#` comments, blank
/// lines ignored. The file replaces the default list entirely.
pub fn load_blocklist(path: &Path) -> Result<Vec<String>, PreflightError> {
    let source =
        std::fs::read_to_string(path).map_err(|e| PreflightError::BlocklistUnreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    Ok(source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Find the first expression in list order that matches `key`.
pub fn first_match<'a>(key: &str, expressions: &'a [String]) -> Option<&'a str> {
    expressions
        .iter()
        .map(String::as_str)
        .find(|expression| matches(key, expression))
}

/// Test one expression against one key under all four grammars.
fn matches(key: &str, expression: &str) -> bool {
    if expression == "(1/2/3/...)" && is_integer(key) {
        return true;
    }

    if let Some(stem) = expression.strip_suffix("(s)") {
        if key == stem || key == format!("{stem}s") {
            return true;
        }
    }

    if let Some(stem) = expression.strip_suffix("(y/ies)") {
        if key == format!("{stem}y") || key == format!("{stem}ies") {
            return true;
        }
    }

    if let Some(stem) = expression.strip_suffix("(1/2)") {
        if key == format!("{stem}1") || key == format!("{stem}2") {
            return true;
        }
    }

    false
}

/// A key consisting only of base-10 digits.
fn is_integer(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}
