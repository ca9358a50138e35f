//! Sort-order validation for registry keys.
//!
//! Keys must appear in lexicographic (byte-wise) order. Every key that sits
//! at the wrong index is reported together with a hint derived from its
//! neighbors at the position it should occupy, so the fix is a single move
//! rather than a guessing game.

use std::fmt;

/// One mis-sorted key with its placement hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub key: String,
    pub recommendation: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.recommendation {
            Some(rec) => write!(f, "Wrong sorting: '{}'. {}", self.key, rec),
            None => write!(f, "Wrong sorting: '{}'.", self.key),
        }
    }
}

/// Diff the key sequence against its sorted copy.
///
/// Comparison is on the raw key bytes; no case folding. A key is flagged iff
/// its index in the original sequence differs from its index in the sorted
/// copy. The hint names the sorted neighbors around the key's correct
/// position (its first occurrence in the sorted copy) and omits neighbors
/// that do not exist.
pub fn violations(keys: &[String]) -> Vec<Violation> {
    let mut sorted = keys.to_vec();
    sorted.sort();

    let mut found = Vec::new();

    for (index, key) in sorted.iter().enumerate() {
        if key == &keys[index] {
            continue;
        }

        let correct = sorted
            .iter()
            .position(|k| k == key)
            .unwrap_or(index);

        let before = correct.checked_sub(1).and_then(|i| sorted.get(i));
        let after = sorted.get(correct + 1);

        let recommendation = match (before, after) {
            (Some(b), Some(a)) => {
                Some(format!("Item should follow '{}' and precede '{}'.", b, a))
            }
            (Some(b), None) => Some(format!("Item should follow '{}'.", b)),
            (None, Some(a)) => Some(format!("Item should precede '{}'.", a)),
            (None, None) => None,
        };

        found.push(Violation {
            key: key.clone(),
            recommendation,
        });
    }

    found
}
