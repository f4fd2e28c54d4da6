//! API Key Registry
//!
//! Static allowlist of caller keys.

use std::collections::HashSet;

/// Immutable set of accepted caller keys
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    keys: HashSet<String>,
}

impl KeyRegistry {
    /// Create a registry; keys are trimmed and blanks dropped
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys }
    }

    /// Exact, case-sensitive membership
    pub fn contains(&self, key: &str) -> bool {
        !key.is_empty() && self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
