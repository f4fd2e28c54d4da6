//! Busy Phrases
//!
//! Literal texts upstreams send instead of an answer when they are overloaded.

/// Immutable set of busy phrases, stored trimmed and lowercased
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusyPhrases {
    phrases: Vec<String>,
}

impl BusyPhrases {
    /// Build from raw phrases; blank entries are dropped
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !normalized.contains(&phrase) {
                normalized.push(phrase);
            }
        }
        Self { phrases: normalized }
    }

    /// Whether `text` equals or contains any phrase, ignoring case and
    /// surrounding whitespace
    pub fn matches(&self, text: &str) -> bool {
        let text = text.trim().to_lowercase();
        self.phrases.iter().any(|phrase| text.contains(phrase.as_str()))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> BusyPhrases {
        BusyPhrases::new([
            "Rejected: Try again later!",
            r#"{"status":true,"result":[{"response":"Rejected: Try again later!"}]}"#,
        ])
    }

    #[test]
    fn test_exact_match_ignores_case_and_whitespace() {
        let phrases = defaults();
        assert!(phrases.matches("Rejected: Try again later!"));
        assert!(phrases.matches("  REJECTED: TRY AGAIN LATER!\n"));
    }

    #[test]
    fn test_substring_match() {
        let phrases = defaults();
        assert!(phrases.matches("Upstream says: rejected: try again later! (code 7)"));
        assert!(phrases.matches(
            r#"{"status":true,"result":[{"response":"Rejected: Try again later!"}]}"#
        ));
    }

    #[test]
    fn test_no_match() {
        let phrases = defaults();
        assert!(!phrases.matches("Paris is the capital of France."));
        assert!(!phrases.matches(""));
    }

    #[test]
    fn test_blank_and_duplicate_phrases_dropped() {
        let phrases = BusyPhrases::new(["", "  ", "Busy", "busy "]);
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases.iter().collect::<Vec<_>>(), vec!["busy"]);
        assert!(!phrases.matches("all good"));
    }
}
