use std::collections::HashSet;

/// Field spellings that count as source-missing cells when reading text.
#[derive(Debug, Clone)]
pub struct MissingTokens {
    empty_is_missing: bool,
    tokens: HashSet<String>,
}

impl Default for MissingTokens {
    fn default() -> Self {
        Self {
            empty_is_missing: true,
            tokens: ["na", "nan", "null", "n/a"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl MissingTokens {
    /// A policy where only empty fields are missing.
    #[must_use]
    pub fn empty_only() -> Self {
        Self {
            empty_is_missing: true,
            tokens: HashSet::new(),
        }
    }

    /// Adds a spelling; matching is case-insensitive and ignores surrounding
    /// whitespace.
    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.tokens.insert(normalize(token));
        self
    }

    #[must_use]
    pub const fn with_empty_is_missing(mut self, empty_is_missing: bool) -> Self {
        self.empty_is_missing = empty_is_missing;
        self
    }

    #[must_use]
    pub fn is_missing(&self, field: &str) -> bool {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return self.empty_is_missing;
        }
        self.tokens.contains(&normalize(trimmed))
    }
}

fn normalize(token: &str) -> String {
    token.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tokens_are_case_insensitive() {
        let tokens = MissingTokens::default();
        for field in ["", "  ", "NA", "nan", "NaN", "NULL", "n/a"] {
            assert!(tokens.is_missing(field), "{field:?}");
        }
        assert!(!tokens.is_missing("0"));
        assert!(!tokens.is_missing("nano"));
    }

    #[test]
    fn custom_tokens_extend_the_policy() {
        let tokens = MissingTokens::empty_only().with_token(" -999 ");
        assert!(tokens.is_missing("-999"));
        assert!(!tokens.is_missing("NA"));

        let strict = MissingTokens::empty_only().with_empty_is_missing(false);
        assert!(!strict.is_missing(""));
    }
}
