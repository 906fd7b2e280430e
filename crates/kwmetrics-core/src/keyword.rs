use std::fmt;

/// A search keyword: a non-empty, byte-exact Unicode string.
///
/// Equality and hashing are derived directly so a `Keyword` can be used as a
/// map key or cache key without a separate normalization step — the spec
/// requires byte-exact equality, not case-folding or trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Keyword(String);

/// A keyword string was empty.
#[derive(Debug, thiserror::Error)]
#[error("keyword must not be empty")]
pub struct EmptyKeyword;

impl Keyword {
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyKeyword> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(EmptyKeyword);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Keyword {
    type Error = EmptyKeyword;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deduplicates a list of keywords, keeping the first occurrence of each and
/// dropping any that fail validation (empty strings).
pub fn dedup_keywords(raw: impl IntoIterator<Item = String>) -> Vec<Keyword> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in raw {
        let Ok(kw) = Keyword::new(item) else {
            continue;
        };
        if seen.insert(kw.clone()) {
            out.push(kw);
        }
    }
    out
}
