/// Substrings of the messenger and its forks that mark a candidate executable
pub const DEFAULT_NAME_PATTERNS: &[&str] = &["telegram", "kibitkogram", "unigram"];

/// Case-insensitive file name predicate: substring rules plus exact-name rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    substrings: Vec<String>,
    exact_names: Vec<String>,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_PATTERNS.iter().copied(), std::iter::empty::<&str>())
    }
}

impl PathMatcher {
    pub fn new<S, E>(substrings: S, exact_names: E) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            substrings: normalize(substrings),
            exact_names: normalize(exact_names),
        }
    }

    /// True when `name` (a bare file or directory name) belongs to the target set
    pub fn matches(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.exact_names.iter().any(|n| *n == lower)
            || self.substrings.iter().any(|s| lower.contains(s.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty() && self.exact_names.is_empty()
    }
}

fn normalize<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
