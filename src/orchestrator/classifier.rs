//! Decide whether a command should also produce a plugin

/// Classify a raw command as a plugin request
pub trait Classifier: Send + Sync {
    /// Whether the command asks for a plugin
    fn wants_plugin(&self, command: &str) -> bool;
}

/// Keywords matched by [`KeywordClassifier::default`]
pub const DEFAULT_PLUGIN_KEYWORDS: &[&str] = &["timer", "calculator"];

/// Case-insensitive substring match against a fixed keyword list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordClassifier {
    /// Lowercased keywords
    keywords: Vec<String>,
}

impl KeywordClassifier {
    /// Create a classifier from a keyword list
    ///
    /// Empty keywords are dropped; an empty substring would match everything.
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Keywords this classifier matches
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PLUGIN_KEYWORDS)
    }
}

impl Classifier for KeywordClassifier {
    fn wants_plugin(&self, command: &str) -> bool {
        let command = command.to_lowercase();
        self.keywords.iter().any(|k| command.contains(k.as_str()))
    }
}
