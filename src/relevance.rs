//! Keyword relevance filter and recency ranking.
//!
//! Listing pages mix product announcements with hiring posts, event recaps
//! and the like. A record survives when its lowercased title and teaser
//! contain at least one keyword from the vocabulary; survivors are ordered
//! newest first and capped.

use crate::config::ConfigError;
use crate::models::ArticleRecord;
use tracing::debug;

/// Terms that signal a product or model announcement.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "gpt",
    "model",
    "feature",
    "update",
    "release",
    "launch",
    "announce",
    "new",
    "api",
    "tool",
    "chatgpt",
    "dall-e",
    "whisper",
    "codex",
    "embedding",
    "fine-tuning",
    "plugin",
    "function",
    "capability",
    "o1",
    "o3",
    "reasoning",
    "preview",
    "beta",
];

/// Default number of records returned per cycle.
pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
    max_results: usize,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl RelevanceFilter {
    /// Build a filter from a keyword vocabulary.
    ///
    /// Keywords are lowercased and blank entries dropped.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyKeywords`] when no usable keyword remains, and
    /// [`ConfigError::ZeroMaxResults`] when `max_results` is zero.
    pub fn new<I, S>(keywords: I, max_results: usize) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(ConfigError::EmptyKeywords);
        }
        if max_results == 0 {
            return Err(ConfigError::ZeroMaxResults);
        }
        Ok(Self { keywords, max_results })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Whether a record mentions any keyword in its title or description.
    pub fn is_relevant(&self, record: &ArticleRecord) -> bool {
        let text = format!("{} {}", record.title, record.description).to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    /// Keep relevant records, newest first, at most `max_results` of them.
    ///
    /// The sort is stable: records with equal timestamps keep their input order.
    pub fn process(&self, records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
        let total = records.len();
        let mut kept: Vec<ArticleRecord> = records.into_iter().filter(|r| self.is_relevant(r)).collect();
        kept.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        kept.truncate(self.max_results);
        debug!(total, kept = kept.len(), "Applied relevance filter");
        kept
    }
}
