//! Data models shared by the scraping pipeline and the announcer.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SourceDescriptor`]: A configured page believed to list news posts
//! - [`PageLayout`]: Which selector chain applies to a source's markup
//! - [`ArticleRecord`]: One extracted candidate news item

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// How a source is reached. Only plain web pages are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Web,
}

/// The page structure a source is expected to have.
///
/// Blog and research listings share the same overall shape but use slightly
/// different container classes, and only the blog gets the loose anchor scan
/// when no structured container matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLayout {
    Blog,
    Research,
}

impl PageLayout {
    /// Guess the layout from the first path segment of a source URL.
    ///
    /// `https://openai.com/blog` -> `Blog`, `https://openai.com/research/index` -> `Research`.
    pub fn detect(url: &Url) -> Option<Self> {
        let first = url.path_segments()?.find(|s| !s.is_empty())?;
        match first {
            "blog" => Some(PageLayout::Blog),
            "research" => Some(PageLayout::Research),
            _ => None,
        }
    }
}

/// Custom selectors replacing a layout's structured pass.
///
/// Each field is a CSS selector group. They are compiled when the source is
/// scraped, so a typo only breaks that one source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SelectorOverrides {
    pub containers: String,
    pub title: String,
    #[serde(default = "default_link_selector")]
    pub link: String,
    pub date: String,
    pub description: String,
}

fn default_link_selector() -> String {
    "a".to_string()
}

/// A configured news source.
///
/// Sources are built once at startup (from the built-in list or a YAML file)
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceDescriptor {
    /// Human readable name, copied onto every record from this source.
    pub name: String,
    /// Listing page to fetch. Relative article links are resolved against it.
    pub url: Url,
    #[serde(default)]
    pub kind: SourceKind,
    /// Explicit layout. When absent it is detected from `url`.
    #[serde(default)]
    pub layout: Option<PageLayout>,
    #[serde(default)]
    pub selectors: Option<SelectorOverrides>,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, url: Url, layout: Option<PageLayout>) -> Self {
        Self {
            name: name.into(),
            url,
            kind: SourceKind::Web,
            layout,
            selectors: None,
        }
    }

    /// The layout to scrape this source with, explicit first, then detected.
    pub fn effective_layout(&self) -> Option<PageLayout> {
        self.layout.or_else(|| PageLayout::detect(&self.url))
    }
}

/// One extracted candidate news item.
///
/// Records only live for a single cycle. The `url` is the identity used for
/// deduplication, both within a run and against the announced set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    /// Headline text. Never empty.
    pub title: String,
    /// Absolute link to the post.
    pub url: String,
    /// Teaser text, at most 200 characters. May be empty.
    pub description: String,
    /// Publication time, or the extraction time when no date could be read.
    pub published_at: DateTime<Utc>,
    /// Name of the [`SourceDescriptor`] this record came from.
    pub source_name: String,
    /// Optional preview image. The scrapers never fill this in.
    pub image: Option<String>,
}
