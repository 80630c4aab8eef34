//! Source list and keyword vocabulary.
//!
//! Both are data rather than logic: the built-in defaults target the OpenAI
//! blog and research pages, and a YAML file can replace any part of them.
//!
//! ```yaml
//! sources:
//!   - name: OpenAI Blog
//!     url: https://openai.com/blog
//!     kind: web
//! keywords: [gpt, model, release]
//! max_results: 10
//! request_timeout_secs: 20
//! ```

use crate::models::{PageLayout, SourceDescriptor};
use crate::relevance::{DEFAULT_KEYWORDS, DEFAULT_MAX_RESULTS, RelevanceFilter};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

/// Desktop browser identification sent with every listing-page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("no sources configured")]
    NoSources,
    #[error("keyword vocabulary is empty")]
    EmptyKeywords,
    #[error("max_results must be greater than zero")]
    ZeroMaxResults,
    #[error("source `{0}` must use an http(s) URL")]
    UnsupportedScheme(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Everything the monitor needs to know about what to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub sources: Vec<SourceDescriptor>,
    pub keywords: Vec<String>,
    pub max_results: usize,
    pub user_agent: String,
    /// Per-request timeout. No timeout when absent.
    pub request_timeout_secs: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            max_results: DEFAULT_MAX_RESULTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
        }
    }
}

/// The OpenAI blog and research listings.
pub fn default_sources() -> Vec<SourceDescriptor> {
    let source = |name: &str, url: &str, layout| {
        SourceDescriptor::new(name, Url::parse(url).expect("built-in source URL"), Some(layout))
    };
    vec![
        source("OpenAI Blog", "https://openai.com/blog", PageLayout::Blog),
        source("OpenAI Research", "https://openai.com/research", PageLayout::Research),
    ]
}

impl MonitorConfig {
    /// Parse and validate a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: MonitorConfig = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if let Some(bad) = self
            .sources
            .iter()
            .find(|s| !matches!(s.url.scheme(), "http" | "https"))
        {
            return Err(ConfigError::UnsupportedScheme(bad.name.clone()));
        }
        self.relevance_filter().map(|_| ())
    }

    pub fn relevance_filter(&self) -> Result<RelevanceFilter, ConfigError> {
        RelevanceFilter::new(&self.keywords, self.max_results)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Load the monitor configuration, or the built-in defaults when no path is given.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    let Some(path) = path else {
        info!("Using built-in sources and keywords");
        return Ok(MonitorConfig::default());
    };
    let shown = path.display().to_string();
    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
    let config = MonitorConfig::from_yaml_str(&yaml, &shown)?;
    info!(
        path = %shown,
        sources = config.sources.len(),
        keywords = config.keywords.len(),
        "Loaded configuration"
    );
    Ok(config)
}
