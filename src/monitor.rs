//! Source monitoring: fetch every listing page, extract, filter, rank.
//!
//! Sources are scraped one after another, never in parallel. Each source
//! is isolated: a failed request, a non-2xx status or an extraction error is
//! logged and that source simply contributes nothing to the cycle.

use crate::config::{ConfigError, MonitorConfig};
use crate::extract::{ExtractError, extract_articles};
use crate::models::{ArticleRecord, SourceDescriptor};
use crate::relevance::RelevanceFilter;
use itertools::Itertools;
use reqwest::{Client, StatusCode, header};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

#[derive(Debug, Clone)]
pub struct NewsMonitor {
    client: Client,
    sources: Vec<SourceDescriptor>,
    filter: RelevanceFilter,
}

impl NewsMonitor {
    /// Build a monitor from validated configuration.
    pub fn new(config: &MonitorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().map_err(ConfigError::HttpClient)?,
            sources: config.sources.clone(),
            filter: config.relevance_filter()?,
        })
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    /// Scrape every source and return the relevant records, newest first.
    ///
    /// Never fails; broken sources are logged and skipped.
    #[instrument(level = "info", skip_all)]
    pub async fn collect(&self) -> Vec<ArticleRecord> {
        let mut all = Vec::new();
        for source in &self.sources {
            match self.scrape_source(source).await {
                Ok(records) => {
                    debug!(source = %source.name, count = records.len(), "Scraped source");
                    all.extend(records);
                }
                Err(e) => {
                    warn!(source = %source.name, url = %source.url, error = %e, "Error scraping source");
                }
            }
        }

        let scraped = all.len();
        let unique: Vec<ArticleRecord> = all.into_iter().unique_by(|r| r.url.clone()).collect();
        let ranked = self.filter.process(unique);
        info!(scraped, relevant = ranked.len(), "Collected latest news");
        ranked
    }

    /// Fetch one listing page and extract its articles.
    #[instrument(level = "info", skip_all, fields(source = %source.name, url = %source.url))]
    pub async fn scrape_source(&self, source: &SourceDescriptor) -> Result<Vec<ArticleRecord>, SourceError> {
        let html = self.fetch(source).await?;
        Ok(extract_articles(&html, source)?)
    }

    async fn fetch(&self, source: &SourceDescriptor) -> Result<String, SourceError> {
        let rsp = self
            .client
            .get(source.url.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;
        let status = rsp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }
        let body = rsp.text().await?;
        debug!(bytes = body.len(), "Fetched listing page");
        Ok(body)
    }
}
