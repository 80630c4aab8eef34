//! Article extraction from listing-page markup.
//!
//! Listing pages are loosely structured and change without notice, so
//! extraction runs a [`SelectorChain`]: an ordered list of [`Strategy`]
//! values tried one after another until one produces at least one record.
//!
//! # Strategies
//!
//! - [`Strategy::Structured`]: find post containers (`article`, `.post`, …)
//!   and read the title, link, date and teaser out of each one.
//! - [`Strategy::AnchorScan`]: ignore structure entirely and accept any link
//!   whose path marks it as a post and whose text looks like a headline.
//!   Low precision, used only when the structured pass finds nothing.
//!
//! # Layouts
//!
//! | Layout | Chain |
//! |--------|-------|
//! | [`PageLayout::Blog`] | structured (blog selectors), then anchor scan on `/blog/` |
//! | [`PageLayout::Research`] | structured (research selectors) |
//!
//! The extractor neither deduplicates nor filters; that happens once all
//! sources have been scraped.

use crate::dates::parse_date;
use crate::models::{ArticleRecord, PageLayout, SelectorOverrides, SourceDescriptor};
use crate::utils::{collapse_whitespace, truncate_chars};
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Maximum number of characters kept from a post's teaser text.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
    #[error("document is empty")]
    EmptyDocument,
}

/// CSS selector groups for one structured pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredSelectors {
    pub containers: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub description: String,
}

impl StructuredSelectors {
    pub fn blog() -> Self {
        Self {
            containers: r#"article, .post, [data-testid*="post"], .blog-post"#.to_string(),
            title: r#"h1, h2, h3, .title, [data-testid*="title"]"#.to_string(),
            link: "a".to_string(),
            date: r#"time, .date, [data-testid*="date"]"#.to_string(),
            description: "p, .description, .excerpt".to_string(),
        }
    }

    pub fn research() -> Self {
        Self {
            containers: r#"article, .research-item, [data-testid*="research"]"#.to_string(),
            title: "h1, h2, h3, .title".to_string(),
            link: "a".to_string(),
            date: "time, .date".to_string(),
            description: "p, .description".to_string(),
        }
    }
}

impl From<&SelectorOverrides> for StructuredSelectors {
    fn from(o: &SelectorOverrides) -> Self {
        Self {
            containers: o.containers.clone(),
            title: o.title.clone(),
            link: o.link.clone(),
            date: o.date.clone(),
            description: o.description.clone(),
        }
    }
}

/// Loose link scan used when no structured container matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorScan {
    /// Substring an `href` must contain to count as a post link.
    pub path_marker: String,
    /// Link text must be strictly longer than this many characters.
    pub min_text_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Structured(StructuredSelectors),
    AnchorScan(AnchorScan),
}

impl Strategy {
    fn label(&self) -> &'static str {
        match self {
            Strategy::Structured(_) => "structured",
            Strategy::AnchorScan(_) => "anchor_scan",
        }
    }

    fn run(&self, document: &Html, source: &SourceDescriptor) -> Result<Vec<ArticleRecord>, ExtractError> {
        match self {
            Strategy::Structured(selectors) => scrape_structured(document, source, selectors),
            Strategy::AnchorScan(scan) => scrape_anchors(document, source, scan),
        }
    }
}

/// Ordered strategies for one source. The first non-empty result wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    strategies: Vec<Strategy>,
}

impl SelectorChain {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    /// The built-in chain for a page layout.
    pub fn for_layout(layout: PageLayout) -> Self {
        match layout {
            PageLayout::Blog => Self::new(vec![
                Strategy::Structured(StructuredSelectors::blog()),
                Strategy::AnchorScan(AnchorScan {
                    path_marker: "/blog/".to_string(),
                    min_text_len: 10,
                }),
            ]),
            PageLayout::Research => Self::new(vec![Strategy::Structured(StructuredSelectors::research())]),
        }
    }

    /// The chain for a configured source, or `None` if the source has neither
    /// a known layout nor custom selectors.
    ///
    /// Custom selectors replace the layout's structured pass but keep its
    /// anchor scan.
    pub fn for_source(source: &SourceDescriptor) -> Option<Self> {
        let layout = source.effective_layout();
        match (&source.selectors, layout) {
            (None, None) => None,
            (None, Some(layout)) => Some(Self::for_layout(layout)),
            (Some(custom), layout) => {
                let mut strategies = vec![Strategy::Structured(custom.into())];
                if let Some(layout) = layout {
                    strategies.extend(
                        Self::for_layout(layout)
                            .strategies
                            .into_iter()
                            .filter(|s| matches!(s, Strategy::AnchorScan(_))),
                    );
                }
                Some(Self::new(strategies))
            }
        }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Run each strategy in order and return the first non-empty result.
    pub fn run(&self, document: &Html, source: &SourceDescriptor) -> Result<Vec<ArticleRecord>, ExtractError> {
        for strategy in &self.strategies {
            let records = strategy.run(document, source)?;
            if !records.is_empty() {
                info!(
                    source = %source.name,
                    strategy = strategy.label(),
                    count = records.len(),
                    "Extracted articles"
                );
                return Ok(records);
            }
            debug!(source = %source.name, strategy = strategy.label(), "Strategy matched nothing");
        }
        info!(source = %source.name, "No articles found on page");
        Ok(Vec::new())
    }
}

/// Extract candidate articles from a listing page.
///
/// # Errors
///
/// Returns [`ExtractError::EmptyDocument`] for a blank body and
/// [`ExtractError::Selector`] when a configured selector does not compile.
/// A source with no usable layout yields an empty list, not an error.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub fn extract_articles(html: &str, source: &SourceDescriptor) -> Result<Vec<ArticleRecord>, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    let Some(chain) = SelectorChain::for_source(source) else {
        warn!(url = %source.url, "No page layout known for source; skipping");
        return Ok(Vec::new());
    };
    let document = Html::parse_document(html);
    chain.run(&document, source)
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Resolve an `href` against the source page. Empty or unjoinable links are dropped.
fn resolve_link(source: &SourceDescriptor, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    source.url.join(href).ok().map(|u| u.to_string())
}

fn scrape_structured(
    document: &Html,
    source: &SourceDescriptor,
    selectors: &StructuredSelectors,
) -> Result<Vec<ArticleRecord>, ExtractError> {
    let containers = compile(&selectors.containers)?;
    let title_sel = compile(&selectors.title)?;
    let link_sel = compile(&selectors.link)?;
    let date_sel = compile(&selectors.date)?;
    let desc_sel = compile(&selectors.description)?;

    let mut records = Vec::new();
    for container in document.select(&containers) {
        let title = container
            .select(&title_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let url = container
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_link(source, href));

        let Some(url) = url.filter(|_| !title.is_empty()) else {
            debug!(title = %title, "Container without title or link; skipping");
            continue;
        };

        let raw_date = container.select(&date_sel).next().map(|el| {
            el.value()
                .attr("datetime")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| element_text(el))
        });
        let description = container
            .select(&desc_sel)
            .next()
            .map(|el| truncate_chars(&element_text(el), DESCRIPTION_MAX_CHARS))
            .unwrap_or_default();

        records.push(ArticleRecord {
            title,
            url,
            description,
            published_at: parse_date(raw_date.as_deref()),
            source_name: source.name.clone(),
            image: None,
        });
    }
    Ok(records)
}

fn scrape_anchors(
    document: &Html,
    source: &SourceDescriptor,
    scan: &AnchorScan,
) -> Result<Vec<ArticleRecord>, ExtractError> {
    let anchors = compile("a[href]")?;
    let now = Utc::now();

    let records = document
        .select(&anchors)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            if !href.contains(&scan.path_marker) {
                return None;
            }
            let title = element_text(a);
            if title.chars().count() <= scan.min_text_len {
                return None;
            }
            Some(ArticleRecord {
                title,
                url: resolve_link(source, href)?,
                description: String::new(),
                published_at: now,
                source_name: source.name.clone(),
                image: None,
            })
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use pretty_assertions::assert_eq;
    use url::Url;

    fn blog() -> SourceDescriptor {
        SourceDescriptor::new("OpenAI Blog", Url::parse("https://openai.com/blog").unwrap(), None)
    }

    fn research() -> SourceDescriptor {
        SourceDescriptor::new(
            "OpenAI Research",
            Url::parse("https://openai.com/research").unwrap(),
            None,
        )
    }

    fn assert_recent(ts: DateTime<Utc>) {
        assert!((Utc::now() - ts).num_seconds().abs() < 5);
    }

    #[test]
    fn test_structured_blog_article() {
        let html = r#"
            <html><body>
              <article>
                <h2>  Introducing
                    GPT-5 </h2>
                <a href="/blog/introducing-gpt-5">Read more</a>
                <time datetime="2025-08-07T17:00:00Z">Aug 7, 2025</time>
                <p>Our smartest model yet.</p>
              </article>
            </body></html>
        "#;

        let records = extract_articles(html, &blog()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.title, "Introducing GPT-5");
        assert_eq!(r.url, "https://openai.com/blog/introducing-gpt-5");
        assert_eq!(r.description, "Our smartest model yet.");
        assert_eq!(r.published_at, Utc.with_ymd_and_hms(2025, 8, 7, 17, 0, 0).unwrap());
        assert_eq!(r.source_name, "OpenAI Blog");
        assert_eq!(r.image, None);
    }

    #[test]
    fn test_date_text_used_without_datetime_attribute() {
        let html = r#"
            <div class="post">
              <h3>Whisper update</h3>
              <a href="https://openai.com/blog/whisper-update">link</a>
              <span class="date">March 4, 2024</span>
            </div>
        "#;
        let records = extract_articles(html, &blog()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].published_at, Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap());
        assert_eq!(records[0].url, "https://openai.com/blog/whisper-update");
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn test_missing_date_defaults_to_now() {
        let html = r#"<article><h2>Codex news</h2><a href="/blog/codex">x</a></article>"#;
        let records = extract_articles(html, &blog()).unwrap();
        assert_eq!(records.len(), 1);
        assert_recent(records[0].published_at);
    }

    #[test]
    fn test_description_truncated_to_200_chars() {
        let long = "word ".repeat(100);
        let html = format!(
            r#"<article><h2>Long teaser</h2><a href="/blog/long">x</a><p>{long}</p></article>"#
        );
        let records = extract_articles(&html, &blog()).unwrap();
        assert_eq!(records[0].description.chars().count(), DESCRIPTION_MAX_CHARS);
    }

    #[test]
    fn test_containers_without_title_or_link_are_dropped() {
        let html = r#"
            <article><h2>No link here</h2></article>
            <article><a href="/blog/untitled">no heading</a></article>
            <article><h2>Kept</h2><a href="/blog/kept">x</a></article>
        "#;
        let records = extract_articles(html, &blog()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Kept");
    }

    #[test]
    fn test_blog_fallback_scans_anchors() {
        let html = r#"
            <html><body>
              <nav><a href="/blog/">Blog</a><a href="/about">About our company and team</a></nav>
              <a href="/blog/new-model-release">Announcing our new model release today</a>
              <a href="/blog/short">Short</a>
            </body></html>
        "#;
        let records = extract_articles(html, &blog()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.title, "Announcing our new model release today");
        assert_eq!(r.url, "https://openai.com/blog/new-model-release");
        assert_eq!(r.description, "");
        assert_recent(r.published_at);
    }

    #[test]
    fn test_fallback_not_used_when_structured_pass_matches() {
        let html = r#"
            <article><h2>Structured post</h2><a href="/blog/structured">x</a></article>
            <a href="/blog/loose-link-somewhere">A loose link that looks like a post</a>
        "#;
        let records = extract_articles(html, &blog()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Structured post");
    }

    #[test]
    fn test_research_has_no_fallback() {
        let html = r#"<a href="/blog/new-model-release">Announcing our new model release today</a>"#;
        let records = extract_articles(html, &research()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_research_items() {
        let html = r#"
            <div class="research-item">
              <h3 class="title">Reasoning in small models</h3>
              <a href="/research/reasoning-small-models">paper</a>
              <p class="description">We study reasoning.</p>
              <time datetime="2024-09-12">Sep 12</time>
            </div>
        "#;
        let records = extract_articles(html, &research()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://openai.com/research/reasoning-small-models");
        assert_eq!(records[0].source_name, "OpenAI Research");
        assert_eq!(
            records[0].published_at,
            Utc.with_ymd_and_hms(2024, 9, 12, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unknown_layout_yields_nothing() {
        let source = SourceDescriptor::new("Elsewhere", Url::parse("https://example.com/news").unwrap(), None);
        let html = r#"<article><h2>GPT news</h2><a href="/news/gpt">x</a></article>"#;
        assert!(extract_articles(html, &source).unwrap().is_empty());
    }

    #[test]
    fn test_custom_selectors() {
        let mut source = SourceDescriptor::new("Custom", Url::parse("https://example.com/updates").unwrap(), None);
        source.selectors = Some(SelectorOverrides {
            containers: "li.update".to_string(),
            title: "strong".to_string(),
            link: "a.permalink".to_string(),
            date: "em".to_string(),
            description: "span".to_string(),
        });
        let html = r#"
            <ul>
              <li class="update">
                <a href="/ignored">first anchor</a>
                <strong>API pricing update</strong>
                <a class="permalink" href="updates/api-pricing">#</a>
                <em>2024-06-01</em>
                <span>Cheaper tokens.</span>
              </li>
            </ul>
        "#;
        let records = extract_articles(html, &source).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://example.com/updates/api-pricing");
        assert_eq!(records[0].description, "Cheaper tokens.");
    }

    #[test]
    fn test_invalid_custom_selector_is_an_error() {
        let mut source = blog();
        source.selectors = Some(SelectorOverrides {
            containers: "article[".to_string(),
            title: "h2".to_string(),
            link: "a".to_string(),
            date: "time".to_string(),
            description: "p".to_string(),
        });
        let err = extract_articles("<article></article>", &source).unwrap_err();
        assert!(matches!(err, ExtractError::Selector { .. }));
    }

    #[test]
    fn test_empty_document_is_an_error() {
        assert!(matches!(
            extract_articles("  \n ", &blog()),
            Err(ExtractError::EmptyDocument)
        ));
    }

    #[test]
    fn test_chain_shapes() {
        let blog_chain = SelectorChain::for_layout(PageLayout::Blog);
        assert_eq!(blog_chain.strategies().len(), 2);
        assert!(matches!(blog_chain.strategies()[1], Strategy::AnchorScan(_)));

        let research_chain = SelectorChain::for_layout(PageLayout::Research);
        assert_eq!(research_chain.strategies().len(), 1);
    }
}
