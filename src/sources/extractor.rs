//! Rule-driven article extraction shared by every listing-page source.
//!
//! A source describes its markup with [`ExtractionRules`]; [`RuleExtractor`]
//! walks the container elements in order and turns each one into an
//! [`Article`]. Candidates without a title or link are dropped and recorded,
//! unparseable dates fall back to the fetch time.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::domain::{Article, MissingField, SkippedCandidate};
use crate::errors::{FeederError, FeederResult};
use crate::sources::dates::DateNormalizer;

const CONTEXT_LEN: usize = 80;

/// Selectors describing where the fields of an article live in a listing page.
///
/// Every list is an ordered fallback chain: the first selector producing a
/// usable value wins.
#[derive(Debug, Clone, Default)]
pub struct ExtractionRules {
    /// Base used to resolve relative links
    pub base_url: &'static str,
    /// Container selectors; matches of later selectors are more canonical and
    /// replace earlier candidates with the same link
    pub containers: Vec<&'static str>,
    /// Link suffixes of the listing page itself, never treated as articles
    pub skip_links: Vec<&'static str>,
    /// Used when the container is not itself an `<a href>`
    pub link: Vec<&'static str>,
    pub title: Vec<&'static str>,
    pub date: Vec<&'static str>,
    pub summary: Vec<&'static str>,
    pub category: Vec<&'static str>,
    pub default_category: Option<&'static str>,
}

impl ExtractionRules {
    /// Parse every selector, reporting the first invalid one
    pub fn validate(&self) -> FeederResult<()> {
        CompiledRules::compile(self).map(|_| ())
    }
}

struct CompiledRules {
    containers: Vec<Selector>,
    link: Vec<Selector>,
    title: Vec<Selector>,
    date: Vec<Selector>,
    summary: Vec<Selector>,
    category: Vec<Selector>,
}

impl CompiledRules {
    fn compile(rules: &ExtractionRules) -> FeederResult<Self> {
        Ok(Self {
            containers: compile(&rules.containers)?,
            link: compile(&rules.link)?,
            title: compile(&rules.title)?,
            date: compile(&rules.date)?,
            summary: compile(&rules.summary)?,
            category: compile(&rules.category)?,
        })
    }
}

fn compile(selectors: &[&str]) -> FeederResult<Vec<Selector>> {
    selectors
        .iter()
        .map(|s| {
            Selector::parse(s).map_err(|e| FeederError::Selector {
                selector: s.to_string(),
                cause: format!("{:?}", e),
            })
        })
        .collect()
}

/// Result of running the rules over one page
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Container elements considered as articles
    pub candidates: usize,
    /// Articles in extraction order, unique by link
    pub articles: Vec<Article>,
    pub skipped: Vec<SkippedCandidate>,
}

impl Extraction {
    /// True when no container matched at all
    pub fn is_empty(&self) -> bool {
        self.candidates == 0
    }

    pub fn inferred_dates(&self) -> usize {
        self.articles.iter().filter(|a| a.date_inferred).count()
    }
}

pub struct RuleExtractor<'a> {
    rules: &'a ExtractionRules,
    normalizer: DateNormalizer,
}

impl<'a> RuleExtractor<'a> {
    pub fn new(rules: &'a ExtractionRules) -> Self {
        Self {
            rules,
            normalizer: DateNormalizer::new(),
        }
    }

    pub fn extract(&self, html: &str, fetched_at: DateTime<Utc>) -> FeederResult<Extraction> {
        let compiled = CompiledRules::compile(self.rules)?;
        let base = Url::parse(self.rules.base_url).map_err(|e| {
            FeederError::Config(format!("invalid base url {:?}: {}", self.rules.base_url, e))
        })?;

        let document = Html::parse_document(html);
        let mut extraction = Extraction::default();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut visited = HashSet::new();
        let mut skipped: Vec<(Option<String>, SkippedCandidate)> = Vec::new();

        for container in &compiled.containers {
            for element in document.select(container) {
                if !visited.insert(element.id()) {
                    continue;
                }

                let link = self.find_link(&element, &compiled, &base);
                if link.as_deref().is_some_and(|l| self.is_listing_link(l)) {
                    continue;
                }

                let position = extraction.candidates;
                extraction.candidates += 1;
                let key = link.clone();

                match self.build_article(&element, link, &compiled, fetched_at) {
                    Ok(article) => match positions.get(&article.link) {
                        Some(&existing) => {
                            debug!(link = %article.link, "Replacing earlier candidate with same link");
                            extraction.articles[existing] = article;
                        }
                        None => {
                            positions.insert(article.link.clone(), extraction.articles.len());
                            extraction.articles.push(article);
                        }
                    },
                    Err(FeederError::ArticleFieldMissing { field, context }) => {
                        skipped.push((
                            key,
                            SkippedCandidate {
                                position,
                                field,
                                context,
                            },
                        ));
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        // A link covered by another container was not lost
        for (key, candidate) in skipped {
            if key.as_ref().is_some_and(|link| positions.contains_key(link)) {
                debug!(position = candidate.position, link = %candidate.context, "Dropping skip for link extracted elsewhere");
                continue;
            }
            warn!(
                position = candidate.position,
                field = %candidate.field,
                context = %candidate.context,
                "Skipping candidate with missing field"
            );
            extraction.skipped.push(candidate);
        }

        debug!(
            candidates = extraction.candidates,
            articles = extraction.articles.len(),
            skipped = extraction.skipped.len(),
            "Extraction finished"
        );

        Ok(extraction)
    }

    fn build_article(
        &self,
        element: &ElementRef,
        link: Option<String>,
        compiled: &CompiledRules,
        fetched_at: DateTime<Utc>,
    ) -> FeederResult<Article> {
        let link = link.ok_or_else(|| FeederError::ArticleFieldMissing {
            field: MissingField::Link,
            context: snippet(element),
        })?;

        let title = first_text(element, &compiled.title).ok_or_else(|| {
            FeederError::ArticleFieldMissing {
                field: MissingField::Title,
                context: link.clone(),
            }
        })?;

        let (article, date_text) = match self.find_date(element, &compiled.date, fetched_at) {
            Ok((published_at, text)) => (Article::new(title, link, published_at), Some(text)),
            Err(FeederError::DateUnparseable(text)) => {
                debug!(%link, date = %text, "Date unparseable, using fetch time");
                (Article::with_inferred_date(title, link, fetched_at), None)
            }
            Err(e) => return Err(e),
        };

        let category = self
            .find_category(element, &compiled.category, date_text.as_deref(), fetched_at)
            .or_else(|| self.rules.default_category.map(str::to_string));

        Ok(article
            .with_summary(first_text(element, &compiled.summary))
            .with_categories(category))
    }

    fn find_link(&self, element: &ElementRef, compiled: &CompiledRules, base: &Url) -> Option<String> {
        if element.value().name() == "a" {
            if let Some(link) = element.value().attr("href").and_then(|h| resolve(base, h)) {
                return Some(link);
            }
        }

        compiled
            .link
            .iter()
            .flat_map(|selector| element.select(selector))
            .find_map(|el| el.value().attr("href").and_then(|h| resolve(base, h)))
    }

    fn is_listing_link(&self, link: &str) -> bool {
        let link = link.trim_end_matches('/');
        self.rules
            .skip_links
            .iter()
            .any(|suffix| link.ends_with(suffix.trim_end_matches('/')))
    }

    /// First parseable date among the date elements, with the text it came from
    fn find_date(
        &self,
        element: &ElementRef,
        selectors: &[Selector],
        fetched_at: DateTime<Utc>,
    ) -> FeederResult<(DateTime<Utc>, String)> {
        let mut last_error = FeederError::DateUnparseable(String::new());

        for el in selectors.iter().flat_map(|selector| element.select(selector)) {
            let text = element_text(&el);
            let attr = el.value().attr("datetime");
            match self.normalizer.normalize_with_attr(attr, &text, fetched_at) {
                Ok(date) => return Ok((date, text)),
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }

    fn find_category(
        &self,
        element: &ElementRef,
        selectors: &[Selector],
        date_text: Option<&str>,
        fetched_at: DateTime<Utc>,
    ) -> Option<String> {
        selectors
            .iter()
            .flat_map(|selector| element.select(selector))
            .map(|el| element_text(&el))
            .find(|text| {
                !text.is_empty()
                    && Some(text.as_str()) != date_text
                    && !self.normalizer.is_date_like(text, fetched_at)
            })
    }
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    base.join(href)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| url.to_string())
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(element: &ElementRef, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|selector| element.select(selector))
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
}

fn snippet(element: &ElementRef) -> String {
    let text = element_text(element);
    if text.is_empty() {
        return format!("<{}> without text", element.value().name());
    }
    text.chars().take(CONTEXT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn rules() -> ExtractionRules {
        ExtractionRules {
            base_url: "https://example.com/blog",
            containers: vec!["article.post"],
            skip_links: vec!["/blog"],
            link: vec!["a[href]"],
            title: vec!["h2"],
            date: vec!["time"],
            summary: vec!["p.summary"],
            category: vec!["span.tag"],
            default_category: Some("Blog"),
        }
    }

    const LISTING: &str = r#"
<html><body>
  <article class="post">
    <h2><a href="/a">Article A</a></h2>
    <time datetime="2024-01-02T00:00:00Z">Jan 2, 2024</time>
    <p class="summary">First post</p>
    <span class="tag">Release</span>
  </article>
  <article class="post">
    <h2><a href="https://example.com/b">Article B</a></h2>
    <time>January 1, 2024</time>
  </article>
  <article class="post">
    <h2><a href="c">  Article
        C  </a></h2>
    <time>2023-12-31</time>
  </article>
</body></html>"#;

    #[test]
    fn test_extracts_every_well_formed_block() {
        let rules = rules();
        let extraction = RuleExtractor::new(&rules).extract(LISTING, fetched_at()).unwrap();

        assert_eq!(extraction.candidates, 3);
        assert_eq!(extraction.articles.len(), 3);
        assert!(extraction.skipped.is_empty());

        for article in &extraction.articles {
            assert!(!article.title.is_empty());
            assert!(article.link.starts_with("https://"));
        }

        let a = &extraction.articles[0];
        assert_eq!(a.title, "Article A");
        assert_eq!(a.link, "https://example.com/a");
        assert_eq!(a.published_at, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(a.summary.as_deref(), Some("First post"));
        assert!(a.categories.contains("Release"));

        let b = &extraction.articles[1];
        assert_eq!(b.published_at.day(), 1);
        assert!(b.categories.contains("Blog"));

        let c = &extraction.articles[2];
        assert_eq!(c.title, "Article C");
        assert_eq!(c.link, "https://example.com/c");
    }

    #[test]
    fn test_missing_fields_are_skipped_not_fatal() {
        let html = r#"
<article class="post"><h2><a href="/ok">Fine</a></h2><time>2024-01-02</time></article>
<article class="post"><h2>No link here</h2></article>
<article class="post"><a href="/untitled"></a><h2>   </h2></article>
"#;
        let rules = rules();
        let extraction = RuleExtractor::new(&rules).extract(html, fetched_at()).unwrap();

        assert_eq!(extraction.candidates, 3);
        assert_eq!(extraction.articles.len(), 1);
        assert_eq!(extraction.skipped.len(), 2);

        assert_eq!(extraction.skipped[0].position, 1);
        assert_eq!(extraction.skipped[0].field, MissingField::Link);
        assert_eq!(extraction.skipped[0].context, "No link here");

        assert_eq!(extraction.skipped[1].field, MissingField::Title);
        assert_eq!(extraction.skipped[1].context, "https://example.com/untitled");
    }

    #[test]
    fn test_untitled_duplicate_of_extracted_link_is_not_skipped() {
        let rules = ExtractionRules {
            containers: vec!["a.thumb", "article.post"],
            ..rules()
        };
        let html = r#"
<a class="thumb" href="/a"><img src="/a.png"></a>
<article class="post"><h2><a href="/a">Article A</a></h2><time>2024-01-02</time></article>
<article class="post"><h2><a href="/b">Article B</a></h2><time>2024-01-01</time></article>
<a class="thumb" href="/b"><img src="/b.png"></a>
<a class="thumb" href="/lonely"><img src="/lonely.png"></a>
"#;
        let extraction = RuleExtractor::new(&rules).extract(html, fetched_at()).unwrap();

        assert_eq!(extraction.candidates, 5);
        assert_eq!(extraction.articles.len(), 2);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].context, "https://example.com/lonely");
        assert_eq!(extraction.skipped[0].field, MissingField::Title);
    }

    #[test]
    fn test_no_containers_is_empty() {
        let rules = rules();
        let extraction = RuleExtractor::new(&rules)
            .extract("<html><body><div>Nothing</div></body></html>", fetched_at())
            .unwrap();

        assert!(extraction.is_empty());
        assert!(extraction.articles.is_empty());
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_missing_date_uses_fetch_time() {
        let html = r#"<article class="post"><h2><a href="/a">Undated</a></h2><time>sometime</time></article>"#;
        let rules = rules();
        let extraction = RuleExtractor::new(&rules).extract(html, fetched_at()).unwrap();

        let article = &extraction.articles[0];
        assert!(article.date_inferred);
        assert_eq!(article.published_at, fetched_at());
        assert_eq!(extraction.inferred_dates(), 1);
    }

    #[test]
    fn test_later_duplicate_wins_in_first_position() {
        let html = r#"
<article class="post"><h2><a href="/a">Draft title</a></h2></article>
<article class="post"><h2><a href="/b">Other</a></h2></article>
<article class="post"><h2><a href="/a">Final title</a></h2><time>2024-01-02</time></article>
"#;
        let rules = rules();
        let extraction = RuleExtractor::new(&rules).extract(html, fetched_at()).unwrap();

        assert_eq!(extraction.candidates, 3);
        assert_eq!(extraction.articles.len(), 2);
        assert_eq!(extraction.articles[0].title, "Final title");
        assert!(!extraction.articles[0].date_inferred);
        assert_eq!(extraction.articles[1].title, "Other");
    }

    #[test]
    fn test_listing_links_are_not_candidates() {
        let rules = ExtractionRules {
            containers: vec!["a[href*='/blog']"],
            title: vec!["span"],
            ..rules()
        };
        let html = r#"
<a href="/blog"><span>All posts</span></a>
<a href="/blog/"><span>All posts</span></a>
<a href="/blog/post-1"><span>Post one</span></a>
"#;
        let extraction = RuleExtractor::new(&rules).extract(html, fetched_at()).unwrap();

        assert_eq!(extraction.candidates, 1);
        assert_eq!(extraction.articles[0].link, "https://example.com/blog/post-1");
    }

    #[test]
    fn test_date_like_category_skipped() {
        let rules = ExtractionRules {
            category: vec!["p.meta"],
            date: vec!["p.meta"],
            default_category: Some("News"),
            ..rules()
        };
        let html = r#"
<article class="post"><h2><a href="/a">A title</a></h2><p class="meta">Mar 3, 2024</p><p class="meta">Policy</p></article>
<article class="post"><h2><a href="/b">B title</a></h2><p class="meta">Mar 4, 2024</p></article>
"#;
        let extraction = RuleExtractor::new(&rules).extract(html, fetched_at()).unwrap();

        assert!(extraction.articles[0].categories.contains("Policy"));
        assert_eq!(extraction.articles[1].categories.iter().collect::<Vec<_>>(), vec!["News"]);
        assert_eq!(extraction.articles[1].published_at.day(), 4);
    }

    #[test]
    fn test_invalid_selector_reported() {
        let rules = ExtractionRules {
            title: vec!["h2[["],
            ..rules()
        };
        assert!(matches!(rules.validate(), Err(FeederError::Selector { .. })));
        assert!(matches!(
            RuleExtractor::new(&rules).extract(LISTING, fetched_at()),
            Err(FeederError::Selector { .. })
        ));
    }
}
