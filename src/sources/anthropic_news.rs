use crate::domain::{FeedDefinition, FeedIdentity};
use crate::errors::FeederResult;
use crate::sources::extractor::ExtractionRules;
use crate::sources::traits::FeedSource;

pub const IDENTITY: &str = "anthropic_news";
const URL: &str = "https://www.anthropic.com/news";

pub struct AnthropicNewsSource {
    definition: FeedDefinition,
    rules: ExtractionRules,
}

impl AnthropicNewsSource {
    pub fn new() -> FeederResult<Self> {
        let definition = FeedDefinition::new(
            FeedIdentity::new(IDENTITY)?,
            "Anthropic News",
            URL,
            "Latest news and updates from Anthropic",
        )
        .with_self_url("https://anthropic.com/news/feed_anthropic_news.xml")
        .with_image("https://www.anthropic.com/images/icons/apple-touch-icon.png");

        // Cards are links into /news/; class names carry build hashes so
        // generic fallbacks follow the exact ones
        let rules = ExtractionRules {
            base_url: "https://www.anthropic.com",
            containers: vec![r#"a[href*="/news/"]"#],
            skip_links: vec!["/news"],
            link: Vec::new(),
            title: vec![
                "h3.PostCard_post-heading__Ob1pu",
                "h3.Card_headline__reaoT",
                "h3[class*='headline']",
                "h3[class*='heading']",
                "h2[class*='headline']",
                "h2[class*='heading']",
                "h3",
                "h2",
            ],
            // `time` first: its datetime attribute beats any display text the card carries
            date: vec![
                "time",
                "p.detail-m",
                "div.PostList_post-date__djrOA",
                "p[class*='date']",
                "div[class*='date']",
            ],
            summary: vec!["p[class*='summary']", "p[class*='description']"],
            category: vec![
                "span.text-label",
                "p.detail-m",
                "span[class*='category']",
                "div[class*='category']",
            ],
            default_category: Some("News"),
        };

        Ok(Self { definition, rules })
    }
}

impl FeedSource for AnthropicNewsSource {
    fn definition(&self) -> &FeedDefinition {
        &self.definition
    }

    fn rules(&self) -> &ExtractionRules {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const LISTING: &str = r#"<!DOCTYPE html>
<html><body>
  <nav><a href="/news">Newsroom</a></nav>
  <section>
    <a href="/news/claude-3-5-sonnet" class="PostCard_post-card">
      <h3 class="PostCard_post-heading__Ob1pu">Introducing Claude 3.5 Sonnet</h3>
      <div class="PostList_post-date__djrOA">Jun 20, 2024</div>
      <span class="text-label">Product</span>
    </a>
    <a href="/news/expanding-access" class="Card_card">
      <h3 class="Card_headline__reaoT">Expanding access to Claude</h3>
      <p class="detail-m">Announcements</p>
      <p class="detail-m">May 14, 2024</p>
    </a>
    <a href="https://www.anthropic.com/news/policy-update">
      <h2>Updates to our policy</h2>
    </a>
    <a href="/news/empty-card"><img src="/card.png"></a>
  </section>
</body></html>"#;

    fn fetched_at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_rules_compile() {
        let source = AnthropicNewsSource::new().unwrap();
        assert!(source.rules().validate().is_ok());
        assert_eq!(source.identity().as_str(), "anthropic_news");
    }

    #[test]
    fn test_extracts_cards() {
        let source = AnthropicNewsSource::new().unwrap();
        let extraction = source.extract(LISTING, fetched_at()).unwrap();

        // The newsroom link is the listing itself, the image-only card has no title
        assert_eq!(extraction.candidates, 4);
        assert_eq!(extraction.articles.len(), 3);
        assert_eq!(extraction.skipped.len(), 1);

        let first = &extraction.articles[0];
        assert_eq!(first.title, "Introducing Claude 3.5 Sonnet");
        assert_eq!(first.link, "https://www.anthropic.com/news/claude-3-5-sonnet");
        assert_eq!(
            first.published_at,
            Utc.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).unwrap()
        );
        assert!(first.categories.contains("Product"));

        let second = &extraction.articles[1];
        assert_eq!(
            second.published_at,
            Utc.with_ymd_and_hms(2024, 5, 14, 0, 0, 0).unwrap()
        );
        assert!(second.categories.contains("Announcements"));
        assert!(!second.date_inferred);
    }

    #[test]
    fn test_undated_card_gets_inferred_date_and_default_category() {
        let source = AnthropicNewsSource::new().unwrap();
        let extraction = source.extract(LISTING, fetched_at()).unwrap();

        let policy = &extraction.articles[2];
        assert_eq!(policy.link, "https://www.anthropic.com/news/policy-update");
        assert!(policy.date_inferred);
        assert_eq!(policy.published_at, fetched_at());
        assert_eq!(policy.categories.iter().collect::<Vec<_>>(), vec!["News"]);
    }

    #[test]
    fn test_time_element_beats_date_text() {
        let html = r#"<html><body>
  <a href="/news/model-card">
    <h3>Model card update</h3>
    <p class="detail-m">Jan 5, 2023</p>
    <time datetime="2024-03-04T00:00:00Z">Mar 4, 2024</time>
  </a>
</body></html>"#;
        let source = AnthropicNewsSource::new().unwrap();
        let extraction = source.extract(html, fetched_at()).unwrap();

        assert_eq!(extraction.articles.len(), 1);
        assert_eq!(
            extraction.articles[0].published_at,
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
        );
    }
}
