use crate::domain::{FeedDefinition, FeedIdentity};
use crate::errors::FeederResult;
use crate::sources::extractor::ExtractionRules;
use crate::sources::traits::FeedSource;

pub const IDENTITY: &str = "anthropic_engineering";
const URL: &str = "https://www.anthropic.com/engineering";

pub struct AnthropicEngineeringSource {
    definition: FeedDefinition,
    rules: ExtractionRules,
}

impl AnthropicEngineeringSource {
    pub fn new() -> FeederResult<Self> {
        let definition = FeedDefinition::new(
            FeedIdentity::new(IDENTITY)?,
            "Anthropic Engineering Blog",
            URL,
            "Latest engineering articles and insights from Anthropic's engineering team",
        )
        .with_self_url("https://anthropic.com/engineering/feed_anthropic_engineering.xml")
        .with_image("https://www.anthropic.com/images/icons/apple-touch-icon.png");

        // Bare links come first so that full <article> cards replace them
        let rules = ExtractionRules {
            base_url: "https://www.anthropic.com",
            containers: vec![r#"a[href*="/engineering/"]"#, "article"],
            skip_links: vec!["/engineering"],
            link: vec![
                "a.ArticleList_cardLink__VWIzl",
                "a[href*='/engineering/']",
                "a[class*='cardLink']",
                "a[class*='link']",
            ],
            title: vec![
                "h2",
                "h3",
                "h1",
                "h4[class*='headline']",
                "h3[class*='title']",
                "h2[class*='title']",
            ],
            // `time` first: its datetime attribute beats any display text the card carries
            date: vec![
                "time",
                "div.ArticleList_date__2VTRg",
                "div[class*='date']",
                "p[class*='date']",
                ".detail-m.agate",
            ],
            summary: vec![
                "p.ArticleList_summary__G96cV",
                "p[class*='summary']",
                "p[class*='description']",
            ],
            category: Vec::new(),
            default_category: Some("Engineering"),
        };

        Ok(Self { definition, rules })
    }
}

impl FeedSource for AnthropicEngineeringSource {
    fn definition(&self) -> &FeedDefinition {
        &self.definition
    }

    fn rules(&self) -> &ExtractionRules {
        &self.rules
    }
}
