use crate::domain::{FeedDefinition, FeedIdentity};
use crate::errors::FeederResult;
use crate::sources::extractor::ExtractionRules;
use crate::sources::traits::FeedSource;

pub const IDENTITY: &str = "blogsurgeai";
const URL: &str = "https://www.surgehq.ai/blog";

/// The listing carries no dates; entries keep the date they were first seen
pub struct SurgeBlogSource {
    definition: FeedDefinition,
    rules: ExtractionRules,
}

impl SurgeBlogSource {
    pub fn new() -> FeederResult<Self> {
        let definition = FeedDefinition::new(
            FeedIdentity::new(IDENTITY)?,
            "Surge AI Blog",
            URL,
            "New methods, current trends & software infrastructure for NLP. Articles written by our senior engineering leads from Google, Facebook, Twitter, Harvard, MIT, and Y Combinator",
        )
        .with_self_url("https://raw.githubusercontent.com/olshansky/rss-feeds/main/feeds/feed_blogsurgeai.xml")
        .with_managing_editor("team@surgehq.ai (Surge AI)");

        let rules = ExtractionRules {
            base_url: "https://www.surgehq.ai",
            containers: vec!["div.research-v2-item"],
            skip_links: vec!["/blog"],
            link: vec!["a.research-v2-item-txt"],
            title: vec!["a.research-v2-item-txt"],
            ..ExtractionRules::default()
        };

        Ok(Self { definition, rules })
    }
}

impl FeedSource for SurgeBlogSource {
    fn definition(&self) -> &FeedDefinition {
        &self.definition
    }

    fn rules(&self) -> &ExtractionRules {
        &self.rules
    }
}
