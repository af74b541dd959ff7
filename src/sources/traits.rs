use chrono::{DateTime, Utc};

use crate::domain::{FeedDefinition, FeedIdentity};
use crate::errors::FeederResult;
use crate::sources::extractor::{Extraction, ExtractionRules, RuleExtractor};

pub trait FeedSource: Send + Sync {
    /// Static channel metadata for this source
    fn definition(&self) -> &FeedDefinition;

    /// Selectors describing the listing page
    fn rules(&self) -> &ExtractionRules;

    fn identity(&self) -> &FeedIdentity {
        &self.definition().identity
    }

    /// Turn a listing page into candidate articles
    fn extract(&self, html: &str, fetched_at: DateTime<Utc>) -> FeederResult<Extraction> {
        RuleExtractor::new(self.rules()).extract(html, fetched_at)
    }
}
