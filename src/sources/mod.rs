pub mod traits;
pub mod content;
pub mod dates;
pub mod extractor;
pub mod anthropic_news;
pub mod anthropic_engineering;
pub mod surge_blog;
pub mod registry;

pub use traits::FeedSource;
pub use content::{ContentLoader, ContentOrigin, ContentPlan, HttpFetcher, PageFetcher};
pub use dates::DateNormalizer;
pub use extractor::{Extraction, ExtractionRules, RuleExtractor};
pub use registry::SourceRegistry;
