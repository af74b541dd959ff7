pub mod feed;
pub mod article;
pub mod report;

pub use feed::{FeedDefinition, FeedIdentity};
pub use article::{Article, MissingField};
pub use report::{RunReport, RunStatus, SkippedCandidate};
