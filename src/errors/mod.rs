use thiserror::Error;

use crate::domain::MissingField;

#[derive(Error, Debug)]
pub enum FeederError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Feed identity errors
    #[error("Unknown feed: {0}")]
    UnknownFeed(String),

    #[error("Invalid feed identity: {0}")]
    InvalidIdentity(String),

    // Source errors
    #[error("Source unavailable ({origin}): {cause}")]
    SourceUnavailable { origin: String, cause: String },

    #[error("No articles found for feed {feed}")]
    NoArticlesFound { feed: String },

    // Extraction errors
    #[error("Article is missing its {field} ({context})")]
    ArticleFieldMissing { field: MissingField, context: String },

    #[error("Unparseable date: {0:?}")]
    DateUnparseable(String),

    #[error("Invalid selector {selector:?}: {cause}")]
    Selector { selector: String, cause: String },

    // Output errors
    #[error("Feed assembly failed: {0}")]
    AssemblyError(String),

    #[error("Previous feed at {path} is unreadable: {cause}")]
    FeedState { path: String, cause: String },

    #[error("Feed serialization failed: {0}")]
    Serialize(#[from] rss::Error),

    // Network errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeederError {
    /// Stable failure kind used when reporting a run to the invoker
    pub fn kind(&self) -> &'static str {
        match self {
            FeederError::Config(_) => "Config",
            FeederError::UnknownFeed(_) => "UnknownFeed",
            FeederError::InvalidIdentity(_) => "InvalidIdentity",
            FeederError::SourceUnavailable { .. } => "SourceUnavailable",
            FeederError::NoArticlesFound { .. } => "NoArticlesFound",
            FeederError::ArticleFieldMissing { .. } => "ArticleFieldMissing",
            FeederError::DateUnparseable(_) => "DateUnparseable",
            FeederError::Selector { .. } => "Selector",
            FeederError::AssemblyError(_) => "AssemblyError",
            FeederError::FeedState { .. } => "FeedState",
            FeederError::Serialize(_) => "Serialize",
            FeederError::Http(_) => "Http",
            FeederError::Io(_) => "Io",
        }
    }

    /// Warnings leave the previous document in place without being a hard failure
    pub fn is_warning(&self) -> bool {
        matches!(self, FeederError::NoArticlesFound { .. })
    }
}

pub type FeederResult<T> = Result<T, FeederError>;
