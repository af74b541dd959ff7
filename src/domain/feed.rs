use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{FeederError, FeederResult};

fn identity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_]+$").expect("identity pattern is valid"))
}

/// Short name that maps one source to one output document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedIdentity(String);

impl FeedIdentity {
    pub fn new(name: &str) -> FeederResult<Self> {
        if identity_pattern().is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(FeederError::InvalidIdentity(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Output file name inside the feeds directory
    pub fn file_name(&self) -> String {
        format!("feed_{}.xml", self.0)
    }
}

impl fmt::Display for FeedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FeedIdentity {
    type Err = FeederError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Static channel metadata for one feed identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDefinition {
    pub identity: FeedIdentity,
    pub title: String,
    /// Listing page; fetched for content and used as the channel link
    pub url: String,
    pub description: String,
    pub language: String,
    /// Public address of the generated document, published as `atom:link rel="self"`
    pub self_url: Option<String>,
    /// `managingEditor`, in the RSS `email (name)` form
    pub managing_editor: Option<String>,
    pub image_url: Option<String>,
}

impl FeedDefinition {
    pub fn new(
        identity: FeedIdentity,
        title: &str,
        url: &str,
        description: &str,
    ) -> Self {
        Self {
            identity,
            title: title.to_string(),
            url: url.to_string(),
            description: description.to_string(),
            language: "en".to_string(),
            self_url: None,
            managing_editor: None,
            image_url: None,
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_self_url(mut self, url: &str) -> Self {
        self.self_url = Some(url.to_string());
        self
    }

    pub fn with_managing_editor(mut self, editor: &str) -> Self {
        self.managing_editor = Some(editor.to_string());
        self
    }

    pub fn with_image(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }
}
