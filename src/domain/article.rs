use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub date_inferred: bool,
    pub summary: Option<String>,
    pub categories: BTreeSet<String>,
}

impl Article {
    pub fn new(title: String, link: String, published_at: DateTime<Utc>) -> Self {
        Self {
            title,
            link,
            published_at,
            date_inferred: false,
            summary: None,
            categories: BTreeSet::new(),
        }
    }

    /// Article whose date could not be read from the source
    pub fn with_inferred_date(title: String, link: String, fetched_at: DateTime<Utc>) -> Self {
        Self {
            date_inferred: true,
            ..Self::new(title, link, fetched_at)
        }
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        if !category.trim().is_empty() {
            self.categories.insert(category);
        }
        self
    }

    pub fn with_categories<I, S>(self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        categories
            .into_iter()
            .fold(self, |article, category| article.with_category(category))
    }

    /// Carry a previously recorded date over a fresh copy
    pub fn with_published(mut self, published_at: DateTime<Utc>, inferred: bool) -> Self {
        self.published_at = published_at;
        self.date_inferred = inferred;
        self
    }

    /// Text used for the feed item description
    pub fn description(&self) -> &str {
        self.summary.as_deref().unwrap_or(&self.title)
    }
}

/// Required article field that a candidate element did not provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingField {
    Title,
    Link,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingField::Title => "title",
            MissingField::Link => "link",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
