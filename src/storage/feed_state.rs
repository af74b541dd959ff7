use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use feed_rs::parser;
use tracing::warn;

use crate::domain::Article;
use crate::errors::{FeederError, FeederResult};

/// Entries of a previously written feed document
#[derive(Debug, Clone)]
pub struct FeedState {
    pub path: PathBuf,
    pub entries: Vec<Article>,
}

impl FeedState {
    pub fn new(path: PathBuf, entries: Vec<Article>) -> Self {
        Self { path, entries }
    }

    /// Parse a stored document; anything unreadable aborts the merge
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> FeederResult<Self> {
        let parsed = parser::parse(bytes).map_err(|e| FeederError::FeedState {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(parsed.entries.len());

        for entry in parsed.entries {
            let link = match entry.links.first().map(|l| l.href.trim().to_string()) {
                Some(link) if !link.is_empty() => link,
                _ => {
                    warn!(path = %path.display(), id = %entry.id, "Stored entry has no link, dropping it");
                    continue;
                }
            };

            if !seen.insert(link.clone()) {
                continue;
            }

            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| link.clone());

            // Undated entries sort as oldest and go first when trimming
            let published_at: DateTime<Utc> = entry
                .published
                .or(entry.updated)
                .unwrap_or_default();

            // The assembler writes the title when there is no summary
            let summary = entry
                .summary
                .map(|s| s.content.trim().to_string())
                .filter(|s| s != &title);

            let article = Article::new(title, link, published_at)
                .with_summary(summary)
                .with_categories(entry.categories.into_iter().map(|c| c.term));

            entries.push(article);
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }
}
