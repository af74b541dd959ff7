use std::collections::HashMap;

use tracing::debug;

use crate::config::DEFAULT_RETENTION;
use crate::domain::Article;
use crate::storage::FeedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Old-only entries kept when they drop off the source page
    pub retention: usize,
    pub prefer_latest: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            prefer_latest: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub articles: Vec<Article>,
    pub added: usize,
    pub already_seen: usize,
    pub retained: usize,
    pub evicted: usize,
}

pub struct MergeService {
    options: MergeOptions,
}

impl MergeService {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    /// Combine freshly extracted articles with the previously published entries.
    ///
    /// Every fresh link is kept. Links already published keep their stored copy
    /// unless `prefer_latest` is set; even then a stored date survives an inferred
    /// fresh one. Entries that only exist in the prior document are kept up to
    /// the retention size, newest first.
    pub fn merge(&self, candidates: Vec<Article>, prior: Option<&FeedState>) -> MergeOutcome {
        let mut stored: HashMap<&str, &Article> = prior
            .map(|state| {
                state
                    .entries
                    .iter()
                    .map(|a| (a.link.as_str(), a))
                    .collect()
            })
            .unwrap_or_default();

        let mut outcome = MergeOutcome::default();
        let mut articles = Vec::with_capacity(candidates.len());

        for fresh in candidates {
            match stored.remove(fresh.link.as_str()) {
                None => {
                    outcome.added += 1;
                    articles.push(fresh);
                }
                Some(known) => {
                    outcome.already_seen += 1;
                    articles.push(self.reconcile(known, fresh));
                }
            }
        }

        let mut old_only: Vec<Article> = prior
            .map(|state| {
                state
                    .entries
                    .iter()
                    .filter(|a| stored.contains_key(a.link.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_newest_first(&mut old_only);

        if old_only.len() > self.options.retention {
            outcome.evicted = old_only.len() - self.options.retention;
            for dropped in &old_only[self.options.retention..] {
                debug!(link = %dropped.link, "Evicting entry outside retention window");
            }
            old_only.truncate(self.options.retention);
        }
        outcome.retained = old_only.len();

        articles.extend(old_only);
        sort_newest_first(&mut articles);
        outcome.articles = articles;

        outcome
    }

    fn reconcile(&self, known: &Article, fresh: Article) -> Article {
        if !self.options.prefer_latest {
            return known.clone();
        }

        if fresh.date_inferred {
            fresh.with_published(known.published_at, known.date_inferred)
        } else {
            fresh
        }
    }
}

fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.link.cmp(&b.link))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn article(link: &str, d: u32) -> Article {
        Article::new(format!("Title {}", link), format!("https://example.com/{}", link), day(d))
    }

    fn state(entries: Vec<Article>) -> FeedState {
        FeedState::new(PathBuf::from("feed_demo.xml"), entries)
    }

    fn links(outcome: &MergeOutcome) -> Vec<&str> {
        outcome.articles.iter().map(|a| a.link.as_str()).collect()
    }

    #[test]
    fn test_first_run_sorts_newest_first() {
        let service = MergeService::new(MergeOptions::default());
        let outcome = service.merge(vec![article("b", 1), article("a", 2)], None);

        assert_eq!(links(&outcome), vec!["https://example.com/a", "https://example.com/b"]);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.already_seen, 0);
        assert_eq!(outcome.retained, 0);
    }

    #[test]
    fn test_ties_ordered_by_link() {
        let service = MergeService::new(MergeOptions::default());
        let outcome = service.merge(vec![article("z", 1), article("m", 1), article("c", 1)], None);

        assert_eq!(
            links(&outcome),
            vec![
                "https://example.com/c",
                "https://example.com/m",
                "https://example.com/z"
            ]
        );
    }

    #[test]
    fn test_new_article_added_to_prior() {
        let prior = state(vec![article("a", 2), article("b", 1)]);
        let service = MergeService::new(MergeOptions::default());

        let outcome = service.merge(vec![article("c", 3), article("a", 2)], Some(&prior));

        assert_eq!(
            links(&outcome),
            vec![
                "https://example.com/c",
                "https://example.com/a",
                "https://example.com/b"
            ]
        );
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.already_seen, 1);
        assert_eq!(outcome.retained, 1);
        assert_eq!(outcome.evicted, 0);
    }

    #[test]
    fn test_known_article_keeps_stored_copy() {
        let stored = article("a", 1).with_summary(Some("Stored summary".to_string()));
        let prior = state(vec![stored.clone()]);
        let service = MergeService::new(MergeOptions::default());

        let mut fresh = article("a", 5);
        fresh.title = "Edited title".to_string();
        let outcome = service.merge(vec![fresh], Some(&prior));

        assert_eq!(outcome.articles, vec![stored]);
    }

    #[test]
    fn test_prefer_latest_takes_fresh_copy() {
        let prior = state(vec![article("a", 1)]);
        let service = MergeService::new(MergeOptions {
            prefer_latest: true,
            ..MergeOptions::default()
        });

        let mut fresh = article("a", 3);
        fresh.title = "Edited title".to_string();
        let outcome = service.merge(vec![fresh], Some(&prior));

        assert_eq!(outcome.articles[0].title, "Edited title");
        assert_eq!(outcome.articles[0].published_at, day(3));
    }

    #[test]
    fn test_prefer_latest_keeps_first_seen_date() {
        let prior = state(vec![article("a", 1)]);
        let service = MergeService::new(MergeOptions {
            prefer_latest: true,
            ..MergeOptions::default()
        });

        let fresh = Article::with_inferred_date(
            "Edited title".to_string(),
            "https://example.com/a".to_string(),
            day(20),
        );
        let outcome = service.merge(vec![fresh], Some(&prior));

        let merged = &outcome.articles[0];
        assert_eq!(merged.title, "Edited title");
        assert_eq!(merged.published_at, day(1));
        assert!(!merged.date_inferred);
    }

    #[test]
    fn test_retention_evicts_oldest() {
        let prior = state(vec![article("a", 4), article("b", 3), article("c", 2), article("d", 1)]);
        let service = MergeService::new(MergeOptions {
            retention: 2,
            prefer_latest: false,
        });

        let outcome = service.merge(vec![article("e", 5)], Some(&prior));

        assert_eq!(
            links(&outcome),
            vec![
                "https://example.com/e",
                "https://example.com/a",
                "https://example.com/b"
            ]
        );
        assert_eq!(outcome.retained, 2);
        assert_eq!(outcome.evicted, 2);
    }

    #[test]
    fn test_retention_never_drops_fresh_articles() {
        let prior = state(vec![article("a", 1)]);
        let service = MergeService::new(MergeOptions {
            retention: 0,
            prefer_latest: false,
        });

        let fresh: Vec<Article> = (2..6).map(|d| article(&format!("n{}", d), d)).collect();
        let outcome = service.merge(fresh, Some(&prior));

        assert_eq!(outcome.articles.len(), 4);
        assert_eq!(outcome.evicted, 1);
    }

    #[test]
    fn test_merged_links_cover_fresh_and_retained() {
        let prior = state(vec![article("a", 3), article("b", 2), article("c", 1)]);
        let fresh = vec![article("b", 2), article("d", 4), article("e", 5)];
        let service = MergeService::new(MergeOptions {
            retention: 1,
            prefer_latest: false,
        });

        let outcome = service.merge(fresh.clone(), Some(&prior));
        let merged: HashSet<&str> = outcome.articles.iter().map(|a| a.link.as_str()).collect();

        assert_eq!(merged.len(), outcome.articles.len(), "no duplicate links");
        for a in &fresh {
            assert!(merged.contains(a.link.as_str()));
        }
        // Newest old-only entry survives the window
        assert!(merged.contains("https://example.com/a"));
        assert!(!merged.contains("https://example.com/c"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let service = MergeService::new(MergeOptions::default());
        let fresh = vec![article("a", 2), article("b", 1)];

        let first = service.merge(fresh.clone(), None);
        let second = service.merge(fresh, Some(&state(first.articles.clone())));

        assert_eq!(first.articles, second.articles);
        assert_eq!(second.added, 0);
        assert_eq!(second.already_seen, 2);
    }
}
