use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{FeedIdentity, RunReport};
use crate::errors::{FeederError, FeederResult};
use crate::services::assembly_service::FeedAssembler;
use crate::services::merge_service::{MergeOptions, MergeService};
use crate::sources::{ContentLoader, ContentPlan, PageFetcher, SourceRegistry};
use crate::storage::FeedStore;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub feed: String,
    /// Read this HTML file instead of fetching the listing page
    pub local_file: Option<PathBuf>,
    /// Republish the stored feed when the page yields no candidates
    pub allow_empty: bool,
}

impl GenerateRequest {
    pub fn new(feed: &str) -> Self {
        Self {
            feed: feed.to_string(),
            local_file: None,
            allow_empty: false,
        }
    }
}

pub struct FeedGenerator<F: PageFetcher, S: FeedStore> {
    registry: SourceRegistry,
    fetcher: F,
    store: S,
    options: MergeOptions,
}

impl<F: PageFetcher, S: FeedStore> FeedGenerator<F, S> {
    pub fn new(registry: SourceRegistry, fetcher: F, store: S, options: MergeOptions) -> Self {
        Self {
            registry,
            fetcher,
            store,
            options,
        }
    }

    pub fn generate(&self, request: &GenerateRequest) -> FeederResult<RunReport> {
        self.generate_at(request, Utc::now())
    }

    /// Run one feed end to end. Nothing is written unless every step before
    /// the write succeeded.
    pub fn generate_at(
        &self,
        request: &GenerateRequest,
        fetched_at: DateTime<Utc>,
    ) -> FeederResult<RunReport> {
        let source = self.registry.get(&request.feed)?;
        let definition = source.definition();
        let identity = source.identity();

        let prior = self.store.load(identity)?;

        let plan = ContentPlan::for_feed(&definition.url, request.local_file.as_deref());
        let (origin, html) = ContentLoader::new(&self.fetcher).load(&plan)?;

        let extraction = source.extract(&html, fetched_at)?;
        if extraction.is_empty() {
            match &prior {
                Some(state) if request.allow_empty => {
                    warn!(feed = %identity, path = %state.path.display(), "No candidates found, republishing stored entries");
                }
                _ => {
                    return Err(FeederError::NoArticlesFound {
                        feed: identity.to_string(),
                    })
                }
            }
        }

        let candidates = extraction.candidates;
        let inferred_dates = extraction.inferred_dates();
        let extracted = extraction.articles.len();
        let skipped = extraction.skipped;

        let merged = MergeService::new(self.options).merge(extraction.articles, prior.as_ref());
        if merged.articles.is_empty() && prior.is_none() {
            return Err(FeederError::AssemblyError(format!(
                "no entries to publish for {}",
                identity
            )));
        }

        let document = FeedAssembler::new(definition).render(&merged.articles)?;
        let path = self.store.save(identity, &document)?;

        info!(
            feed = %identity,
            path = %path.display(),
            added = merged.added,
            retained = merged.retained,
            total = merged.articles.len(),
            "Feed written"
        );

        Ok(RunReport {
            feed: identity.clone(),
            path,
            origin: origin.to_string(),
            fetched_at,
            candidates,
            extracted,
            skipped,
            inferred_dates,
            added: merged.added,
            already_seen: merged.already_seen,
            retained: merged.retained,
            evicted: merged.evicted,
            total: merged.articles.len(),
        })
    }

    /// Run every registered feed; one failure does not stop the others.
    /// With `pages_dir`, each feed reads `<pages_dir>/<identity>.html` instead
    /// of fetching.
    pub fn generate_all(
        &self,
        allow_empty: bool,
        pages_dir: Option<&Path>,
    ) -> Vec<(FeedIdentity, FeederResult<RunReport>)> {
        self.registry
            .iter()
            .map(|source| {
                let identity = source.identity().clone();
                let request = GenerateRequest {
                    allow_empty,
                    local_file: pages_dir.map(|dir| dir.join(format!("{}.html", identity))),
                    ..GenerateRequest::new(identity.as_str())
                };
                let result = self.generate(&request);
                if let Err(e) = &result {
                    warn!(feed = %identity, error = %e, "Feed generation failed");
                }
                (identity, result)
            })
            .collect()
    }
}
