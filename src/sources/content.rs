use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, info};

use crate::errors::{FeederError, FeederResult};

/// Blocking access to remote listing pages
#[cfg_attr(test, mockall::automock)]
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> FeederResult<String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> FeederResult<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()?,
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> FeederResult<String> {
        let unavailable = |cause: String| FeederError::SourceUnavailable {
            origin: url.to_string(),
            cause,
        };

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status)));
        }

        response.text().map_err(|e| unavailable(e.to_string()))
    }
}

/// Where the HTML for a run comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOrigin {
    LocalFile(PathBuf),
    Remote(String),
}

impl fmt::Display for ContentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentOrigin::LocalFile(path) => write!(f, "{}", path.display()),
            ContentOrigin::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Ordered list of origins; the first one that yields content wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPlan {
    origins: Vec<ContentOrigin>,
}

impl ContentPlan {
    /// An explicit local file replaces the network entirely
    pub fn for_feed(url: &str, local_file: Option<&Path>) -> Self {
        let origins = match local_file {
            Some(path) => vec![ContentOrigin::LocalFile(path.to_path_buf())],
            None => vec![ContentOrigin::Remote(url.to_string())],
        };
        Self { origins }
    }

    pub fn then(mut self, origin: ContentOrigin) -> Self {
        self.origins.push(origin);
        self
    }

    pub fn origins(&self) -> &[ContentOrigin] {
        &self.origins
    }
}

pub struct ContentLoader<'a, F: PageFetcher> {
    fetcher: &'a F,
}

impl<'a, F: PageFetcher> ContentLoader<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Load raw HTML, returning it together with the origin that produced it
    pub fn load(&self, plan: &ContentPlan) -> FeederResult<(ContentOrigin, String)> {
        let mut last_error = FeederError::SourceUnavailable {
            origin: "none".to_string(),
            cause: "no content origin configured".to_string(),
        };

        for origin in plan.origins() {
            match self.load_origin(origin) {
                Ok(html) => {
                    info!(%origin, bytes = html.len(), "Loaded source content");
                    return Ok((origin.clone(), html));
                }
                Err(e) => {
                    debug!(%origin, error = %e, "Content origin failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn load_origin(&self, origin: &ContentOrigin) -> FeederResult<String> {
        match origin {
            ContentOrigin::LocalFile(path) => {
                fs::read_to_string(path).map_err(|e| FeederError::SourceUnavailable {
                    origin: path.display().to_string(),
                    cause: e.to_string(),
                })
            }
            ContentOrigin::Remote(url) => self.fetcher.fetch(url),
        }
    }
}
