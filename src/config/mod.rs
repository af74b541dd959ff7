use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{FeederError, FeederResult};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RETENTION: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub feeds_dir: PathBuf,
    pub user_agent: String,
    pub timeout: Duration,
    pub retention: usize,
    pub prefer_latest: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds_dir: PathBuf::from("feeds"),
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retention: DEFAULT_RETENTION,
            prefer_latest: false,
        }
    }
}

fn default_user_agent() -> String {
    format!("scrapefeed/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> FeederResult<Self> {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, defaults filling the gaps
    pub fn from_lookup<F>(lookup: F) -> FeederResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let feeds_dir = lookup("SCRAPEFEED_FEEDS_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.feeds_dir);

        let user_agent = lookup("SCRAPEFEED_USER_AGENT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.user_agent);

        let timeout = match lookup("SCRAPEFEED_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = parse_number::<u64>("SCRAPEFEED_TIMEOUT_SECS", &raw)?;
                if secs == 0 {
                    return Err(FeederError::Config(
                        "SCRAPEFEED_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        let retention = match lookup("SCRAPEFEED_RETENTION") {
            Some(raw) => parse_number::<usize>("SCRAPEFEED_RETENTION", &raw)?,
            None => defaults.retention,
        };

        let prefer_latest = match lookup("SCRAPEFEED_PREFER_LATEST") {
            Some(raw) => parse_flag("SCRAPEFEED_PREFER_LATEST", &raw)?,
            None => defaults.prefer_latest,
        };

        Ok(Self {
            feeds_dir,
            user_agent,
            timeout,
            retention,
            prefer_latest,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> FeederResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| FeederError::Config(format!("{} must be a number, got {:?}", key, raw)))
}

fn parse_flag(key: &str, raw: &str) -> FeederResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(FeederError::Config(format!(
            "{} must be a boolean, got {:?}",
            key, raw
        ))),
    }
}
