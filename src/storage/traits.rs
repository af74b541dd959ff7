use std::path::PathBuf;

use crate::domain::FeedIdentity;
use crate::errors::FeederResult;
use crate::storage::feed_state::FeedState;

#[cfg_attr(test, mockall::automock)]
pub trait FeedStore: Send + Sync {
    fn path_for(&self, identity: &FeedIdentity) -> PathBuf;
    fn load(&self, identity: &FeedIdentity) -> FeederResult<Option<FeedState>>;
    fn save(&self, identity: &FeedIdentity, document: &str) -> FeederResult<PathBuf>;
}
