use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::FeedIdentity;
use crate::errors::{FeederError, FeederResult};
use crate::storage::feed_state::FeedState;
use crate::storage::traits::FeedStore;

/// Feed documents stored as `feed_<identity>.xml` in one directory
#[derive(Debug, Clone)]
pub struct FileFeedStore {
    feeds_dir: PathBuf,
}

impl FileFeedStore {
    pub fn new<P: AsRef<Path>>(feeds_dir: P) -> Self {
        Self {
            feeds_dir: feeds_dir.as_ref().to_path_buf(),
        }
    }
}

impl FeedStore for FileFeedStore {
    fn path_for(&self, identity: &FeedIdentity) -> PathBuf {
        self.feeds_dir.join(identity.file_name())
    }

    fn load(&self, identity: &FeedIdentity) -> FeederResult<Option<FeedState>> {
        let path = self.path_for(identity);

        match fs::read(&path) {
            Ok(bytes) => FeedState::from_bytes(&path, &bytes).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FeederError::FeedState {
                path: path.display().to_string(),
                cause: e.to_string(),
            }),
        }
    }

    /// Write through a temporary file in the same directory, then rename over
    /// the target so readers never see a partial document
    fn save(&self, identity: &FeedIdentity, document: &str) -> FeederResult<PathBuf> {
        fs::create_dir_all(&self.feeds_dir)?;
        let path = self.path_for(identity);

        let mut temp = NamedTempFile::new_in(&self.feeds_dir)?;
        temp.write_all(document.as_bytes())?;
        temp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))?;
        }

        temp.persist(&path).map_err(|e| e.error)?;
        debug!(path = %path.display(), bytes = document.len(), "Feed document replaced");

        Ok(path)
    }
}
