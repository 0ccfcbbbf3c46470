//! Storage choice persistence and path resolution
//!
//! The user's choice (private app area vs shared documents) is stored as a
//! small JSON file inside the *private* app directory, regardless of which
//! location was chosen, so it can be read back before any storage is
//! resolved on the next start. The resolved path itself is recomputed every
//! run and published through [`DATA_PATH_ENV`] for the downstream
//! application's own configuration loading.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::platform::Platform;

/// Environment variable carrying the resolved storage path to the
/// downstream application. The core's only outbound contract toward it.
pub const DATA_PATH_ENV: &str = "LIFEMON_DATA_PATH";

/// File name of the persisted storage choice, inside the private data dir.
const CONFIG_FILE: &str = "storage_config.json";

/// Folder created under the public documents directory for a public choice.
const PUBLIC_DIR_NAME: &str = "LifeMonitor";

/// Where the user asked their data to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageChoice {
    Private,
    Public,
}

impl FromStr for StorageChoice {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "private" => Ok(StorageChoice::Private),
            "public" => Ok(StorageChoice::Public),
            other => Err(CoreError::InvalidChoice(other.to_string())),
        }
    }
}

impl fmt::Display for StorageChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageChoice::Private => f.write_str("private"),
            StorageChoice::Public => f.write_str("public"),
        }
    }
}

/// Persisted form of [`StorageChoice`].
#[derive(Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    pub storage_mode: StorageChoice,
}

/// Maps a [`StorageChoice`] to a concrete, existing directory.
pub struct StorageLocator {
    platform: Arc<dyn Platform>,
}

impl StorageLocator {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    fn config_path(&self) -> PathBuf {
        self.platform.private_data_dir().join(CONFIG_FILE)
    }

    /// Read back the persisted choice, if any. An unreadable or malformed
    /// file is treated the same as a missing one (the app re-enters SETUP).
    pub fn load_config(&self) -> Option<StorageChoice> {
        let path = self.config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config unreadable");
                return None;
            }
        };
        match serde_json::from_str::<StorageConfig>(&raw) {
            Ok(config) => Some(config.storage_mode),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config malformed");
                None
            }
        }
    }

    /// Persist the choice. Best-effort at the call sites: a failed save is
    /// logged and the in-memory choice stays in effect for this run.
    pub fn save_config(&self, choice: StorageChoice) -> Result<()> {
        let private = self.platform.private_data_dir();
        fs::create_dir_all(&private)?;
        let json = serde_json::to_string(&StorageConfig {
            storage_mode: choice,
        })?;
        fs::write(self.config_path(), json)?;
        Ok(())
    }

    /// Resolve the choice to an absolute directory, creating it if absent
    /// (idempotent), and publish it through [`DATA_PATH_ENV`].
    ///
    /// A public choice on a platform without a documents directory falls
    /// back to the private area.
    pub fn resolve(&self, choice: StorageChoice) -> Result<PathBuf> {
        let path = match choice {
            StorageChoice::Private => self.private_path(),
            StorageChoice::Public => match self.platform.shared_documents_dir() {
                Some(docs) => docs.join(PUBLIC_DIR_NAME),
                None => {
                    tracing::warn!("no public documents dir; falling back to private storage");
                    self.private_path()
                }
            },
        };
        fs::create_dir_all(&path)?;
        std::env::set_var(DATA_PATH_ENV, &path);
        tracing::info!(path = %path.display(), %choice, "storage path resolved");
        Ok(path)
    }

    /// The private-area data directory, independent of any choice.
    pub fn private_path(&self) -> PathBuf {
        self.platform.private_data_dir().join("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::StaticPlatform;
    use tempfile::TempDir;

    fn locator(tmp: &TempDir) -> StorageLocator {
        let platform = StaticPlatform::new(tmp.path().join("private"))
            .with_shared(tmp.path().join("Documents"));
        StorageLocator::new(Arc::new(platform))
    }

    #[test]
    fn resolve_private_is_rooted_in_private_area() {
        let tmp = TempDir::new().unwrap();
        let loc = locator(&tmp);
        let path = loc.resolve(StorageChoice::Private).unwrap();
        assert!(path.starts_with(tmp.path().join("private")));
        assert!(path.is_dir());
    }

    #[test]
    fn resolve_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let loc = locator(&tmp);
        let first = loc.resolve(StorageChoice::Public).unwrap();
        let second = loc.resolve(StorageChoice::Public).unwrap();
        assert_eq!(first, second);
        assert!(second.is_dir());
    }

    #[test]
    fn resolve_public_lands_in_documents() {
        let tmp = TempDir::new().unwrap();
        let loc = locator(&tmp);
        let path = loc.resolve(StorageChoice::Public).unwrap();
        assert_eq!(path, tmp.path().join("Documents").join("LifeMonitor"));
    }

    #[test]
    fn resolve_public_without_documents_falls_back_to_private() {
        let tmp = TempDir::new().unwrap();
        let loc = StorageLocator::new(Arc::new(StaticPlatform::new(
            tmp.path().join("private"),
        )));
        let path = loc.resolve(StorageChoice::Public).unwrap();
        assert!(path.starts_with(tmp.path().join("private")));
    }

    #[test]
    fn config_round_trips() {
        let tmp = TempDir::new().unwrap();
        let loc = locator(&tmp);
        assert_eq!(loc.load_config(), None);
        loc.save_config(StorageChoice::Public).unwrap();
        assert_eq!(loc.load_config(), Some(StorageChoice::Public));
    }

    #[test]
    fn malformed_config_reads_as_absent() {
        let tmp = TempDir::new().unwrap();
        let loc = locator(&tmp);
        fs::create_dir_all(tmp.path().join("private")).unwrap();
        fs::write(
            tmp.path().join("private").join("storage_config.json"),
            "not json",
        )
        .unwrap();
        assert_eq!(loc.load_config(), None);
    }

    #[test]
    fn choice_parses_from_query_values() {
        assert_eq!("private".parse::<StorageChoice>().unwrap(), StorageChoice::Private);
        assert_eq!("public".parse::<StorageChoice>().unwrap(), StorageChoice::Public);
        assert!("documents".parse::<StorageChoice>().is_err());
    }
}
