//! File-based document persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::document::NetplanDocument;

use super::{DocumentStore, LoadError, SaveError};

/// Extension of every document file.
const EXTENSION: &str = "yaml";

/// Suffix appended to the canonical path for the previous generation.
const BACKUP_SUFFIX: &str = ".bkp";

/// Suffix appended to the canonical path while writing.
const TEMP_SUFFIX: &str = ".tmp";

/// Stores one YAML document per interface in a directory.
///
/// The document for `eth0` with prefix `90-vz-` lives at
/// `<dir>/90-vz-eth0.yaml`.
///
/// # Atomic Writes
///
/// Saving follows a write-then-rename sequence:
/// 1. Write `{path}.tmp`
/// 2. Hard-link an existing `{path}` to `{path}.bkp`, replacing any older
///    backup (copied where hard links are unsupported)
/// 3. Rename `{path}.tmp` over `{path}`
///
/// `{path}` always holds a complete document, old or new. If any step
/// fails, `{path}.tmp` is removed.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    dir: PathBuf,
    prefix: String,
}

impl FileDocumentStore {
    /// Creates a store rooted at `dir` naming files `<prefix><interface>.yaml`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Returns the canonical document path for `interface`.
    #[must_use]
    pub fn path_for(&self, interface: &str) -> PathBuf {
        self.dir.join(format!("{}{interface}.{EXTENSION}", self.prefix))
    }

    /// Returns the backup path for `interface`.
    #[must_use]
    pub fn backup_path_for(&self, interface: &str) -> PathBuf {
        with_suffix(&self.path_for(interface), BACKUP_SUFFIX)
    }

    /// Performs the blocking save operation.
    ///
    /// Separated out so it can be wrapped in `spawn_blocking`.
    fn save_blocking(path: &Path, content: &str) -> Result<(), SaveError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| SaveError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let temp_path = with_suffix(path, TEMP_SUFFIX);
        std::fs::write(&temp_path, content).map_err(|source| SaveError::Write {
            path: temp_path.clone(),
            source,
        })?;

        let result = Self::backup(path).and_then(|()| rename(&temp_path, path));
        if result.is_err() {
            if let Err(e) = std::fs::remove_file(&temp_path) {
                tracing::warn!("Failed to remove {}: {e}", temp_path.display());
            }
        }
        result
    }

    /// Keeps the current document at `{path}.bkp`, leaving `path` in place.
    fn backup(path: &Path) -> Result<(), SaveError> {
        if !path.exists() {
            return Ok(());
        }

        let backup_path = with_suffix(path, BACKUP_SUFFIX);
        let backup_error = |source: std::io::Error| SaveError::Backup {
            from: path.to_path_buf(),
            to: backup_path.clone(),
            source,
        };

        // hard_link refuses to replace an existing file
        if let Err(e) = std::fs::remove_file(&backup_path) {
            if e.kind() != ErrorKind::NotFound {
                return Err(backup_error(e));
            }
        }

        if let Err(e) = std::fs::hard_link(path, &backup_path) {
            tracing::debug!("Hard link to {} failed ({e}), copying", backup_path.display());
            std::fs::copy(path, &backup_path).map_err(backup_error)?;
        }

        tracing::debug!("Previous document kept at {}", backup_path.display());
        Ok(())
    }
}

impl DocumentStore for FileDocumentStore {
    fn load(&self, interface: &str) -> Result<NetplanDocument, LoadError> {
        let path = self.path_for(interface);

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} does not exist, using a skeleton", path.display());
                return Ok(NetplanDocument::skeleton(interface));
            }
            Err(source) => return Err(LoadError::Read { path, source }),
        };

        NetplanDocument::from_yaml(interface, &content)
            .map_err(|source| LoadError::Parse { path, source })
    }

    async fn save(&self, document: &NetplanDocument) -> Result<(), SaveError> {
        let path = self.path_for(document.interface());
        let content = document.to_yaml().map_err(SaveError::Serialize)?;

        tracing::debug!("Writing {}", path.display());

        // Use spawn_blocking to avoid blocking the async runtime
        tokio::task::spawn_blocking(move || Self::save_blocking(&path, &content))
            .await
            .map_err(|e| SaveError::Task(e.to_string()))?
    }
}

/// Appends `suffix` to the full file name (`a.yaml` -> `a.yaml.bkp`).
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn rename(from: &Path, to: &Path) -> Result<(), SaveError> {
    std::fs::rename(from, to).map_err(|source| SaveError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}
