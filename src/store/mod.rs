//! Persistence of per-interface netplan documents.
//!
//! This module provides the [`DocumentStore`] abstraction and its
//! filesystem implementation [`FileDocumentStore`].

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileDocumentStore;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::document::{DocumentError, NetplanDocument};

/// Errors reading an existing document.
///
/// A missing file is not an error: stores return a skeleton instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document exists but could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        /// Path of the document.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The document exists but is not a valid netplan document.
    #[error("Failed to parse '{}': {source}", path.display())]
    Parse {
        /// Path of the document.
        path: PathBuf,
        /// Underlying document error.
        #[source]
        source: DocumentError,
    },
}

/// Errors persisting a document.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The document could not be rendered.
    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] DocumentError),

    /// Writing the temporary file failed.
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Keeping the previous document as a backup failed.
    #[error("Failed to back up '{}' to '{}': {source}", from.display(), to.display())]
    Backup {
        /// Current document.
        from: PathBuf,
        /// Backup path.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Moving a file into place failed.
    #[error("Failed to rename '{}' to '{}': {source}", from.display(), to.display())]
    Rename {
        /// Source path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The blocking save task did not complete.
    #[error("Save task failed: {0}")]
    Task(String),
}

/// Abstraction for loading and saving interface documents.
///
/// Implementations should:
/// - Return a skeleton document when none exists yet
/// - Fail loudly on a document that exists but cannot be read
/// - Replace the stored document atomically, keeping one backup
///
/// # Testing
///
/// Use [`mock::MockDocumentStore`] in tests to avoid filesystem dependencies.
pub trait DocumentStore: Send + Sync {
    /// Loads the document for `interface`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if an existing document is unreadable or invalid.
    fn load(&self, interface: &str) -> Result<NetplanDocument, LoadError>;

    /// Persists `document`, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError`] if the document cannot be written.
    fn save(
        &self,
        document: &NetplanDocument,
    ) -> impl std::future::Future<Output = Result<(), SaveError>> + Send;
}

/// Mock document store for testing.
///
/// Serves a fixed document (or a load failure) and records saves.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::RwLock;

    /// A mock implementation of [`DocumentStore`] for testing.
    #[derive(Debug)]
    pub struct MockDocumentStore {
        document: Option<NetplanDocument>,
        fail_load: bool,
        fail_save: bool,
        saved: RwLock<Vec<NetplanDocument>>,
    }

    impl MockDocumentStore {
        /// Creates a mock that serves `document` on load.
        #[must_use]
        pub fn with_document(document: NetplanDocument) -> Self {
            Self {
                document: Some(document),
                fail_load: false,
                fail_save: false,
                saved: RwLock::new(Vec::new()),
            }
        }

        /// Creates a mock with no stored document (loads yield a skeleton).
        #[must_use]
        pub fn empty() -> Self {
            Self {
                document: None,
                fail_load: false,
                fail_save: false,
                saved: RwLock::new(Vec::new()),
            }
        }

        /// Creates a mock whose loads fail as if the file were corrupt.
        #[must_use]
        pub fn corrupted() -> Self {
            Self {
                fail_load: true,
                ..Self::empty()
            }
        }

        /// Makes every save fail.
        #[must_use]
        pub fn failing_save(mut self) -> Self {
            self.fail_save = true;
            self
        }

        /// Returns every document saved so far, oldest first.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned (only in test code).
        #[must_use]
        pub fn saved(&self) -> Vec<NetplanDocument> {
            self.saved.read().unwrap().clone()
        }
    }

    impl DocumentStore for MockDocumentStore {
        fn load(&self, interface: &str) -> Result<NetplanDocument, LoadError> {
            if self.fail_load {
                return Err(LoadError::Read {
                    path: PathBuf::from(format!("mock/{interface}.yaml")),
                    source: io::Error::new(io::ErrorKind::InvalidData, "corrupted"),
                });
            }
            Ok(self
                .document
                .clone()
                .unwrap_or_else(|| NetplanDocument::skeleton(interface)))
        }

        async fn save(&self, document: &NetplanDocument) -> Result<(), SaveError> {
            if self.fail_save {
                return Err(SaveError::Write {
                    path: PathBuf::from("mock"),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            self.saved.write().unwrap().push(document.clone());
            Ok(())
        }
    }
}
