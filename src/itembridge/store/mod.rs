//! # Storage Layer
//!
//! Two independent stores sit underneath the bridge, and nothing ties them
//! together transactionally:
//!
//! 1. **Truth**: the folder tree ([`FileStore`]). An item exists if and only if
//!    the file store says so.
//! 2. **Side data**: the tag store ([`TagStore`]), a key → bytes map keyed by
//!    relative path and shared with other processes.
//!
//! The tag store is treated as a cache that may be stale. When the two
//! disagree the file store wins and a missing or unreadable tag reads as
//! "no tag".
//!
//! ## Implementations
//!
//! - [`fs_backend::FsFileStore`]: the managed folder on disk.
//! - [`mem_backend::MemFileStore`]: an in-memory tree for tests.
//! - [`json_tags::JsonTagStore`]: `tags.json` in a shared directory.
//! - [`mem_tags::MemTagStore`]: a map for tests.
//!
//! Both traits take `&self` everywhere and are `Send + Sync`, so a single
//! bridge can serve requests from several threads. Implementations use
//! interior locking.
//!
//! ## Shared Directory Layout
//!
//! ```text
//! shared/
//! ├── tags.json          # { "<relative path>": "<base64 tag>" }
//! ├── tags.lock          # advisory lock held while rewriting tags.json
//! └── .tags-{uuid}.tmp   # transient, renamed over tags.json
//! ```

use crate::error::Result;
use crate::model::RelativePath;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub mod fs_backend;
pub mod json_tags;
pub mod mem_backend;
pub mod mem_tags;

/// Type identifier reported for every directory.
pub const FOLDER_TYPE: &str = "public.folder";

/// Raw access to the managed folder tree, addressed by relative path.
pub trait FileStore: Send + Sync {
    /// Absolute location of the managed root.
    fn root(&self) -> &Path;

    /// Location of an entry. For `MemFileStore` this is a virtual path.
    fn absolute_path(&self, path: &RelativePath) -> PathBuf;

    /// `Ok(false)` when the entry is missing; `Err` only on real I/O failure.
    fn exists(&self, path: &RelativePath) -> Result<bool>;

    /// Follows symlinks: a link to a directory is a directory.
    fn is_directory(&self, path: &RelativePath) -> Result<bool>;

    /// Whether the entry itself is a symbolic link. Tree walks treat links as
    /// leaves. Stores without links keep the default.
    fn is_symlink(&self, _path: &RelativePath) -> Result<bool> {
        Ok(false)
    }

    /// Names of the direct children of a directory, sorted.
    fn list_children(&self, path: &RelativePath) -> Result<Vec<String>>;

    /// Moves an entry. Must refuse to replace an existing destination.
    fn move_item(&self, from: &RelativePath, to: &RelativePath) -> Result<()>;

    /// Removes an entry, recursively for directories.
    fn remove_item(&self, path: &RelativePath) -> Result<()>;

    // --- Attributes ---

    fn created(&self, path: &RelativePath) -> Result<DateTime<Utc>>;

    fn modified(&self, path: &RelativePath) -> Result<DateTime<Utc>>;

    fn accessed(&self, path: &RelativePath) -> Result<DateTime<Utc>>;

    /// Byte size of a file. Directories have no size and return `Err`.
    fn size(&self, path: &RelativePath) -> Result<u64>;

    fn type_identifier(&self, path: &RelativePath) -> Result<String>;
}

/// A key → blob map that other processes may read and write concurrently.
pub trait TagStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores a blob. `None` and an empty blob both remove the key.
    fn set(&self, key: &str, value: Option<&[u8]>) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// MIME essence guessed from a file name's extension.
pub(crate) fn guess_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
