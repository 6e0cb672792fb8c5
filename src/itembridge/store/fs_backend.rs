use super::{guess_type, FileStore, FOLDER_TYPE};
use crate::error::{BridgeError, Result};
use crate::model::RelativePath;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Creates the root if needed and resolves symlinks in it, so paths
    /// coming back from directory listings share the root's prefix.
    pub fn open_canonical(root: PathBuf) -> Result<Self> {
        ensure_dir(&root)?;
        let root = fs::canonicalize(&root).map_err(BridgeError::Io)?;
        Ok(Self { root })
    }

    pub fn ensure_root(&self) -> Result<()> {
        ensure_dir(&self.root)
    }

    fn path_of(&self, path: &RelativePath) -> PathBuf {
        let mut full = self.root.clone();
        full.extend(path.segments());
        full
    }

    fn metadata(&self, path: &RelativePath) -> Result<fs::Metadata> {
        fs::metadata(self.path_of(path)).map_err(|e| not_found_or_io(e, path))
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(BridgeError::Io)?;
    }
    Ok(())
}

/// Moves a regular file without ever replacing `to`. If the source cannot be
/// unlinked after linking, the new link is removed again.
fn move_file_no_replace(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::hard_link(from, to)?;
    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}

fn not_found_or_io(err: std::io::Error, path: &RelativePath) -> BridgeError {
    if err.kind() == ErrorKind::NotFound {
        BridgeError::NoSuchItem(path.to_string())
    } else {
        BridgeError::Io(err)
    }
}

impl FileStore for FsFileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn absolute_path(&self, path: &RelativePath) -> PathBuf {
        self.path_of(path)
    }

    fn exists(&self, path: &RelativePath) -> Result<bool> {
        // symlink_metadata so that a dangling link still occupies its name.
        match fs::symlink_metadata(self.path_of(path)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    fn is_directory(&self, path: &RelativePath) -> Result<bool> {
        Ok(self.metadata(path)?.is_dir())
    }

    fn is_symlink(&self, path: &RelativePath) -> Result<bool> {
        let meta = fs::symlink_metadata(self.path_of(path)).map_err(|e| not_found_or_io(e, path))?;
        Ok(meta.file_type().is_symlink())
    }

    fn list_children(&self, path: &RelativePath) -> Result<Vec<String>> {
        let dir = self.path_of(path);
        let entries = fs::read_dir(&dir).map_err(|e| not_found_or_io(e, path))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(BridgeError::Io)?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    debug!(target: "itembridge::store", name = ?raw, "skipping non UTF-8 entry");
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Regular files move by link-then-unlink, which fails atomically when the
    /// destination exists. Directories and links fall back to `fs::rename`
    /// after the existence check; a directory created at the destination in
    /// between can still be replaced if it is empty.
    fn move_item(&self, from: &RelativePath, to: &RelativePath) -> Result<()> {
        let collision = || BridgeError::FilenameCollision {
            name: to.last().unwrap_or_default().to_string(),
            parent: to.parent().to_string(),
        };
        if self.exists(to)? {
            return Err(collision());
        }

        let source = self.path_of(from);
        let target = self.path_of(to);
        let meta = fs::symlink_metadata(&source).map_err(|e| not_found_or_io(e, from))?;
        if meta.is_file() {
            match move_file_no_replace(&source, &target) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(collision()),
                Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found_or_io(e, from)),
                Err(e) => {
                    debug!(target: "itembridge::store", error = %e, "hard link unavailable, renaming");
                }
            }
        }
        fs::rename(&source, &target).map_err(|e| not_found_or_io(e, from))
    }

    fn remove_item(&self, path: &RelativePath) -> Result<()> {
        if path.is_empty() {
            return Err(BridgeError::Store("refusing to remove the managed root".into()));
        }
        let full = self.path_of(path);
        let meta = fs::symlink_metadata(&full).map_err(|e| not_found_or_io(e, path))?;
        if meta.is_dir() {
            fs::remove_dir_all(&full).map_err(BridgeError::Io)
        } else {
            fs::remove_file(&full).map_err(BridgeError::Io)
        }
    }

    fn created(&self, path: &RelativePath) -> Result<DateTime<Utc>> {
        let time = self.metadata(path)?.created().map_err(BridgeError::Io)?;
        Ok(time.into())
    }

    fn modified(&self, path: &RelativePath) -> Result<DateTime<Utc>> {
        let time = self.metadata(path)?.modified().map_err(BridgeError::Io)?;
        Ok(time.into())
    }

    fn accessed(&self, path: &RelativePath) -> Result<DateTime<Utc>> {
        let time = self.metadata(path)?.accessed().map_err(BridgeError::Io)?;
        Ok(time.into())
    }

    fn size(&self, path: &RelativePath) -> Result<u64> {
        let meta = self.metadata(path)?;
        if meta.is_dir() {
            return Err(BridgeError::Store(format!("{} is a directory", path)));
        }
        Ok(meta.len())
    }

    fn type_identifier(&self, path: &RelativePath) -> Result<String> {
        if self.metadata(path)?.is_dir() {
            return Ok(FOLDER_TYPE.to_string());
        }
        Ok(guess_type(path.last().unwrap_or_default()))
    }
}
