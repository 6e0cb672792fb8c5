//! # Identifier Resolver
//!
//! Converts between the opaque identifiers handed to the host and locations
//! inside the managed folder.
//!
//! Identifiers are *derived* from paths, never allocated, so there is no
//! identifier table that could drift away from the folder tree:
//!
//! - The root is always [`ROOT_IDENTIFIER`].
//! - Any other item is its relative path, segments joined with `/`
//!   (`2024/scan-01.jpg`).
//!
//! No segment may be empty, `.`, `..`, or contain `/`, so a derived identifier
//! never equals `"/"` and never starts with `/`. The mapping is a bijection.
//!
//! The price is that a rename changes the identifier: hosts observe a rename
//! as the old identifier disappearing and a new one appearing.
//!
//! Nothing here touches a store. Whether the item exists is checked lazily by
//! the command layer. Only [`Resolver::from_disk_path`] looks at the disk, to
//! recognise the root when a path spells it through a symlink.

use crate::error::{BridgeError, Result};
use crate::model::{check_segment, Item, RelativePath, SegmentFault, SEPARATOR};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Well-known identifier of the managed root. Hosts start enumeration here.
pub const ROOT_IDENTIFIER: &str = "/";

pub fn is_root_identifier(identifier: &str) -> bool {
    identifier == ROOT_IDENTIFIER
}

/// Parses an identifier. Never fails on an identifier produced by
/// [`identifier`].
pub fn from_identifier(identifier: &str) -> Result<Item> {
    if is_root_identifier(identifier) {
        return Ok(Item::Root);
    }
    if identifier.is_empty() {
        return Err(BridgeError::NoSuchItem(identifier.to_string()));
    }

    let mut segments = Vec::new();
    for segment in identifier.split(SEPARATOR) {
        match check_segment(segment) {
            Ok(()) => segments.push(segment.to_string()),
            Err(SegmentFault::Dot) => {
                return Err(BridgeError::OutsideRoot(PathBuf::from(identifier)));
            }
            Err(_) => return Err(BridgeError::NoSuchItem(identifier.to_string())),
        }
    }
    Ok(Item::from_relative(RelativePath::from_checked(segments)))
}

pub fn identifier(item: &Item) -> String {
    match item {
        Item::Root => ROOT_IDENTIFIER.to_string(),
        Item::Child(path) => path.to_key(),
    }
}

/// Identifier of the containing directory. The root is its own parent.
pub fn parent_identifier(item: &Item) -> String {
    identifier(&Item::from_relative(item.relative_path().parent()))
}

/// Anchors identifiers to a concrete root directory.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
}

impl Resolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps an absolute path to an item. The root folder itself maps to
    /// [`Item::Root`]; anything not below it is refused.
    pub fn from_path(&self, path: &Path) -> Result<Item> {
        let rest = path
            .strip_prefix(&self.root)
            .map_err(|_| BridgeError::OutsideRoot(path.to_path_buf()))?;

        let mut segments = Vec::new();
        for component in rest.components() {
            match component {
                Component::Normal(name) => {
                    let name = name
                        .to_str()
                        .ok_or_else(|| BridgeError::NoSuchItem(path.display().to_string()))?;
                    check_segment(name)
                        .map_err(|_| BridgeError::NoSuchItem(path.display().to_string()))?;
                    segments.push(name.to_string());
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(BridgeError::OutsideRoot(path.to_path_buf()));
                }
            }
        }

        let item = Item::from_relative(RelativePath::from_checked(segments));
        debug!(target: "itembridge::resolver", path = %path.display(), id = %identifier(&item), "resolved path");
        Ok(item)
    }

    /// Like [`Resolver::from_path`], but also accepts paths that reach the root
    /// through a different spelling, such as `/tmp/gallery` for a root of
    /// `/private/tmp/gallery`.
    ///
    /// Only the prefix that names the root is resolved. Everything below it is
    /// kept as written, so a link inside the managed folder keeps its own
    /// identifier instead of taking its target's. The path need not exist.
    pub fn from_disk_path(&self, path: &Path) -> Result<Item> {
        match self.from_path(path) {
            Err(BridgeError::OutsideRoot(_)) => {}
            resolved => return resolved,
        }

        let outside = || BridgeError::OutsideRoot(path.to_path_buf());
        let root = fs::canonicalize(&self.root).map_err(|_| outside())?;

        // Shortest ancestor first, so links below the root stay unresolved.
        let ancestors: Vec<&Path> = path.ancestors().collect();
        for ancestor in ancestors.into_iter().rev() {
            let Ok(resolved) = fs::canonicalize(ancestor) else {
                continue;
            };
            if resolved != root {
                continue;
            }
            let rest = path.strip_prefix(ancestor).map_err(|_| outside())?;
            debug!(target: "itembridge::resolver", path = %path.display(), root = %root.display(), "matched root through symlinked prefix");
            return Resolver::new(root.clone()).from_path(&root.join(rest));
        }
        Err(outside())
    }

    pub fn to_path(&self, item: &Item) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(item.segments());
        path
    }
}
