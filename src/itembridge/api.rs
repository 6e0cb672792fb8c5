//! # API Facade
//!
//! The host protocol surface. Every method takes the host's opaque identifier
//! string, resolves it, and dispatches to the command layer.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Resolves** identifiers into items (no store access)
//! - **Dispatches** to the matching command function
//! - **Returns structured types**, never formatted text
//!
//! Business logic stays in `commands/*.rs`.
//!
//! ## Generic Over Both Stores
//!
//! `BridgeApi<F: FileStore, T: TagStore>`:
//! - Production: `BridgeApi<FsFileStore, JsonTagStore>`
//! - Testing: `BridgeApi<MemFileStore, MemTagStore>`
//!
//! All methods take `&self`, so one instance can be shared between threads.
//! Calls for different items do not interfere with each other; calls for the
//! same item are not ordered by the bridge.

use crate::commands;
use crate::error::Result;
use crate::model::{Capabilities, ItemView};
use crate::resolver::{self, Resolver};
use crate::store::{FileStore, TagStore};
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT_NAME: &str = "Scans";

pub struct BridgeApi<F: FileStore, T: TagStore> {
    files: F,
    tags: T,
    resolver: Resolver,
    root_name: String,
}

impl<F: FileStore, T: TagStore> BridgeApi<F, T> {
    pub fn new(files: F, tags: T) -> Self {
        let resolver = Resolver::new(files.root());
        Self {
            files,
            tags,
            resolver,
            root_name: DEFAULT_ROOT_NAME.to_string(),
        }
    }

    pub fn with_root_name(mut self, name: &str) -> Self {
        self.root_name = name.to_string();
        self
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn tags(&self) -> &T {
        &self.tags
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Identifier for an absolute path below the managed root. The root may be
    /// spelled through a symlink; the rest of the path is taken as written.
    pub fn identifier_for_path(&self, path: &Path) -> Result<String> {
        let item = self.resolver.from_disk_path(path)?;
        Ok(resolver::identifier(&item))
    }

    /// Absolute location an identifier refers to; the entry need not exist.
    pub fn path_for_identifier(&self, identifier: &str) -> Result<PathBuf> {
        let item = resolver::from_identifier(identifier)?;
        Ok(self.files.absolute_path(&item.relative_path()))
    }

    pub fn item(&self, identifier: &str) -> Result<ItemView> {
        let item = resolver::from_identifier(identifier)?;
        commands::lookup::run(&self.files, &self.tags, &item, &self.root_name)
    }

    pub fn enumerate(&self, identifier: &str) -> Result<Vec<ItemView>> {
        let item = resolver::from_identifier(identifier)?;
        commands::enumerate::run(&self.files, &self.tags, &item, &self.root_name)
    }

    pub fn parent_identifier(&self, identifier: &str) -> Result<String> {
        let item = resolver::from_identifier(identifier)?;
        Ok(resolver::parent_identifier(&item))
    }

    pub fn capabilities(&self, identifier: &str) -> Result<Capabilities> {
        let item = resolver::from_identifier(identifier)?;
        Ok(commands::capabilities::run(&item))
    }

    /// Renames and returns the view of the item under its new identifier.
    pub fn rename(&self, identifier: &str, new_name: &str) -> Result<ItemView> {
        let item = resolver::from_identifier(identifier)?;
        let renamed = commands::rename::run(&self.files, &self.tags, &item, new_name)?;
        commands::lookup::run(&self.files, &self.tags, &renamed, &self.root_name)
    }

    pub fn delete(&self, identifier: &str) -> Result<()> {
        let item = resolver::from_identifier(identifier)?;
        commands::delete::run(&self.files, &self.tags, &item)
    }

    pub fn tag(&self, identifier: &str) -> Result<Option<Vec<u8>>> {
        let item = resolver::from_identifier(identifier)?;
        Ok(commands::tag::get(&self.tags, &item))
    }

    pub fn set_tag(&self, identifier: &str, value: Option<&[u8]>) -> Result<()> {
        let item = resolver::from_identifier(identifier)?;
        commands::tag::set(&self.files, &self.tags, &item, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BridgeError, ErrorKind};
    use crate::model::Capability;
    use crate::resolver::ROOT_IDENTIFIER;
    use crate::store::mem_backend::MemFileStore;
    use crate::store::mem_tags::MemTagStore;
    use std::sync::Arc;

    fn api() -> BridgeApi<MemFileStore, MemTagStore> {
        let files = MemFileStore::new();
        files.add_file("a/b.txt", b"bee").unwrap();
        BridgeApi::new(files, MemTagStore::new())
    }

    #[test]
    fn paths_and_identifiers() {
        let api = api();
        let path = api.path_for_identifier("a/b.txt").unwrap();
        assert_eq!(path, Path::new("/memory/a/b.txt"));
        assert_eq!(api.identifier_for_path(&path).unwrap(), "a/b.txt");
        assert_eq!(
            api.identifier_for_path(Path::new("/memory")).unwrap(),
            ROOT_IDENTIFIER
        );
        let err = api.identifier_for_path(Path::new("/elsewhere/a")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutsideRoot);
    }

    #[test]
    fn rename_flow() {
        let api = api();
        api.set_tag("a/b.txt", Some(b"red")).unwrap();

        let view = api.rename("a/b.txt", "c.txt").unwrap();

        assert_eq!(view.identifier, "a/c.txt");
        assert_eq!(view.tag, Some(b"red".to_vec()));
        assert_eq!(api.tag("a/b.txt").unwrap(), None);
        assert_eq!(api.item("a/b.txt").unwrap_err().kind(), ErrorKind::NoSuchItem);
    }

    #[test]
    fn delete_flow() {
        let api = api();
        api.delete("a").unwrap();
        assert!(matches!(api.item("a/b.txt"), Err(BridgeError::NoSuchItem(_))));
        assert!(api.enumerate(ROOT_IDENTIFIER).unwrap().is_empty());
    }

    #[test]
    fn capability_and_parent_queries() {
        let api = api();
        assert!(!api.capabilities(ROOT_IDENTIFIER).unwrap().contains(Capability::Rename));
        assert!(api.capabilities("a/b.txt").unwrap().contains(Capability::Rename));
        assert_eq!(api.parent_identifier("a/b.txt").unwrap(), "a");
        assert_eq!(api.parent_identifier("a").unwrap(), ROOT_IDENTIFIER);
    }

    #[test]
    fn custom_root_name() {
        let api = api().with_root_name("Backlit");
        assert_eq!(api.item(ROOT_IDENTIFIER).unwrap().display_name, "Backlit");
    }

    #[test]
    fn different_items_from_many_threads() {
        let files = MemFileStore::new();
        for i in 0..8 {
            files.add_file(&format!("scan-{}.jpg", i), b"jpg").unwrap();
        }
        let api = Arc::new(BridgeApi::new(files, MemTagStore::new()));

        std::thread::scope(|s| {
            for i in 0..8 {
                let api = Arc::clone(&api);
                s.spawn(move || {
                    let id = format!("scan-{}.jpg", i);
                    api.set_tag(&id, Some(format!("tag-{}", i).as_bytes())).unwrap();
                    api.rename(&id, &format!("renamed-{}.jpg", i)).unwrap();
                });
            }
        });

        let listed = api.enumerate(ROOT_IDENTIFIER).unwrap();
        assert_eq!(listed.len(), 8);
        for i in 0..8 {
            let view = api.item(&format!("renamed-{}.jpg", i)).unwrap();
            assert_eq!(view.tag, Some(format!("tag-{}", i).into_bytes()));
        }
    }
}

#[cfg(test)]
mod fs_tests {
    use crate::error::ErrorKind;
    use crate::resolver::ROOT_IDENTIFIER;
    use crate::test_utils::TestEnv;
    use std::fs;

    #[test]
    fn identifiers_round_trip_on_disk() {
        let env = TestEnv::new();
        let path = env.write("2024/03/scan 01.jpg", "jpg");
        let id = env.api.identifier_for_path(&path).unwrap();
        assert_eq!(id, "2024/03/scan 01.jpg");
        assert_eq!(env.api.path_for_identifier(&id).unwrap(), path);
        assert_eq!(env.api.identifier_for_path(&env.root).unwrap(), ROOT_IDENTIFIER);
    }

    #[test]
    fn rename_collision_leaves_disk_unchanged() {
        let env = TestEnv::new();
        env.write("a/b.txt", "bee");
        env.write("a/c.txt", "sea");

        let err = env.api.rename("a/b.txt", "c.txt").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FilenameCollision);
        assert_eq!(fs::read_to_string(env.root.join("a/b.txt")).unwrap(), "bee");
        assert_eq!(fs::read_to_string(env.root.join("a/c.txt")).unwrap(), "sea");
    }

    #[test]
    fn rename_moves_file_and_tag() {
        let env = TestEnv::new();
        env.write("a/b.txt", "bee");
        env.api.set_tag("a/b.txt", Some(b"red")).unwrap();

        let view = env.api.rename("a/b.txt", "c.txt").unwrap();

        assert_eq!(view.identifier, "a/c.txt");
        assert!(!env.exists("a/b.txt"));
        assert!(env.exists("a/c.txt"));
        assert_eq!(env.api.tag("a/c.txt").unwrap(), Some(b"red".to_vec()));
        assert_eq!(env.api.tag("a/b.txt").unwrap(), None);
        assert_eq!(env.api.item("a/b.txt").unwrap_err().kind(), ErrorKind::NoSuchItem);
    }

    #[test]
    fn delete_directory_clears_tags() {
        let env = TestEnv::new();
        env.write("album/one.jpg", "1");
        env.write("album/inner/two.jpg", "2");
        env.api.set_tag("album", Some(b"dir")).unwrap();
        env.api.set_tag("album/inner/two.jpg", Some(b"two")).unwrap();

        env.api.delete("album").unwrap();

        assert!(!env.exists("album"));
        assert_eq!(env.api.tag("album").unwrap(), None);
        assert_eq!(env.api.tag("album/inner/two.jpg").unwrap(), None);
        assert!(env.api.enumerate(ROOT_IDENTIFIER).unwrap().is_empty());
    }

    #[test]
    fn empty_tag_is_absent() {
        let env = TestEnv::new();
        env.write("x.png", "png");
        env.api.set_tag("x.png", Some(b"")).unwrap();
        assert_eq!(env.api.tag("x.png").unwrap(), None);
        assert!(!env.shared.join("tags.json").exists());
    }

    #[test]
    fn file_view_on_disk() {
        let env = TestEnv::new();
        env.write("scan.pdf", "%PDF-1.4");
        let view = env.api.item("scan.pdf").unwrap();
        assert_eq!(view.metadata.size, Some(8));
        assert_eq!(view.metadata.type_identifier.as_deref(), Some("application/pdf"));
        assert!(view.metadata.modified_at.is_some());
        assert!(!view.is_directory);
    }
}
