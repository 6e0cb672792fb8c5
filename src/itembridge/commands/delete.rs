use super::helpers::walk;
use crate::error::{BridgeError, Result};
use crate::model::Item;
use crate::resolver::identifier;
use crate::store::{FileStore, TagStore};
use tracing::{info, warn};

/// Deletes an item, recursively for directories.
///
/// Tags for the item and everything below it are cleared first. Clearing is
/// best-effort: a leftover tag is cosmetic, a failed removal is not, so only
/// the file-store error is returned.
pub fn run<F: FileStore, T: TagStore>(files: &F, tags: &T, item: &Item) -> Result<()> {
    let path = match item {
        Item::Root => {
            return Err(BridgeError::Unsupported {
                operation: "delete",
                identifier: identifier(item),
            });
        }
        Item::Child(path) => path,
    };
    if !files.exists(path)? {
        return Err(BridgeError::NoSuchItem(path.to_key()));
    }

    let doomed = walk(files, path).unwrap_or_else(|e| {
        warn!(target: "itembridge::delete", item = %path, error = %e, "could not list descendants, clearing own tag only");
        vec![path.clone()]
    });
    for entry in &doomed {
        if let Err(e) = tags.remove(&entry.to_key()) {
            warn!(target: "itembridge::delete", key = %entry, error = %e, "could not clear tag");
        }
    }

    files.remove_item(path)?;
    info!(target: "itembridge::delete", item = %path, entries = doomed.len(), "deleted item");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{helpers::ensure_exists, tag};
    use crate::resolver::from_identifier;
    use crate::store::mem_backend::MemFileStore;
    use crate::store::mem_tags::MemTagStore;

    fn item(id: &str) -> Item {
        from_identifier(id).unwrap()
    }

    #[test]
    fn deletes_file_and_tag() {
        let files = MemFileStore::new();
        let tags = MemTagStore::new();
        files.add_file("a/b.txt", b"").unwrap();
        tag::set(&files, &tags, &item("a/b.txt"), Some(b"red")).unwrap();

        run(&files, &tags, &item("a/b.txt")).unwrap();

        assert_eq!(files.entries(), vec!["a"]);
        assert!(tags.keys().is_empty());
        assert!(matches!(
            ensure_exists(&files, &item("a/b.txt")),
            Err(BridgeError::NoSuchItem(_))
        ));
    }

    #[test]
    fn deletes_directory_recursively() {
        let files = MemFileStore::new();
        let tags = MemTagStore::new();
        files.add_file("album/one.jpg", b"").unwrap();
        files.add_file("album/inner/two.jpg", b"").unwrap();
        files.add_file("keep.jpg", b"").unwrap();
        tag::set(&files, &tags, &item("album"), Some(b"dir")).unwrap();
        tag::set(&files, &tags, &item("album/inner/two.jpg"), Some(b"two")).unwrap();
        tag::set(&files, &tags, &item("keep.jpg"), Some(b"keep")).unwrap();

        run(&files, &tags, &item("album")).unwrap();

        assert_eq!(files.entries(), vec!["keep.jpg"]);
        assert_eq!(tags.keys(), vec!["keep.jpg"]);
    }

    #[test]
    fn missing_item_touches_nothing() {
        let files = MemFileStore::new();
        let tags = MemTagStore::new();
        tags.set("ghost.jpg", Some(b"orphan")).unwrap();

        let err = run(&files, &tags, &item("ghost.jpg")).unwrap_err();

        assert!(matches!(err, BridgeError::NoSuchItem(_)));
        assert_eq!(tags.keys(), vec!["ghost.jpg"]);
    }

    #[test]
    fn root_cannot_be_deleted() {
        let files = MemFileStore::new();
        let tags = MemTagStore::new();
        let err = run(&files, &tags, &Item::Root).unwrap_err();
        assert!(matches!(err, BridgeError::Unsupported { operation: "delete", .. }));
    }

    #[test]
    fn tag_failure_does_not_block_removal() {
        let files = MemFileStore::new();
        let tags = MemTagStore::new();
        files.add_file("a.jpg", b"").unwrap();
        tag::set(&files, &tags, &item("a.jpg"), Some(b"red")).unwrap();
        tags.set_simulate_write_error(true);

        run(&files, &tags, &item("a.jpg")).unwrap();

        assert!(files.entries().is_empty());
    }

    #[test]
    fn removal_failure_is_surfaced() {
        let files = MemFileStore::new();
        let tags = MemTagStore::new();
        files.add_file("a.jpg", b"").unwrap();
        files.set_simulate_write_error(true);

        let err = run(&files, &tags, &item("a.jpg")).unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::StoreError);
        assert_eq!(files.entries(), vec!["a.jpg"]);
    }
}
