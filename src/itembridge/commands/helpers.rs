use crate::error::{BridgeError, Result};
use crate::model::{check_segment, Item, RelativePath};
use crate::store::{FileStore, TagStore};
use tracing::warn;

/// Fails with `NoSuchItem` unless the file store has the item. The root
/// always exists.
pub fn ensure_exists<F: FileStore>(files: &F, item: &Item) -> Result<()> {
    match item {
        Item::Root => Ok(()),
        Item::Child(path) => {
            if files.exists(path)? {
                Ok(())
            } else {
                Err(BridgeError::NoSuchItem(path.to_key()))
            }
        }
    }
}

/// `path` followed by every entry below it, parents before children.
///
/// Symbolic links are listed but never descended into, so a link to an
/// ancestor or to a tree outside the root ends the walk there.
pub fn walk<F: FileStore>(files: &F, path: &RelativePath) -> Result<Vec<RelativePath>> {
    let mut found = Vec::new();
    let mut pending = vec![path.clone()];

    while let Some(current) = pending.pop() {
        if !files.is_symlink(&current)? && files.is_directory(&current)? {
            let children = files.list_children(&current)?;
            for name in children.iter().rev() {
                if check_segment(name).is_ok() {
                    pending.push(current.child(name));
                }
            }
        }
        found.push(current);
    }
    Ok(found)
}

/// Copies the tag at `from` to `to`, then clears `from`. Returns whether
/// there was a tag to move.
///
/// With no tag at `from`, any leftover tag at `to` is cleared instead so the
/// destination does not inherit a stale tag.
pub fn migrate_tag<T: TagStore>(tags: &T, from: &RelativePath, to: &RelativePath) -> Result<bool> {
    match tags.get(&from.to_key())? {
        Some(tag) => {
            tags.set(&to.to_key(), Some(&tag))?;
            tags.remove(&from.to_key())?;
            Ok(true)
        }
        None => {
            if let Err(e) = tags.remove(&to.to_key()) {
                warn!(target: "itembridge::tags", key = %to, error = %e, "could not clear stale tag");
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::from_identifier;
    use crate::store::mem_backend::MemFileStore;
    use crate::store::mem_tags::MemTagStore;

    fn rel(id: &str) -> RelativePath {
        from_identifier(id).unwrap().relative_path()
    }

    #[test]
    fn walk_lists_parents_first() {
        let files = MemFileStore::new();
        files.add_file("a/b/c.jpg", b"").unwrap();
        files.add_file("a/d.jpg", b"").unwrap();
        let keys: Vec<String> = walk(&files, &rel("a"))
            .unwrap()
            .iter()
            .map(RelativePath::to_key)
            .collect();
        assert_eq!(keys, vec!["a", "a/b", "a/b/c.jpg", "a/d.jpg"]);
    }

    #[test]
    fn walk_of_a_file_is_the_file() {
        let files = MemFileStore::new();
        files.add_file("x.png", b"").unwrap();
        assert_eq!(walk(&files, &rel("x.png")).unwrap(), vec![rel("x.png")]);
    }

    #[test]
    fn migrate_moves_and_clears() {
        let tags = MemTagStore::new();
        tags.set("a", Some(b"blue")).unwrap();
        assert!(migrate_tag(&tags, &rel("a"), &rel("b")).unwrap());
        assert_eq!(tags.keys(), vec!["b"]);
        assert_eq!(tags.get("b").unwrap(), Some(b"blue".to_vec()));
    }

    #[test]
    fn migrate_without_tag_clears_stale_destination() {
        let tags = MemTagStore::new();
        tags.set("b", Some(b"stale")).unwrap();
        assert!(!migrate_tag(&tags, &rel("a"), &rel("b")).unwrap());
        assert!(tags.keys().is_empty());
    }

    #[test]
    fn ensure_exists_reports_missing_items() {
        let files = MemFileStore::new();
        assert!(ensure_exists(&files, &Item::Root).is_ok());
        let err = ensure_exists(&files, &from_identifier("ghost").unwrap()).unwrap_err();
        assert!(matches!(err, BridgeError::NoSuchItem(id) if id == "ghost"));
    }
}
