use super::helpers::ensure_exists;
use crate::error::Result;
use crate::model::Item;
use crate::store::{FileStore, TagStore};
use tracing::{debug, warn};

/// Reads the item's tag. An unreadable tag store reads as "no tag".
pub fn get<T: TagStore>(tags: &T, item: &Item) -> Option<Vec<u8>> {
    match tags.get(&item.tag_key()) {
        Ok(tag) => tag.filter(|bytes| !bytes.is_empty()),
        Err(e) => {
            warn!(target: "itembridge::tags", item = %item.relative_path(), error = %e, "tag unreadable, treating as absent");
            None
        }
    }
}

/// Writes or clears the item's tag. `None` and empty bytes both clear it.
pub fn set<F: FileStore, T: TagStore>(
    files: &F,
    tags: &T,
    item: &Item,
    value: Option<&[u8]>,
) -> Result<()> {
    ensure_exists(files, item)?;
    let value = value.filter(|bytes| !bytes.is_empty());
    tags.set(&item.tag_key(), value)?;
    debug!(target: "itembridge::tags", item = %item.relative_path(), cleared = value.is_none(), "tag written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::resolver::from_identifier;
    use crate::store::mem_backend::MemFileStore;
    use crate::store::mem_tags::MemTagStore;

    fn setup() -> (MemFileStore, MemTagStore, Item) {
        let files = MemFileStore::new();
        files.add_file("a/b.txt", b"hello").unwrap();
        (files, MemTagStore::new(), from_identifier("a/b.txt").unwrap())
    }

    #[test]
    fn set_then_get() {
        let (files, tags, item) = setup();
        set(&files, &tags, &item, Some(b"green")).unwrap();
        assert_eq!(get(&tags, &item), Some(b"green".to_vec()));
        assert_eq!(tags.keys(), vec!["a/b.txt"]);
    }

    #[test]
    fn empty_tag_reads_as_absent() {
        let (files, tags, item) = setup();
        set(&files, &tags, &item, Some(b"green")).unwrap();
        set(&files, &tags, &item, Some(b"")).unwrap();
        assert_eq!(get(&tags, &item), None);
        assert!(tags.keys().is_empty());
    }

    #[test]
    fn none_clears() {
        let (files, tags, item) = setup();
        set(&files, &tags, &item, Some(b"green")).unwrap();
        set(&files, &tags, &item, None).unwrap();
        assert_eq!(get(&tags, &item), None);
    }

    #[test]
    fn missing_item_cannot_be_tagged() {
        let (files, tags, _) = setup();
        let ghost = from_identifier("a/ghost.txt").unwrap();
        let err = set(&files, &tags, &ghost, Some(b"x")).unwrap_err();
        assert!(matches!(err, BridgeError::NoSuchItem(_)));
        assert!(tags.keys().is_empty());
    }

    #[test]
    fn read_failure_degrades_to_absent() {
        let (files, tags, item) = setup();
        set(&files, &tags, &item, Some(b"green")).unwrap();
        tags.set_simulate_read_error(true);
        assert_eq!(get(&tags, &item), None);
    }

    #[test]
    fn write_failure_is_surfaced() {
        let (files, tags, item) = setup();
        tags.set_simulate_write_error(true);
        let err = set(&files, &tags, &item, Some(b"green")).unwrap_err();
        assert!(matches!(err, BridgeError::Store(_)));
    }

    #[test]
    fn root_can_carry_a_tag() {
        let (files, tags, _) = setup();
        set(&files, &tags, &Item::Root, Some(b"r")).unwrap();
        assert_eq!(get(&tags, &Item::Root), Some(b"r".to_vec()));
    }
}
