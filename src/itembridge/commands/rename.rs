use super::helpers::{migrate_tag, walk};
use crate::error::{BridgeError, Result};
use crate::model::{check_segment, Item, RelativePath};
use crate::resolver::identifier;
use crate::store::{FileStore, TagStore};
use tracing::{info, warn};

/// Renames an item within its directory and returns the item at its new
/// location. The old identifier stops resolving.
///
/// Order of work:
/// 1. Validate the name, the source, and that the destination is free.
/// 2. Move the tags of the item and everything below it (copy, then clear).
/// 3. Move the entry in the file store.
///
/// If step 3 fails the tags are moved back before the error is returned.
pub fn run<F: FileStore, T: TagStore>(
    files: &F,
    tags: &T,
    item: &Item,
    new_name: &str,
) -> Result<Item> {
    let source = match item {
        Item::Root => {
            return Err(BridgeError::Unsupported {
                operation: "rename",
                identifier: identifier(item),
            });
        }
        Item::Child(path) => path,
    };

    let parent = source.parent();
    if check_segment(new_name).is_err() {
        let attempted = if parent.is_empty() {
            new_name.to_string()
        } else {
            format!("{}/{}", parent.to_key(), new_name)
        };
        return Err(BridgeError::NoSuchItem(attempted));
    }
    if !files.exists(source)? {
        return Err(BridgeError::NoSuchItem(source.to_key()));
    }
    if source.last() == Some(new_name) {
        return Ok(item.clone());
    }

    let target = parent.child(new_name);
    if files.exists(&target)? {
        return Err(BridgeError::FilenameCollision {
            name: new_name.to_string(),
            parent: parent.to_string(),
        });
    }

    let moved = walk(files, source)?;
    let mut migrated: Vec<(RelativePath, RelativePath)> = Vec::new();
    for old in &moved {
        let Some(new) = old.rebase(source, &target) else {
            continue;
        };
        match migrate_tag(tags, old, &new) {
            Ok(true) => migrated.push((old.clone(), new)),
            Ok(false) => {}
            Err(e) => {
                restore_tags(tags, &migrated);
                return Err(e);
            }
        }
    }

    if let Err(e) = files.move_item(source, &target) {
        restore_tags(tags, &migrated);
        return Err(e);
    }

    info!(target: "itembridge::rename", from = %source, to = %target, tags = migrated.len(), "renamed item");
    Ok(Item::Child(target))
}

fn restore_tags<T: TagStore>(tags: &T, migrated: &[(RelativePath, RelativePath)]) {
    for (old, new) in migrated.iter().rev() {
        if let Err(e) = migrate_tag(tags, new, old) {
            warn!(target: "itembridge::rename", key = %old, error = %e, "could not restore tag");
        }
    }
}
