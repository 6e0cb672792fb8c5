use super::helpers::ensure_exists;
use super::lookup;
use crate::error::{BridgeError, Result};
use crate::model::{check_segment, Item, ItemView};
use crate::store::{FileStore, TagStore};
use tracing::debug;

/// Lists the direct children of a directory, sorted by name.
///
/// Entries whose names cannot form an identifier are skipped, as are entries
/// that disappear between the listing and their lookup.
pub fn run<F: FileStore, T: TagStore>(
    files: &F,
    tags: &T,
    item: &Item,
    root_name: &str,
) -> Result<Vec<ItemView>> {
    ensure_exists(files, item)?;
    let path = item.relative_path();
    if !item.is_root() && !files.is_directory(&path)? {
        return Err(BridgeError::NoSuchItem(format!("{} (not a folder)", path)));
    }

    let mut views = Vec::new();
    for name in files.list_children(&path)? {
        if check_segment(&name).is_err() {
            debug!(target: "itembridge::enumerate", name = %name, "skipping unrepresentable name");
            continue;
        }
        let child = Item::Child(path.child(&name));
        match lookup::run(files, tags, &child, root_name) {
            Ok(view) => views.push(view),
            Err(BridgeError::NoSuchItem(id)) => {
                debug!(target: "itembridge::enumerate", id = %id, "entry vanished during enumeration");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(views)
}
