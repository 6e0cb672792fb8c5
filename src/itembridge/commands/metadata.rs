use crate::error::Result;
use crate::model::{Item, ItemMetadata};
use crate::store::FileStore;
use tracing::debug;

pub fn display_name(item: &Item, root_name: &str) -> String {
    match item {
        Item::Root => root_name.to_string(),
        Item::Child(path) => path.last().unwrap_or_default().to_string(),
    }
}

/// Fetches each attribute independently. A failed fetch leaves that one field
/// empty and never fails the whole call.
pub fn run<F: FileStore>(files: &F, item: &Item) -> ItemMetadata {
    let path = item.relative_path();
    let is_directory = item.is_root() || files.is_directory(&path).unwrap_or(false);

    ItemMetadata {
        created_at: field(files.created(&path), "created", item),
        modified_at: field(files.modified(&path), "modified", item),
        accessed_at: field(files.accessed(&path), "accessed", item),
        size: if is_directory {
            None
        } else {
            field(files.size(&path), "size", item)
        },
        type_identifier: field(files.type_identifier(&path), "type", item),
    }
}

fn field<V>(fetched: Result<V>, name: &str, item: &Item) -> Option<V> {
    match fetched {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(target: "itembridge::metadata", item = %item.relative_path(), field = name, error = %e, "attribute unavailable");
            None
        }
    }
}
