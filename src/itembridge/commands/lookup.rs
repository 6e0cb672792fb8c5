use super::helpers::ensure_exists;
use super::{capabilities, metadata, tag};
use crate::error::Result;
use crate::model::{Item, ItemView};
use crate::resolver::{identifier, parent_identifier};
use crate::store::{FileStore, TagStore};
use tracing::warn;

/// Builds the full view of an existing item. Fails with `NoSuchItem` when the
/// file store does not have it; individual attributes and the tag degrade to
/// absent.
pub fn run<F: FileStore, T: TagStore>(
    files: &F,
    tags: &T,
    item: &Item,
    root_name: &str,
) -> Result<ItemView> {
    ensure_exists(files, item)?;

    let is_directory = item.is_root()
        || files.is_directory(&item.relative_path()).unwrap_or_else(|e| {
            warn!(target: "itembridge::lookup", item = %item.relative_path(), error = %e, "directory flag unavailable");
            false
        });

    Ok(ItemView {
        identifier: identifier(item),
        parent_identifier: parent_identifier(item),
        display_name: metadata::display_name(item, root_name),
        is_directory,
        capabilities: capabilities::run(item),
        metadata: metadata::run(files, item),
        tag: tag::get(tags, item),
    })
}
