use crate::model::{Capabilities, Capability, Item};

/// Decided by the item's variant alone; the file store is not consulted.
pub fn run(item: &Item) -> Capabilities {
    let base = [Capability::Enumerate, Capability::Read, Capability::AddChild];
    match item {
        Item::Root => base.into_iter().collect(),
        Item::Child(_) => base
            .into_iter()
            .chain([Capability::Rename, Capability::Delete])
            .collect(),
    }
}
