//! # Command Layer
//!
//! Item Operations: the reads and mutations a host can perform on a resolved
//! [`Item`](crate::model::Item). Each operation family lives in its own
//! submodule as plain functions over the two stores.
//!
//! ## Safety Rules
//!
//! Every mutation follows the same order:
//!
//! 1. **Preconditions first**: existence, collisions and name validity are
//!    checked before anything is written. A refused operation leaves both
//!    stores untouched.
//! 2. **Tags next**: the tag store is updated (migrated or cleared).
//! 3. **Files last**: the file-store mutation is the final, authoritative step.
//!
//! There is no transaction spanning the two stores. A crash between steps 2
//! and 3 can leave a tag pointing at the wrong path; since existence is only
//! ever decided by the file store, the worst outcome is a stale or missing tag.
//!
//! Reads degrade instead of failing: an attribute or tag that cannot be
//! fetched is reported as absent.
//!
//! ## Testing Strategy
//!
//! Command tests run against `MemFileStore` and `MemTagStore`. This is where
//! most of the behavioural tests live.
//!
//! ## Command Modules
//!
//! - [`capabilities`]: What the host may do with an item
//! - [`metadata`]: Display name and file attributes
//! - [`tag`]: Read and write the per-item tag
//! - [`rename`]: Rename in place, migrating tags
//! - [`delete`]: Remove an item and its tags
//! - [`lookup`]: Resolve an item into a full [`ItemView`](crate::model::ItemView)
//! - [`enumerate`]: List a directory's children
//! - [`helpers`]: Shared utilities (existence checks, subtree walks)

pub mod capabilities;
pub mod delete;
pub mod enumerate;
pub mod helpers;
pub mod lookup;
pub mod metadata;
pub mod rename;
pub mod tag;
