//! # Itembridge Architecture
//!
//! Itembridge lets an external file browser (the *host*) list, rename, delete
//! and tag the entries of an application-owned folder without ever seeing a
//! real path. The host only handles opaque identifiers, which it may cache and
//! diff between enumerations.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, args.rs)                                     │
//! │  - Parses arguments, prints results, sets up logging        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Host protocol surface: identifier strings in and out     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │  Resolver (resolver.rs)  │◀──│  Commands (commands/*.rs)    │
//! │  identifier ⇄ path       │   │  rename, delete, tags, ...   │
//! └──────────────────────────┘   └──────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - FileStore: the folder tree (truth)                       │
//! │  - TagStore: shared key → bytes map (side data)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifiers
//!
//! Identifiers are derived from relative paths rather than stored, see
//! [`resolver`]. The root is always `"/"`.
//!
//! ## Items Are Transient
//!
//! An [`model::Item`] is built for one request and dropped afterwards. Only the
//! folder tree and the tag store persist anything.
//!
//! ## Module Overview
//!
//! - [`api`]: The host-facing facade
//! - [`commands`]: Item operations
//! - [`resolver`]: Identifier ⇄ path mapping
//! - [`store`]: Storage traits and implementations
//! - [`model`]: Core data types (`Item`, `RelativePath`, `ItemView`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod resolver;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
