use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Separator used between segments when a relative path is written out as a
/// single string (identifiers and tag-store keys).
pub const SEPARATOR: char = '/';

/// Why a single path segment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentFault {
    Empty,
    Separator,
    Nul,
    /// `.` or `..`; these would step outside the item they name.
    Dot,
}

pub(crate) fn check_segment(segment: &str) -> std::result::Result<(), SegmentFault> {
    if segment.is_empty() {
        Err(SegmentFault::Empty)
    } else if segment == "." || segment == ".." {
        Err(SegmentFault::Dot)
    } else if segment.contains(SEPARATOR) {
        Err(SegmentFault::Separator)
    } else if segment.contains('\0') {
        Err(SegmentFault::Nul)
    } else {
        Ok(())
    }
}

/// Location of an item below the managed root, as a list of segments.
///
/// Every segment has passed `check_segment`; the empty list is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelativePath(Vec<String>);

impl RelativePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Callers must have validated every segment.
    pub(crate) fn from_checked(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Drops the last segment. The parent of the root is the root.
    pub fn parent(&self) -> RelativePath {
        let mut segments = self.0.clone();
        segments.pop();
        Self(segments)
    }

    pub(crate) fn child(&self, checked_name: &str) -> RelativePath {
        let mut segments = self.0.clone();
        segments.push(checked_name.to_string());
        Self(segments)
    }

    pub fn starts_with(&self, prefix: &RelativePath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Moves `self` from below `from` to the same place below `to`.
    pub fn rebase(&self, from: &RelativePath, to: &RelativePath) -> Option<RelativePath> {
        let rest = self.0.strip_prefix(from.0.as_slice())?;
        let mut segments = to.0.clone();
        segments.extend(rest.iter().cloned());
        Some(Self(segments))
    }

    /// Segments joined with [`SEPARATOR`]; the root gives the empty string.
    pub fn to_key(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.to_key())
        }
    }
}

/// A transient view of one entry in the managed tree.
///
/// Built fresh for every request; it carries no state beyond its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Root,
    /// Never holds an empty path.
    Child(RelativePath),
}

impl Item {
    pub fn from_relative(path: RelativePath) -> Self {
        if path.is_empty() {
            Item::Root
        } else {
            Item::Child(path)
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Item::Root)
    }

    pub fn segments(&self) -> &[String] {
        match self {
            Item::Root => &[],
            Item::Child(path) => path.segments(),
        }
    }

    pub fn relative_path(&self) -> RelativePath {
        match self {
            Item::Root => RelativePath::root(),
            Item::Child(path) => path.clone(),
        }
    }

    /// Final path segment; `None` for the root.
    pub fn name(&self) -> Option<&str> {
        match self {
            Item::Root => None,
            Item::Child(path) => path.last(),
        }
    }

    /// Key under which the item's tag lives in the metadata store.
    pub fn tag_key(&self) -> String {
        match self {
            Item::Root => String::new(),
            Item::Child(path) => path.to_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Enumerate,
    Read,
    AddChild,
    Rename,
    Delete,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Enumerate => "enumerate",
            Capability::Read => "read",
            Capability::AddChild => "add-child",
            Capability::Rename => "rename",
            Capability::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeSet<Capability>);

impl Capabilities {
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// File-store attributes of an item. Each field is fetched on its own and is
/// absent when that single fetch failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemMetadata {
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub accessed_at: Option<DateTime<Utc>>,
    /// Always `None` for directories.
    pub size: Option<u64>,
    pub type_identifier: Option<String>,
}

/// Everything a host needs to present one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub identifier: String,
    pub parent_identifier: String,
    pub display_name: String,
    pub is_directory: bool,
    pub capabilities: Capabilities,
    pub metadata: ItemMetadata,
    #[serde(serialize_with = "serialize_tag")]
    pub tag: Option<Vec<u8>>,
}

fn serialize_tag<S: Serializer>(tag: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match tag {
        Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}
