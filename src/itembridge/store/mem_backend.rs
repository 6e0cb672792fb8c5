use super::{guess_type, FileStore, FOLDER_TYPE};
use crate::error::{BridgeError, Result};
use crate::model::RelativePath;
use crate::resolver::from_identifier;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Copy)]
struct Times {
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    accessed: DateTime<Utc>,
}

impl Times {
    fn now() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            modified: now,
            accessed: now,
        }
    }
}

#[derive(Clone)]
enum MemNode {
    File { data: Vec<u8>, times: Times },
    Directory { times: Times },
}

impl MemNode {
    fn times(&self) -> &Times {
        match self {
            MemNode::File { times, .. } | MemNode::Directory { times } => times,
        }
    }
}

/// In-memory folder tree for testing.
///
/// The root is an implicit directory and is not stored in the map. Entries
/// are kept in a `BTreeMap` so that a subtree is a contiguous, ordered run
/// of keys.
pub struct MemFileStore {
    root: PathBuf,
    nodes: RwLock<BTreeMap<RelativePath, MemNode>>,
    simulate_write_error: AtomicBool,
    simulate_attribute_error: AtomicBool,
}

impl Default for MemFileStore {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/memory"),
            nodes: RwLock::new(BTreeMap::new()),
            simulate_write_error: AtomicBool::new(false),
            simulate_attribute_error: AtomicBool::new(false),
        }
    }
}

impl MemFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `move_item` and `remove_item` fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Make the date and size queries fail, leaving existence checks intact.
    pub fn set_simulate_attribute_error(&self, simulate: bool) {
        self.simulate_attribute_error.store(simulate, Ordering::SeqCst);
    }

    /// Seeds a file, creating missing parent directories.
    pub fn add_file(&self, identifier: &str, data: &[u8]) -> Result<()> {
        let path = from_identifier(identifier)?.relative_path();
        let mut nodes = self.nodes.write();
        add_parents(&mut nodes, &path);
        nodes.insert(
            path,
            MemNode::File {
                data: data.to_vec(),
                times: Times::now(),
            },
        );
        Ok(())
    }

    /// Seeds a directory, creating missing parent directories.
    pub fn add_dir(&self, identifier: &str) -> Result<()> {
        let path = from_identifier(identifier)?.relative_path();
        let mut nodes = self.nodes.write();
        add_parents(&mut nodes, &path);
        nodes.insert(path, MemNode::Directory { times: Times::now() });
        Ok(())
    }

    pub fn read_file(&self, identifier: &str) -> Option<Vec<u8>> {
        let path = from_identifier(identifier).ok()?.relative_path();
        match self.nodes.read().get(&path) {
            Some(MemNode::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    /// Every stored entry as an identifier, in tree order.
    pub fn entries(&self) -> Vec<String> {
        self.nodes.read().keys().map(RelativePath::to_key).collect()
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(BridgeError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }

    fn times(&self, path: &RelativePath) -> Result<Times> {
        if self.simulate_attribute_error.load(Ordering::SeqCst) {
            return Err(BridgeError::Store("Simulated attribute error".to_string()));
        }
        if path.is_empty() {
            return Ok(Times::now());
        }
        let nodes = self.nodes.read();
        let node = nodes
            .get(path)
            .ok_or_else(|| BridgeError::NoSuchItem(path.to_string()))?;
        Ok(*node.times())
    }
}

fn add_parents(nodes: &mut BTreeMap<RelativePath, MemNode>, path: &RelativePath) {
    let mut parent = path.parent();
    while !parent.is_empty() {
        nodes
            .entry(parent.clone())
            .or_insert_with(|| MemNode::Directory { times: Times::now() });
        parent = parent.parent();
    }
}

fn subtree(nodes: &BTreeMap<RelativePath, MemNode>, top: &RelativePath) -> Vec<RelativePath> {
    nodes
        .range(top.clone()..)
        .take_while(|(key, _)| key.starts_with(top))
        .map(|(key, _)| key.clone())
        .collect()
}

impl FileStore for MemFileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn absolute_path(&self, path: &RelativePath) -> PathBuf {
        let mut full = self.root.clone();
        full.extend(path.segments());
        full
    }

    fn exists(&self, path: &RelativePath) -> Result<bool> {
        Ok(path.is_empty() || self.nodes.read().contains_key(path))
    }

    fn is_directory(&self, path: &RelativePath) -> Result<bool> {
        if path.is_empty() {
            return Ok(true);
        }
        match self.nodes.read().get(path) {
            Some(MemNode::Directory { .. }) => Ok(true),
            Some(MemNode::File { .. }) => Ok(false),
            None => Err(BridgeError::NoSuchItem(path.to_string())),
        }
    }

    fn list_children(&self, path: &RelativePath) -> Result<Vec<String>> {
        if !self.is_directory(path)? {
            return Err(BridgeError::Store(format!("{} is not a directory", path)));
        }
        let depth = path.len() + 1;
        let nodes = self.nodes.read();
        // BTreeMap order is already sorted by segments.
        Ok(subtree(&nodes, path)
            .into_iter()
            .filter(|key| key.len() == depth)
            .filter_map(|key| key.last().map(str::to_string))
            .collect())
    }

    fn move_item(&self, from: &RelativePath, to: &RelativePath) -> Result<()> {
        self.check_writable()?;
        let mut nodes = self.nodes.write();

        if !nodes.contains_key(from) {
            return Err(BridgeError::NoSuchItem(from.to_string()));
        }
        if nodes.contains_key(to) || to.is_empty() {
            return Err(BridgeError::FilenameCollision {
                name: to.last().unwrap_or_default().to_string(),
                parent: to.parent().to_string(),
            });
        }
        let target_parent = to.parent();
        if !target_parent.is_empty()
            && !matches!(nodes.get(&target_parent), Some(MemNode::Directory { .. }))
        {
            return Err(BridgeError::NoSuchItem(target_parent.to_string()));
        }
        if to.starts_with(from) {
            return Err(BridgeError::Store(format!(
                "cannot move {} into itself",
                from
            )));
        }

        for key in subtree(&nodes, from) {
            if let (Some(node), Some(new_key)) = (nodes.remove(&key), key.rebase(from, to)) {
                nodes.insert(new_key, node);
            }
        }
        Ok(())
    }

    fn remove_item(&self, path: &RelativePath) -> Result<()> {
        self.check_writable()?;
        if path.is_empty() {
            return Err(BridgeError::Store("refusing to remove the managed root".into()));
        }
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(path) {
            return Err(BridgeError::NoSuchItem(path.to_string()));
        }
        for key in subtree(&nodes, path) {
            nodes.remove(&key);
        }
        Ok(())
    }

    fn created(&self, path: &RelativePath) -> Result<DateTime<Utc>> {
        Ok(self.times(path)?.created)
    }

    fn modified(&self, path: &RelativePath) -> Result<DateTime<Utc>> {
        Ok(self.times(path)?.modified)
    }

    fn accessed(&self, path: &RelativePath) -> Result<DateTime<Utc>> {
        Ok(self.times(path)?.accessed)
    }

    fn size(&self, path: &RelativePath) -> Result<u64> {
        if self.simulate_attribute_error.load(Ordering::SeqCst) {
            return Err(BridgeError::Store("Simulated attribute error".to_string()));
        }
        match self.nodes.read().get(path) {
            Some(MemNode::File { data, .. }) => Ok(data.len() as u64),
            Some(MemNode::Directory { .. }) => {
                Err(BridgeError::Store(format!("{} is a directory", path)))
            }
            None if path.is_empty() => Err(BridgeError::Store("the root is a directory".into())),
            None => Err(BridgeError::NoSuchItem(path.to_string())),
        }
    }

    fn type_identifier(&self, path: &RelativePath) -> Result<String> {
        if self.is_directory(path)? {
            Ok(FOLDER_TYPE.to_string())
        } else {
            Ok(guess_type(path.last().unwrap_or_default()))
        }
    }
}
