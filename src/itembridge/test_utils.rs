use crate::api::BridgeApi;
use crate::store::fs_backend::FsFileStore;
use crate::store::FileStore;
use crate::store::json_tags::JsonTagStore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A bridge over a temporary gallery folder and a temporary shared directory.
pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub api: BridgeApi<FsFileStore, JsonTagStore>,
    pub root: PathBuf,
    pub shared: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().join("gallery");
        let shared = temp_dir.path().join("shared");
        let files = FsFileStore::open_canonical(root).expect("failed to create gallery");
        let root = files.root().to_path_buf();
        let api = BridgeApi::new(files, JsonTagStore::new(shared.clone()));
        Self {
            _temp_dir: temp_dir,
            api,
            root,
            shared,
        }
    }

    /// Writes a file below the gallery, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent");
        }
        fs::write(&path, content).expect("failed to write file");
        path
    }

    pub fn exists(&self, relative: &str) -> bool {
        Path::new(&self.root).join(relative).exists()
    }
}
