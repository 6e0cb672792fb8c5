use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("No such item: {0}")]
    NoSuchItem(String),

    #[error("Path is outside the managed folder: {}", .0.display())]
    OutsideRoot(PathBuf),

    #[error("An item named \"{name}\" already exists in \"{parent}\"")]
    FilenameCollision { name: String, parent: String },

    #[error("Cannot {operation} \"{identifier}\"")]
    Unsupported {
        operation: &'static str,
        identifier: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// The failure classes a host is expected to present to the user.
///
/// None of them are transient, so hosts should not retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    NoSuchItem,
    OutsideRoot,
    FilenameCollision,
    StoreError,
    Unsupported,
    Config,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::NoSuchItem(_) => ErrorKind::NoSuchItem,
            BridgeError::OutsideRoot(_) => ErrorKind::OutsideRoot,
            BridgeError::FilenameCollision { .. } => ErrorKind::FilenameCollision,
            BridgeError::Unsupported { .. } => ErrorKind::Unsupported,
            BridgeError::Io(_) | BridgeError::Serialization(_) | BridgeError::Store(_) => {
                ErrorKind::StoreError
            }
            BridgeError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
