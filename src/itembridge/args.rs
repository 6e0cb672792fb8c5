use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "itembridge", version)]
#[command(about = "Browse, rename, delete and tag gallery items by identifier", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Managed folder (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Shared tag store directory (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub metadata_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show an item
    Info { identifier: String },

    /// List the children of a folder (the root by default)
    #[command(alias = "ls")]
    List {
        #[arg(default_value = "/")]
        identifier: String,
    },

    /// Print an item's parent identifier
    Parent { identifier: String },

    /// Print what the host may do with an item
    #[command(alias = "caps")]
    Capabilities { identifier: String },

    /// Rename an item within its folder
    #[command(alias = "mv")]
    Rename { identifier: String, new_name: String },

    /// Delete an item (folders recursively)
    #[command(alias = "rm")]
    Delete { identifier: String },

    /// Read or write an item's tag
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Print the identifier for a path inside the managed folder
    Id { path: PathBuf },

    /// Print the path an identifier refers to
    Path { identifier: String },
}

#[derive(Subcommand, Debug)]
pub enum TagAction {
    /// Print the tag
    Get { identifier: String },

    /// Replace the tag (an empty value clears it)
    Set { identifier: String, value: String },

    /// Remove the tag
    Clear { identifier: String },
}
