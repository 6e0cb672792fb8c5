use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Parser;
use colored::Colorize;
use itembridge::api::BridgeApi;
use itembridge::config::{self, BridgeConfig};
use itembridge::error::{BridgeError, Result};
use itembridge::store::fs_backend::FsFileStore;
use itembridge::store::json_tags::JsonTagStore;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod args;
mod print;
use args::{Cli, Commands, TagAction};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct AppContext {
    api: BridgeApi<FsFileStore, JsonTagStore>,
    json: bool,
}

#[derive(Serialize)]
struct IdentifierOutput<'a> {
    identifier: &'a str,
}

#[derive(Serialize)]
struct TagOutput<'a> {
    identifier: &'a str,
    // base64
    tag: Option<String>,
}

#[derive(Serialize)]
struct PathOutput<'a> {
    path: &'a Path,
}

fn run(cli: Cli) -> Result<()> {
    let ctx = init_context(&cli)?;

    match cli.command {
        Commands::Info { identifier } => handle_info(&ctx, &identifier),
        Commands::List { identifier } => handle_list(&ctx, &identifier),
        Commands::Parent { identifier } => handle_parent(&ctx, &identifier),
        Commands::Capabilities { identifier } => handle_capabilities(&ctx, &identifier),
        Commands::Rename {
            identifier,
            new_name,
        } => handle_rename(&ctx, &identifier, &new_name),
        Commands::Delete { identifier } => handle_delete(&ctx, &identifier),
        Commands::Tag { action } => handle_tag(&ctx, action),
        Commands::Id { path } => handle_id(&ctx, &path),
        Commands::Path { identifier } => handle_path(&ctx, &identifier),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let config_dir = config::config_dir()?;
    let config = BridgeConfig::load(&config_dir)?;
    debug!(config_dir = %config_dir.display(), ?config, "loaded config");

    let root = match &cli.root {
        Some(root) => absolute(root)?,
        None => config.root_dir()?,
    };
    let metadata_dir = match &cli.metadata_dir {
        Some(dir) => absolute(dir)?,
        None => config.metadata_dir()?,
    };

    let files = if config.resolve_symlinks {
        FsFileStore::open_canonical(root)?
    } else {
        let files = FsFileStore::new(root);
        files.ensure_root()?;
        files
    };
    let api = BridgeApi::new(files, JsonTagStore::new(metadata_dir))
        .with_root_name(&config.root_display_name);

    Ok(AppContext {
        api,
        json: cli.json,
    })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(BridgeError::Io)?;
    Ok(cwd.join(path))
}

fn handle_info(ctx: &AppContext, identifier: &str) -> Result<()> {
    let view = ctx.api.item(identifier)?;
    if ctx.json {
        return print::print_json(&view);
    }
    print::print_view(&view);
    Ok(())
}

fn handle_list(ctx: &AppContext, identifier: &str) -> Result<()> {
    let views = ctx.api.enumerate(identifier)?;
    if ctx.json {
        return print::print_json(&views);
    }
    print::print_list(&views);
    Ok(())
}

fn handle_parent(ctx: &AppContext, identifier: &str) -> Result<()> {
    let parent = ctx.api.parent_identifier(identifier)?;
    if ctx.json {
        return print::print_json(&IdentifierOutput {
            identifier: &parent,
        });
    }
    println!("{}", parent);
    Ok(())
}

fn handle_capabilities(ctx: &AppContext, identifier: &str) -> Result<()> {
    let caps = ctx.api.capabilities(identifier)?;
    if ctx.json {
        return print::print_json(&caps);
    }
    print::print_capabilities(&caps);
    Ok(())
}

fn handle_rename(ctx: &AppContext, identifier: &str, new_name: &str) -> Result<()> {
    let view = ctx.api.rename(identifier, new_name)?;
    if ctx.json {
        return print::print_json(&view);
    }
    print::print_success(&format!("Renamed {} → {}", identifier, view.identifier));
    Ok(())
}

fn handle_delete(ctx: &AppContext, identifier: &str) -> Result<()> {
    ctx.api.delete(identifier)?;
    if ctx.json {
        return print::print_json(&IdentifierOutput { identifier });
    }
    print::print_success(&format!("Deleted {}", identifier));
    Ok(())
}

fn handle_tag(ctx: &AppContext, action: TagAction) -> Result<()> {
    match action {
        TagAction::Get { identifier } => {
            let tag = ctx.api.tag(&identifier)?;
            if ctx.json {
                return print::print_json(&TagOutput {
                    identifier: &identifier,
                    tag: tag.map(|bytes| STANDARD.encode(bytes)),
                });
            }
            print::print_tag(tag.as_deref());
        }
        TagAction::Set { identifier, value } => {
            ctx.api.set_tag(&identifier, Some(value.as_bytes()))?;
            if ctx.json {
                return print::print_json(&IdentifierOutput {
                    identifier: &identifier,
                });
            }
            print::print_success(&format!("Tagged {}", identifier));
        }
        TagAction::Clear { identifier } => {
            ctx.api.set_tag(&identifier, None)?;
            if ctx.json {
                return print::print_json(&IdentifierOutput {
                    identifier: &identifier,
                });
            }
            print::print_success(&format!("Cleared tag on {}", identifier));
        }
    }
    Ok(())
}

fn handle_id(ctx: &AppContext, path: &Path) -> Result<()> {
    let path = absolute(path)?;
    let identifier = ctx.api.identifier_for_path(&path)?;
    if ctx.json {
        return print::print_json(&IdentifierOutput {
            identifier: &identifier,
        });
    }
    println!("{}", identifier);
    Ok(())
}

fn handle_path(ctx: &AppContext, identifier: &str) -> Result<()> {
    let path = ctx.api.path_for_identifier(identifier)?;
    if ctx.json {
        return print::print_json(&PathOutput { path: &path });
    }
    println!("{}", path.display());
    Ok(())
}
