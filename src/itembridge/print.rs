use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use colored::Colorize;
use itembridge::model::{Capabilities, ItemView};
use serde::Serialize;

const TIME_WIDTH: usize = 16;

pub(super) fn print_json<T: Serialize>(value: &T) -> itembridge::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(super) fn print_view(view: &ItemView) {
    let kind = if view.is_directory { "folder" } else { "file" };
    println!("{} {}", view.display_name.bold(), format!("({})", kind).dimmed());
    println!("  identifier  {}", view.identifier);
    println!("  parent      {}", view.parent_identifier);
    if let Some(type_id) = &view.metadata.type_identifier {
        println!("  type        {}", type_id);
    }
    if let Some(size) = view.metadata.size {
        println!("  size        {} bytes", size);
    }
    print_date("created", view.metadata.created_at);
    print_date("modified", view.metadata.modified_at);
    print_date("accessed", view.metadata.accessed_at);
    if let Some(tag) = &view.tag {
        println!("  tag         {}", format_tag(tag).yellow());
    }
    println!("  can         {}", format_capabilities(&view.capabilities));
}

pub(super) fn print_list(views: &[ItemView]) {
    if views.is_empty() {
        println!("{}", "No items found.".dimmed());
        return;
    }
    for view in views {
        let name = if view.is_directory {
            format!("{}/", view.display_name).blue().bold()
        } else {
            view.display_name.normal()
        };
        let time = view
            .metadata
            .modified_at
            .map(format_time_ago)
            .unwrap_or_default();
        let tag = view
            .tag
            .as_deref()
            .map(|t| format!(" [{}]", format_tag(t)))
            .unwrap_or_default();
        let time = format!("{:>width$}", time, width = TIME_WIDTH);
        println!("{}  {}{}", time.dimmed(), name, tag.yellow());
    }
}

pub(super) fn print_capabilities(caps: &Capabilities) {
    println!("{}", format_capabilities(caps));
}

pub(super) fn print_tag(tag: Option<&[u8]>) {
    match tag {
        Some(tag) => println!("{}", format_tag(tag)),
        None => println!("{}", "(no tag)".dimmed()),
    }
}

pub(super) fn print_success(message: &str) {
    println!("{}", message.green());
}

fn print_date(label: &str, date: Option<DateTime<Utc>>) {
    if let Some(date) = date {
        println!(
            "  {:<11} {} {}",
            label,
            date.format("%Y-%m-%d %H:%M:%S"),
            format!("({})", format_time_ago(date)).dimmed()
        );
    }
}

fn format_capabilities(caps: &Capabilities) -> String {
    caps.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tags are opaque bytes; show them as text when they are UTF-8.
fn format_tag(tag: &[u8]) -> String {
    match std::str::from_utf8(tag) {
        Ok(text) => text.to_string(),
        Err(_) => format!("base64:{}", STANDARD.encode(tag)),
    }
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    formatter.convert(duration.to_std().unwrap_or_default())
}
