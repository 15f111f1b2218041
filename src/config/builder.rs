//! Writing the default configuration and updating the location in place.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::api::Location;
use crate::common::constants::*;
use crate::common::utils::private_path;

fn default_config_content() -> String {
    format!(
        "#[Location]\n\
         # city = \"Makkah\"              # City name as understood by the timings API\n\
         # country = \"Saudi Arabia\"     # Country name\n\
         method = {DEFAULT_METHOD}                     # Calculation method id (0-{MAXIMUM_METHOD})\n\
         \n\
         #[Reminders]\n\
         notifications = {DEFAULT_NOTIFICATIONS}           # Send desktop notifications\n\
         thirty_minute_reminder = {DEFAULT_THIRTY_MINUTE_REMINDER}  # Remind 30 minutes before a prayer period ends\n\
         \n\
         #[Network]\n\
         retry_delay = {DEFAULT_RETRY_DELAY}                # Seconds between fetch retries ({MINIMUM_RETRY_DELAY}-{MAXIMUM_RETRY_DELAY})\n\
         request_timeout = {DEFAULT_REQUEST_TIMEOUT}            # HTTP timeout in seconds ({MINIMUM_REQUEST_TIMEOUT}-{MAXIMUM_REQUEST_TIMEOUT})\n"
    )
}

pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory {}", private_path(parent))
        })?;
    }
    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write default config to {}", private_path(path)))?;

    log_block_start!("Created default configuration at {}", private_path(path));
    Ok(())
}

/// First active (uncommented) line assigning `key`.
pub(crate) fn find_config_line(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .find(|line| {
            let trimmed = line.trim_start();
            trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        })
        .map(str::to_string)
}

/// Rewrite `key = value`, keeping the spacing before a trailing comment.
pub(crate) fn preserve_comment_formatting(original_line: &str, key: &str, new_value: &str) -> String {
    let key_value_part = format!("{key} = {new_value}");

    match original_line.find('#') {
        Some(comment_pos) => {
            let before_comment = &original_line[..comment_pos];
            let spacing = before_comment
                .rfind(|c: char| !c.is_whitespace())
                .map(|last| &before_comment[last + 1..])
                .filter(|s| !s.is_empty())
                .unwrap_or(" ");
            format!("{key_value_part}{spacing}{}", &original_line[comment_pos..])
        }
        None => key_value_part,
    }
}

fn set_key(content: &str, key: &str, value: &str) -> String {
    let encoded = toml::Value::String(value.to_string()).to_string();
    match find_config_line(content, key) {
        Some(line) => content.replacen(&line, &preserve_comment_formatting(&line, key, &encoded), 1),
        None => {
            let separator = if content.is_empty() || content.ends_with('\n') { "" } else { "\n" };
            format!("{content}{separator}{key} = {encoded}\n")
        }
    }
}

/// Store `location` in the config file at `path`, creating it if needed.
pub fn update_location(path: &Path, location: &Location) -> Result<()> {
    if !path.exists() {
        create_default_config(path)?;
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let updated = set_key(&content, "city", &location.city);
    let updated = set_key(&updated, "country", &location.country);

    // Refuse to write something the loader would reject.
    toml::from_str::<super::Config>(&updated)
        .context("Updated configuration would not parse")?;

    fs::write(path, updated)
        .with_context(|| format!("Failed to write config to {}", private_path(path)))?;

    log_block_start!("Saved location to {}", private_path(path));
    log_indented!("City: {}", location.city);
    log_indented!("Country: {}", location.country);
    Ok(())
}
