//! `waqtbar city "City, Country"`: validate and store the location.

use anyhow::{Context, Result};

use crate::api::{CityCatalog, Location, fetch_catalog};
use crate::config::{self, Config};

const MAX_SUGGESTIONS: usize = 5;

/// Outcome of checking a selection against the catalog.
#[derive(Debug, PartialEq, Eq)]
pub enum Verification<'a> {
    Known,
    Unknown { suggestions: Vec<&'a str> },
}

pub fn handle_city_command(selection: &str, no_verify: bool) -> Result<()> {
    log_version!();

    let location = Location::parse(selection);
    if location.city.is_empty() {
        anyhow::bail!("City must not be empty");
    }

    // Also creates the default file on first use.
    let config = Config::load()?;

    if no_verify {
        log_block_start!("Skipping catalog check for {location}");
    } else {
        log_block_start!("Checking {location} against the city catalog...");
        let running = super::always_running();
        let catalog = super::one_shot_policy(&config)
            .run(&running, |_| fetch_catalog(config.request_timeout()))
            .context("Could not download the city catalog (use --no-verify to skip)")?;

        if let Verification::Unknown { suggestions } = verify(&catalog, &location) {
            log_pipe!();
            log_error!("'{location}' is not in the city catalog");
            if suggestions.is_empty() {
                log_indented!("No similar entries found");
            } else {
                log_block_start!("Did you mean:");
                for suggestion in suggestions {
                    log_indented!("{suggestion}");
                }
            }
            log_end!();
            anyhow::bail!("Unknown city: {location}");
        }
        log_decorated!("Found in catalog ({} entries)", catalog.len());
    }

    config::update_location(&config::get_config_path()?, &location)?;
    log_block_start!("A running waqtbar will pick up the change automatically");
    log_end!();
    Ok(())
}

/// Exact membership, otherwise substring matches on the city (falling back
/// to the closest entries by edit distance).
pub fn verify<'a>(catalog: &'a CityCatalog, location: &Location) -> Verification<'a> {
    let selection = location.to_string();
    if catalog.contains(&selection) {
        return Verification::Known;
    }

    let mut suggestions = catalog.search(&location.city, MAX_SUGGESTIONS);
    if suggestions.is_empty() {
        suggestions = super::find_similar(&selection, &catalog.entries(), 3);
    }
    Verification::Unknown { suggestions }
}

pub fn display_help() {
    log_version!();
    log_block_start!("city - Choose the location for prayer times");
    log_block_start!("Usage: waqtbar city \"City, Country\" [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("--no-verify  Store the location without checking the city catalog");
    log_block_start!("Examples:");
    log_indented!("waqtbar city \"Makkah, Saudi Arabia\"");
    log_indented!("waqtbar city \"Cairo, Egypt\"");
    log_end!();
}
