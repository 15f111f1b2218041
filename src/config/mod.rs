//! TOML configuration with validation and hot reload.
//!
//! The configuration lives in `$XDG_CONFIG_HOME/waqtbar/waqtbar.toml` (or in
//! the directory passed with `--config`). Every field is optional; unset
//! fields fall back to the defaults in `common::constants`.
//!
//! ```toml
//! #[Location]
//! city = "Makkah"                # City name as understood by the timings API
//! country = "Saudi Arabia"       # Country name
//! method = 2                     # Calculation method id (0-23)
//!
//! #[Reminders]
//! notifications = true           # Send desktop notifications
//! thirty_minute_reminder = true  # Remind 30 minutes before a prayer period ends
//!
//! #[Network]
//! retry_delay = 5                # Seconds between fetch retries (1-300)
//! request_timeout = 5            # HTTP timeout in seconds (1-60)
//! ```

pub mod builder;
pub mod loading;
pub mod validation;
pub mod watcher;


use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::api::Location;
use crate::common::constants::*;

pub use builder::{create_default_config, update_location};
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};
pub use watcher::start_config_watcher;

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// City passed to the timings API. Required to run.
    pub city: Option<String>,
    pub country: Option<String>,
    /// Aladhan calculation method id, passed through unchanged.
    pub method: Option<u8>,
    /// Whether reminders reach the desktop (otherwise they are only logged).
    pub notifications: Option<bool>,
    pub thirty_minute_reminder: Option<bool>,
    /// Seconds between fetch retries.
    pub retry_delay: Option<u64>,
    /// HTTP timeout in seconds.
    pub request_timeout: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        loading::load()
    }

    /// Configured location, or an error telling the user how to set one.
    pub fn location(&self) -> Result<Location> {
        match self.city.as_deref().map(str::trim) {
            Some(city) if !city.is_empty() => Ok(Location::new(
                city,
                self.country.as_deref().unwrap_or("").trim(),
            )),
            _ => anyhow::bail!(
                "No city configured. Run 'waqtbar city \"City, Country\"' to choose one"
            ),
        }
    }

    pub fn method(&self) -> u8 {
        self.method.unwrap_or(DEFAULT_METHOD)
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications.unwrap_or(DEFAULT_NOTIFICATIONS)
    }

    pub fn thirty_minute_reminder_enabled(&self) -> bool {
        self.thirty_minute_reminder
            .unwrap_or(DEFAULT_THIRTY_MINUTE_REMINDER)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
    }

    /// Log the effective settings as an indented block.
    pub fn log_config(&self) {
        log_block_start!(
            "Loaded configuration from {}",
            get_config_path()
                .map(|p| crate::common::utils::private_path(&p))
                .unwrap_or_else(|_| "defaults".to_string())
        );
        match self.location() {
            Ok(location) => log_indented!("Location: {location}"),
            Err(_) => log_indented!("Location: not set"),
        }
        log_indented!("Calculation method: {}", self.method());
        log_indented!(
            "Notifications: {}",
            if self.notifications_enabled() { "desktop" } else { "log only" }
        );
        log_indented!(
            "30-minute reminder: {}",
            if self.thirty_minute_reminder_enabled() { "on" } else { "off" }
        );
        log_indented!(
            "Retry delay: {}",
            crate::common::utils::plural(self.retry_delay().as_secs(), "second")
        );
    }
}
