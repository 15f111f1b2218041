//! # waqtbar
//!
//! Prayer-times status line with a live countdown to the end of the current
//! period and desktop reminders.
//!
//! - **Prayer core** (`prayer`): boundary table construction, period
//!   classification and reminder decisions as pure functions over explicit
//!   `NaiveDateTime` values.
//! - **Sources** (`api`, `calendar`): Aladhan timings and Hijri dates, the city
//!   catalog, and an offline Hijri converter.
//! - **Runtime** (`runner`, `io`, `time_source`): the tick loop, signals, the
//!   lock file, notifications and the terminal status line.
//! - **Configuration** (`config`): TOML settings with validation and hot reload.
//! - **Commands** (`commands`): `status`, `city`, `simulate`, `help`.

#[macro_use]
pub mod logger;

pub mod api;
pub mod args;
pub mod calendar;
pub mod commands;
pub mod common;
pub mod config;
pub mod io;
pub mod prayer;
pub mod runner;
pub mod time_source;

mod waqtbar;

pub use waqtbar::{Waqtbar, aladhan_provider};
