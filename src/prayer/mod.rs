//! Prayer-period core: segmentation, classification and countdown reminders.
//!
//! Everything here is pure. Callers supply the raw timings, the reference date
//! and "now"; nothing in this module performs I/O, and only
//! [`segments::build_for_today`] reads the clock.
//!
//! - [`segments::build`] turns one day of raw "HH:MM" strings into a [`BoundaryTable`].
//! - [`classifier::classify`] locates "now" within the table's eleven periods.
//! - [`reminder::tick`] produces the countdown text and any due reminders.
//! - [`schedule::DaySchedule`] summarizes the day for the `status` command.

pub mod classifier;
pub mod error;
pub mod period;
pub mod reminder;
pub mod schedule;
pub mod segments;
pub mod timings;

pub use classifier::{Classification, classify, next_state};
pub use error::PrayerError;
pub use period::PeriodState;
pub use reminder::{ReminderEvent, ReminderFlags, TickOutcome, format_countdown, tick};
pub use schedule::DaySchedule;
pub use segments::{Boundary, BoundaryTable, build, build_for_today};
pub use timings::RawTimings;
