//! Application-wide constants and configuration defaults.

use std::time::Duration;

// # Period Boundary Margins

/// Makruh window after sunrise (sunrise_time → haram1_end).
pub const MAKRUH_AFTER_SUNRISE_MINUTES: i64 = 10;

/// Makruh window before the noon prayer (haram2_start → dhuhr_time).
pub const MAKRUH_BEFORE_DHUHR_MINUTES: i64 = 5;

/// Makruh window before sunset (haram3_start → maghrib_time).
pub const MAKRUH_BEFORE_MAGHRIB_MINUTES: i64 = 10;

/// Duha is displayed this long after sunrise.
pub const DUHA_AFTER_SUNRISE_MINUTES: i64 = 20;

/// Substituted for any period name missing from the raw timings.
pub const MISSING_TIME_FALLBACK: &str = "00:00";

// # Reminders

/// Upper bound (inclusive) of the "30 minutes left" reminder window, in seconds.
pub const THIRTY_MINUTE_REMINDER_SECS: i64 = 30 * 60;

/// Upper bound (inclusive) of the "period started" reminder window, in seconds.
pub const PERIOD_STARTED_WINDOW_SECS: i64 = 1;

pub const REMINDER_TITLE: &str = "Prayer Reminder";

pub const COUNTDOWN_UNAVAILABLE: &str = "Countdown unavailable";

/// Desktop notification expiry in milliseconds.
pub const NOTIFICATION_TIMEOUT_MS: i32 = 5_000;

// # Run Loop Cadence

/// Baseline tick while a countdown is running.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Tick cadence after a fetch/build failure or with no countdown.
pub const FAILURE_RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// Granularity at which retry waits check for cancellation.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

// # Network

pub const ALADHAN_BASE_URL: &str = "https://api.aladhan.com/v1";
pub const CITY_CATALOG_URL: &str = "https://countriesnow.space/api/v0.1/countries";

/// Bounded attempts for one-shot commands (`status`, `city`).
pub const ONE_SHOT_FETCH_ATTEMPTS: u32 = 3;

// # Configuration Defaults

pub const DEFAULT_METHOD: u8 = 2;
pub const DEFAULT_NOTIFICATIONS: bool = true;
pub const DEFAULT_THIRTY_MINUTE_REMINDER: bool = true;
pub const DEFAULT_RETRY_DELAY: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 5;

// # Validation Limits

pub const MAXIMUM_METHOD: u8 = 23;
pub const MINIMUM_RETRY_DELAY: u64 = 1;
pub const MAXIMUM_RETRY_DELAY: u64 = 300;
pub const MINIMUM_REQUEST_TIMEOUT: u64 = 1;
pub const MAXIMUM_REQUEST_TIMEOUT: u64 = 60;

// # Exit Codes

pub const EXIT_FAILURE: i32 = 1;
