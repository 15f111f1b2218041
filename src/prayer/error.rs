use thiserror::Error;

/// Failures of the pure prayer core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrayerError {
    /// The raw timings map was empty.
    #[error("no prayer timings were provided")]
    MissingInput,

    /// A clock string could not be read as "HH:MM".
    #[error("could not parse {field} time {value:?} (expected HH:MM)")]
    Parse { field: String, value: String },

    /// A label does not name any of the eleven periods.
    #[error("unknown period label {0:?}")]
    InvalidState(String),
}
