//! Locating an instant within the day's periods.

use chrono::{NaiveDateTime, TimeDelta};

use super::{BoundaryTable, PeriodState, PrayerError};

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// `now` belongs to `state`, which ends at `next_boundary`.
    Period {
        state: PeriodState,
        next_boundary: NaiveDateTime,
    },
    /// No boundary table is available.
    Unknown,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Period { state, .. } => state.label(),
            Classification::Unknown => "UNKNOWN",
        }
    }

    pub fn state(&self) -> Option<PeriodState> {
        match self {
            Classification::Period { state, .. } => Some(*state),
            Classification::Unknown => None,
        }
    }

    pub fn next_boundary(&self) -> Option<NaiveDateTime> {
        match self {
            Classification::Period { next_boundary, .. } => Some(*next_boundary),
            Classification::Unknown => None,
        }
    }

    /// Time left until the period ends, if it has not ended yet.
    pub fn remaining(&self, now: NaiveDateTime) -> Option<TimeDelta> {
        self.next_boundary()
            .map(|boundary| boundary - now)
            .filter(|remaining| *remaining > TimeDelta::zero())
    }
}

/// Find the period containing `now`.
///
/// Periods are tested in table order and the first half-open interval
/// containing `now` wins. An instant outside every interval (before Fajr,
/// past the next Fajr, or in a gap of a disordered table) is reported as
/// TAHAJJUT ending at today's Fajr.
pub fn classify(table: Option<&BoundaryTable>, now: NaiveDateTime) -> Classification {
    let Some(table) = table else {
        return Classification::Unknown;
    };

    let entries = table.entries();
    PeriodState::ALL
        .into_iter()
        .zip(entries.windows(2))
        .find_map(|(state, bounds)| {
            let (start, end) = (bounds[0].1, bounds[1].1);
            (start <= now && now < end).then_some(Classification::Period {
                state,
                next_boundary: end,
            })
        })
        .unwrap_or(Classification::Period {
            state: PeriodState::Tahajjut,
            next_boundary: table.fajr_time,
        })
}

/// Successor of the period named `label`.
pub fn next_state(label: &str) -> Result<PeriodState, PrayerError> {
    label.parse::<PeriodState>().map(PeriodState::next)
}
