use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::PrayerError;

/// The eleven liturgical periods of a prayer day, in cycle order.
///
/// Period *i* spans `[entry i, entry i+1)` of the boundary table; the
/// successor of [`PeriodState::Tahajjut`] is [`PeriodState::Fajr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PeriodState {
    Fajr,
    Makruh1,
    Duha,
    Makruh2,
    Zuhr,
    Asr,
    Makruh3,
    Maghrib,
    Isha,
    MidNight,
    Tahajjut,
}

impl PeriodState {
    pub const ALL: [PeriodState; 11] = [
        PeriodState::Fajr,
        PeriodState::Makruh1,
        PeriodState::Duha,
        PeriodState::Makruh2,
        PeriodState::Zuhr,
        PeriodState::Asr,
        PeriodState::Makruh3,
        PeriodState::Maghrib,
        PeriodState::Isha,
        PeriodState::MidNight,
        PeriodState::Tahajjut,
    ];

    /// Label shown in the status line and in reminders.
    pub fn label(self) -> &'static str {
        match self {
            PeriodState::Fajr => "FAJR",
            PeriodState::Makruh1 => "Makruh1",
            PeriodState::Duha => "DUHA",
            PeriodState::Makruh2 => "Makruh2",
            PeriodState::Zuhr => "ZUHR",
            PeriodState::Asr => "ASR",
            PeriodState::Makruh3 => "Makruh3",
            PeriodState::Maghrib => "MAGHRIB",
            PeriodState::Isha => "ISHA",
            PeriodState::MidNight => "Mid Night",
            PeriodState::Tahajjut => "TAHAJJUT",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Successor in the closed cycle.
    pub fn next(self) -> PeriodState {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// One of the five obligatory prayers.
    pub fn is_canonical_prayer(self) -> bool {
        matches!(
            self,
            PeriodState::Fajr
                | PeriodState::Zuhr
                | PeriodState::Asr
                | PeriodState::Maghrib
                | PeriodState::Isha
        )
    }

    pub fn is_makruh(self) -> bool {
        matches!(
            self,
            PeriodState::Makruh1 | PeriodState::Makruh2 | PeriodState::Makruh3
        )
    }
}

impl fmt::Display for PeriodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PeriodState {
    type Err = PrayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MidNight" => Ok(PeriodState::MidNight),
            _ => Self::ALL
                .into_iter()
                .find(|state| state.label() == s)
                .ok_or_else(|| PrayerError::InvalidState(s.to_string())),
        }
    }
}
