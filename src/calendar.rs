//! Hijri date display with an offline converter.

use chrono::{Datelike, NaiveDate};
use hijri_date::HijriDate;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub const HIJRI_MIN_YEAR: i32 = 1938;
pub const HIJRI_MAX_YEAR: i32 = 2076;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("{0} is outside the supported range ({HIJRI_MIN_YEAR}-{HIJRI_MAX_YEAR})")]
    OutOfRange(NaiveDate),
}

/// A Hijri date ready for display, e.g. "09 Jumada al-Akhirah 1446".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HijriDay {
    pub day: u32,
    pub month_name: String,
    pub year: u32,
}

impl fmt::Display for HijriDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02} {} {}", self.day, self.month_name, self.year)
    }
}

pub fn month_name(month: usize) -> &'static str {
    match month {
        1 => "Muharram",
        2 => "Safar",
        3 => "Rabi' al-Awwal",
        4 => "Rabi' al-Thani",
        5 => "Jumada al-Ula",
        6 => "Jumada al-Akhirah",
        7 => "Rajab",
        8 => "Sha'ban",
        9 => "Ramadan",
        10 => "Shawwal",
        11 => "Dhu al-Qi'dah",
        12 => "Dhu al-Hijjah",
        _ => "Unknown",
    }
}

/// Convert a Gregorian date without network access.
pub fn to_hijri(date: NaiveDate) -> Result<HijriDay, CalendarError> {
    if !(HIJRI_MIN_YEAR..=HIJRI_MAX_YEAR).contains(&date.year()) {
        return Err(CalendarError::OutOfRange(date));
    }

    let hijri = HijriDate::from_gr(
        date.year() as usize,
        date.month() as usize,
        date.day() as usize,
    )
    .map_err(|_| CalendarError::OutOfRange(date))?;

    Ok(HijriDay {
        day: hijri.day() as u32,
        month_name: month_name(hijri.month()).to_string(),
        year: hijri.year() as u32,
    })
}
