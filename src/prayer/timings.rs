//! Raw per-day clock strings as delivered by the timings API.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::PrayerError;

/// Period name → "HH:MM" (24-hour) for one calendar day.
///
/// Deserialized verbatim from the API, so it may carry extra keys
/// (Sunset, Midnight, Firstthird, ...) and may lack some the core needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTimings(BTreeMap<String, String>);

impl RawTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, name: &str, clock: &str) -> Self {
        self.0.insert(name.to_string(), clock.to_string());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, clock: impl Into<String>) {
        self.0.insert(name.into(), clock.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawTimings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Anchor a lenient "H:M" clock string to `date`.
///
/// Hours and minutes are taken as plain signed integers and added to local
/// midnight without range checks, so "25:70" lands at 02:10 the next day.
pub fn parse_clock(field: &str, value: &str, date: NaiveDate) -> Result<NaiveDateTime, PrayerError> {
    let parse_error = || PrayerError::Parse {
        field: field.to_string(),
        value: value.to_string(),
    };

    let mut parts = value.split(':');
    let (Some(hours), Some(minutes), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(parse_error());
    };
    let hours: i64 = hours.trim().parse().map_err(|_| parse_error())?;
    let minutes: i64 = minutes.trim().parse().map_err(|_| parse_error())?;

    let offset = TimeDelta::try_hours(hours)
        .zip(TimeDelta::try_minutes(minutes))
        .and_then(|(h, m)| h.checked_add(&m))
        .ok_or_else(parse_error)?;

    date.and_time(NaiveTime::MIN)
        .checked_add_signed(offset)
        .ok_or_else(parse_error)
}
