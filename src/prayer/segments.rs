//! Derivation of the daily boundary table from raw timings.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

use super::timings::{RawTimings, parse_clock};
use super::PrayerError;
use crate::common::constants::{
    MAKRUH_AFTER_SUNRISE_MINUTES, MAKRUH_BEFORE_DHUHR_MINUTES, MAKRUH_BEFORE_MAGHRIB_MINUTES,
    MISSING_TIME_FALLBACK,
};
use crate::time_source;

/// Named entries of a [`BoundaryTable`], in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    Fajr,
    Sunrise,
    Haram1End,
    Dhuhr,
    Haram2Start,
    Asr,
    Haram3Start,
    Maghrib,
    Isha,
    Midnight,
    LastThird,
    NextFajr,
}

impl Boundary {
    pub const ALL: [Boundary; 12] = [
        Boundary::Fajr,
        Boundary::Sunrise,
        Boundary::Haram1End,
        Boundary::Dhuhr,
        Boundary::Haram2Start,
        Boundary::Asr,
        Boundary::Haram3Start,
        Boundary::Maghrib,
        Boundary::Isha,
        Boundary::Midnight,
        Boundary::LastThird,
        Boundary::NextFajr,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Boundary::Fajr => "fajr_time",
            Boundary::Sunrise => "sunrise_time",
            Boundary::Haram1End => "haram1_end",
            Boundary::Dhuhr => "dhuhr_time",
            Boundary::Haram2Start => "haram2_start",
            Boundary::Asr => "asr_time",
            Boundary::Haram3Start => "haram3_start",
            Boundary::Maghrib => "maghrib_time",
            Boundary::Isha => "isha_time",
            Boundary::Midnight => "midnight_time",
            Boundary::LastThird => "lastthird_time",
            Boundary::NextFajr => "next_fajr_time",
        }
    }
}

/// Twelve ordered timestamps splitting one prayer day into eleven periods.
///
/// All entries are anchored to `reference_date` except `lastthird_time` and
/// `next_fajr_time`, which belong to the following day. Entries are expected
/// to be non-decreasing, but a table built from corrupt input is kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundaryTable {
    pub reference_date: NaiveDate,
    pub fajr_time: NaiveDateTime,
    pub sunrise_time: NaiveDateTime,
    pub haram1_end: NaiveDateTime,
    pub dhuhr_time: NaiveDateTime,
    pub haram2_start: NaiveDateTime,
    pub asr_time: NaiveDateTime,
    pub haram3_start: NaiveDateTime,
    pub maghrib_time: NaiveDateTime,
    pub isha_time: NaiveDateTime,
    pub midnight_time: NaiveDateTime,
    pub lastthird_time: NaiveDateTime,
    pub next_fajr_time: NaiveDateTime,
}

impl BoundaryTable {
    pub fn get(&self, boundary: Boundary) -> NaiveDateTime {
        match boundary {
            Boundary::Fajr => self.fajr_time,
            Boundary::Sunrise => self.sunrise_time,
            Boundary::Haram1End => self.haram1_end,
            Boundary::Dhuhr => self.dhuhr_time,
            Boundary::Haram2Start => self.haram2_start,
            Boundary::Asr => self.asr_time,
            Boundary::Haram3Start => self.haram3_start,
            Boundary::Maghrib => self.maghrib_time,
            Boundary::Isha => self.isha_time,
            Boundary::Midnight => self.midnight_time,
            Boundary::LastThird => self.lastthird_time,
            Boundary::NextFajr => self.next_fajr_time,
        }
    }

    /// The twelve entries in table order.
    pub fn entries(&self) -> [(Boundary, NaiveDateTime); 12] {
        Boundary::ALL.map(|b| (b, self.get(b)))
    }

    pub fn is_monotonic(&self) -> bool {
        self.entries().windows(2).all(|w| w[0].1 <= w[1].1)
    }
}

fn field(raw: &RawTimings, name: &str, date: NaiveDate) -> Result<NaiveDateTime, PrayerError> {
    parse_clock(name, raw.get(name).unwrap_or(MISSING_TIME_FALLBACK), date)
}

/// Build the boundary table for `reference_date`.
///
/// Missing period names fall back to local midnight; malformed ones fail with
/// [`PrayerError::Parse`]. An empty map fails with [`PrayerError::MissingInput`].
pub fn build(raw: &RawTimings, reference_date: NaiveDate) -> Result<BoundaryTable, PrayerError> {
    if raw.is_empty() {
        return Err(PrayerError::MissingInput);
    }

    let fajr_time = field(raw, "Fajr", reference_date)?;
    let sunrise_time = field(raw, "Sunrise", reference_date)?;
    let dhuhr_time = field(raw, "Dhuhr", reference_date)?;
    let asr_time = field(raw, "Asr", reference_date)?;
    let maghrib_time = field(raw, "Maghrib", reference_date)?;
    let isha_time = field(raw, "Isha", reference_date)?;
    let lastthird_time = field(raw, "Lastthird", reference_date)? + TimeDelta::days(1);

    // Midpoint of the night, measured forward from Maghrib to the next Fajr.
    let mut night = fajr_time - maghrib_time;
    if night < TimeDelta::zero() {
        night += TimeDelta::days(1);
    }
    let midnight_time = maghrib_time + night / 2;

    Ok(BoundaryTable {
        reference_date,
        fajr_time,
        sunrise_time,
        haram1_end: sunrise_time + TimeDelta::minutes(MAKRUH_AFTER_SUNRISE_MINUTES),
        dhuhr_time,
        haram2_start: dhuhr_time - TimeDelta::minutes(MAKRUH_BEFORE_DHUHR_MINUTES),
        asr_time,
        haram3_start: maghrib_time - TimeDelta::minutes(MAKRUH_BEFORE_MAGHRIB_MINUTES),
        maghrib_time,
        isha_time,
        midnight_time,
        lastthird_time,
        next_fajr_time: fajr_time + TimeDelta::days(1),
    })
}

/// [`build`] for the time source's current local date.
pub fn build_for_today(raw: &RawTimings) -> Result<BoundaryTable, PrayerError> {
    build(raw, time_source::local_now().date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn sample() -> RawTimings {
        RawTimings::new()
            .with("Fajr", "05:00")
            .with("Sunrise", "06:30")
            .with("Dhuhr", "12:00")
            .with("Asr", "15:30")
            .with("Maghrib", "17:45")
            .with("Isha", "21:49")
            .with("Lastthird", "00:00")
    }

    #[test]
    fn test_build_sample_day() {
        let table = build(&sample(), reference()).unwrap();

        assert_eq!(table.fajr_time, jan(1, 5, 0, 0));
        assert_eq!(table.haram1_end, jan(1, 6, 40, 0));
        assert_eq!(table.haram2_start, jan(1, 11, 55, 0));
        assert_eq!(table.haram3_start, jan(1, 17, 35, 0));
        assert_eq!(table.midnight_time, jan(1, 23, 22, 30));
        assert_eq!(table.lastthird_time, jan(2, 0, 0, 0));
        assert_eq!(table.next_fajr_time, jan(2, 5, 0, 0));
        assert!(table.is_monotonic());
    }

    #[test]
    fn test_entries_follow_table_order() {
        let table = build(&sample(), reference()).unwrap();
        let keys: Vec<_> = table.entries().iter().map(|(b, _)| b.key()).collect();
        assert_eq!(keys.first(), Some(&"fajr_time"));
        assert_eq!(keys.last(), Some(&"next_fajr_time"));
        assert_eq!(keys.len(), 12);
    }

    #[test]
    fn test_missing_dhuhr_defaults_to_midnight() {
        let mut raw = sample();
        raw = raw.iter().filter(|(k, _)| *k != "Dhuhr").collect();

        let table = build(&raw, reference()).unwrap();
        assert_eq!(table.dhuhr_time, jan(1, 0, 0, 0));
        assert_eq!(
            table.haram2_start,
            NaiveDate::from_ymd_opt(2023, 12, 31)
                .unwrap()
                .and_hms_opt(23, 55, 0)
                .unwrap()
        );
        assert!(!table.is_monotonic());
    }

    #[test]
    fn test_build_for_today_uses_local_date() {
        let before = time_source::local_now().date();
        let table = build_for_today(&sample()).unwrap();
        let after = time_source::local_now().date();

        assert!(table.reference_date == before || table.reference_date == after);
        assert_eq!(table, build(&sample(), table.reference_date).unwrap());
        assert_eq!(table.fajr_time.date(), table.reference_date);
    }

    #[test]
    fn test_empty_input_is_missing_input() {
        assert_eq!(
            build(&RawTimings::new(), reference()),
            Err(PrayerError::MissingInput)
        );
    }

    #[test]
    fn test_malformed_field_is_parse_error() {
        let raw = sample().with("Asr", "3.30pm");
        assert!(matches!(
            build(&raw, reference()),
            Err(PrayerError::Parse { field, .. }) if field == "Asr"
        ));
    }

    #[test]
    fn test_midnight_when_fajr_precedes_maghrib_numerically() {
        // Night length 05:00 - 17:45 wraps: 11h15m, half is 5h37m30s.
        let table = build(&sample(), reference()).unwrap();
        assert_eq!(table.midnight_time - table.maghrib_time, TimeDelta::seconds(20_250));
    }

    #[test]
    fn test_midnight_without_wrap() {
        // Corrupt ordering: fajr after maghrib on the same date.
        let raw = sample().with("Fajr", "19:45").with("Maghrib", "17:45");
        let table = build(&raw, reference()).unwrap();
        assert_eq!(table.midnight_time, jan(1, 18, 45, 0));
    }
}
