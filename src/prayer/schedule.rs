//! Daily summary of prayer times and auxiliary windows.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

use super::{BoundaryTable, RawTimings};
use crate::common::constants::DUHA_AFTER_SUNRISE_MINUTES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub name: &'static str,
    pub time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub name: &'static str,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// "hh:mm AM - hh:mm PM"
    pub fn display(&self) -> String {
        format!("{} - {}", format_12h(self.start), format_12h(self.end))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub prayers: Vec<ScheduleEntry>,
    /// Pre-dawn fasting cutoff; absent when the API omits or garbles it.
    pub imsak: Option<NaiveTime>,
    pub tahajjud: TimeWindow,
    pub makruh: Vec<TimeWindow>,
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

impl DaySchedule {
    /// Makruh windows use the classifier's margins, so "Before Maghrib" starts
    /// 10 minutes before Maghrib.
    pub fn new(table: &BoundaryTable, raw: &RawTimings) -> Self {
        let prayers = vec![
            ScheduleEntry {
                name: "Fajr",
                time: table.fajr_time,
            },
            ScheduleEntry {
                name: "Duha",
                time: table.sunrise_time + TimeDelta::minutes(DUHA_AFTER_SUNRISE_MINUTES),
            },
            ScheduleEntry {
                name: "Zuhr",
                time: table.dhuhr_time,
            },
            ScheduleEntry {
                name: "Asr",
                time: table.asr_time,
            },
            ScheduleEntry {
                name: "Maghrib",
                time: table.maghrib_time,
            },
            ScheduleEntry {
                name: "Esha",
                time: table.isha_time,
            },
        ];

        let makruh = vec![
            TimeWindow {
                name: "After Fajr",
                start: table.fajr_time,
                end: table.sunrise_time,
            },
            TimeWindow {
                name: "Before Zuhr",
                start: table.haram2_start,
                end: table.dhuhr_time,
            },
            TimeWindow {
                name: "Before Maghrib",
                start: table.haram3_start,
                end: table.maghrib_time,
            },
        ];

        Self {
            date: table.reference_date,
            prayers,
            imsak: raw
                .get("Imsak")
                .and_then(|clock| NaiveTime::parse_from_str(clock.trim(), "%H:%M").ok()),
            tahajjud: TimeWindow {
                name: "Tahajjud",
                start: table.lastthird_time,
                end: table.next_fajr_time,
            },
            makruh,
            sunrise: table.sunrise_time,
            sunset: table.maghrib_time,
        }
    }
}

/// 12-hour clock, e.g. "05:00 AM".
pub fn format_12h(time: NaiveDateTime) -> String {
    time.format("%I:%M %p").to_string()
}
