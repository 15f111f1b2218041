//! End-to-end checks over the reference day used throughout the docs:
//! 2024-01-01 with Fajr 05:00, Sunrise 06:30, Dhuhr 12:00, Asr 15:30,
//! Maghrib 17:45, Isha 21:49 and Lastthird 00:00.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use waqtbar::prayer::{
    PeriodState, PrayerError, RawTimings, ReminderEvent, ReminderFlags, build, classify,
    next_state, tick,
};
use waqtbar::runner::{PrayerClock, next_delay};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, m, s).unwrap()
}

fn raw() -> RawTimings {
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
fn test_reference_table() {
    let table = build(&raw(), day(1)).unwrap();
    assert_eq!(table.haram1_end, at(1, 6, 40, 0));
    assert_eq!(table.haram2_start, at(1, 11, 55, 0));
    assert_eq!(table.haram3_start, at(1, 17, 35, 0));
    assert_eq!(table.midnight_time, at(1, 23, 22, 30));
    assert_eq!(table.lastthird_time, at(2, 0, 0, 0));
    assert_eq!(table.next_fajr_time, at(2, 5, 0, 0));
}

#[test]
fn test_classification_samples() {
    let table = build(&raw(), day(1)).unwrap();
    let cases = [
        (at(1, 5, 0, 0), "FAJR", at(1, 6, 30, 0)),
        (at(1, 6, 35, 0), "Makruh1", at(1, 6, 40, 0)),
        (at(1, 9, 0, 0), "DUHA", at(1, 11, 55, 0)),
        (at(1, 11, 58, 0), "Makruh2", at(1, 12, 0, 0)),
        (at(1, 17, 40, 0), "Makruh3", at(1, 17, 45, 0)),
        (at(1, 23, 30, 0), "Mid Night", at(2, 0, 0, 0)),
        (at(2, 1, 0, 0), "TAHAJJUT", at(2, 5, 0, 0)),
        // Before the day's Fajr the fallback points at today's Fajr.
        (at(1, 3, 0, 0), "TAHAJJUT", at(1, 5, 0, 0)),
    ];
    for (now, label, next) in cases {
        let classification = classify(Some(&table), now);
        assert_eq!(classification.label(), label, "at {now}");
        assert_eq!(classification.next_boundary(), Some(next), "at {now}");
    }
    assert_eq!(classify(None, at(1, 12, 0, 0)).label(), "UNKNOWN");
}

#[test]
fn test_next_state_by_label() {
    assert_eq!(next_state("ISHA").unwrap(), PeriodState::MidNight);
    assert_eq!(next_state("TAHAJJUT").unwrap(), PeriodState::Fajr);
    assert!(matches!(
        next_state("BOGUS"),
        Err(PrayerError::InvalidState(_))
    ));
}

#[test]
fn test_thirty_minute_reminder_scenario() {
    let now = at(1, 17, 0, 0);
    let boundary = now + TimeDelta::seconds(1799);

    let first = tick(Some(PeriodState::Asr), Some(boundary), now, ReminderFlags::new());
    assert_eq!(
        first.events,
        vec![ReminderEvent::ThirtyMinuteReminder(PeriodState::Asr)]
    );
    assert_eq!(first.countdown_text, "0h 29m 59s");

    let later = now + TimeDelta::seconds(1);
    let second = tick(Some(PeriodState::Asr), Some(boundary), later, first.flags);
    assert!(second.events.is_empty());
}

#[test]
fn test_missing_dhuhr_defaults_to_midnight() {
    let timings = raw();
    let without_dhuhr: RawTimings = timings
        .iter()
        .filter(|(name, _)| *name != "Dhuhr")
        .collect();
    let table = build(&without_dhuhr, day(1)).unwrap();
    assert_eq!(table.dhuhr_time, at(1, 0, 0, 0));
    assert_eq!(table.haram2_start, at(1, 0, 0, 0) - TimeDelta::minutes(5));
}

/// Walk a whole cycle at the run loop's own cadence and count reminders.
#[test]
fn test_full_day_walk_fires_each_reminder_once() {
    let mut clock = PrayerClock::new(raw(), day(1)).unwrap();
    let end = clock.table().next_fajr_time;

    let mut now = at(1, 5, 0, 0);
    let mut started = Vec::new();
    let mut thirty = Vec::new();
    let mut changes = 0;

    while now <= end {
        let step = clock.step(now);
        if step.period_changed() {
            changes += 1;
        }
        for event in step.outcome.events {
            match event {
                ReminderEvent::PeriodStartedReminder(state) => started.push(state),
                ReminderEvent::ThirtyMinuteReminder(state) => thirty.push(state),
            }
        }
        let delay = next_delay(step.outcome.remaining);
        now += TimeDelta::from_std(delay).unwrap();
    }

    let mut expected_started: Vec<PeriodState> = PeriodState::ALL[1..].to_vec();
    expected_started.push(PeriodState::Fajr);
    assert_eq!(started, expected_started);

    assert_eq!(
        thirty,
        vec![
            PeriodState::Fajr,
            PeriodState::Zuhr,
            PeriodState::Asr,
            PeriodState::Maghrib,
            PeriodState::Isha,
        ]
    );

    // The fallback after the cycle keeps the TAHAJJUT label.
    assert_eq!(changes, 11);
    assert!(clock.needs_refresh(now));
}
