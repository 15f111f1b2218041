//! The periodic tick loop.
//!
//! [`PrayerClock`] owns one day's boundary table and the reminder flags and is
//! advanced with explicit instants. [`RunLoop`] wraps it with fetching,
//! presentation, notification dispatch and signal handling.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use crate::api::{ApiError, Location, RetryPolicy, TimingsProvider};
use crate::calendar;
use crate::common::constants::{FAILURE_RETRY_INTERVAL, TICK_INTERVAL};
use crate::config::{self, Config};
use crate::io::notify::Notifier;
use crate::io::signals::{SignalMessage, SignalState};
use crate::io::status_line::{StatusLine, status_text};
use crate::prayer::{
    BoundaryTable, Classification, PeriodState, PrayerError, RawTimings, ReminderEvent,
    ReminderFlags, TickOutcome, build, classify, tick,
};
use crate::time_source;

/// Result of advancing a [`PrayerClock`] to one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub classification: Classification,
    pub outcome: TickOutcome,
    /// Period observed on the previous step.
    pub previous: Option<PeriodState>,
}

impl Step {
    pub fn period_changed(&self) -> bool {
        self.previous != self.classification.state()
    }
}

pub struct PrayerClock {
    raw: RawTimings,
    table: BoundaryTable,
    flags: ReminderFlags,
    last_state: Option<PeriodState>,
}

impl PrayerClock {
    pub fn new(raw: RawTimings, date: NaiveDate) -> Result<Self, PrayerError> {
        let table = build(&raw, date)?;
        Ok(Self {
            raw,
            table,
            flags: ReminderFlags::new(),
            last_state: None,
        })
    }

    pub fn table(&self) -> &BoundaryTable {
        &self.table
    }

    pub fn raw(&self) -> &RawTimings {
        &self.raw
    }

    /// Swap in a new day's timings, keeping reminder state.
    pub fn refresh(&mut self, raw: RawTimings, date: NaiveDate) -> Result<(), PrayerError> {
        self.table = build(&raw, date)?;
        self.raw = raw;
        Ok(())
    }

    /// True once the local date no longer matches the table's reference date.
    pub fn needs_refresh(&self, now: NaiveDateTime) -> bool {
        now.date() != self.table.reference_date
    }

    pub fn step(&mut self, now: NaiveDateTime) -> Step {
        let classification = classify(Some(&self.table), now);
        let outcome = tick(
            classification.state(),
            classification.next_boundary(),
            now,
            self.flags,
        );
        self.flags = outcome.flags;
        let previous = std::mem::replace(&mut self.last_state, classification.state());
        Step {
            classification,
            outcome,
            previous,
        }
    }
}

/// Delay until the next tick given the time left in the current period.
///
/// Near a boundary the delay shrinks so that one tick lands inside the final
/// second (where the "period started" reminder fires) and the next one just
/// past the boundary.
pub fn next_delay(remaining: Option<TimeDelta>) -> Duration {
    let Some(remaining) = remaining else {
        return FAILURE_RETRY_INTERVAL;
    };
    let ms = remaining.num_milliseconds().max(0) as u64;
    match ms {
        1501.. => TICK_INTERVAL,
        1001..=1500 => Duration::from_millis(ms - 500),
        _ => Duration::from_millis(ms + 1),
    }
}

/// Builds a timings provider for the current configuration.
pub type ProviderFactory = Box<dyn Fn(&Config) -> Result<Box<dyn TimingsProvider>>>;

pub struct RunLoop<'a> {
    config: Config,
    location: Location,
    make_provider: ProviderFactory,
    provider: Box<dyn TimingsProvider>,
    notifier: Box<dyn Notifier>,
    signal_state: &'a SignalState,
    status_line: StatusLine,
    debug_enabled: bool,
    clock: Option<PrayerClock>,
    force_refresh: bool,
    last_error: Option<&'static str>,
    config_path: Option<PathBuf>,
}

impl<'a> RunLoop<'a> {
    pub fn new(
        config: Config,
        make_provider: ProviderFactory,
        notifier: Box<dyn Notifier>,
        signal_state: &'a SignalState,
    ) -> Result<Self> {
        let location = config.location()?;
        let provider = make_provider(&config)?;
        Ok(Self {
            config,
            location,
            make_provider,
            provider,
            notifier,
            signal_state,
            status_line: StatusLine::disabled(),
            debug_enabled: false,
            clock: None,
            force_refresh: false,
            last_error: None,
            config_path: None,
        })
    }

    pub fn with_status_line(mut self, status_line: StatusLine) -> Self {
        self.status_line = status_line;
        self
    }

    pub fn with_debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }

    /// Reload from `path` instead of the default config location.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn clock(&self) -> Option<&PrayerClock> {
        self.clock.as_ref()
    }

    /// Run until shutdown is requested or a simulation ends.
    pub fn run(mut self) -> Result<()> {
        while self.signal_state.is_running() && !time_source::simulation_ended() {
            let delay = self.tick_at(time_source::local_now());
            if let Some(message) = self.wait(delay)
                && !self.handle_message(message)
            {
                break;
            }
        }
        Ok(())
    }

    /// Act on a signal message. Returns false when the loop should stop.
    pub fn handle_message(&mut self, message: SignalMessage) -> bool {
        match message {
            SignalMessage::Shutdown => false,
            SignalMessage::Reload => {
                self.reload();
                true
            }
        }
    }

    /// Refresh if needed, advance the clock to `now` and present the result.
    /// Returns how long to wait before the next tick.
    ///
    /// A failed fetch is tried once per tick, so signals are still handled
    /// between attempts while the network is down.
    pub fn tick_at(&mut self, now: NaiveDateTime) -> Duration {
        let stale = self.clock.as_ref().is_none_or(|clock| clock.needs_refresh(now));
        if stale || self.force_refresh {
            self.force_refresh = false;
            self.refresh(now.date());
        }

        let Some(step) = self.clock.as_mut().map(|clock| clock.step(now)) else {
            let message = self.last_error.unwrap_or("Error fetching prayer times");
            self.render(&format!("{} {message}", self.location.city));
            return FAILURE_RETRY_INTERVAL;
        };

        self.present(&step);
        next_delay(step.outcome.remaining)
    }

    fn wait(&self, delay: Duration) -> Option<SignalMessage> {
        if time_source::is_simulated() {
            time_source::sleep(delay);
            return self.signal_state.signal_receiver.try_recv().ok();
        }
        match self.signal_state.signal_receiver.recv_timeout(delay) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                time_source::sleep(delay);
                None
            }
        }
    }

    fn refresh(&mut self, date: NaiveDate) {
        let policy = RetryPolicy::bounded(self.config.retry_delay(), 1);
        let fetched = policy.run(&self.signal_state.running, |_| {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Fetching timings for {}", self.location);
            }
            self.provider.fetch_timings(&self.location, date)
        });

        let raw = match fetched {
            Ok(raw) => raw,
            Err(ApiError::Cancelled) => return,
            Err(e) => {
                log_pipe!();
                log_error!("Error fetching prayer times: {e}");
                self.clock = None;
                self.last_error = Some("Error fetching prayer times");
                return;
            }
        };

        let built = if let Some(clock) = self.clock.as_mut() {
            clock.refresh(raw, date)
        } else {
            PrayerClock::new(raw, date).map(|clock| self.clock = Some(clock))
        };

        match built {
            Ok(()) => {
                self.last_error = None;
                self.log_day(date);
            }
            Err(e) => {
                log_pipe!();
                log_error!("Error calculating prayer times: {e}");
                self.clock = None;
                self.last_error = Some("Error calculating prayer times");
            }
        }
    }

    fn log_day(&self, date: NaiveDate) {
        let Some(clock) = &self.clock else {
            return;
        };
        let table = clock.table();

        log_block_start!("Prayer times for {} on {}", self.location, date.format("%Y-%m-%d"));
        for (name, time) in [
            ("Fajr", table.fajr_time),
            ("Sunrise", table.sunrise_time),
            ("Dhuhr", table.dhuhr_time),
            ("Asr", table.asr_time),
            ("Maghrib", table.maghrib_time),
            ("Isha", table.isha_time),
        ] {
            log_indented!("{name:<8} {}", time.format("%H:%M"));
        }

        let hijri = self
            .provider
            .fetch_hijri(date)
            .map_err(|e| e.to_string())
            .or_else(|_| calendar::to_hijri(date).map_err(|e| e.to_string()));
        match hijri {
            Ok(day) => log_indented!("Hijri date: {day}"),
            Err(e) => log_indented!("Hijri date unavailable: {e}"),
        }
    }

    fn present(&mut self, step: &Step) {
        if step.period_changed()
            && let Classification::Period {
                state,
                next_boundary,
            } = step.classification
        {
            log_block_start!("Entering {state}");
            log_indented!("Ends at {}", next_boundary.format("%H:%M:%S"));
        }

        for event in &step.outcome.events {
            if matches!(event, ReminderEvent::ThirtyMinuteReminder(_))
                && !self.config.thirty_minute_reminder_enabled()
            {
                continue;
            }
            if let Err(e) = self.notifier.notify(event.title(), &event.message()) {
                log_pipe!();
                log_warning!("Could not deliver reminder: {e}");
            }
        }

        self.render(&status_text(
            &self.location.city,
            step.classification.label(),
            &step.outcome.countdown_text,
        ));
    }

    fn render(&mut self, text: &str) {
        if let Err(e) = self.status_line.render(text) {
            log_warning!("Status line disabled: {e}");
            self.status_line = StatusLine::disabled();
        }
    }

    fn reload(&mut self) {
        log_block_start!("Reloading configuration");
        let loaded = match &self.config_path {
            Some(path) => config::load_from_path(path),
            None => Config::load(),
        };
        let config = match loaded {
            Ok(config) => config,
            Err(e) => {
                log_warning!("Keeping previous configuration: {e:#}");
                return;
            }
        };

        match (config.location(), (self.make_provider)(&config)) {
            (Ok(location), Ok(provider)) => {
                if location != self.location || config.method() != self.config.method() {
                    // A different city's table must not inherit this one's flags.
                    self.clock = None;
                }
                self.location = location;
                self.provider = provider;
                self.config = config;
                self.force_refresh = true;
                self.config.log_config();
            }
            (Err(e), _) | (_, Err(e)) => log_warning!("Keeping previous configuration: {e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTimingsProvider;
    use crate::io::notify::MockNotifier;
    use crate::logger::Log;
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::tempdir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn raw() -> RawTimings {
        RawTimings::new()
            .with("Fajr", "05:00")
            .with("Sunrise", "06:30")
            .with("Dhuhr", "12:00")
            .with("Asr", "15:30")
            .with("Maghrib", "17:45")
            .with("Isha", "21:49")
            .with("Lastthird", "02:30")
    }

    fn config() -> Config {
        Config {
            city: Some("Makkah".into()),
            country: Some("Saudi Arabia".into()),
            retry_delay: Some(1),
            ..Config::default()
        }
    }

    fn provider_returning(raw: RawTimings) -> ProviderFactory {
        Box::new(move |_| {
            let raw = raw.clone();
            let mut provider = MockTimingsProvider::new();
            provider
                .expect_fetch_timings()
                .returning(move |_, _| Ok(raw.clone()));
            provider
                .expect_fetch_hijri()
                .returning(|_| Err(ApiError::Status(503)));
            Ok(Box::new(provider))
        })
    }

    /// Fails for every city except Makkah, as the API does for unknown cities.
    fn provider_accepting_makkah(raw: RawTimings) -> ProviderFactory {
        Box::new(move |_| {
            let raw = raw.clone();
            let mut provider = MockTimingsProvider::new();
            provider
                .expect_fetch_timings()
                .returning(move |location, _| {
                    if location.city == "Makkah" {
                        Ok(raw.clone())
                    } else {
                        Err(ApiError::Status(400))
                    }
                });
            provider
                .expect_fetch_hijri()
                .returning(|_| Err(ApiError::Status(503)));
            Ok(Box::new(provider))
        })
    }

    fn write_config(dir: &std::path::Path, content: &str) -> PathBuf {
        let path = dir.join("waqtbar.toml");
        fs::write(&path, content).unwrap();
        path
    }

    const MAKKAH_CONFIG: &str = r#"
city = "Makkah"
country = "Saudi Arabia"
retry_delay = 1
"#;

    #[test]
    fn test_next_delay() {
        assert_eq!(next_delay(None), FAILURE_RETRY_INTERVAL);
        assert_eq!(next_delay(Some(TimeDelta::seconds(90))), TICK_INTERVAL);
        assert_eq!(
            next_delay(Some(TimeDelta::milliseconds(1400))),
            Duration::from_millis(900)
        );
        assert_eq!(
            next_delay(Some(TimeDelta::milliseconds(300))),
            Duration::from_millis(301)
        );
    }

    #[test]
    fn test_clock_reports_period_changes() {
        let mut clock = PrayerClock::new(raw(), date()).unwrap();

        let first = clock.step(at(1, 15, 0, 0));
        assert!(first.period_changed());
        assert_eq!(first.classification.state(), Some(PeriodState::Zuhr));

        let second = clock.step(at(1, 15, 0, 1));
        assert!(!second.period_changed());

        let third = clock.step(at(1, 15, 30, 0));
        assert!(third.period_changed());
        assert_eq!(third.previous, Some(PeriodState::Zuhr));
    }

    #[test]
    fn test_clock_needs_refresh_at_midnight() {
        let clock = PrayerClock::new(raw(), date()).unwrap();
        assert!(!clock.needs_refresh(at(1, 3, 0, 0)));
        assert!(!clock.needs_refresh(at(1, 23, 59, 59)));
        assert!(clock.needs_refresh(at(2, 0, 0, 0)));
        assert!(clock.needs_refresh(at(2, 5, 0, 0)));
        assert!(clock.needs_refresh(
            NaiveDate::from_ymd_opt(2023, 12, 31)
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap()
        ));
    }

    #[test]
    fn test_clock_refresh_keeps_reminder_state() {
        let mut clock = PrayerClock::new(raw(), date()).unwrap();
        let before = clock.step(at(2, 4, 59, 59));
        assert_eq!(
            before.outcome.events,
            vec![ReminderEvent::PeriodStartedReminder(PeriodState::Fajr)]
        );

        clock
            .refresh(raw(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .unwrap();
        let after = clock.step(at(2, 5, 0, 0));
        assert_eq!(after.classification.state(), Some(PeriodState::Fajr));
        assert_eq!(after.previous, Some(PeriodState::Tahajjut));
        assert!(after.outcome.events.is_empty());
    }

    #[test]
    fn test_run_loop_sends_thirty_minute_reminder_once() {
        Log::set_enabled(false);
        let signals = SignalState::detached();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .with(eq("Prayer Reminder"), eq("Approx. 30 minutes left for ASR."))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut run_loop =
            RunLoop::new(config(), provider_returning(raw()), Box::new(notifier), &signals)
                .unwrap();

        // ASR ends at 17:35 (Makruh before Maghrib).
        assert_eq!(run_loop.tick_at(at(1, 17, 5, 1)), TICK_INTERVAL);
        assert_eq!(run_loop.tick_at(at(1, 17, 5, 2)), TICK_INTERVAL);
        assert!(run_loop.clock().is_some());
    }

    #[test]
    fn test_run_loop_respects_disabled_thirty_minute_reminder() {
        Log::set_enabled(false);
        let signals = SignalState::detached();
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let config = Config {
            thirty_minute_reminder: Some(false),
            ..config()
        };
        let mut run_loop =
            RunLoop::new(config, provider_returning(raw()), Box::new(notifier), &signals)
                .unwrap();
        run_loop.tick_at(at(1, 17, 5, 1));
    }

    #[test]
    fn test_run_loop_falls_back_to_failure_cadence_on_bad_timings() {
        Log::set_enabled(false);
        let signals = SignalState::detached();
        let notifier = MockNotifier::new();

        let mut run_loop = RunLoop::new(
            config(),
            provider_returning(raw().with("Asr", "half past three")),
            Box::new(notifier),
            &signals,
        )
        .unwrap();

        assert_eq!(run_loop.tick_at(at(1, 12, 0, 0)), FAILURE_RETRY_INTERVAL);
        assert!(run_loop.clock().is_none());
    }

    #[test]
    fn test_run_loop_requires_location() {
        let signals = SignalState::detached();
        let result = RunLoop::new(
            Config::default(),
            provider_returning(raw()),
            Box::new(MockNotifier::new()),
            &signals,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_run_loop_tries_once_per_tick_when_fetch_fails() {
        Log::set_enabled(false);
        let signals = SignalState::detached();
        let factory: ProviderFactory = Box::new(|_| {
            let mut provider = MockTimingsProvider::new();
            provider
                .expect_fetch_timings()
                .times(2)
                .returning(|_, _| Err(ApiError::Status(400)));
            Ok(Box::new(provider))
        });

        let mut run_loop =
            RunLoop::new(config(), factory, Box::new(MockNotifier::new()), &signals).unwrap();

        assert_eq!(run_loop.tick_at(at(1, 12, 0, 0)), FAILURE_RETRY_INTERVAL);
        assert!(run_loop.clock().is_none());
        assert_eq!(run_loop.tick_at(at(1, 12, 1, 0)), FAILURE_RETRY_INTERVAL);
        assert!(run_loop.clock().is_none());
    }

    #[test]
    fn test_run_loop_handles_reload_after_failed_fetch() {
        Log::set_enabled(false);
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), MAKKAH_CONFIG);
        let signals = SignalState::detached();

        let misspelled = Config {
            city: Some("Mekka".into()),
            ..config()
        };
        let mut run_loop = RunLoop::new(
            misspelled,
            provider_accepting_makkah(raw()),
            Box::new(MockNotifier::new()),
            &signals,
        )
        .unwrap()
        .with_config_path(path);

        assert_eq!(run_loop.tick_at(at(1, 12, 0, 0)), FAILURE_RETRY_INTERVAL);
        assert!(run_loop.clock().is_none());

        signals.signal_sender.send(SignalMessage::Reload).unwrap();
        let message = run_loop.wait(Duration::ZERO);
        assert_eq!(message, Some(SignalMessage::Reload));
        assert!(run_loop.handle_message(SignalMessage::Reload));

        assert_eq!(run_loop.tick_at(at(1, 12, 0, 1)), TICK_INTERVAL);
        assert!(run_loop.clock().is_some());
    }

    #[test]
    fn test_run_loop_stops_on_shutdown_message() {
        let signals = SignalState::detached();
        let mut run_loop = RunLoop::new(
            config(),
            provider_returning(raw()),
            Box::new(MockNotifier::new()),
            &signals,
        )
        .unwrap();
        assert!(!run_loop.handle_message(SignalMessage::Shutdown));
    }

    #[test]
    fn test_run_loop_rolls_over_at_midnight() {
        Log::set_enabled(false);
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), MAKKAH_CONFIG);
        let signals = SignalState::detached();
        let mut run_loop = RunLoop::new(
            config(),
            provider_returning(raw()),
            Box::new(MockNotifier::new()),
            &signals,
        )
        .unwrap()
        .with_config_path(path);

        run_loop.tick_at(at(1, 22, 0, 0));
        assert_eq!(run_loop.clock().unwrap().table().reference_date, date());

        run_loop.tick_at(at(2, 1, 0, 0));
        let table = run_loop.clock().unwrap().table().clone();
        assert_eq!(table.reference_date, date() + TimeDelta::days(1));
        let before_reload = classify(Some(&table), at(2, 1, 0, 1));
        assert_eq!(
            before_reload,
            Classification::Period {
                state: PeriodState::Tahajjut,
                next_boundary: at(2, 5, 0, 0),
            }
        );

        // Reloading an unchanged config keeps the same day's table.
        assert!(run_loop.handle_message(SignalMessage::Reload));
        run_loop.tick_at(at(2, 1, 0, 1));
        let after_reload = classify(Some(run_loop.clock().unwrap().table()), at(2, 1, 0, 1));
        assert_eq!(after_reload, before_reload);
    }

    #[test]
    fn test_reload_with_same_location_keeps_reminder_flags() {
        Log::set_enabled(false);
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), MAKKAH_CONFIG);
        let signals = SignalState::detached();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .with(eq("Prayer Reminder"), eq("Approx. 30 minutes left for ASR."))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut run_loop =
            RunLoop::new(config(), provider_returning(raw()), Box::new(notifier), &signals)
                .unwrap()
                .with_config_path(path);

        run_loop.tick_at(at(1, 17, 5, 1));
        assert!(run_loop.handle_message(SignalMessage::Reload));
        assert!(run_loop.clock().is_some());
        assert_eq!(run_loop.tick_at(at(1, 17, 5, 2)), TICK_INTERVAL);
    }

    #[test]
    fn test_reload_with_new_city_or_method_resets_clock() {
        Log::set_enabled(false);
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), MAKKAH_CONFIG);
        let signals = SignalState::detached();
        let mut run_loop = RunLoop::new(
            config(),
            provider_returning(raw()),
            Box::new(MockNotifier::new()),
            &signals,
        )
        .unwrap()
        .with_config_path(path);

        run_loop.tick_at(at(1, 12, 0, 0));
        assert!(run_loop.clock().is_some());

        write_config(dir.path(), "city = \"Cairo\"\ncountry = \"Egypt\"\n");
        run_loop.handle_message(SignalMessage::Reload);
        assert!(run_loop.clock().is_none());

        run_loop.tick_at(at(1, 12, 0, 1));
        assert!(run_loop.clock().is_some());

        write_config(
            dir.path(),
            "city = \"Cairo\"\ncountry = \"Egypt\"\nmethod = 5\n",
        );
        run_loop.handle_message(SignalMessage::Reload);
        assert!(run_loop.clock().is_none());
    }

    #[test]
    fn test_reload_keeps_previous_config_on_invalid_file() {
        Log::set_enabled(false);
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "method = 99\n");
        let signals = SignalState::detached();
        let mut run_loop = RunLoop::new(
            config(),
            provider_returning(raw()),
            Box::new(MockNotifier::new()),
            &signals,
        )
        .unwrap()
        .with_config_path(path);

        run_loop.tick_at(at(1, 12, 0, 0));
        run_loop.handle_message(SignalMessage::Reload);
        assert!(run_loop.clock().is_some());
        assert_eq!(run_loop.tick_at(at(1, 12, 0, 1)), TICK_INTERVAL);
    }
}
