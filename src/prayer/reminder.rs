//! Countdown text and reminder decisions for one tick.
//!
//! [`tick`] is a pure function over explicit state: the caller owns the
//! [`ReminderFlags`] value and threads the returned copy into the next tick.
//! Dispatching the produced [`ReminderEvent`]s is the caller's job.

use chrono::{NaiveDateTime, TimeDelta};

use super::PeriodState;
use crate::common::constants::{
    COUNTDOWN_UNAVAILABLE, PERIOD_STARTED_WINDOW_SECS, REMINDER_TITLE,
    THIRTY_MINUTE_REMINDER_SECS,
};

/// Which reminders have already fired for the current period instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderFlags {
    pub notified_30_minutes: bool,
    pub period_started_notified: bool,
    period: Option<PeriodState>,
}

impl ReminderFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Period these flags were last evaluated for.
    pub fn period(&self) -> Option<PeriodState> {
        self.period
    }

    fn for_period(self, period: Option<PeriodState>) -> Self {
        if self.period == period {
            self
        } else {
            Self {
                period,
                ..Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderEvent {
    /// Roughly thirty minutes remain in a canonical prayer period.
    ThirtyMinuteReminder(PeriodState),
    /// The given period is about to begin.
    PeriodStartedReminder(PeriodState),
}

impl ReminderEvent {
    pub fn title(&self) -> &'static str {
        REMINDER_TITLE
    }

    pub fn message(&self) -> String {
        match self {
            ReminderEvent::ThirtyMinuteReminder(state) => {
                format!("Approx. 30 minutes left for {state}.")
            }
            ReminderEvent::PeriodStartedReminder(state) => format!("{state} time started!"),
        }
    }
}

/// Result of one [`tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub countdown_text: String,
    pub events: Vec<ReminderEvent>,
    pub flags: ReminderFlags,
    /// Time left in the period; `None` when the countdown is unavailable.
    pub remaining: Option<TimeDelta>,
}

/// "{h}h {m}m {s}s" with whole seconds, truncating any fraction.
pub fn format_countdown(remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{}h {}m {}s", total / 3600, (total / 60) % 60, total % 60)
}

/// Advance the countdown for `label` ending at `next_boundary`.
///
/// Flags reset whenever `label` differs from the period they were recorded
/// for, and whenever the countdown is unavailable (no boundary, or the
/// boundary is not in the future).
pub fn tick(
    label: Option<PeriodState>,
    next_boundary: Option<NaiveDateTime>,
    now: NaiveDateTime,
    flags: ReminderFlags,
) -> TickOutcome {
    let mut flags = flags.for_period(label);

    let remaining = next_boundary
        .map(|boundary| boundary - now)
        .filter(|remaining| *remaining > TimeDelta::zero());

    let (Some(state), Some(remaining)) = (label, remaining) else {
        return TickOutcome {
            countdown_text: COUNTDOWN_UNAVAILABLE.to_string(),
            events: Vec::new(),
            flags: ReminderFlags {
                period: label,
                ..ReminderFlags::default()
            },
            remaining: None,
        };
    };

    let mut events = Vec::new();

    if remaining <= TimeDelta::seconds(THIRTY_MINUTE_REMINDER_SECS)
        && state.is_canonical_prayer()
        && !flags.notified_30_minutes
    {
        events.push(ReminderEvent::ThirtyMinuteReminder(state));
        flags.notified_30_minutes = true;
    }

    if remaining <= TimeDelta::seconds(PERIOD_STARTED_WINDOW_SECS) && !flags.period_started_notified
    {
        events.push(ReminderEvent::PeriodStartedReminder(state.next()));
        flags.period_started_notified = true;
    }

    TickOutcome {
        countdown_text: format_countdown(remaining),
        events,
        flags,
        remaining: Some(remaining),
    }
}
