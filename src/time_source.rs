//! Real and simulated clocks.
//!
//! Everything that needs "now" outside the pure prayer core asks this module,
//! so `waqtbar simulate` can drive the whole run loop through a day of period
//! changes without waiting for real time to pass.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Sleep for `duration` (or advance the simulated clock by it).
    fn sleep(&self, duration: StdDuration);

    fn is_simulated(&self) -> bool;

    /// Whether a simulation has reached its end time. Always false for real time.
    fn is_ended(&self) -> bool {
        false
    }
}

pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Clock that starts at `start_time` and only advances when slept on.
///
/// A multiplier of `0.0` fast-forwards: every sleep jumps the clock instantly.
/// Any positive multiplier scales the real sleep down (60.0 = one simulated
/// minute per real second).
pub struct SimulatedTimeSource {
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
    time_multiplier: f64,
    elapsed: Mutex<ChronoDuration>,
}

impl SimulatedTimeSource {
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        Self {
            start_time,
            end_time,
            time_multiplier: if multiplier.is_finite() && multiplier > 0.0 {
                multiplier
            } else {
                0.0
            },
            elapsed: Mutex::new(ChronoDuration::zero()),
        }
    }

    pub fn is_fast_forward(&self) -> bool {
        self.time_multiplier == 0.0
    }

    fn current_time(&self) -> DateTime<Local> {
        let elapsed = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        (self.start_time + elapsed).min(self.end_time)
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.current_time()
    }

    fn sleep(&self, duration: StdDuration) {
        let remaining = self.end_time - self.current_time();
        let step = ChronoDuration::from_std(duration)
            .unwrap_or(remaining)
            .min(remaining)
            .max(ChronoDuration::zero());

        if self.is_fast_forward() {
            // Yield so log output keeps its order.
            std::thread::sleep(StdDuration::from_millis(1));
        } else if let Ok(step_std) = step.to_std() {
            std::thread::sleep(step_std.div_f64(self.time_multiplier));
        }

        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += step;
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current_time() >= self.end_time
    }
}

/// Install the process-wide time source. Later calls are ignored.
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

fn source() -> &'static Arc<dyn TimeSource> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource))
}

pub fn now() -> DateTime<Local> {
    source().now()
}

/// Wall-clock "now" as the naive local datetime the prayer core works with.
pub fn local_now() -> NaiveDateTime {
    now().naive_local()
}

pub fn sleep(duration: StdDuration) {
    source().sleep(duration)
}

pub fn is_simulated() -> bool {
    source().is_simulated()
}

pub fn simulation_ended() -> bool {
    source().is_ended()
}

/// Parse a local datetime in the format "YYYY-MM-DD HH:MM:SS".
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;
    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| "Ambiguous or invalid local time".to_string())
}
