//! `waqtbar simulate`: drive the run loop with a simulated clock.
//!
//! The simulated time source has to be installed before anything logs, so the
//! command only prepares the environment. `main` then starts
//! [`Waqtbar`](crate::Waqtbar) in simulated mode while the returned
//! [`SimulationGuard`] is alive.

use anyhow::{Result, anyhow};
use chrono::Local;
use std::sync::Arc;

use crate::logger::{Log, LoggerGuard};
use crate::time_source::{self, SimulatedTimeSource};

/// Keeps the file sink alive and reports how the simulation ended.
pub struct SimulationGuard {
    logger: Option<LoggerGuard>,
    completed: bool,
}

impl SimulationGuard {
    pub fn complete_simulation(&mut self) {
        self.completed = true;
    }
}

impl Drop for SimulationGuard {
    fn drop(&mut self) {
        if self.completed {
            log_block_start!("Simulation complete");
        } else {
            log_block_start!("Simulation interrupted");
        }
        log_end!();
        // Flush the file sink last so it receives the closing lines.
        self.logger.take();
    }
}

pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    multiplier: f64,
    debug_enabled: bool,
    log_to_file: bool,
) -> Result<SimulationGuard> {
    let start = time_source::parse_datetime(start_time)
        .map_err(|e| anyhow!("Invalid start time: {e}"))?;
    let end =
        time_source::parse_datetime(end_time).map_err(|e| anyhow!("Invalid end time: {e}"))?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    let logger = if log_to_file {
        let log_filename = format!(
            "waqtbar-simulation-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        );
        let guard = Log::start_file_logging(log_filename.clone())?;
        println!("Writing simulation output to {log_filename}");
        Some(guard)
    } else {
        None
    };

    let source = SimulatedTimeSource::new(start, end, multiplier);
    let fast_forward = source.is_fast_forward();
    time_source::init_time_source(Arc::new(source));

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );

    let duration = end - start;
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );
    if fast_forward {
        log_indented!("Time acceleration: fast-forward (instant execution)");
    } else {
        log_indented!(
            "Time acceleration: {multiplier}x (will complete in ~{:.1} seconds)",
            duration.num_seconds() as f64 / multiplier
        );
    }
    log_indented!("Reminders are logged instead of sent");

    if debug_enabled {
        log_pipe!();
        log_debug!("Simulated time source initialized");
    }

    Ok(SimulationGuard {
        logger,
        completed: false,
    })
}

pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Run against a simulated clock");
    log_block_start!("Usage: waqtbar simulate <start> <end> [multiplier] [OPTIONS]");
    log_block_start!("Arguments:");
    log_indented!("start       Start time, \"YYYY-MM-DD HH:MM:SS\"");
    log_indented!("end         End time, \"YYYY-MM-DD HH:MM:SS\"");
    log_indented!("multiplier  Time acceleration (0 or omitted = fast-forward)");
    log_block_start!("Options:");
    log_indented!("--log       Write output to waqtbar-simulation-<timestamp>.log");
    log_block_start!("Examples:");
    log_indented!("waqtbar simulate \"2024-01-01 04:00:00\" \"2024-01-02 04:00:00\"");
    log_indented!("waqtbar simulate \"2024-01-01 15:00:00\" \"2024-01-01 18:00:00\" 600");
    log_end!();
}
