//! `waqtbar status`: today's schedule, Hijri date and current period.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::api::{AladhanClient, Location, RetryPolicy, TimingsProvider};
use crate::calendar::{self, HijriDay};
use crate::config::Config;
use crate::prayer::schedule::format_12h;
use crate::prayer::{DaySchedule, build, classify, format_countdown};
use crate::time_source;

/// Everything the status command prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub location: Location,
    pub schedule: DaySchedule,
    pub hijri: Option<HijriDay>,
    pub current_period: String,
    pub next_boundary: Option<NaiveDateTime>,
    pub countdown: Option<String>,
}

pub fn handle_status_command(json: bool, debug_enabled: bool) -> Result<()> {
    let config = Config::load()?;
    let location = config.location()?;
    let provider = AladhanClient::new(config.request_timeout(), config.method())?;

    if debug_enabled {
        log_version!();
        log_pipe!();
        log_debug!("Fetching timings for {location} (method {})", config.method());
    }

    let report = build_report(
        &provider,
        &location,
        super::one_shot_policy(&config),
        time_source::local_now(),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_human_readable(&report);
    }
    Ok(())
}

/// Fetch today's timings and classify `now` against them.
pub fn build_report(
    provider: &dyn TimingsProvider,
    location: &Location,
    policy: RetryPolicy,
    now: NaiveDateTime,
) -> Result<StatusReport> {
    let date = now.date();
    let running = super::always_running();

    let raw = policy
        .run(&running, |_| provider.fetch_timings(location, date))
        .context("Error fetching prayer times")?;
    let table = build(&raw, date).context("Error calculating prayer times")?;

    let hijri = provider
        .fetch_hijri(date)
        .ok()
        .or_else(|| calendar::to_hijri(date).ok());

    let classification = classify(Some(&table), now);
    let countdown = classification.remaining(now).map(format_countdown);

    Ok(StatusReport {
        location: location.clone(),
        schedule: DaySchedule::new(&table, &raw),
        hijri,
        current_period: classification.label().to_string(),
        next_boundary: classification.next_boundary(),
        countdown,
    })
}

fn display_human_readable(report: &StatusReport) {
    let schedule = &report.schedule;

    println!("      Location: {}", report.location);
    println!("          Date: {}", schedule.date.format("%A, %d %B %Y"));
    if let Some(hijri) = &report.hijri {
        println!("         Hijri: {hijri}");
    }
    println!();
    for prayer in &schedule.prayers {
        println!("{:>14}: {}", prayer.name, format_12h(prayer.time));
    }
    println!();
    if let Some(imsak) = schedule.imsak {
        println!("         Imsak: {}", imsak.format("%I:%M %p"));
    }
    println!("       Sunrise: {}", format_12h(schedule.sunrise));
    println!("        Sunset: {}", format_12h(schedule.sunset));
    println!("      Tahajjud: {}", schedule.tahajjud.display());
    for window in &schedule.makruh {
        println!("{:>14}: {}", format!("Makruh {}", window.name), window.display());
    }
    println!();
    println!("Current period: {}", report.current_period);
    match (&report.countdown, report.next_boundary) {
        (Some(countdown), Some(next)) => {
            println!("       Ends at: {} (in {countdown})", next.format("%H:%M:%S"))
        }
        _ => println!("       Ends at: unavailable"),
    }
}

pub fn display_help() {
    log_version!();
    log_block_start!("status - Show today's prayer schedule");
    log_block_start!("Usage: waqtbar status [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-j, --json  Output in JSON format");
    log_block_start!("Output:");
    log_indented!("Prayer times, Imsak, sunrise and sunset, the Tahajjud window,");
    log_indented!("Makruh windows, the Hijri date and the current period");
    log_end!();
}
