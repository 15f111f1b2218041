//! Single redrawn terminal line showing the current period and countdown.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    execute, queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{IsTerminal, Write, stdout};

use crate::logger::Log;

/// "{city} {label} left {countdown}"
pub fn status_text(city: &str, label: &str, countdown: &str) -> String {
    format!("{city} {label} left {countdown}")
}

pub struct StatusLine {
    enabled: bool,
    last: Option<String>,
}

impl StatusLine {
    /// Draw inline only when stdout is a terminal and the clock is real.
    pub fn for_terminal() -> Result<Self> {
        let enabled = stdout().is_terminal() && !crate::time_source::is_simulated();
        if enabled {
            execute!(stdout(), Hide)?;
        }
        Ok(Self {
            enabled,
            last: None,
        })
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            last: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn render(&mut self, text: &str) -> Result<()> {
        let unchanged = self.last.as_deref() == Some(text) && Log::is_status_line_drawn();
        if !self.enabled || unchanged {
            return Ok(());
        }
        let mut out = stdout().lock();
        queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(text))?;
        out.flush()?;
        Log::set_status_line_drawn(true);
        self.last = Some(text.to_string());
        Ok(())
    }
}

impl Drop for StatusLine {
    fn drop(&mut self) {
        if self.enabled {
            let mut out = stdout();
            if self.last.is_some() {
                let _ = writeln!(out);
                Log::set_status_line_drawn(false);
            }
            let _ = execute!(out, Show);
        }
    }
}
