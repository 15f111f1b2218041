//! Application coordinator that owns the run loop's resources.
//!
//! The `Waqtbar` builder covers the two startup contexts:
//! - Normal startup: `Waqtbar::new(debug_enabled).run()`
//! - Simulation: `Waqtbar::new(debug_enabled).without_lock().without_headers().simulated().run()`

use anyhow::{Context, Result};

use crate::{
    api::{AladhanClient, TimingsProvider},
    common::utils::private_path,
    config::{self, Config},
    io::{
        lock::{acquire_lock, default_lock_path, read_lock_pid},
        notify::{LogNotifier, Notifier, notifier_for},
        signals::{SignalState, setup_signal_handler},
        status_line::StatusLine,
    },
    runner::{ProviderFactory, RunLoop},
};

/// Builder for configuring and running waqtbar.
///
/// ```no_run
/// use waqtbar::Waqtbar;
///
/// # fn main() -> anyhow::Result<()> {
/// Waqtbar::new(false).run()?;
/// # Ok(())
/// # }
/// ```
pub struct Waqtbar {
    debug_enabled: bool,
    create_lock: bool,
    show_headers: bool,
    simulated: bool,
}

impl Waqtbar {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            create_lock: true,
            show_headers: true,
            simulated: false,
        }
    }

    /// Skip single-instance enforcement.
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Run against the installed simulated clock: no OS signals, no config
    /// watching, reminders go to the log.
    pub fn simulated(mut self) -> Self {
        self.simulated = true;
        self
    }

    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Debug mode enabled");
            }
        }

        let config = Config::load().context("Configuration failed")?;
        config.log_config();

        let _lock = if self.create_lock {
            let lock_path = default_lock_path();
            match acquire_lock(&lock_path)? {
                Some(lock) => Some(lock),
                None => {
                    log_pipe!();
                    match read_lock_pid(&lock_path) {
                        Some(pid) => log_error!("waqtbar is already running (PID {pid})"),
                        None => log_error!("waqtbar is already running"),
                    }
                    log_indented!("Lock file: {}", private_path(&lock_path));
                    anyhow::bail!("Another instance holds the lock");
                }
            }
        } else {
            None
        };

        let signal_state = if self.simulated {
            SignalState::detached()
        } else {
            setup_signal_handler(self.debug_enabled)?
        };

        if !self.simulated
            && let Err(e) =
                config::start_config_watcher(signal_state.signal_sender.clone(), self.debug_enabled)
        {
            log_pipe!();
            log_warning!("Config file watching unavailable: {e}");
            log_indented!("Hot config reload disabled, use SIGUSR2 for manual reload");
        }

        let notifier: Box<dyn Notifier> = if self.simulated {
            Box::new(LogNotifier)
        } else {
            notifier_for(&config)
        };

        let status_line = StatusLine::for_terminal().unwrap_or_else(|e| {
            log_warning!("Status line unavailable: {e}");
            StatusLine::disabled()
        });

        if self.create_lock {
            log_block_start!("Lock acquired, starting waqtbar...");
        }

        RunLoop::new(config, aladhan_provider(), notifier, &signal_state)?
            .with_status_line(status_line)
            .with_debug(self.debug_enabled)
            .run()
    }
}

/// Provider factory backed by the Aladhan HTTP API.
pub fn aladhan_provider() -> ProviderFactory {
    Box::new(|config: &Config| {
        let client = AladhanClient::new(config.request_timeout(), config.method())?;
        Ok(Box::new(client) as Box<dyn TimingsProvider>)
    })
}
