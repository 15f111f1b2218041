//! Unix signal handling for the run loop.
//!
//! SIGINT, SIGTERM and SIGHUP stop the loop; SIGUSR2 asks it to reload the
//! configuration and refetch today's timings.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Reload configuration and refetch (SIGUSR2, config file change).
    Reload,
    /// Stop the run loop (SIGTERM, SIGINT, SIGHUP).
    Shutdown,
}

/// State shared between the signal thread, the config watcher and the loop.
pub struct SignalState {
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// A state with no OS signal hookup, used by simulations and tests.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running = state.running.clone();
    let sender = state.signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            match sig {
                SIGUSR2 => {
                    if debug_enabled {
                        log_pipe!();
                        log_debug!("Received SIGUSR2, reloading");
                    }
                    if sender.send(SignalMessage::Reload).is_err() {
                        break;
                    }
                }
                _ => {
                    running.store(false, Ordering::SeqCst);
                    let _ = sender.send(SignalMessage::Shutdown);
                    break;
                }
            }
        }
    });

    Ok(state)
}
