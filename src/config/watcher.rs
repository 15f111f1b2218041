//! Hot reload: watch the configuration file and request a reload on change.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use super::get_config_path;
use crate::common::utils::private_path;
use crate::io::signals::SignalMessage;

/// Editors often write a file in several steps; coalesce them.
const DEBOUNCE: Duration = Duration::from_millis(500);

pub struct ConfigWatcher {
    signal_sender: Sender<SignalMessage>,
    debug_enabled: bool,
    config_path: PathBuf,
}

/// Whether `event_path` is the config file or an editor temp file next to it.
fn is_config_event(event_path: &Path, config_path: &Path) -> bool {
    if event_path == config_path {
        return true;
    }
    let same_dir = event_path.parent() == config_path.parent();
    let names = event_path
        .file_name()
        .and_then(|n| n.to_str())
        .zip(config_path.file_name().and_then(|n| n.to_str()));
    same_dir && names.is_some_and(|(event_name, config_name)| event_name.starts_with(config_name))
}

impl ConfigWatcher {
    pub fn new(signal_sender: Sender<SignalMessage>, debug_enabled: bool, config_path: PathBuf) -> Self {
        Self {
            signal_sender,
            debug_enabled,
            config_path,
        }
    }

    /// Spawn the watcher thread. Returns once the watch is registered.
    pub fn start(self) -> Result<()> {
        let Some(config_dir) = self.config_path.parent().map(Path::to_path_buf) else {
            return Ok(());
        };
        if !config_dir.is_dir() {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("No configuration directory to watch for hot reload");
            }
            return Ok(());
        }

        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        // Watch the directory so editor rename-and-replace saves are seen.
        watcher
            .watch(&config_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {}", private_path(&config_dir)))?;

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Watching {} for changes", private_path(&self.config_path));
        }

        thread::spawn(move || {
            let _watcher = watcher;
            let mut last_reload: Option<Instant> = None;

            for event in rx {
                if !event
                    .paths
                    .iter()
                    .any(|path| is_config_event(path, &self.config_path))
                {
                    continue;
                }
                if last_reload.is_some_and(|at| at.elapsed() < DEBOUNCE) {
                    continue;
                }

                if self.debug_enabled {
                    log_pipe!();
                    log_info!("Configuration file change detected");
                }
                if self.signal_sender.send(SignalMessage::Reload).is_err() {
                    break;
                }
                last_reload = Some(Instant::now());
            }
        });

        Ok(())
    }
}

pub fn start_config_watcher(signal_sender: Sender<SignalMessage>, debug_enabled: bool) -> Result<()> {
    ConfigWatcher::new(signal_sender, debug_enabled, get_config_path()?).start()
}
