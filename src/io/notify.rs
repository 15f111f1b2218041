//! Delivery of reminder notifications.
//!
//! Reminders go to the desktop through `org.freedesktop.Notifications` when a
//! session bus is available and fall back to the log otherwise.

use anyhow::{Context, Result};
use std::collections::HashMap;
use zbus::blocking::Connection;
use zbus::zvariant::Value;

use crate::common::constants::NOTIFICATION_TIMEOUT_MS;
use crate::config::Config;

#[zbus::proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: HashMap<&str, &Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

pub struct DbusNotifier {
    proxy: NotificationsProxyBlocking<'static>,
}

impl DbusNotifier {
    pub fn connect() -> Result<Self> {
        let connection = Connection::session().context("Failed to connect to session D-Bus")?;
        let proxy = NotificationsProxyBlocking::new(&connection)
            .context("Failed to create notifications proxy")?;
        Ok(Self { proxy })
    }
}

impl Notifier for DbusNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        self.proxy
            .notify(
                "waqtbar",
                0,
                "appointment-soon",
                title,
                body,
                &[],
                HashMap::new(),
                NOTIFICATION_TIMEOUT_MS,
            )
            .context("Notification server rejected the reminder")?;
        Ok(())
    }
}

/// Writes reminders as log blocks.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        log_block_start!("{title}");
        log_indented!("{body}");
        Ok(())
    }
}

/// Tries `primary`, then `fallback` if it fails.
pub struct FallbackNotifier {
    primary: Box<dyn Notifier>,
    fallback: Box<dyn Notifier>,
}

impl FallbackNotifier {
    pub fn new(primary: Box<dyn Notifier>, fallback: Box<dyn Notifier>) -> Self {
        Self { primary, fallback }
    }
}

impl Notifier for FallbackNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        match self.primary.notify(title, body) {
            Ok(()) => Ok(()),
            Err(e) => {
                log_pipe!();
                log_warning!("Desktop notification failed: {e}");
                self.fallback.notify(title, body)
            }
        }
    }
}

/// Notifier matching the configuration and what the session offers.
pub fn notifier_for(config: &Config) -> Box<dyn Notifier> {
    if !config.notifications_enabled() {
        return Box::new(LogNotifier);
    }
    match DbusNotifier::connect() {
        Ok(dbus) => Box::new(FallbackNotifier::new(Box::new(dbus), Box::new(LogNotifier))),
        Err(e) => {
            log_pipe!();
            log_warning!("Desktop notifications unavailable: {e}");
            log_indented!("Reminders will be written to the log instead");
            Box::new(LogNotifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_fallback_used_when_primary_fails() {
        crate::logger::Log::set_enabled(false);
        let mut primary = MockNotifier::new();
        primary
            .expect_notify()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("no server")));
        let mut fallback = MockNotifier::new();
        fallback
            .expect_notify()
            .with(eq("Prayer Reminder"), eq("ASR time started!"))
            .times(1)
            .returning(|_, _| Ok(()));

        let notifier = FallbackNotifier::new(Box::new(primary), Box::new(fallback));
        notifier.notify("Prayer Reminder", "ASR time started!").unwrap();
    }

    #[test]
    fn test_fallback_skipped_when_primary_succeeds() {
        let mut primary = MockNotifier::new();
        primary.expect_notify().times(1).returning(|_, _| Ok(()));
        let mut fallback = MockNotifier::new();
        fallback.expect_notify().never();

        let notifier = FallbackNotifier::new(Box::new(primary), Box::new(fallback));
        notifier.notify("t", "b").unwrap();
    }
}
