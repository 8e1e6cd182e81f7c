use std::time::Duration;

use log::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Danger => "danger",
        }
    }
}

/// Fire-and-forget user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str, duration: Option<Duration>);
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NotificationLevel, message: &str, duration: Option<Duration>) {
        match level {
            NotificationLevel::Danger => error!("[{}] {message} ({duration:?})", level.as_str()),
            NotificationLevel::Warning => warn!("[{}] {message} ({duration:?})", level.as_str()),
            NotificationLevel::Info | NotificationLevel::Success => {
                info!("[{}] {message} ({duration:?})", level.as_str())
            }
        }
    }
}
