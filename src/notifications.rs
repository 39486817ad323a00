//! Transient user-facing notifications
//!
//! Fetch failures and the offline state are reported here instead of being
//! returned as errors. Delivery is best effort: with no subscriber the
//! message is only logged.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

pub const OFFLINE_MESSAGE: &str = "Could not connect to the network: you are offline";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Alert,
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => log::info!("{}", notification.message),
            NotificationLevel::Alert => log::warn!("{}", notification.message),
        }
        let _ = self.sender.send(notification);
    }

    pub fn alert(&self, message: impl Into<String>) {
        self.notify(Notification::alert(message));
    }

    pub fn offline(&self) {
        self.alert(OFFLINE_MESSAGE);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
