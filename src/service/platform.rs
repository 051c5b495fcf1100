//! Host platform capabilities the runner depends on
//!
//! [`Platform`] covers service start, foreground elevation, notification
//! channels and the notification permission. [`DesktopPlatform`] simulates a
//! host with a configurable API level and grants.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::AppConfig;
use crate::error::ForegroundError;

use super::notification::{Notification, NotificationChannel};

/// API levels where host behavior changes
pub mod api {
    /// Immutable pending intents
    pub const M: u32 = 23;
    /// Notification channels and foreground-service start
    pub const O: u32 = 26;
    /// Runtime notification permission
    pub const TIRAMISU: u32 = 33;
}

#[cfg_attr(test, mockall::automock)]
pub trait Platform: Send + Sync {
    fn api_level(&self) -> u32;

    fn start_foreground_service(&self, service: &str);

    fn start_service(&self, service: &str);

    fn start_foreground(&self, id: u32, notification: &Notification) -> Result<(), ForegroundError>;

    fn stop_foreground(&self);

    fn has_notification_permission(&self) -> bool;

    fn has_notification_channel(&self, channel_id: &str) -> bool;

    fn create_notification_channel(&self, channel: &NotificationChannel);

    fn notify(&self, id: u32, notification: &Notification);
}

#[derive(Default)]
struct DesktopState {
    channels: HashMap<String, NotificationChannel>,
    posted: HashMap<u32, Notification>,
    foreground: Option<Notification>,
}

pub struct DesktopPlatform {
    api_level: u32,
    foreground_allowed: bool,
    notifications_permitted: bool,
    state: Mutex<DesktopState>,
}

impl DesktopPlatform {
    pub fn new(api_level: u32, foreground_allowed: bool, notifications_permitted: bool) -> Self {
        Self {
            api_level,
            foreground_allowed,
            notifications_permitted,
            state: Mutex::new(DesktopState::default()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_level, config.foreground_allowed, config.notifications_permitted)
    }

    /// The foreground notification if there is one, else any posted notification.
    pub fn active_notification(&self) -> Option<Notification> {
        let state = self.lock_state();
        state
            .foreground
            .clone()
            .or_else(|| state.posted.values().next().cloned())
    }

    pub fn is_foreground(&self) -> bool {
        self.lock_state().foreground.is_some()
    }

    #[cfg(test)]
    pub fn channel_count(&self) -> usize {
        self.lock_state().channels.len()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DesktopState> {
        // State stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Platform for DesktopPlatform {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn start_foreground_service(&self, service: &str) {
        tracing::info!(service, "Starting foreground service");
    }

    fn start_service(&self, service: &str) {
        tracing::info!(service, "Starting service");
    }

    fn start_foreground(&self, id: u32, notification: &Notification) -> Result<(), ForegroundError> {
        if !self.foreground_allowed {
            return Err(ForegroundError::NotAllowed);
        }
        if !self.lock_state().channels.contains_key(&notification.channel_id) && self.api_level >= api::O {
            return Err(ForegroundError::Failed(format!(
                "bad notification for startForeground: no channel {}",
                notification.channel_id
            )));
        }
        tracing::debug!(id, title = %notification.title, "Entered foreground");
        self.lock_state().foreground = Some(notification.clone());
        Ok(())
    }

    fn stop_foreground(&self) {
        self.lock_state().foreground = None;
    }

    fn has_notification_permission(&self) -> bool {
        self.notifications_permitted
    }

    fn has_notification_channel(&self, channel_id: &str) -> bool {
        self.lock_state().channels.contains_key(channel_id)
    }

    fn create_notification_channel(&self, channel: &NotificationChannel) {
        tracing::debug!(channel_id = %channel.id, "Notification channel created");
        self.lock_state().channels.insert(channel.id.clone(), channel.clone());
    }

    fn notify(&self, id: u32, notification: &Notification) {
        tracing::info!(id, title = %notification.title, "Notification posted");
        self.lock_state().posted.insert(id, notification.clone());
    }
}
