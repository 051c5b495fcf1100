//! Playback notification and its channel

use chrono::{DateTime, Utc};

use super::platform::{api, Platform};

pub const CHANNEL_ID: &str = "player_channel";
pub const NOTIFICATION_ID: u32 = 123;

const CHANNEL_NAME: &str = "Playback";
const CONTENT_TITLE: &str = "pocketplay";
const CONTENT_TEXT: &str = "Playing in the background";
const MAIN_UI_LINK: &str = "pocketplay://main";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Importance {
    High,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: Importance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
}

/// Deep link opened when the notification is tapped
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentIntent {
    pub target: String,
    pub immutable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub channel_id: String,
    pub small_icon: &'static str,
    pub title: String,
    pub text: String,
    pub priority: Priority,
    pub visibility: Visibility,
    pub content_intent: Option<ContentIntent>,
    pub posted_at: DateTime<Utc>,
}

/// Build the playback notification, creating its channel first if needed.
pub fn build_notification(platform: &dyn Platform) -> Notification {
    ensure_notification_channel(platform);
    Notification {
        channel_id: CHANNEL_ID.to_string(),
        small_icon: "♫",
        title: CONTENT_TITLE.to_string(),
        text: CONTENT_TEXT.to_string(),
        priority: Priority::High,
        visibility: Visibility::Public,
        content_intent: Some(ContentIntent {
            target: MAIN_UI_LINK.to_string(),
            immutable: platform.api_level() >= api::M,
        }),
        posted_at: Utc::now(),
    }
}

/// Post the notification without foreground status. Skipped silently when
/// the platform requires a permission that was not granted.
pub fn show_notification(platform: &dyn Platform) -> bool {
    if platform.api_level() >= api::TIRAMISU && !platform.has_notification_permission() {
        tracing::debug!("Notification permission not granted, skipping notification");
        return false;
    }
    let notification = build_notification(platform);
    platform.notify(NOTIFICATION_ID, &notification);
    true
}

fn ensure_notification_channel(platform: &dyn Platform) {
    if platform.api_level() < api::O || platform.has_notification_channel(CHANNEL_ID) {
        return;
    }
    platform.create_notification_channel(&NotificationChannel {
        id: CHANNEL_ID.to_string(),
        name: CHANNEL_NAME.to_string(),
        importance: Importance::High,
    });
}
