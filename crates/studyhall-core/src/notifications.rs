//! Notification model and category styles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification category as sent by the backend.
///
/// Unrecognised wire values decode as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    FeeDue,
    FeePaid,
    SeatBooking,
    Reminder,
    Announcement,
    Chat,
    System,
    #[serde(other)]
    Other,
}

/// Icon name and accent color for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStyle {
    pub icon: &'static str,
    pub color: &'static str,
}

const FALLBACK_STYLE: CategoryStyle = CategoryStyle {
    icon: "bell",
    color: "gray",
};

const STYLE_TABLE: [(NotificationCategory, CategoryStyle); 8] = [
    (NotificationCategory::FeeDue, CategoryStyle { icon: "credit-card", color: "red" }),
    (NotificationCategory::FeePaid, CategoryStyle { icon: "check-circle", color: "green" }),
    (NotificationCategory::SeatBooking, CategoryStyle { icon: "armchair", color: "blue" }),
    (NotificationCategory::Reminder, CategoryStyle { icon: "alarm-clock", color: "amber" }),
    (NotificationCategory::Announcement, CategoryStyle { icon: "megaphone", color: "purple" }),
    (NotificationCategory::Chat, CategoryStyle { icon: "message-circle", color: "teal" }),
    (NotificationCategory::System, CategoryStyle { icon: "info", color: "slate" }),
    (NotificationCategory::Other, FALLBACK_STYLE),
];

impl NotificationCategory {
    pub const ALL: [NotificationCategory; 8] = [
        NotificationCategory::FeeDue,
        NotificationCategory::FeePaid,
        NotificationCategory::SeatBooking,
        NotificationCategory::Reminder,
        NotificationCategory::Announcement,
        NotificationCategory::Chat,
        NotificationCategory::System,
        NotificationCategory::Other,
    ];

    pub fn style(self) -> CategoryStyle {
        STYLE_TABLE
            .iter()
            .find(|(category, _)| *category == self)
            .map(|(_, style)| *style)
            .unwrap_or(FALLBACK_STYLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub category: NotificationCategory,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub fn style(&self) -> CategoryStyle {
        self.category.style()
    }
}
