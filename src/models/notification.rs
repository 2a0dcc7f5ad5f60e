//! Notification feed item and its category.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Category of a system-generated notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    BudgetAlert,
    GoalAchievement,
    TransactionAlert,
    SystemUpdate,
    DailyReminder,
    WeeklyInsight,
    MonthlyWarning,
    BudgetingTip,
    Milestone,
    /// Tag not recognized by this build. Kept visible as a notification
    /// rather than silently folded into another category.
    Unknown,
}

impl NotificationType {
    /// Every variant, in declaration order.
    pub const ALL: [NotificationType; 10] = [
        Self::BudgetAlert,
        Self::GoalAchievement,
        Self::TransactionAlert,
        Self::SystemUpdate,
        Self::DailyReminder,
        Self::WeeklyInsight,
        Self::MonthlyWarning,
        Self::BudgetingTip,
        Self::Milestone,
        Self::Unknown,
    ];

    /// Map a stored type tag to a category.
    ///
    /// Accepts camelCase and snake_case spellings, ignoring case.
    pub fn from_tag(tag: &str) -> Self {
        let normalized: String = tag
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "budgetalert" => Self::BudgetAlert,
            "goalachievement" => Self::GoalAchievement,
            "transactionalert" => Self::TransactionAlert,
            "systemupdate" => Self::SystemUpdate,
            "dailyreminder" => Self::DailyReminder,
            "weeklyinsight" => Self::WeeklyInsight,
            "monthlywarning" => Self::MonthlyWarning,
            "budgetingtip" => Self::BudgetingTip,
            "milestone" => Self::Milestone,
            _ => Self::Unknown,
        }
    }

    /// Canonical tag written by this build.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::BudgetAlert => "budgetAlert",
            Self::GoalAchievement => "goalAchievement",
            Self::TransactionAlert => "transactionAlert",
            Self::SystemUpdate => "systemUpdate",
            Self::DailyReminder => "dailyReminder",
            Self::WeeklyInsight => "weeklyInsight",
            Self::MonthlyWarning => "monthlyWarning",
            Self::BudgetingTip => "budgetingTip",
            Self::Milestone => "milestone",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable category label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BudgetAlert => "Budget Alert",
            Self::GoalAchievement => "Goal Achievement",
            Self::TransactionAlert => "Transaction Alert",
            Self::SystemUpdate => "System Update",
            Self::DailyReminder => "Daily Reminder",
            Self::WeeklyInsight => "Weekly Insight",
            Self::MonthlyWarning => "Monthly Warning",
            Self::BudgetingTip => "Budgeting Tip",
            Self::Milestone => "Milestone",
            Self::Unknown => "Notification",
        }
    }

    /// Only daily reminders count as reminders.
    pub fn is_reminder(&self) -> bool {
        matches!(self, Self::DailyReminder)
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A notification record as written by the notification generator.
///
/// `date` and `type_tag` are unparsed; see [`NotificationItem::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RawNotification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub date: String,
    #[serde(rename = "type")]
    pub type_tag: String,
}

/// Notification shown in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub is_read: bool,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
}

impl NotificationItem {
    /// Build a feed item from a raw record.
    ///
    /// Returns `None` when the date cannot be parsed. Unknown type tags map to
    /// [`NotificationType::Unknown`]. New items start unread.
    pub fn from_raw(raw: RawNotification) -> Option<Self> {
        let Some(date) = parse_timestamp(&raw.date) else {
            log::debug!("[feed] Skipping notification {}: bad date {:?}", raw.id, raw.date);
            return None;
        };

        let notification_type = NotificationType::from_tag(&raw.type_tag);
        if notification_type == NotificationType::Unknown {
            log::warn!(
                "[feed] Notification {} has unrecognized type tag {:?}",
                raw.id,
                raw.type_tag
            );
        }

        Some(Self {
            id: raw.id,
            title: raw.title,
            description: raw.body,
            date,
            is_read: false,
            notification_type,
        })
    }

    pub fn is_reminder_type(&self) -> bool {
        self.notification_type.is_reminder()
    }

    pub fn is_notification_type(&self) -> bool {
        !self.is_reminder_type()
    }

    pub fn type_display_name(&self) -> &'static str {
        self.notification_type.display_name()
    }

    /// Humanized age of the notification relative to now.
    pub fn time_ago(&self) -> String {
        time_ago_at(self.date, Utc::now())
    }
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 and naive ISO-8601 (`2024-01-05T08:30:00[.123]`), the
/// latter read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Humanized delta between `date` and `now`.
///
/// Future dates and anything under a minute read as "Just now"; a week or
/// older falls back to a calendar date.
pub fn time_ago_at(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(date);

    if delta.num_minutes() < 1 {
        "Just now".to_string()
    } else if delta.num_hours() < 1 {
        format!("{}m ago", delta.num_minutes())
    } else if delta.num_days() < 1 {
        format!("{}h ago", delta.num_hours())
    } else if delta.num_days() < 7 {
        format!("{}d ago", delta.num_days())
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn raw(id: &str, date: &str, tag: &str) -> RawNotification {
        RawNotification {
            id: id.to_string(),
            title: "Over budget".to_string(),
            body: "Dining is at 110%".to_string(),
            date: date.to_string(),
            type_tag: tag.to_string(),
        }
    }

    #[test]
    fn test_reminder_and_notification_types_partition_all_variants() {
        let reminders: Vec<_> = NotificationType::ALL
            .iter()
            .filter(|t| t.is_reminder())
            .collect();
        assert_eq!(reminders, vec![&NotificationType::DailyReminder]);

        for ty in NotificationType::ALL {
            let item = NotificationItem {
                id: "x".to_string(),
                title: String::new(),
                description: String::new(),
                date: Utc::now(),
                is_read: false,
                notification_type: ty,
            };
            assert_ne!(item.is_reminder_type(), item.is_notification_type(), "{:?}", ty);
        }
    }

    #[test]
    fn test_from_tag_accepts_common_spellings() {
        assert_eq!(NotificationType::from_tag("budgetAlert"), NotificationType::BudgetAlert);
        assert_eq!(NotificationType::from_tag("budget_alert"), NotificationType::BudgetAlert);
        assert_eq!(NotificationType::from_tag("DAILY_REMINDER"), NotificationType::DailyReminder);
        assert_eq!(NotificationType::from_tag("weekly-insight"), NotificationType::WeeklyInsight);
        for ty in NotificationType::ALL {
            assert_eq!(NotificationType::from_tag(ty.as_tag()), ty);
        }
    }

    #[test]
    fn test_unknown_tag_is_a_notification_not_a_reminder() {
        let item = NotificationItem::from_raw(raw("n1", "2024-01-01T00:00:00Z", "promo")).unwrap();
        assert_eq!(item.notification_type, NotificationType::Unknown);
        assert!(item.is_notification_type());
    }

    #[test]
    fn test_from_raw_skips_unparseable_dates() {
        assert!(NotificationItem::from_raw(raw("n1", "yesterday", "budgetAlert")).is_none());
        assert!(NotificationItem::from_raw(raw("n1", "", "budgetAlert")).is_none());
    }

    #[test]
    fn test_from_raw_maps_fields() {
        let item =
            NotificationItem::from_raw(raw("n1", "2024-03-01T10:15:00.250", "goalAchievement"))
                .unwrap();
        assert_eq!(item.id, "n1");
        assert_eq!(item.description, "Dining is at 110%");
        assert!(!item.is_read);
        assert_eq!(item.date, Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap() + Duration::milliseconds(250));
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let parsed = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        assert_eq!(time_ago_at(now - Duration::seconds(30), now), "Just now");
        assert_eq!(time_ago_at(now + Duration::minutes(5), now), "Just now");
        assert_eq!(time_ago_at(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago_at(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago_at(now - Duration::days(2), now), "2d ago");
        assert_eq!(time_ago_at(now - Duration::days(10), now), "Jun 5, 2024");
    }

    #[test]
    fn test_serializes_type_as_camel_case_tag() {
        let item = NotificationItem::from_raw(raw("n1", "2024-01-01T00:00:00Z", "budget_alert")).unwrap();
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"budgetAlert\""));
        assert!(json.contains("\"isRead\":false"));
    }
}
