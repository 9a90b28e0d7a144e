//! Announcement model and the timestamp formats accepted on the wire.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::Patch;

/// A time-bounded message shown to students between `start_date` and `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    pub id: String,
    pub message: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Whether the announcement is visible at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at && self.start_date.map_or(true, |start| start <= now)
    }
}

/// A validated announcement ready to be stored.
#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub message: String,
    pub expires_at: DateTime<Utc>,
    pub start_date: Option<DateTime<Utc>>,
}

/// Request body for `PUT /announcements/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAnnouncementRequest {
    #[serde(default)]
    pub message: Patch<String>,
    #[serde(default)]
    pub expires_at: Patch<String>,
    #[serde(default)]
    pub start_date: Patch<String>,
}

impl UpdateAnnouncementRequest {
    /// True when at least one field carries a non-null value.
    pub fn has_changes(&self) -> bool {
        self.message.is_value() || self.expires_at.is_value() || self.start_date.is_value()
    }
}

/// Validated partial update handed to the store.
///
/// `None` keeps the stored value. `start_date` keeps the tri-state so that an
/// explicit null clears it.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementChanges {
    pub message: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub start_date: Patch<DateTime<Utc>>,
}

/// Parse a timestamp in RFC 3339, naive date-time (UTC) or plain date form.
///
/// The UTC year must have four digits; anything else would not fit the
/// storage format.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_any_timestamp(raw.trim()).filter(|ts| (0..=9999).contains(&ts.year()))
}

fn parse_any_timestamp(raw: &str) -> Option<DateTime<Utc>> {

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Storage format. Fixed width so that text comparison in SQL orders chronologically.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
