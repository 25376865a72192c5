use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status derived from the record's expiry field relative to a
/// supplied "now". Never stored independently of the field it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expiring,
    Expired,
    Unknown,
}

/// Expiries inside this window ahead of `now` count as expiring.
pub const EXPIRING_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Classify an expiry date against `now`.
///
/// Instant-based, not calendar-day based: the boundary at exactly
/// `now + 7d` is already `Active`, while `now` itself is `Expiring`.
pub fn classify(expiry_text: &str, now: DateTime<Utc>) -> SubscriptionStatus {
    let expiry = match parse_expiry(expiry_text) {
        Some(instant) => instant,
        None => return SubscriptionStatus::Unknown,
    };

    if expiry < now {
        SubscriptionStatus::Expired
    } else if (expiry - now).num_milliseconds() < EXPIRING_WINDOW_MS {
        SubscriptionStatus::Expiring
    } else {
        SubscriptionStatus::Active
    }
}

/// Parse the date shapes the store export is known to contain. Date-only
/// forms resolve to midnight UTC.
fn parse_expiry(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    // The source sheet's locale writes day-first slash dates.
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}
