//! Stored records and input coercion
//!
//! Records are backend-agnostic: storage implementations map them to and from
//! their own document shapes.

use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::ServiceError;

/// An event as stored
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub date: DateTime<Utc>,
    /// Id of the user who created the event
    pub creator: ObjectId,
}

/// A user as stored
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: ObjectId,
    pub email: String,
    /// bcrypt hash, never plaintext
    pub password: String,
    /// Ids of events created by this user, in creation order
    pub created_events: Vec<ObjectId>,
}

/// Event attributes for an insert; storage assigns the id
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub date: DateTime<Utc>,
    pub creator: ObjectId,
}

/// User attributes for an insert; storage assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
}

/// Client-supplied event attributes before coercion
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub date: String,
}

/// Client-supplied user attributes before hashing
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub email: String,
    pub password: String,
}

/// Parse an opaque id token
pub fn parse_id(raw: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| ServiceError::InvalidInput(format!("malformed id '{raw}'")))
}

/// Coerce a client date string to a UTC timestamp
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` read as UTC, and a
/// bare `YYYY-MM-DD` read as UTC midnight.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(ServiceError::InvalidInput(format!("invalid date '{raw}'")))
}

/// Render a timestamp as an ISO-8601 string with millisecond precision
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}
