use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::StoreError;

/// Store-assigned identifier of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A decoded attendance record. Timestamps are always UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub user_id: String,
    pub username: String,
    pub checkin_time: DateTime<Utc>,
    pub checkout_time: Option<DateTime<Utc>>,
}

/// Fields of a record before the store has assigned it an id.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub user_id: String,
    pub username: String,
    pub checkin_time: DateTime<Utc>,
}

impl NewAttendance {
    pub fn with_id(self, id: RecordId) -> AttendanceRecord {
        AttendanceRecord {
            id,
            user_id: self.user_id,
            username: self.username,
            checkin_time: self.checkin_time,
            checkout_time: None,
        }
    }
}

/// Partial update applied by `find_one_and_update`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct AttendancePatch {
    pub checkout_time: Option<DateTime<Utc>>,
}

impl AttendancePatch {
    pub fn checkout_at(time: DateTime<Utc>) -> Self {
        Self {
            checkout_time: Some(time),
        }
    }

    /// A checkout earlier than the check-in (wall clock stepped back) is
    /// clamped to the check-in time so the stored record stays decodable.
    pub fn apply(&self, record: &mut AttendanceRecord) {
        if let Some(time) = self.checkout_time {
            record.checkout_time = Some(time.max(record.checkin_time));
        }
    }
}

/// Persisted shape of a record, as read from a table row or held in memory.
///
/// Rows are not trusted: converting one into an [`AttendanceRecord`] checks
/// the id and the record invariants and reports a [`StoreError::Decode`] on
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub checkin_time: DateTime<Utc>,
    pub checkout_time: Option<DateTime<Utc>>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let id = row
            .id
            .parse::<RecordId>()
            .map_err(|e| StoreError::Decode(format!("invalid id {:?}: {}", row.id, e)))?;

        if row.user_id.is_empty() || row.username.is_empty() {
            return Err(StoreError::Decode(format!(
                "record {} is missing user_id or username",
                id
            )));
        }

        if let Some(checkout) = row.checkout_time {
            if checkout < row.checkin_time {
                return Err(StoreError::Decode(format!(
                    "record {} checks out before it checks in",
                    id
                )));
            }
        }

        Ok(AttendanceRecord {
            id,
            user_id: row.user_id,
            username: row.username,
            checkin_time: row.checkin_time,
            checkout_time: row.checkout_time,
        })
    }
}

impl From<&AttendanceRecord> for AttendanceRow {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            id: record.id.to_string(),
            user_id: record.user_id.clone(),
            username: record.username.clone(),
            checkin_time: record.checkin_time,
            checkout_time: record.checkout_time,
        }
    }
}
