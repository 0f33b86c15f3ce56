//! Record store contract and its backends.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use futures::stream::BoxStream;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::model::attendance::{AttendancePatch, AttendanceRecord, NewAttendance, RecordId};

pub use memory::MemoryRecordStore;
pub use mysql::MySqlRecordStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A single stored record could not be turned into an [`AttendanceRecord`].
    #[error("record decode failed: {0}")]
    Decode(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Forward-only cursor over every stored record.
///
/// Items that fail to decode are yielded as `Err(StoreError::Decode(_))` and
/// the cursor keeps going; any other error ends the scan.
pub type RecordCursor<'a> = BoxStream<'a, StoreResult<AttendanceRecord>>;

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub user_id: Option<String>,
}

impl RecordFilter {
    pub fn by_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordSort {
    /// Whatever order the backend returns.
    #[default]
    Natural,
    CheckinAsc,
    CheckinDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    Mysql,
    Memory,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record and return the id the store assigned to it.
    async fn insert(&self, record: &NewAttendance) -> StoreResult<RecordId>;

    /// Atomically apply `patch` to the record with `id` and return the
    /// post-update record, or `None` if no such record exists.
    async fn find_one_and_update(
        &self,
        id: RecordId,
        patch: AttendancePatch,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// First record matching `filter` under `sort`.
    async fn find_one(
        &self,
        filter: &RecordFilter,
        sort: RecordSort,
    ) -> StoreResult<Option<AttendanceRecord>>;

    async fn find_all(&self) -> StoreResult<RecordCursor<'_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_from_env_value() {
        assert_eq!("mysql".parse::<StoreBackend>().unwrap(), StoreBackend::Mysql);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("mongo".parse::<StoreBackend>().is_err());
        assert_eq!(StoreBackend::Memory.as_ref(), "memory");
    }
}
