use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;

use super::{RecordCursor, RecordFilter, RecordSort, RecordStore, StoreError, StoreResult};
use crate::model::attendance::{
    AttendancePatch, AttendanceRecord, AttendanceRow, NewAttendance, RecordId,
};

/// Process-local store. Rows are kept in insertion order, which is the
/// natural order reported by `find_all`.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Vec<AttendanceRow>>,
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Backend("memory store lock poisoned".to_string())
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row exactly as given, without validation. Used to seed the
    /// store from existing data.
    pub fn insert_raw(&self, row: AttendanceRow) -> StoreResult<()> {
        self.rows.write().map_err(poisoned)?.push(row);
        Ok(())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.rows.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: &NewAttendance) -> StoreResult<RecordId> {
        let id = RecordId::generate();
        let row = AttendanceRow::from(&record.clone().with_id(id));
        self.rows.write().map_err(poisoned)?.push(row);
        Ok(id)
    }

    async fn find_one_and_update(
        &self,
        id: RecordId,
        patch: AttendancePatch,
    ) -> StoreResult<Option<AttendanceRecord>> {
        // Lookup and write happen under one write guard.
        let mut rows = self.rows.write().map_err(poisoned)?;
        let key = id.to_string();

        let Some(slot) = rows.iter_mut().find(|row| row.id == key) else {
            return Ok(None);
        };

        let mut record = AttendanceRecord::try_from(slot.clone())?;
        patch.apply(&mut record);
        *slot = AttendanceRow::from(&record);

        Ok(Some(record))
    }

    async fn find_one(
        &self,
        filter: &RecordFilter,
        sort: RecordSort,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let rows = self.rows.read().map_err(poisoned)?;
        let mut matching = rows.iter().filter(|row| {
            filter
                .user_id
                .as_deref()
                .is_none_or(|user_id| row.user_id == user_id)
        });

        // max_by_key keeps the last of equal keys, so ties go to the most
        // recently inserted row.
        let found = match sort {
            RecordSort::Natural => matching.next(),
            RecordSort::CheckinAsc => matching.min_by_key(|row| row.checkin_time),
            RecordSort::CheckinDesc => matching.max_by_key(|row| row.checkin_time),
        };

        found.cloned().map(AttendanceRecord::try_from).transpose()
    }

    async fn find_all(&self) -> StoreResult<RecordCursor<'_>> {
        let snapshot = self.rows.read().map_err(poisoned)?.clone();
        Ok(stream::iter(snapshot.into_iter().map(AttendanceRecord::try_from)).boxed())
    }
}
