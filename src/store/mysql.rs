use async_trait::async_trait;
use futures::StreamExt;
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, info};

use super::{RecordCursor, RecordFilter, RecordSort, RecordStore, StoreError, StoreResult};
use crate::model::attendance::{
    AttendancePatch, AttendanceRecord, AttendanceRow, NewAttendance, RecordId,
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS attendance_records (
        id CHAR(36) NOT NULL PRIMARY KEY,
        user_id VARCHAR(255) NOT NULL,
        username VARCHAR(255) NOT NULL,
        checkin_time DATETIME(6) NOT NULL,
        checkout_time DATETIME(6) NULL,
        INDEX idx_attendance_user_checkin (user_id, checkin_time)
    )
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, username, checkin_time, checkout_time FROM attendance_records";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_) => StoreError::Decode(e.to_string()),
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

impl RecordSort {
    fn order_by(self) -> &'static str {
        match self {
            RecordSort::Natural => "",
            RecordSort::CheckinAsc => " ORDER BY checkin_time ASC",
            RecordSort::CheckinDesc => " ORDER BY checkin_time DESC",
        }
    }
}

/// MySQL-backed store over the `attendance_records` table.
#[derive(Debug, Clone)]
pub struct MySqlRecordStore {
    pool: MySqlPool,
}

impl MySqlRecordStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create the table if it is missing. Existing tables are left alone.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        info!("attendance_records table ready");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MySqlRecordStore {
    async fn insert(&self, record: &NewAttendance) -> StoreResult<RecordId> {
        let id = RecordId::generate();

        sqlx::query(
            r#"
            INSERT INTO attendance_records (id, user_id, username, checkin_time)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&record.user_id)
        .bind(&record.username)
        .bind(record.checkin_time)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_one_and_update(
        &self,
        id: RecordId,
        patch: AttendancePatch,
    ) -> StoreResult<Option<AttendanceRecord>> {
        // The row lock taken by FOR UPDATE is held until commit, so
        // concurrent updates of the same id are serialized and the patch is
        // clamped against the locked row's checkin_time.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = ? FOR UPDATE"
        ))
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            // dropping the transaction rolls it back
            return Ok(None);
        };

        let mut record = AttendanceRecord::try_from(row)?;
        patch.apply(&mut record);

        if patch.checkout_time.is_some() {
            sqlx::query("UPDATE attendance_records SET checkout_time = ? WHERE id = ?")
                .bind(record.checkout_time)
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(record_id = %id, "attendance record updated");

        Ok(Some(record))
    }

    async fn find_one(
        &self,
        filter: &RecordFilter,
        sort: RecordSort,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let mut sql = String::from(SELECT_COLUMNS);
        if filter.user_id.is_some() {
            sql.push_str(" WHERE user_id = ?");
        }
        sql.push_str(sort.order_by());
        sql.push_str(" LIMIT 1");

        let mut query = sqlx::query_as::<_, AttendanceRow>(&sql);
        if let Some(user_id) = &filter.user_id {
            query = query.bind(user_id);
        }

        let row = query.fetch_optional(&self.pool).await?;
        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn find_all(&self) -> StoreResult<RecordCursor<'_>> {
        // Row-level decode failures become per-item errors; fetch errors
        // stay backend errors.
        let cursor = sqlx::query(SELECT_COLUMNS)
            .fetch(&self.pool)
            .map(|row| {
                let row = row.map_err(|e| StoreError::Backend(e.to_string()))?;
                let row = AttendanceRow::from_row(&row)
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                AttendanceRecord::try_from(row)
            });

        Ok(cursor.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_maps_to_order_by_clause() {
        assert_eq!(RecordSort::Natural.order_by(), "");
        assert!(RecordSort::CheckinDesc.order_by().ends_with("DESC"));
        assert!(RecordSort::CheckinAsc.order_by().ends_with("ASC"));
    }

    #[test]
    fn decode_failures_are_classified_separately() {
        let decode = StoreError::from(sqlx::Error::ColumnNotFound("id".to_string()));
        assert!(matches!(decode, StoreError::Decode(_)));

        let backend = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(backend, StoreError::Backend(_)));
    }
}
