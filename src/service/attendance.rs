use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::model::attendance::{AttendancePatch, AttendanceRecord, NewAttendance, RecordId};
use crate::models::{AttendanceList, AttendanceView, CheckInRequest};
use crate::service::clock::{Clock, SystemClock};
use crate::store::{RecordFilter, RecordSort, RecordStore, StoreError};
use crate::utils::display_time::DisplayZone;

const CHECKED_IN: &str = "User checked in successfully.";
const CHECKED_OUT: &str = "User checked out successfully.";
const RECORD_FOUND: &str = "Record found.";
const RECORD_RETRIEVED: &str = "Record retrieved.";

/// Check-in, check-out and lookup of attendance records.
///
/// Holds no mutable state of its own; the store handle is shared by every
/// in-flight request and all write atomicity is left to the store.
pub struct AttendanceService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    zone: DisplayZone,
}

fn internal(context: &'static str) -> impl FnOnce(StoreError) -> ServiceError {
    move |e| {
        error!(error = %e, "{}", context);
        ServiceError::Internal(format!("{context}: {e}"))
    }
}

impl AttendanceService {
    pub fn new(store: Arc<dyn RecordStore>, zone: DisplayZone) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), zone)
    }

    pub fn with_clock(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, zone: DisplayZone) -> Self {
        Self { store, clock, zone }
    }

    pub fn zone(&self) -> &DisplayZone {
        &self.zone
    }

    fn render(&self, record: &AttendanceRecord, status: &str) -> AttendanceView {
        AttendanceView {
            id: record.id.to_string(),
            user_id: record.user_id.clone(),
            username: record.username.clone(),
            checkin_time: self.zone.format(&record.checkin_time),
            checkout_time: record.checkout_time.map(|t| self.zone.format(&t)),
            status_message: status.to_string(),
        }
    }

    #[instrument(skip(self, req), fields(user_id = %req.user_id))]
    pub async fn check_in(&self, req: CheckInRequest) -> ServiceResult<AttendanceView> {
        if req.user_id.trim().is_empty() || req.username.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "user_id and username are required".to_string(),
            ));
        }

        let new = NewAttendance {
            user_id: req.user_id,
            username: req.username,
            checkin_time: self.clock.now(),
        };

        let id = self
            .store
            .insert(&new)
            .await
            .map_err(internal("failed to insert record"))?;

        info!(record_id = %id, "user checked in");
        Ok(self.render(&new.with_id(id), CHECKED_IN))
    }

    /// Sets the checkout time unconditionally. A second check-out of the same
    /// record overwrites the first.
    #[instrument(skip(self))]
    pub async fn check_out(&self, record_id: &str) -> ServiceResult<AttendanceView> {
        let record_id = record_id.trim();
        if record_id.is_empty() {
            return Err(ServiceError::InvalidArgument("record_id required".to_string()));
        }

        let id: RecordId = record_id
            .parse()
            .map_err(|_| ServiceError::InvalidArgument("invalid record id".to_string()))?;

        let updated = self
            .store
            .find_one_and_update(id, AttendancePatch::checkout_at(self.clock.now()))
            .await
            .map_err(internal("update error"))?
            .ok_or_else(|| ServiceError::NotFound("record not found".to_string()))?;

        info!(record_id = %id, "user checked out");
        Ok(self.render(&updated, CHECKED_OUT))
    }

    /// Latest record for `user_id` by check-in time.
    #[instrument(skip(self))]
    pub async fn get_attendance(&self, user_id: &str) -> ServiceResult<AttendanceView> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("user_id required".to_string()));
        }

        let record = self
            .store
            .find_one(&RecordFilter::by_user(user_id), RecordSort::CheckinDesc)
            .await
            .map_err(internal("db error"))?
            .ok_or_else(|| ServiceError::NotFound("no records found for this user".to_string()))?;

        debug!(record_id = %record.id, "record found");
        Ok(self.render(&record, RECORD_FOUND))
    }

    /// Every record in store order. Records that fail to decode are logged,
    /// counted in `skipped` and left out; any other store failure fails the call.
    #[instrument(skip(self))]
    pub async fn get_all_attendance(&self) -> ServiceResult<AttendanceList> {
        let mut cursor = self
            .store
            .find_all()
            .await
            .map_err(internal("find error"))?;

        let mut list = AttendanceList::default();
        while let Some(item) = cursor.next().await {
            match item {
                Ok(record) => list.records.push(self.render(&record, RECORD_RETRIEVED)),
                Err(StoreError::Decode(reason)) => {
                    warn!(%reason, "skipping undecodable attendance record");
                    list.skipped += 1;
                }
                Err(e) => return Err(internal("cursor error")(e)),
            }
        }

        if list.skipped > 0 {
            warn!(skipped = list.skipped, returned = list.records.len(), "attendance scan skipped records");
        }

        Ok(list)
    }
}
