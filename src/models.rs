use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Check-in payload. Missing fields deserialize as empty strings and are
/// rejected by validation, so both cases produce the same error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[serde(default)]
    #[schema(example = "u1")]
    pub user_id: String,
    #[serde(default)]
    #[schema(example = "Alice")]
    pub username: String,
}

impl CheckInRequest {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

/// An attendance record as shown to callers: canonical id string and
/// timestamps rendered in the display timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        "user_id": "u1",
        "username": "Alice",
        "checkin_time": "2025-03-01 09:00:00 IST",
        "checkout_time": "2025-03-01 17:30:00 IST",
        "status_message": "User checked out successfully."
    })
)]
pub struct AttendanceView {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub checkin_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = true)]
    pub checkout_time: Option<String>,
    pub status_message: String,
}

/// Result of a full scan.
#[derive(Debug, Clone, Default)]
pub struct AttendanceList {
    pub records: Vec<AttendanceView>,
    /// Stored records left out because they could not be decoded.
    pub skipped: usize,
}
