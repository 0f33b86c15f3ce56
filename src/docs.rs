use crate::error::{ErrorBody, ErrorDetail};
use crate::models::{AttendanceView, CheckInRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Service API",
        version = "1.0.0",
        description = r#"
## Attendance Service

Record-keeping for employee attendance: clients check in, check out, and
query records keyed by user.

### Operations
- **Check in** creates a record with the current time
- **Check out** sets the checkout time of an existing record
- **Get attendance** returns the latest record of a user
- **Get all attendance** lists every stored record

### Timestamps
Stored in UTC, rendered as `YYYY-MM-DD HH:MM:SS ZONE` in the configured
display timezone.

### Errors
Every failure returns `{"error": {"code", "message"}}` with code
`INVALID_ARGUMENT` (400), `NOT_FOUND` (404) or `INTERNAL` (500).

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::get_attendance,
        crate::api::attendance::get_all_attendance,

        crate::api::health::health
    ),
    components(
        schemas(
            CheckInRequest,
            AttendanceView,
            ErrorBody,
            ErrorDetail
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance check-in/check-out APIs"),
        (name = "Health", description = "Liveness check"),
    )
)]
pub struct ApiDoc;
