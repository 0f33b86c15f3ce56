use actix_web::{HttpRequest, HttpResponse, web};

use crate::error::{ServiceError, ServiceResult};
use crate::models::CheckInRequest;
use crate::service::AttendanceService;

/// Response header carrying the number of records left out of a full listing.
pub const SKIPPED_RECORDS_HEADER: &str = "X-Skipped-Records";

/// JSON extractor config: malformed bodies become `INVALID_ARGUMENT` errors
/// with the same body shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        ServiceError::InvalidArgument(format!("invalid json body: {err}")).into()
    })
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/v1/checkin",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = crate::models::AttendanceView),
        (status = 400, description = "user_id or username missing", body = crate::error::ErrorBody, example = json!({
            "error": { "code": "INVALID_ARGUMENT", "message": "user_id and username are required" }
        })),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    service: web::Data<AttendanceService>,
    payload: web::Json<CheckInRequest>,
) -> ServiceResult<HttpResponse> {
    let record = service.check_in(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/v1/checkout/{record_id}",
    params(
        ("record_id" = String, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Checked out successfully", body = crate::models::AttendanceView),
        (status = 400, description = "Invalid record id", body = crate::error::ErrorBody, example = json!({
            "error": { "code": "INVALID_ARGUMENT", "message": "invalid record id" }
        })),
        (status = 404, description = "Record not found", body = crate::error::ErrorBody, example = json!({
            "error": { "code": "NOT_FOUND", "message": "record not found" }
        })),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    service: web::Data<AttendanceService>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let record = service.check_out(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Latest attendance record of a user
#[utoipa::path(
    get,
    path = "/v1/attendance/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Most recent record for the user", body = crate::models::AttendanceView),
        (status = 400, description = "user_id missing", body = crate::error::ErrorBody),
        (status = 404, description = "No records for the user", body = crate::error::ErrorBody, example = json!({
            "error": { "code": "NOT_FOUND", "message": "no records found for this user" }
        })),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    service: web::Data<AttendanceService>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let record = service.get_attendance(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// All attendance records
#[utoipa::path(
    get,
    path = "/v1/attendance",
    responses(
        (status = 200, description = "Every stored record; undecodable ones are left out and counted in X-Skipped-Records",
            body = [crate::models::AttendanceView],
            headers(("X-Skipped-Records" = usize, description = "Records skipped because they could not be decoded"))
        ),
        (status = 500, description = "Store failure", body = crate::error::ErrorBody)
    ),
    tag = "Attendance"
)]
pub async fn get_all_attendance(
    service: web::Data<AttendanceService>,
) -> ServiceResult<HttpResponse> {
    let list = service.get_all_attendance().await?;
    Ok(HttpResponse::Ok()
        .insert_header((SKIPPED_RECORDS_HEADER, list.skipped.to_string()))
        .json(list.records))
}
