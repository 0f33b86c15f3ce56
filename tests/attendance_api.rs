//! End-to-end tests of the HTTP routes over the in-memory store.

use std::sync::Arc;

use actix_web::http::{Method, StatusCode};
use actix_web::middleware::NormalizePath;
use actix_web::{App, test, web};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};

use attendance::api::attendance::SKIPPED_RECORDS_HEADER;
use attendance::model::attendance::AttendanceRow;
use attendance::models::AttendanceView;
use attendance::routes::attendance_routes;
use attendance::service::{AttendanceService, ManualClock};
use attendance::store::MemoryRecordStore;
use attendance::utils::display_time::DisplayZone;

struct Harness {
    store: Arc<MemoryRecordStore>,
    clock: Arc<ManualClock>,
    service: web::Data<AttendanceService>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryRecordStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 3, 30, 0).unwrap(),
    ));
    let service = web::Data::new(AttendanceService::with_clock(
        store.clone(),
        clock.clone(),
        DisplayZone::kolkata(),
    ));
    Harness {
        store,
        clock,
        service,
    }
}

macro_rules! app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .wrap(NormalizePath::trim())
                .app_data($harness.service.clone())
                .service(web::scope("/v1").configure(attendance_routes)),
        )
        .await
    };
}

#[actix_web::test]
async fn check_in_returns_full_record() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/v1/checkin")
        .set_json(json!({ "user_id": "u1", "username": "Alice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["username"], "Alice");
    assert_eq!(body["checkin_time"], "2025-03-01 09:00:00 IST");
    assert_eq!(body["status_message"], "User checked in successfully.");
    assert!(body.get("checkout_time").is_none());
    assert!(body["id"].as_str().is_some_and(|id| id.len() == 36));
}

#[actix_web::test]
async fn check_in_missing_field_is_bad_request() {
    let h = harness();
    let app = app!(h);

    for payload in [
        json!({ "user_id": "u1" }),
        json!({ "username": "Alice" }),
        json!({ "user_id": "", "username": "Alice" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/v1/checkin")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
    }

    assert!(h.store.is_empty().unwrap());
}

#[actix_web::test]
async fn check_in_malformed_json_is_bad_request() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/v1/checkin")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
}

#[actix_web::test]
async fn check_out_status_codes() {
    let h = harness();
    let app = app!(h);

    let bad = test::TestRequest::with_uri("/v1/checkout/not-a-record")
        .method(Method::PUT)
        .to_request();
    let resp = test::call_service(&app, bad).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let missing = test::TestRequest::put()
        .uri("/v1/checkout/67e55044-10b1-426f-9247-bb680e5fe0c8")
        .to_request();
    let resp = test::call_service(&app, missing).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "record not found");
}

#[actix_web::test]
async fn get_attendance_for_unknown_user_is_not_found() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::get().uri("/v1/attendance/ghost").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn check_in_check_out_then_lookup() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/v1/checkin")
        .set_json(json!({ "user_id": "u1", "username": "Alice" }))
        .to_request();
    let created: AttendanceView = test::call_and_read_body_json(&app, req).await;

    h.clock.advance(Duration::hours(8));
    let req = test::TestRequest::put()
        .uri(&format!("/v1/checkout/{}", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let checked_out: AttendanceView = test::read_body_json(resp).await;
    assert_eq!(checked_out.id, created.id);
    assert_eq!(checked_out.checkout_time.as_deref(), Some("2025-03-01 17:00:00 IST"));

    let req = test::TestRequest::get().uri("/v1/attendance/u1").to_request();
    let found: AttendanceView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.id, created.id);
    assert_eq!(found.checkin_time, created.checkin_time);
    assert_eq!(found.checkout_time, checked_out.checkout_time);
    assert_eq!(found.status_message, "Record found.");
}

#[actix_web::test]
async fn get_all_on_empty_store_is_empty_array() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::get().uri("/v1/attendance").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(SKIPPED_RECORDS_HEADER).unwrap(), "0");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn get_all_reports_skipped_records_in_header() {
    let h = harness();
    let app = app!(h);

    for (user_id, username) in [("u1", "Alice"), ("u2", "Bob")] {
        let req = test::TestRequest::post()
            .uri("/v1/checkin")
            .set_json(json!({ "user_id": user_id, "username": username }))
            .to_request();
        test::call_service(&app, req).await;
        h.clock.advance(Duration::minutes(5));
    }
    h.store
        .insert_raw(AttendanceRow {
            id: "corrupt".to_string(),
            user_id: "u3".to_string(),
            username: "Carol".to_string(),
            checkin_time: Utc::now(),
            checkout_time: None,
        })
        .unwrap();

    // trailing slash is normalized away
    let req = test::TestRequest::get().uri("/v1/attendance/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(SKIPPED_RECORDS_HEADER).unwrap(), "1");

    let records: Vec<AttendanceView> = test::read_body_json(resp).await;
    let users: Vec<_> = records.iter().map(|r| r.user_id.as_str()).collect();
    assert_eq!(users, ["u1", "u2"]);
}
