use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::web::Data;
use actix_web::{App, test};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use tempfile::TempDir;

use hrm_sync::cache::{CacheConfig, QueryCache};
use hrm_sync::gateway::Table;
use hrm_sync::gateway::memory::InMemoryGateway;
use hrm_sync::preferences::PreferenceStore;
use hrm_sync::resource::DataContext;
use hrm_sync::routes;

struct Harness {
    gateway: Arc<InMemoryGateway>,
    ctx: Data<DataContext>,
    preferences: Data<PreferenceStore>,
    _dir: TempDir,
}

fn harness() -> Harness {
    let gateway = Arc::new(InMemoryGateway::new());
    let ctx = DataContext::new(gateway.clone(), QueryCache::new(&CacheConfig::default()));
    let dir = tempfile::tempdir().unwrap();
    let preferences = PreferenceStore::open(dir.path().join("preferences.json"));
    Harness {
        gateway,
        ctx: Data::new(ctx),
        preferences: Data::new(preferences),
        _dir: dir,
    }
}

macro_rules! app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .app_data($h.ctx.clone())
                .app_data($h.preferences.clone())
                .service(routes::api("/api")),
        )
        .await
    };
}

fn employee(id: &str, first: &str, last: &str, status: &str) -> Value {
    json!({
        "id": id,
        "first_name": first,
        "last_name": last,
        "email": format!("{}@company.com", first.to_lowercase()),
        "department": "Engineering",
        "role": "Developer",
        "salary": 60000.0,
        "status": status,
        "join_date": "2024-01-01",
        "avatar_url": null
    })
}

fn leave(id: &str, employee_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "employee_id": employee_id,
        "leave_type": "Sick Leave",
        "start_date": "2024-01-15",
        "end_date": "2024-01-16",
        "days_requested": 2,
        "status": status
    })
}

#[actix_web::test]
async fn employee_lifecycle_is_visible_on_next_read() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/employees")
        .set_json(json!({
            "first_name": "Ann",
            "last_name": "Lee",
            "email": "ann@company.com",
            "department": "Engineering",
            "role": "Developer",
            "salary": 60000,
            "join_date": "2024-01-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    let list: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/employees").to_request(),
    )
    .await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["data"][0]["name"], "Ann Lee");

    let req = test::TestRequest::put()
        .uri(&format!("/api/employees/{id}"))
        .set_json(json!({ "last_name": "Park" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let list: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/employees").to_request(),
    )
    .await;
    assert_eq!(list["data"][0]["name"], "Ann Park");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/employees/{id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/employees/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains(&id));
}

#[rstest]
#[case(json!({ "id": "other" }))]
#[case(json!({ "email": "not-an-email" }))]
#[case(json!({ "nickname": "A" }))]
#[case(json!({}))]
#[actix_web::test]
async fn bad_patches_are_rejected_before_the_store(#[case] patch: Value) {
    let h = harness();
    h.gateway
        .seed(Table::Employees, vec![employee("e-1", "Ann", "Lee", "Active")])
        .unwrap();
    let app = app!(h);

    let req = test::TestRequest::put()
        .uri("/api/employees/e-1")
        .set_json(patch)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.gateway.write_count(Table::Employees), 0);
}

#[actix_web::test]
async fn leave_can_only_leave_pending_once() {
    let h = harness();
    h.gateway
        .seed(Table::Employees, vec![employee("e-1", "Ann", "Lee", "Active")])
        .unwrap();
    h.gateway
        .seed(Table::LeaveRequests, vec![leave("l-1", "e-1", "Pending")])
        .unwrap();
    let app = app!(h);

    let list: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/leave?status=pending").to_request(),
    )
    .await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["data"][0]["actionable"], true);

    let approve = |id: &str| {
        test::TestRequest::put()
            .uri(&format!("/api/leave/{id}/approve"))
            .to_request()
    };
    let resp = test::call_service(&app, approve("l-1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "Approved");

    let reject = test::TestRequest::put().uri("/api/leave/l-1/reject").to_request();
    assert_eq!(test::call_service(&app, reject).await.status(), StatusCode::CONFLICT);
    assert_eq!(
        test::call_service(&app, approve("missing")).await.status(),
        StatusCode::NOT_FOUND
    );

    // the approval invalidated the list
    let list: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/leave?status=pending").to_request(),
    )
    .await;
    assert_eq!(list["total"], 0);
}

#[actix_web::test]
async fn payroll_period_is_generated_once() {
    let h = harness();
    h.gateway
        .seed(
            Table::Employees,
            vec![
                employee("e-1", "Ann", "Lee", "Active"),
                employee("e-2", "Bob", "Stone", "Inactive"),
            ],
        )
        .unwrap();
    let app = app!(h);

    let generate = || {
        test::TestRequest::post()
            .uri("/api/payroll/generate")
            .set_json(json!({ "year": 2024, "month": 1 }))
            .to_request()
    };
    let resp = test::call_service(&app, generate()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created.as_array().unwrap().len(), 1);
    assert_eq!(created[0]["net_salary"], 5100.0);

    let writes = h.gateway.write_count(Table::Payroll);
    assert_eq!(test::call_service(&app, generate()).await.status(), StatusCode::CONFLICT);
    assert_eq!(h.gateway.write_count(Table::Payroll), writes);

    let list: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/payroll?period=2024-01").to_request(),
    )
    .await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["data"][0]["employee_name"], "Ann Lee");

    let bad = test::TestRequest::get().uri("/api/payroll?period=2024-13").to_request();
    assert_eq!(test::call_service(&app, bad).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn mark_daily_skips_employees_already_recorded() {
    let h = harness();
    h.gateway
        .seed(
            Table::Employees,
            vec![
                employee("e-1", "Ann", "Lee", "Active"),
                employee("e-2", "Bob", "Stone", "Active"),
            ],
        )
        .unwrap();
    let app = app!(h);

    let manual = test::TestRequest::post()
        .uri("/api/attendance")
        .set_json(json!({
            "employee_id": "e-1",
            "date": "2024-01-02",
            "check_in": "09:30:00",
            "check_out": "18:30:00"
        }))
        .to_request();
    let resp = test::call_service(&app, manual).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let record: Value = test::read_body_json(resp).await;
    assert_eq!(record["status"], "Late");
    assert_eq!(record["overtime_hours"], 1.0);

    let bulk = test::TestRequest::post()
        .uri("/api/attendance/mark-daily")
        .set_json(json!({
            "date": "2024-01-02",
            "marks": [
                { "employee_id": "e-1", "check_in": "09:00:00", "check_out": "17:00:00" },
                { "employee_id": "e-2" }
            ]
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, bulk).await;
    assert_eq!(created.as_array().unwrap().len(), 1);
    assert_eq!(created[0]["employee_id"], "e-2");
    assert_eq!(created[0]["status"], "Absent");

    let summary: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/attendance/summary?date=2024-01-02")
            .to_request(),
    )
    .await;
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["late"], 1);
    assert_eq!(summary["absent"], 1);
    assert_eq!(summary["attendance_rate"], 50.0);
}

#[actix_web::test]
async fn reports_download_with_fixed_header() {
    let h = harness();
    h.gateway
        .seed(
            Table::Employees,
            vec![
                employee("e-1", "Ann", "Lee", "Active"),
                employee("e-2", "Bob", "Stone", "On Leave"),
            ],
        )
        .unwrap();
    let app = app!(h);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/reports/employees?format=csv")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("employees-"));
    assert!(disposition.contains(".csv"));

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Name,Position,Department,Email,Phone,Status");
    assert_eq!(lines.len(), 3);
    // newest first, and a missing phone renders as the placeholder
    assert!(lines[1].starts_with("Bob Stone,Developer,Engineering,bob@company.com"));
    assert!(lines[1].ends_with("N/A,On Leave"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/reports/leave").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let pdf = test::read_body(resp).await;
    assert!(pdf.starts_with(b"%PDF"));

    let departments: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/reports/departments").to_request(),
    )
    .await;
    assert_eq!(departments[0]["name"], "Engineering");
    assert_eq!(departments[0]["employees"], 2);

    let unknown = test::TestRequest::get().uri("/api/reports/nonsense").to_request();
    assert_eq!(test::call_service(&app, unknown).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn cache_table_shows_staleness_after_mutation() {
    let h = harness();
    h.gateway
        .seed(Table::Employees, vec![employee("e-1", "Ann", "Lee", "Active")])
        .unwrap();
    let app = app!(h);

    test::call_service(&app, test::TestRequest::get().uri("/api/employees").to_request()).await;
    test::call_service(&app, test::TestRequest::get().uri("/api/employees").to_request()).await;
    assert_eq!(h.gateway.select_count(Table::Employees), 1);

    let entries: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/cache").to_request(),
    )
    .await;
    assert_eq!(entries[0]["key"], "employees");
    assert_eq!(entries[0]["status"], "success");
    assert_eq!(entries[0]["stale"], false);

    let req = test::TestRequest::put()
        .uri("/api/employees/e-1")
        .set_json(json!({ "salary": 65000 }))
        .to_request();
    test::call_service(&app, req).await;

    let entries: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/cache").to_request(),
    )
    .await;
    assert_eq!(entries[0]["stale"], true);

    let list: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/employees").to_request(),
    )
    .await;
    assert_eq!(list["data"][0]["salary"], 65000.0);
    assert_eq!(h.gateway.select_count(Table::Employees), 2);
}

#[actix_web::test]
async fn failed_reads_surface_as_bad_gateway_and_are_retried() {
    let h = harness();
    h.gateway
        .seed(Table::Employees, vec![employee("e-1", "Ann", "Lee", "Active")])
        .unwrap();
    h.gateway.fail_next_selects(Table::Employees, 1);
    let app = app!(h);

    let first = test::call_service(&app, test::TestRequest::get().uri("/api/employees").to_request()).await;
    assert_eq!(first.status(), StatusCode::BAD_GATEWAY);

    let second = test::call_service(&app, test::TestRequest::get().uri("/api/employees").to_request()).await;
    assert_eq!(second.status(), StatusCode::OK);
}

#[actix_web::test]
async fn avatar_and_document_links_point_at_storage() {
    let h = harness();
    h.gateway
        .seed(Table::Employees, vec![employee("e-1", "Ann", "Lee", "Active")])
        .unwrap();
    h.gateway
        .seed(
            Table::Documents,
            vec![json!({
                "id": "d-1", "employee_id": "e-1", "name": "Contract.pdf",
                "doc_type": "Contract", "uploaded_by": "HR", "upload_date": "2024-01-05",
                "size_bytes": 2048, "status": "Active", "file_path": "e-1/contract.pdf"
            })],
        )
        .unwrap();
    let app = app!(h);

    let rejected = test::TestRequest::post()
        .uri("/api/employees/e-1/avatar")
        .insert_header((header::CONTENT_TYPE, "text/plain"))
        .set_payload("hello")
        .to_request();
    assert_eq!(test::call_service(&app, rejected).await.status(), StatusCode::BAD_REQUEST);

    let upload = test::TestRequest::post()
        .uri("/api/employees/e-1/avatar")
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0x89, b'P', b'N', b'G'])
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, upload).await;
    let url = updated["avatar_url"].as_str().unwrap();
    assert!(url.starts_with("memory://employee-avatars/"));
    assert!(url.ends_with(".png"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/documents/d-1/download").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "memory://employee-documents/e-1/contract.pdf"
    );
}

#[actix_web::test]
async fn preferences_round_trip_through_the_file() {
    let h = harness();
    let app = app!(h);

    let current: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/preferences").to_request(),
    )
    .await;
    assert_eq!(current["theme"], "light");
    assert_eq!(current["primaryColor"]["name"], "blue");

    let req = test::TestRequest::put()
        .uri("/api/preferences")
        .set_json(json!({ "theme": "dark", "primaryColor": "purple" }))
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["theme"], "dark");
    assert_eq!(saved["primaryColor"]["value"], "hsl(262, 83%, 58%)");

    let req = test::TestRequest::put()
        .uri("/api/preferences")
        .set_json(json!({ "primaryColor": "teal" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn dashboard_combines_collections() {
    let h = harness();
    h.gateway
        .seed(
            Table::Employees,
            vec![
                employee("e-1", "Ann", "Lee", "Active"),
                employee("e-2", "Bob", "Stone", "Inactive"),
            ],
        )
        .unwrap();
    h.gateway
        .seed(
            Table::LeaveRequests,
            vec![leave("l-1", "e-1", "Pending"), leave("l-2", "e-2", "Approved")],
        )
        .unwrap();
    let app = app!(h);

    let dash: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/dashboard").to_request(),
    )
    .await;

    assert_eq!(dash["employees"]["total"], 2);
    assert_eq!(dash["employees"]["active"], 1);
    assert_eq!(dash["leave"]["pending"], 1);
    assert_eq!(dash["pending_requests"][0]["id"], "l-1");
    assert_eq!(dash["attendance_today"]["total"], 0);
}

#[actix_web::test]
async fn out_of_range_page_returns_an_empty_page() {
    let h = harness();
    let app = app!(h);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/employees?page={}", usize::MAX))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"], json!([]));
}
