use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::{MessageResponse, today};
use crate::error::Result;
use crate::model::attendance::{AttendanceRecord, DailyMark, NewAttendance};
use crate::resource::{DataContext, attendance, employees};
use crate::views::attendance::{AttendanceFilter, AttendanceSummary, rows, summary};
use crate::views::{AttendancePage, Paging};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkDailyRequest {
    #[schema(example = "2024-01-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub marks: Vec<DailyMark>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Defaults to today
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(Paging, AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance records", body = AttendancePage)
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    ctx: web::Data<DataContext>,
    paging: web::Query<Paging>,
    filter: web::Query<AttendanceFilter>,
) -> Result<HttpResponse> {
    let (records, staff) = futures::try_join!(attendance::fetch(&ctx), employees::fetch(&ctx))?;
    Ok(HttpResponse::Ok().json(paging.apply(rows(&records, &staff, &filter))))
}

/// Record attendance
///
/// Work hours, overtime and, unless given, the status are derived from the
/// check-in and check-out times.
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = NewAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 400, description = "Check-out before check-in", body = MessageResponse)
    ),
    tag = "Attendance"
)]
pub async fn record_attendance(
    ctx: web::Data<DataContext>,
    payload: web::Json<NewAttendance>,
) -> Result<HttpResponse> {
    let created = attendance::record(&ctx, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Mark daily attendance
///
/// Employees that already have a record for the date are skipped.
#[utoipa::path(
    post,
    path = "/api/attendance/mark-daily",
    request_body = MarkDailyRequest,
    responses(
        (status = 201, description = "Records created for the day", body = [AttendanceRecord])
    ),
    tag = "Attendance"
)]
pub async fn mark_daily(
    ctx: web::Data<DataContext>,
    payload: web::Json<MarkDailyRequest>,
) -> Result<HttpResponse> {
    let MarkDailyRequest { date, marks } = payload.into_inner();
    let created = attendance::mark_daily(&ctx, date, marks).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Counts and rate for one day", body = AttendanceSummary)
    ),
    tag = "Attendance"
)]
pub async fn attendance_summary(
    ctx: web::Data<DataContext>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse> {
    let date = query.date.unwrap_or_else(today);
    let records = attendance::fetch_for_date(&ctx, date).await?;
    Ok(HttpResponse::Ok().json(summary(&records, Some(date))))
}
