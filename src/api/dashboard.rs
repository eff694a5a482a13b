use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use super::{MessageResponse, today};
use crate::error::Result;
use crate::export::{ExportFormat, ReportDocument, ReportKind, ReportRows, render};
use crate::resource::{DataContext, attendance, employees, leave_requests, payroll};
use crate::views::analytics::{DepartmentStats, departments};
use crate::views::attendance::AttendanceFilter;
use crate::views::dashboard::{self, Dashboard, DashboardInput};
use crate::views::employees::EmployeeFilter;
use crate::views::leave::LeaveFilter;
use crate::views::payroll::{PayrollFilter, latest_period};
use crate::views::{attendance as attendance_view, employees as employee_view};
use crate::views::{leave as leave_view, payroll as payroll_view};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Headline figures across all collections", body = Dashboard)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(ctx: web::Data<DataContext>) -> Result<HttpResponse> {
    let (staff, records, requests, runs) = futures::try_join!(
        employees::fetch(&ctx),
        attendance::fetch(&ctx),
        leave_requests::fetch(&ctx),
        payroll::fetch(&ctx),
    )?;
    let view = dashboard::build(
        DashboardInput {
            employees: &staff,
            attendance: &records,
            leave_requests: &requests,
            payroll: &runs,
        },
        today(),
    );
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    get,
    path = "/api/reports/departments",
    responses(
        (status = 200, description = "Per-department figures", body = [DepartmentStats])
    ),
    tag = "Report"
)]
pub async fn department_analytics(ctx: web::Data<DataContext>) -> Result<HttpResponse> {
    let (staff, records) = futures::try_join!(employees::fetch(&ctx), attendance::fetch(&ctx))?;
    Ok(HttpResponse::Ok().json(departments(&staff, &records)))
}

/// Filters and options for a downloadable report. Only the fields that make
/// sense for the requested kind are used.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// `pdf` (default) or `csv`
    #[param(value_type = Option<String>)]
    pub format: Option<ExportFormat>,
    /// Payroll period as `YYYY-MM`
    pub period: Option<String>,
    /// Attendance day
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub department: Option<String>,
    /// Report name shown on a template
    pub subject: Option<String>,
}

async fn report_rows(
    ctx: &DataContext,
    kind: ReportKind,
    query: ReportQuery,
) -> Result<(ReportRows, Option<String>)> {
    Ok(match kind {
        ReportKind::Attendance => {
            let (records, staff) =
                futures::try_join!(attendance::fetch(ctx), employees::fetch(ctx))?;
            let filter = AttendanceFilter {
                search: query.search,
                status: query.status,
                date: query.date,
            };
            let period = query.date.map(|d| d.format("%B %-d, %Y").to_string());
            (
                ReportRows::Attendance(attendance_view::rows(&records, &staff, &filter)),
                period,
            )
        }
        ReportKind::Payroll => {
            let filter = PayrollFilter {
                period: query.period,
                search: query.search,
                status: query.status,
            };
            let requested = filter.period()?;
            let (records, staff) = futures::try_join!(payroll::fetch(ctx), employees::fetch(ctx))?;
            let period = requested.or_else(|| latest_period(&records));
            (
                ReportRows::Payroll(payroll_view::rows(&records, &staff, period, &filter)),
                period.map(|p| p.label()),
            )
        }
        ReportKind::DepartmentAnalytics => {
            let (staff, records) =
                futures::try_join!(employees::fetch(ctx), attendance::fetch(ctx))?;
            (ReportRows::Departments(departments(&staff, &records)), None)
        }
        ReportKind::Employees => {
            let staff = employees::fetch(ctx).await?;
            let filter = EmployeeFilter {
                search: query.search,
                department: query.department,
                status: query.status,
            };
            (ReportRows::Employees(employee_view::rows(&staff, &filter)), None)
        }
        ReportKind::Leave => {
            let (requests, staff) =
                futures::try_join!(leave_requests::fetch(ctx), employees::fetch(ctx))?;
            let filter = LeaveFilter {
                search: query.search,
                status: query.status,
            };
            (ReportRows::Leave(leave_view::rows(&requests, &staff, &filter)), None)
        }
        ReportKind::Template => {
            let subject = query.subject.unwrap_or_else(|| "Employee".into());
            (ReportRows::Template(subject), None)
        }
    })
}

/// Download Report
///
/// Renders the current rows of a collection as a PDF or CSV attachment.
#[utoipa::path(
    get,
    path = "/api/reports/{kind}",
    params(
        ("kind" = ReportKind, Path, description = "attendance, payroll, department-analytics, employees, leave or template"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Report file", content_type = "application/pdf"),
        (status = 404, description = "Unknown report kind", body = MessageResponse)
    ),
    tag = "Report"
)]
pub async fn download_report(
    ctx: web::Data<DataContext>,
    path: web::Path<ReportKind>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse> {
    let kind = path.into_inner();
    let query = query.into_inner();
    let format = query.format.unwrap_or_default();

    let (rows, period) = report_rows(&ctx, kind, query).await?;
    let doc = ReportDocument::new(rows, period, today());
    let file = render(&doc, format)?;
    info!(file = %file.file_name, rows = doc.rows.len(), "Report exported");

    Ok(HttpResponse::Ok()
        .content_type(file.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.file_name)],
        })
        .body(file.bytes))
}
