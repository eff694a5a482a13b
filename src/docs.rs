use utoipa::OpenApi;

use crate::api::MessageResponse;
use crate::api::attendance::MarkDailyRequest;
use crate::api::employee::EmployeeDetail;
use crate::cache::{CacheEntrySummary, CacheStatus};
use crate::export::{ExportFormat, ReportKind};
use crate::model::EmployeeSummary;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, DailyMark, NewAttendance};
use crate::model::document::{DocumentRecord, DocumentStatus};
use crate::model::employee::{Employee, EmployeeStatus, EmployeeUpdate, NewEmployee};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::payroll::{PayPeriod, PayrollRecord, PayrollStatus};
use crate::preferences::{CssVars, Preferences, PreferencesUpdate, PrimaryColor, ThemeMode};
use crate::views::analytics::DepartmentStats;
use crate::views::attendance::{AttendanceRow, AttendanceSummary};
use crate::views::dashboard::Dashboard;
use crate::views::detail::{DetailField, DetailView};
use crate::views::documents::{DocumentRow, DocumentStats};
use crate::views::employees::{EmployeeRow, EmployeeStats};
use crate::views::leave::{LeaveRow, LeaveStats};
use crate::views::payroll::{PayrollRow, PayrollSummary};
use crate::views::{AttendancePage, DocumentPage, EmployeePage, LeavePage, PayrollPage};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Sync API",
        version = "0.1.0",
        description = r#"
## HR dashboard data layer

Reads and mutations for an HR dashboard backed by a hosted data store.
Reads are served from a shared query cache; every successful mutation marks
the affected collections stale so the next read fetches them again.

### Key Features
- **Employees**: list, create, edit, delete and upload avatars
- **Attendance**: manual entry, daily bulk marking and day summaries
- **Leave**: approve or reject Pending requests
- **Payroll**: generate a period once and browse records
- **Documents**: list and download stored files
- **Reports**: dashboard, department analytics and PDF/CSV exports
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::upload_avatar,

        crate::api::attendance::list_attendance,
        crate::api::attendance::record_attendance,
        crate::api::attendance::mark_daily,
        crate::api::attendance::attendance_summary,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::payroll::list_payrolls,
        crate::api::payroll::generate_payroll,

        crate::api::document::list_documents,
        crate::api::document::download_document,

        crate::api::dashboard::dashboard,
        crate::api::dashboard::department_analytics,
        crate::api::dashboard::download_report,

        crate::api::settings::get_preferences,
        crate::api::settings::update_preferences,
        crate::api::settings::cache_status
    ),
    components(
        schemas(
            MessageResponse,
            Employee,
            EmployeeStatus,
            EmployeeSummary,
            NewEmployee,
            EmployeeUpdate,
            EmployeeDetail,
            EmployeeRow,
            EmployeeStats,
            EmployeePage,
            AttendanceRecord,
            AttendanceStatus,
            NewAttendance,
            DailyMark,
            MarkDailyRequest,
            AttendanceRow,
            AttendanceSummary,
            AttendancePage,
            LeaveRequest,
            LeaveStatus,
            LeaveRow,
            LeaveStats,
            LeavePage,
            PayPeriod,
            PayrollRecord,
            PayrollStatus,
            PayrollRow,
            PayrollSummary,
            PayrollPage,
            DocumentRecord,
            DocumentStatus,
            DocumentRow,
            DocumentStats,
            DocumentPage,
            Dashboard,
            DepartmentStats,
            DetailField,
            DetailView,
            ReportKind,
            ExportFormat,
            ThemeMode,
            CssVars,
            PrimaryColor,
            Preferences,
            PreferencesUpdate,
            CacheStatus,
            CacheEntrySummary
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
        (name = "Document", description = "Employee document APIs"),
        (name = "Dashboard", description = "Dashboard figures"),
        (name = "Report", description = "Analytics and report exports"),
        (name = "Settings", description = "Appearance preferences and cache status"),
    )
)]
pub struct ApiDoc;
