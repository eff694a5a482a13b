//! Turns row collections into downloadable report files.
//!
//! A [`ReportDocument`] is built from typed rows with a fixed header per
//! [`ReportKind`]; body rows keep their input order. Encoding to PDF or CSV
//! is a pure function of the document.

mod csv;
pub mod format;
mod layout;
mod pdf;

use chrono::NaiveDate;
use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::error::Result;
use crate::views::analytics::DepartmentStats;
use crate::views::attendance::AttendanceRow;
use crate::views::employees::EmployeeRow;
use crate::views::leave::LeaveRow;
use crate::views::payroll::PayrollRow;
use format::{PLACEHOLDER, percent, slug, thousands, usd};

pub use layout::{PageLayout, paginate};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter, Deserialize, ToSchema,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Attendance,
    Payroll,
    DepartmentAnalytics,
    Employees,
    Leave,
    Template,
}

impl ReportKind {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            ReportKind::Attendance => &[
                "Employee",
                "Department",
                "Status",
                "Check In",
                "Check Out",
                "Working Hours",
            ],
            ReportKind::Payroll => &[
                "Employee",
                "Department",
                "Base Salary",
                "Overtime",
                "Deductions",
                "Net Salary",
            ],
            ReportKind::DepartmentAnalytics => {
                &["Department", "Employees", "Avg Salary", "Attendance Rate"]
            }
            ReportKind::Employees => &["Name", "Position", "Department", "Email", "Phone", "Status"],
            ReportKind::Leave => &["Employee", "Type", "Start Date", "End Date", "Days", "Status"],
            ReportKind::Template => &["Column 1", "Column 2", "Column 3", "Column 4"],
        }
    }

    /// Only these carry a period line.
    pub fn has_period(self) -> bool {
        matches!(self, ReportKind::Attendance | ReportKind::Payroll)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Deserialize, ToSchema)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// Typed rows for one report.
pub enum ReportRows {
    Attendance(Vec<AttendanceRow>),
    Payroll(Vec<PayrollRow>),
    Departments(Vec<DepartmentStats>),
    Employees(Vec<EmployeeRow>),
    Leave(Vec<LeaveRow>),
    /// Sample layout for the named report.
    Template(String),
}

fn or_placeholder<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

impl ReportRows {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportRows::Attendance(_) => ReportKind::Attendance,
            ReportRows::Payroll(_) => ReportKind::Payroll,
            ReportRows::Departments(_) => ReportKind::DepartmentAnalytics,
            ReportRows::Employees(_) => ReportKind::Employees,
            ReportRows::Leave(_) => ReportKind::Leave,
            ReportRows::Template(_) => ReportKind::Template,
        }
    }

    fn title(&self) -> String {
        match self {
            ReportRows::Attendance(_) => "Attendance Report".into(),
            ReportRows::Payroll(_) => "Payroll Report".into(),
            ReportRows::Departments(_) => "Department Analytics Report".into(),
            ReportRows::Employees(_) => "Employee Report".into(),
            ReportRows::Leave(_) => "Leave Management Report".into(),
            ReportRows::Template(subject) => format!("{subject} Report Template"),
        }
    }

    fn cells(self) -> Vec<Vec<String>> {
        match self {
            ReportRows::Attendance(rows) => rows
                .into_iter()
                .map(|r| {
                    vec![
                        r.employee_name,
                        or_placeholder(r.department),
                        r.status.to_string(),
                        or_placeholder(r.check_in.map(|t| t.format("%H:%M"))),
                        or_placeholder(r.check_out.map(|t| t.format("%H:%M"))),
                        or_placeholder(r.work_hours.map(|h| format!("{h:.2}"))),
                    ]
                })
                .collect(),
            // the stored record has no overtime pay; allowances fill that column
            ReportRows::Payroll(rows) => rows
                .into_iter()
                .map(|r| {
                    vec![
                        r.employee_name,
                        or_placeholder(r.department),
                        thousands(r.basic_salary),
                        thousands(r.allowances),
                        thousands(r.deductions),
                        thousands(r.net_salary),
                    ]
                })
                .collect(),
            ReportRows::Departments(rows) => rows
                .into_iter()
                .map(|d| {
                    vec![
                        d.name,
                        d.employees.to_string(),
                        usd(d.avg_salary),
                        percent(d.attendance_rate),
                    ]
                })
                .collect(),
            ReportRows::Employees(rows) => rows
                .into_iter()
                .map(|e| {
                    vec![
                        e.name,
                        e.role,
                        e.department,
                        e.email,
                        or_placeholder(e.phone),
                        e.status.to_string(),
                    ]
                })
                .collect(),
            ReportRows::Leave(rows) => rows
                .into_iter()
                .map(|l| {
                    vec![
                        l.employee_name,
                        l.leave_type,
                        l.start_date.to_string(),
                        l.end_date.to_string(),
                        l.days.to_string(),
                        l.status.to_string(),
                    ]
                })
                .collect(),
            ReportRows::Template(_) => {
                let sample = |prefix: &str| -> Vec<String> {
                    (1..=4).map(|i| format!("{prefix} {i}")).collect()
                };
                vec![
                    sample("Sample Column"),
                    vec!["Data Row 1".to_string(); 4],
                    vec!["Data Row 2".to_string(); 4],
                ]
            }
        }
    }

    fn file_stem(&self) -> String {
        match self {
            ReportRows::Template(subject) => format!("{}-template", slug(subject)),
            other => other.kind().to_string(),
        }
    }
}

/// A report ready to encode.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub kind: ReportKind,
    pub title: String,
    /// Shown as `Period: ...` for kinds that have one.
    pub period: Option<String>,
    pub generated_on: NaiveDate,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    file_stem: String,
}

impl ReportDocument {
    pub fn new(rows: ReportRows, period: Option<String>, generated_on: NaiveDate) -> Self {
        let kind = rows.kind();
        let period = period.filter(|p| kind.has_period() && !p.trim().is_empty());
        Self {
            kind,
            title: rows.title(),
            period,
            generated_on,
            header: kind.header().iter().map(|h| h.to_string()).collect(),
            file_stem: rows.file_stem(),
            rows: rows.cells(),
        }
    }

    /// Lines printed above the table.
    pub fn preamble(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if let Some(period) = &self.period {
            lines.push(format!("Period: {period}"));
        }
        lines.push(format!("Generated on: {}", self.generated_on.format("%Y-%m-%d")));
        lines
    }

    /// `<kind>-<period-or-date>.<ext>`
    pub fn file_name(&self, format: ExportFormat) -> String {
        let suffix = self
            .period
            .as_deref()
            .map(slug)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.generated_on.format("%Y-%m-%d").to_string());
        format!("{}-{suffix}.{}", self.file_stem, format.extension())
    }
}

/// An encoded report.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn render(doc: &ReportDocument, format: ExportFormat) -> Result<ExportFile> {
    let bytes = match format {
        ExportFormat::Pdf => pdf::encode(doc)?,
        ExportFormat::Csv => csv::encode(doc)?,
    };
    Ok(ExportFile {
        file_name: doc.file_name(format),
        content_type: format.content_type(),
        bytes,
    })
}
