//! Read-only detail panels. Each record kind has a fixed allowlist of fields,
//! split into a primary and a secondary group.

use std::fmt::Display;

use serde::Serialize;
use utoipa::ToSchema;

use crate::export::format::{PLACEHOLDER, usd};
use crate::model::Joined;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::model::leave_request::LeaveRequest;
use crate::model::payroll::PayrollRecord;

pub enum DetailRecord<'a> {
    Employee(&'a Employee),
    Attendance(&'a Joined<AttendanceRecord>),
    Payroll(&'a Joined<PayrollRecord>),
    Leave(&'a Joined<LeaveRequest>),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DetailView {
    pub title: String,
    pub primary: Vec<DetailField>,
    pub secondary: Vec<DetailField>,
}

fn field(label: &'static str, value: impl Display) -> DetailField {
    DetailField {
        label,
        value: value.to_string(),
    }
}

fn optional<T: Display>(label: &'static str, value: Option<T>) -> DetailField {
    match value {
        Some(v) => field(label, v),
        None => field(label, PLACEHOLDER),
    }
}

fn employee_name<T>(row: &Joined<T>, employee_id: &str) -> String {
    row.employee
        .as_ref()
        .map(|e| e.full_name())
        .unwrap_or_else(|| employee_id.to_string())
}

impl DetailRecord<'_> {
    pub fn view(&self) -> DetailView {
        match self {
            DetailRecord::Employee(e) => DetailView {
                title: e.full_name(),
                primary: vec![
                    field("Full Name", e.full_name()),
                    field("Email", &e.email),
                    field("Employee ID", &e.id),
                    field("Position", &e.role),
                    field("Department", &e.department),
                ],
                secondary: vec![
                    optional("Phone", e.phone.as_deref()),
                    field("Join Date", e.join_date),
                    field("Salary", usd(e.salary)),
                    field("Status", e.status),
                ],
            },
            DetailRecord::Attendance(r) => DetailView {
                title: format!("Attendance {}", r.date),
                primary: vec![
                    field("Employee", employee_name(r, &r.employee_id)),
                    field("Date", r.date),
                    optional("Check In", r.check_in),
                    optional("Check Out", r.check_out),
                    field("Status", r.status),
                ],
                secondary: vec![
                    optional("Total Hours", r.work_hours),
                    optional("Overtime Hours", r.overtime_hours),
                    optional("Notes", r.notes.as_deref()),
                ],
            },
            DetailRecord::Payroll(r) => DetailView {
                title: format!("Payroll {}", r.period().label()),
                primary: vec![
                    field("Employee", employee_name(r, &r.employee_id)),
                    field("Pay Period", r.period().label()),
                    field("Basic Salary", usd(r.basic_salary)),
                    field("Net Salary", usd(r.net_salary)),
                    field("Status", r.status),
                ],
                secondary: vec![
                    field("Allowances", usd(r.allowances)),
                    field("Deductions", usd(r.deductions)),
                    optional("Pay Date", r.pay_date),
                ],
            },
            DetailRecord::Leave(r) => DetailView {
                title: format!("{} request", r.leave_type),
                primary: vec![
                    field("Employee", employee_name(r, &r.employee_id)),
                    field("Leave Type", &r.leave_type),
                    field("Start Date", r.start_date),
                    field("End Date", r.end_date),
                    field("Status", r.status),
                ],
                secondary: vec![
                    field("Days Requested", r.days_requested),
                    optional("Reason", r.reason.as_deref()),
                    optional("Approved By", r.approved_by.as_deref()),
                    optional("Comments", r.comments.as_deref()),
                ],
            },
        }
    }
}
