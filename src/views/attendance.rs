use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{EmployeeIndex, initials, matches_choice, matches_search, percentage};
use crate::model::Joined;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    /// Matches employee name or department
    pub search: Option<String>,
    /// `Present`, `Late`, `Absent`, `Half Day` or `all`
    pub status: Option<String>,
    #[schema(example = "2024-01-02", value_type = Option<String>, format = "date")]
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceRow {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub initials: String,
    pub department: Option<String>,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,
    pub work_hours: Option<f64>,
    pub overtime_hours: f64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub total: usize,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub half_day: usize,
    /// Present or late, as a percentage of all records.
    pub attendance_rate: f64,
    pub overtime_hours: f64,
}

pub fn rows(
    records: &[Joined<AttendanceRecord>],
    employees: &[Employee],
    filter: &AttendanceFilter,
) -> Vec<AttendanceRow> {
    let index = EmployeeIndex::new(employees);
    records
        .iter()
        .filter(|r| filter.date.is_none_or(|d| r.date == d))
        .filter(|r| matches_choice(filter.status.as_deref(), &r.status.to_string()))
        .filter_map(|r| {
            let person = index.resolve(r, &r.employee_id)?;
            let department = person.department.clone().unwrap_or_default();
            if !matches_search(filter.search.as_deref(), &[person.name.as_str(), department.as_str()]) {
                return None;
            }
            Some(AttendanceRow {
                id: r.id.clone(),
                employee_id: r.employee_id.clone(),
                initials: initials(&person.name),
                employee_name: person.name,
                department: person.department,
                date: r.date,
                check_in: r.check_in,
                check_out: r.check_out,
                work_hours: r.work_hours,
                overtime_hours: r.overtime_hours.unwrap_or(0.0),
                status: r.status,
            })
        })
        .collect()
}

/// Status counts over `records`, optionally restricted to one day.
pub fn summary(records: &[Joined<AttendanceRecord>], date: Option<NaiveDate>) -> AttendanceSummary {
    let day: Vec<&AttendanceRecord> = records
        .iter()
        .map(|r| &r.row)
        .filter(|r| date.is_none_or(|d| r.date == d))
        .collect();
    let count = |status: AttendanceStatus| day.iter().filter(|r| r.status == status).count();
    let attended = day.iter().filter(|r| r.status.is_attended()).count();
    let overtime: f64 = day.iter().filter_map(|r| r.overtime_hours).sum();

    AttendanceSummary {
        date,
        total: day.len(),
        present: count(AttendanceStatus::Present),
        late: count(AttendanceStatus::Late),
        absent: count(AttendanceStatus::Absent),
        half_day: count(AttendanceStatus::HalfDay),
        attendance_rate: percentage(attended, day.len()),
        overtime_hours: crate::model::round_cents(overtime),
    }
}
