use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use utoipa::ToSchema;

use super::percentage;
use crate::model::Joined;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::model::round_cents;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepartmentStats {
    #[schema(example = "Engineering")]
    pub name: String,
    pub employees: usize,
    /// Mean annual salary.
    pub avg_salary: f64,
    /// Present or late records as a percentage of the department's records.
    pub attendance_rate: f64,
}

/// One entry per department, sorted by name. Attendance records of unknown
/// employees are ignored.
pub fn departments(
    employees: &[Employee],
    attendance: &[Joined<AttendanceRecord>],
) -> Vec<DepartmentStats> {
    let department_of: HashMap<&str, &str> = employees
        .iter()
        .map(|e| (e.id.as_str(), e.department.as_str()))
        .collect();

    // (attended, total) per department
    let mut presence: HashMap<&str, (usize, usize)> = HashMap::new();
    for record in attendance {
        let Some(dept) = department_of.get(record.employee_id.as_str()) else {
            continue;
        };
        let entry = presence.entry(*dept).or_default();
        entry.1 += 1;
        if record.status.is_attended() {
            entry.0 += 1;
        }
    }

    let mut groups: BTreeMap<&str, Vec<&Employee>> = BTreeMap::new();
    for e in employees {
        groups.entry(e.department.as_str()).or_default().push(e);
    }

    groups
        .into_iter()
        .map(|(name, members)| {
            let total_salary: f64 = members.iter().map(|e| e.salary).sum();
            let (attended, total) = presence.get(name).copied().unwrap_or_default();
            DepartmentStats {
                name: name.to_string(),
                employees: members.len(),
                avg_salary: round_cents(total_salary / members.len() as f64),
                attendance_rate: percentage(attended, total),
            }
        })
        .collect()
}
