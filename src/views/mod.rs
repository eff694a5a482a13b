//! View models derived from cached collections.
//!
//! Everything here is a pure function of the rows it is given. Rows whose
//! employee cannot be resolved are left out of the output, never reported as
//! errors.

pub mod analytics;
pub mod attendance;
pub mod dashboard;
pub mod detail;
pub mod documents;
pub mod employees;
pub mod leave;
pub mod payroll;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::model::employee::Employee;
use crate::model::{EmployeeSummary, Joined};

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams, ToSchema)]
pub struct Paging {
    /// Page number, starting at 1
    #[schema(example = 1)]
    pub page: Option<usize>,
    /// Items per page (1-100)
    #[schema(example = 20)]
    pub per_page: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    EmployeePage = Page<employees::EmployeeRow>,
    AttendancePage = Page<attendance::AttendanceRow>,
    LeavePage = Page<leave::LeaveRow>,
    PayrollPage = Page<payroll::PayrollRow>,
    DocumentPage = Page<documents::DocumentRow>
)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[schema(example = 1)]
    pub page: usize,
    #[schema(example = 20)]
    pub per_page: usize,
    #[schema(example = 42)]
    pub total: usize,
}

impl Paging {
    pub fn apply<T>(self, items: Vec<T>) -> Page<T> {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let total = items.len();
        let data = items
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(per_page))
            .take(per_page)
            .collect();
        Page {
            data,
            page,
            per_page,
            total,
        }
    }
}

/// Who a row belongs to, as far as the views can tell.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub department: Option<String>,
    pub role: Option<String>,
    pub avatar_url: Option<String>,
}

/// Employees by id, used to resolve `employee_id` references.
pub struct EmployeeIndex<'a> {
    by_id: HashMap<&'a str, &'a Employee>,
}

impl<'a> EmployeeIndex<'a> {
    pub fn new(employees: &'a [Employee]) -> Self {
        Self {
            by_id: employees.iter().map(|e| (e.id.as_str(), e)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a Employee> {
        self.by_id.get(id).copied()
    }

    /// Resolves the owner of a joined row: the full employee record when it
    /// is loaded, else the embedded display fields. `None` means the row
    /// should be skipped.
    pub fn resolve<T>(&self, row: &Joined<T>, employee_id: &str) -> Option<Person> {
        if let Some(e) = self.get(employee_id) {
            return Some(Person {
                name: e.full_name(),
                department: Some(e.department.clone()),
                role: Some(e.role.clone()),
                avatar_url: e.avatar_url.clone(),
            });
        }
        if let Some(summary) = &row.employee {
            return Some(from_summary(summary));
        }
        warn!(employee_id, "Skipping row whose employee no longer exists");
        None
    }
}

fn from_summary(summary: &EmployeeSummary) -> Person {
    Person {
        name: summary.full_name(),
        department: None,
        role: None,
        avatar_url: summary.avatar_url.clone(),
    }
}

/// `"Ann Lee"` -> `"AL"`
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Share of `part` in `whole` as a percentage with one decimal; 0 when
/// `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

/// Case-insensitive substring match against any of `fields`. An empty or
/// missing needle matches everything.
pub fn matches_search(needle: Option<&str>, fields: &[&str]) -> bool {
    let Some(needle) = needle.map(str::trim).filter(|n| !n.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

/// Case-insensitive equality against an optional filter; `all` or an empty
/// filter matches everything.
pub fn matches_choice(filter: Option<&str>, value: &str) -> bool {
    match filter.map(str::trim) {
        None | Some("") => true,
        Some(f) if f.eq_ignore_ascii_case("all") => true,
        Some(f) => f.eq_ignore_ascii_case(value),
    }
}
