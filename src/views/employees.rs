use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{initials, matches_choice, matches_search};
use crate::model::employee::{Employee, EmployeeStatus};

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeFilter {
    /// Matches name, email, role or department
    #[schema(example = "lee")]
    pub search: Option<String>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
    /// `Active`, `Inactive`, `On Leave` or `all`
    #[schema(example = "Active")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeRow {
    pub id: String,
    #[schema(example = "Ann Lee")]
    pub name: String,
    #[schema(example = "AL")]
    pub initials: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub role: String,
    pub salary: f64,
    pub status: EmployeeStatus,
    #[schema(value_type = String, format = "date")]
    pub join_date: NaiveDate,
    pub avatar_url: Option<String>,
}

impl From<&Employee> for EmployeeRow {
    fn from(e: &Employee) -> Self {
        let name = e.full_name();
        Self {
            id: e.id.clone(),
            initials: initials(&name),
            name,
            email: e.email.clone(),
            phone: e.phone.clone(),
            department: e.department.clone(),
            role: e.role.clone(),
            salary: e.salary,
            status: e.status,
            join_date: e.join_date,
            avatar_url: e.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub on_leave: usize,
    /// Distinct departments, sorted.
    pub departments: Vec<String>,
}

/// Filtered rows, in the order given.
pub fn rows(employees: &[Employee], filter: &EmployeeFilter) -> Vec<EmployeeRow> {
    employees
        .iter()
        .filter(|e| {
            let name = e.full_name();
            matches_search(
                filter.search.as_deref(),
                &[name.as_str(), e.email.as_str(), e.role.as_str(), e.department.as_str()],
            ) && matches_choice(filter.department.as_deref(), &e.department)
                && matches_choice(filter.status.as_deref(), &e.status.to_string())
        })
        .map(EmployeeRow::from)
        .collect()
}

pub fn stats(employees: &[Employee]) -> EmployeeStats {
    let count = |status: EmployeeStatus| employees.iter().filter(|e| e.status == status).count();
    EmployeeStats {
        total: employees.len(),
        active: count(EmployeeStatus::Active),
        inactive: count(EmployeeStatus::Inactive),
        on_leave: count(EmployeeStatus::OnLeave),
        departments: employees
            .iter()
            .map(|e| e.department.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::test_support::employee;
    use pretty_assertions::assert_eq;

    fn staff() -> Vec<Employee> {
        let mut mike = employee("e-2", "Mike", "Chen");
        mike.department = "Marketing".into();
        mike.status = EmployeeStatus::OnLeave;
        let mut sara = employee("e-3", "Sarah", "Johnson");
        sara.status = EmployeeStatus::Inactive;
        vec![employee("e-1", "Ann", "Lee"), mike, sara]
    }

    #[test]
    fn filters_by_search_department_and_status() {
        let staff = staff();

        let by_name = rows(
            &staff,
            &EmployeeFilter {
                search: Some("chen".into()),
                ..Default::default()
            },
        );
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].initials, "MC");

        let engineering_active = rows(
            &staff,
            &EmployeeFilter {
                department: Some("engineering".into()),
                status: Some("active".into()),
                ..Default::default()
            },
        );
        let ids: Vec<_> = engineering_active.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["e-1"]);

        assert_eq!(rows(&staff, &EmployeeFilter::default()).len(), 3);
    }

    #[test]
    fn counts_statuses_and_departments() {
        assert_eq!(
            stats(&staff()),
            EmployeeStats {
                total: 3,
                active: 1,
                inactive: 1,
                on_leave: 1,
                departments: vec!["Engineering".into(), "Marketing".into()],
            }
        );
    }
}
