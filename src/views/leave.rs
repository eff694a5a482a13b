use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{EmployeeIndex, initials, matches_choice, matches_search};
use crate::model::Joined;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Matches employee name, leave type or reason
    #[schema(example = "sick")]
    pub search: Option<String>,
    /// `Pending`, `Approved`, `Rejected` or `all`
    #[schema(example = "pending")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LeaveRow {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub initials: String,
    pub avatar_url: Option<String>,
    pub leave_type: String,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub days: u32,
    pub status: LeaveStatus,
    pub reason: Option<String>,
    /// Only Pending requests can be approved or rejected.
    pub actionable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LeaveStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Days covered by approved requests.
    pub approved_days: u32,
}

pub fn rows(
    requests: &[Joined<LeaveRequest>],
    employees: &[Employee],
    filter: &LeaveFilter,
) -> Vec<LeaveRow> {
    let index = EmployeeIndex::new(employees);
    requests
        .iter()
        .filter(|r| matches_choice(filter.status.as_deref(), &r.status.to_string()))
        .filter_map(|r| {
            let person = index.resolve(r, &r.employee_id)?;
            let reason = r.reason.as_deref().unwrap_or_default();
            if !matches_search(
                filter.search.as_deref(),
                &[person.name.as_str(), r.leave_type.as_str(), reason],
            ) {
                return None;
            }
            Some(LeaveRow {
                id: r.id.clone(),
                employee_id: r.employee_id.clone(),
                initials: initials(&person.name),
                employee_name: person.name,
                avatar_url: person.avatar_url,
                leave_type: r.leave_type.clone(),
                start_date: r.start_date,
                end_date: r.end_date,
                days: days(r),
                status: r.status,
                reason: r.reason.clone(),
                actionable: r.status == LeaveStatus::Pending,
            })
        })
        .collect()
}

pub fn stats(requests: &[Joined<LeaveRequest>]) -> LeaveStats {
    let count = |status: LeaveStatus| requests.iter().filter(|r| r.status == status).count();
    LeaveStats {
        total: requests.len(),
        pending: count(LeaveStatus::Pending),
        approved: count(LeaveStatus::Approved),
        rejected: count(LeaveStatus::Rejected),
        approved_days: requests
            .iter()
            .filter(|r| r.status == LeaveStatus::Approved)
            .map(|r| days(r))
            .sum(),
    }
}

/// Stored day count, or the inclusive calendar span when none was stored.
fn days(request: &LeaveRequest) -> u32 {
    if request.days_requested > 0 {
        return request.days_requested;
    }
    let span = (request.end_date - request.start_date).num_days() + 1;
    u32::try_from(span.max(0)).unwrap_or(0)
}


#[cfg(test)]
mod tests {
    use super::test_support::request;
    use super::*;
    use crate::model::employee::test_support::employee;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_pending_rows_are_actionable() {
        let staff = vec![employee("e-1", "Ann", "Lee")];
        let requests = vec![
            request("l-1", "e-1", LeaveStatus::Pending, 3),
            request("l-2", "e-1", LeaveStatus::Approved, 3),
            request("l-3", "ghost", LeaveStatus::Pending, 3),
        ];

        let out = rows(&requests, &staff, &LeaveFilter::default());

        let flags: Vec<_> = out.iter().map(|r| (r.id.as_str(), r.actionable)).collect();
        assert_eq!(flags, vec![("l-1", true), ("l-2", false)]);
    }

    #[test]
    fn searches_reason_and_filters_status() {
        let staff = vec![employee("e-1", "Ann", "Lee")];
        let requests = vec![
            request("l-1", "e-1", LeaveStatus::Pending, 3),
            request("l-2", "e-1", LeaveStatus::Approved, 3),
        ];

        let out = rows(
            &requests,
            &staff,
            &LeaveFilter {
                search: Some("VACATION".into()),
                status: Some("approved".into()),
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "l-2");
    }

    #[test]
    fn counts_and_falls_back_to_calendar_span() {
        let requests = vec![
            request("l-1", "e-1", LeaveStatus::Approved, 0),
            request("l-2", "e-1", LeaveStatus::Approved, 2),
            request("l-3", "e-1", LeaveStatus::Rejected, 1),
        ];
        assert_eq!(
            stats(&requests),
            LeaveStats {
                total: 3,
                pending: 0,
                approved: 2,
                rejected: 1,
                approved_days: 5,
            }
        );
    }
}
