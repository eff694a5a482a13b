use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::attendance::{self, AttendanceSummary};
use super::employees::{self, EmployeeStats};
use super::leave::{self, LeaveFilter, LeaveRow, LeaveStats};
use super::payroll::{self, PayrollSummary};
use crate::model::Joined;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::model::leave_request::LeaveRequest;
use crate::model::payroll::PayrollRecord;

const RECENT_REQUESTS: usize = 5;

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub employees: EmployeeStats,
    pub attendance_today: AttendanceSummary,
    pub leave: LeaveStats,
    /// Totals for the most recent payroll period.
    pub payroll: PayrollSummary,
    /// Newest Pending requests.
    pub pending_requests: Vec<LeaveRow>,
}

pub struct DashboardInput<'a> {
    pub employees: &'a [Employee],
    pub attendance: &'a [Joined<AttendanceRecord>],
    pub leave_requests: &'a [Joined<LeaveRequest>],
    pub payroll: &'a [Joined<PayrollRecord>],
}

pub fn build(input: DashboardInput<'_>, today: NaiveDate) -> Dashboard {
    let mut pending_requests = leave::rows(
        input.leave_requests,
        input.employees,
        &LeaveFilter {
            status: Some("pending".into()),
            ..Default::default()
        },
    );
    pending_requests.truncate(RECENT_REQUESTS);

    Dashboard {
        employees: employees::stats(input.employees),
        attendance_today: attendance::summary(input.attendance, Some(today)),
        leave: leave::stats(input.leave_requests),
        payroll: payroll::summary(input.payroll, payroll::latest_period(input.payroll)),
        pending_requests,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use crate::model::employee::test_support::employee;
    use crate::model::leave_request::LeaveStatus;
    use crate::model::payroll::PayPeriod;
    use crate::views::{attendance, leave, payroll};

    #[test]
    fn combines_all_collections() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let yesterday = today.pred_opt().unwrap();
        let staff = vec![employee("e-1", "Ann", "Lee"), employee("e-2", "Bob", "Stone")];
        let records = vec![
            attendance::test_support::record("a-1", "e-1", today, AttendanceStatus::Present),
            attendance::test_support::record("a-2", "e-2", yesterday, AttendanceStatus::Absent),
        ];
        let requests: Vec<_> = (0..7)
            .map(|i| leave::test_support::request(&format!("l-{i}"), "e-1", LeaveStatus::Pending, 1))
            .collect();
        let runs = vec![payroll::test_support::record(
            "p-1",
            "e-1",
            PayPeriod::new(2023, 12).unwrap(),
            5100.0,
        )];

        let dash = build(
            DashboardInput {
                employees: &staff,
                attendance: &records,
                leave_requests: &requests,
                payroll: &runs,
            },
            today,
        );

        assert_eq!(dash.employees.total, 2);
        assert_eq!(dash.attendance_today.total, 1);
        assert_eq!(dash.attendance_today.attendance_rate, 100.0);
        assert_eq!(dash.leave.pending, 7);
        assert_eq!(dash.pending_requests.len(), RECENT_REQUESTS);
        assert_eq!(dash.pending_requests[0].id, "l-0");
        assert_eq!(dash.payroll.period.as_deref(), Some("2023-12"));
        assert_eq!(dash.payroll.total_net, 5100.0);
    }
}
