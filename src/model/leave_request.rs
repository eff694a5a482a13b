use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Requests only ever move out of `Pending`.
    pub fn can_become(self, next: LeaveStatus) -> bool {
        self == LeaveStatus::Pending && next != LeaveStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "b5c0c1d2-0000-4000-8000-000000000001",
    "employee_id": "8c1f2a52-5a3e-4f5b-9a3e-1f0d9b1c2e7a",
    "leave_type": "Annual Leave",
    "start_date": "2024-01-15",
    "end_date": "2024-01-17",
    "days_requested": 3,
    "status": "Pending",
    "reason": "Family vacation",
    "approved_by": null,
    "comments": null,
    "created_at": "2024-01-10T08:00:00Z"
}))]
pub struct LeaveRequest {
    pub id: String,
    pub employee_id: String,
    #[schema(example = "Annual Leave")]
    pub leave_type: String,
    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-17", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub days_requested: u32,
    pub status: LeaveStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_moves() {
        assert!(LeaveStatus::Pending.can_become(LeaveStatus::Approved));
        assert!(LeaveStatus::Pending.can_become(LeaveStatus::Rejected));
        assert!(!LeaveStatus::Pending.can_become(LeaveStatus::Pending));
        assert!(!LeaveStatus::Approved.can_become(LeaveStatus::Rejected));
        assert!(!LeaveStatus::Rejected.can_become(LeaveStatus::Approved));
    }
}
