use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

use super::round_cents;
use crate::error::{HrmError, Result};

/// Hours beyond this count as overtime.
pub const STANDARD_DAY_HOURS: f64 = 8.0;
/// Fewer worked hours than this make a half day.
pub const HALF_DAY_HOURS: f64 = 5.0;

fn late_after() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

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
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,
}

impl AttendanceStatus {
    /// Counts toward the attendance rate.
    pub fn is_attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    #[schema(example = "2024-01-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:05:00", value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "17:30:00", value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub work_hours: Option<f64>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub overtime_hours: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A manual attendance entry. Hours, overtime and, unless given, the status
/// are derived from the check-in and check-out times.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAttendance {
    pub employee_id: String,
    #[schema(example = "2024-01-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:05:00", value_type = Option<String>)]
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "17:30:00", value_type = Option<String>)]
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One employee's line in a bulk daily mark.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DailyMark {
    pub employee_id: String,
    #[schema(value_type = Option<String>)]
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DailyMark {
    pub fn on(self, date: NaiveDate) -> NewAttendance {
        NewAttendance {
            employee_id: self.employee_id,
            date,
            check_in: self.check_in,
            check_out: self.check_out,
            status: self.status,
            notes: self.notes,
        }
    }
}

/// Row as written to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceInsert {
    pub employee_id: String,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub work_hours: Option<f64>,
    pub overtime_hours: f64,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

impl NewAttendance {
    pub fn validate(&self) -> Result<()> {
        if self.employee_id.trim().is_empty() {
            return Err(HrmError::validation("employee_id is required"));
        }
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if check_out < check_in => Err(HrmError::validation(
                format!("check-out {check_out} is before check-in {check_in}"),
            )),
            (None, Some(_)) => Err(HrmError::validation("check-out given without check-in")),
            _ => Ok(()),
        }
    }

    pub fn into_insert(self) -> Result<AttendanceInsert> {
        self.validate()?;
        let work_hours = match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => Some(hours_between(check_in, check_out)),
            _ => None,
        };
        let overtime_hours = work_hours
            .map(|h| round_cents((h - STANDARD_DAY_HOURS).max(0.0)))
            .unwrap_or(0.0);
        let status = self
            .status
            .unwrap_or_else(|| derive_status(self.check_in, work_hours));

        Ok(AttendanceInsert {
            employee_id: self.employee_id,
            date: self.date,
            check_in: self.check_in,
            check_out: self.check_out,
            work_hours,
            overtime_hours,
            status,
            notes: self.notes,
        })
    }
}

fn hours_between(from: NaiveTime, to: NaiveTime) -> f64 {
    round_cents((to - from).num_minutes() as f64 / 60.0)
}

fn derive_status(check_in: Option<NaiveTime>, work_hours: Option<f64>) -> AttendanceStatus {
    match (check_in, work_hours) {
        (None, _) => AttendanceStatus::Absent,
        (_, Some(hours)) if hours < HALF_DAY_HOURS => AttendanceStatus::HalfDay,
        (Some(at), _) if at > late_after() => AttendanceStatus::Late,
        _ => AttendanceStatus::Present,
    }
}
