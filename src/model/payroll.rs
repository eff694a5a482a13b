use std::str::FromStr;

use chrono::{DateTime, Month, NaiveDate, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};
use utoipa::ToSchema;

use super::employee::Employee;
use super::round_cents;
use crate::error::{HrmError, Result};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum PayrollStatus {
    Pending,
    Processed,
    Failed,
}

/// A calendar month payroll is generated for. Displays as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize, ToSchema)]
#[display(fmt = "{:04}-{:02}", year, month)]
pub struct PayPeriod {
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(example = 1)]
    pub month: u32,
}

impl PayPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(HrmError::validation(format!("month {month} is out of range")));
        }
        Ok(Self { year, month })
    }

    /// e.g. `January 2024`
    pub fn label(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| self.month.to_string());
        format!("{name} {}", self.year)
    }
}

impl FromStr for PayPeriod {
    type Err = HrmError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || HrmError::validation(format!("`{s}` is not a YYYY-MM period"));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollRecord {
    pub id: String,
    pub employee_id: String,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
    pub basic_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub net_salary: f64,
    pub status: PayrollStatus,
    #[schema(value_type = Option<String>, format = "date")]
    #[serde(default)]
    pub pay_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date-time")]
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PayrollRecord {
    pub fn period(&self) -> PayPeriod {
        PayPeriod {
            year: self.year,
            month: self.month,
        }
    }
}

/// Row as written by bulk generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollInsert {
    pub employee_id: String,
    pub month: u32,
    pub year: i32,
    pub basic_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub net_salary: f64,
    pub status: PayrollStatus,
}

/// Allowance and deduction rates applied to the monthly basic salary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollPolicy {
    pub allowance_rate: f64,
    pub deduction_rate: f64,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            allowance_rate: 0.10,
            deduction_rate: 0.08,
        }
    }
}

impl PayrollPolicy {
    pub fn compute(&self, employee: &Employee, period: PayPeriod) -> PayrollInsert {
        let basic = employee.salary / 12.0;
        let allowances = basic * self.allowance_rate;
        let deductions = basic * self.deduction_rate;

        PayrollInsert {
            employee_id: employee.id.clone(),
            month: period.month,
            year: period.year,
            basic_salary: round_cents(basic),
            allowances: round_cents(allowances),
            deductions: round_cents(deductions),
            net_salary: round_cents(basic + allowances - deductions),
            status: PayrollStatus::Pending,
        }
    }
}
