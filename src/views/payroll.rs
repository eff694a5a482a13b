use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{EmployeeIndex, initials, matches_choice, matches_search};
use crate::error::Result;
use crate::model::Joined;
use crate::model::employee::Employee;
use crate::model::payroll::{PayPeriod, PayrollRecord, PayrollStatus};
use crate::model::round_cents;

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct PayrollFilter {
    /// `YYYY-MM`; omitted means the most recent period on record
    #[schema(example = "2024-01")]
    pub period: Option<String>,
    pub search: Option<String>,
    /// `Pending`, `Processed`, `Failed` or `all`
    pub status: Option<String>,
}

impl PayrollFilter {
    pub fn period(&self) -> Result<Option<PayPeriod>> {
        self.period
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(str::parse)
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollRow {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub initials: String,
    pub department: Option<String>,
    #[schema(value_type = String, example = "2024-01")]
    pub period: String,
    pub basic_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub net_salary: f64,
    pub status: PayrollStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollSummary {
    #[schema(value_type = Option<String>, example = "2024-01")]
    pub period: Option<String>,
    pub employees_paid: usize,
    pub total_basic: f64,
    pub total_allowances: f64,
    pub total_deductions: f64,
    pub total_net: f64,
    pub pending: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Most recent period that has any record.
pub fn latest_period(records: &[Joined<PayrollRecord>]) -> Option<PayPeriod> {
    records.iter().map(|r| r.period()).max()
}

pub fn rows(
    records: &[Joined<PayrollRecord>],
    employees: &[Employee],
    period: Option<PayPeriod>,
    filter: &PayrollFilter,
) -> Vec<PayrollRow> {
    let index = EmployeeIndex::new(employees);
    records
        .iter()
        .filter(|r| period.is_none_or(|p| r.period() == p))
        .filter(|r| matches_choice(filter.status.as_deref(), &r.status.to_string()))
        .filter_map(|r| {
            let person = index.resolve(r, &r.employee_id)?;
            if !matches_search(filter.search.as_deref(), &[person.name.as_str()]) {
                return None;
            }
            Some(PayrollRow {
                id: r.id.clone(),
                employee_id: r.employee_id.clone(),
                initials: initials(&person.name),
                employee_name: person.name,
                department: person.department,
                period: r.period().to_string(),
                basic_salary: r.basic_salary,
                allowances: r.allowances,
                deductions: r.deductions,
                net_salary: r.net_salary,
                status: r.status,
            })
        })
        .collect()
}

pub fn summary(records: &[Joined<PayrollRecord>], period: Option<PayPeriod>) -> PayrollSummary {
    let selected: Vec<&PayrollRecord> = records
        .iter()
        .map(|r| &r.row)
        .filter(|r| period.is_none_or(|p| r.period() == p))
        .collect();
    let total = |f: fn(&PayrollRecord) -> f64| round_cents(selected.iter().map(|r| f(r)).sum());
    let count = |status: PayrollStatus| selected.iter().filter(|r| r.status == status).count();

    PayrollSummary {
        period: period.map(|p| p.to_string()),
        employees_paid: selected.len(),
        total_basic: total(|r| r.basic_salary),
        total_allowances: total(|r| r.allowances),
        total_deductions: total(|r| r.deductions),
        total_net: total(|r| r.net_salary),
        pending: count(PayrollStatus::Pending),
        processed: count(PayrollStatus::Processed),
        failed: count(PayrollStatus::Failed),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn record(id: &str, employee_id: &str, period: PayPeriod, net: f64) -> Joined<PayrollRecord> {
        Joined {
            row: PayrollRecord {
                id: id.into(),
                employee_id: employee_id.into(),
                month: period.month,
                year: period.year,
                basic_salary: net,
                allowances: 0.0,
                deductions: 0.0,
                net_salary: net,
                status: PayrollStatus::Pending,
                pay_date: None,
                created_at: None,
            },
            employee: None,
        }
    }
}
