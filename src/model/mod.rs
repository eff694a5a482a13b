pub mod attendance;
pub mod document;
pub mod employee;
pub mod leave_request;
pub mod payroll;

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee display fields embedded into joined reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = "Ann")]
    pub first_name: String,
    #[schema(example = "Lee")]
    pub last_name: String,
    #[schema(nullable = true)]
    pub avatar_url: Option<String>,
}

impl EmployeeSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A row read together with its employee's display fields.
///
/// `employee` is `None` for left joins whose employee no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joined<T> {
    #[serde(flatten)]
    pub row: T,
    #[serde(rename = "employees", default)]
    pub employee: Option<EmployeeSummary>,
}

impl<T> Deref for Joined<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.row
    }
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
