//! HTTP handlers. Each one reads or mutates through the resource modules and
//! shapes the result with the view layer; none of them talks to the gateway.

pub mod attendance;
pub mod dashboard;
pub mod document;
pub mod employee;
pub mod leave_request;
pub mod payroll;
pub mod settings;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Employee deleted")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
