use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::error::{HrmError, Result};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
    #[serde(rename = "On Leave")]
    #[strum(serialize = "On Leave")]
    OnLeave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "8c1f2a52-5a3e-4f5b-9a3e-1f0d9b1c2e7a",
        "first_name": "Ann",
        "last_name": "Lee",
        "email": "ann.lee@company.com",
        "phone": "+1 555 0100",
        "department": "Engineering",
        "role": "Backend Developer",
        "salary": 50000.0,
        "status": "Active",
        "join_date": "2024-01-01",
        "avatar_url": null,
        "created_at": "2024-01-01T09:00:00Z"
    })
)]
pub struct Employee {
    pub id: String,

    #[schema(example = "Ann")]
    pub first_name: String,

    #[schema(example = "Lee")]
    pub last_name: String,

    #[schema(example = "ann.lee@company.com")]
    pub email: String,

    #[schema(example = "+1 555 0100", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "Backend Developer")]
    pub role: String,

    /// Annual salary.
    #[schema(example = 50000.0)]
    pub salary: f64,

    pub status: EmployeeStatus,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub join_date: NaiveDate,

    #[schema(nullable = true)]
    pub avatar_url: Option<String>,

    #[schema(value_type = Option<String>, format = "date-time")]
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "Ann")]
    pub first_name: String,
    #[schema(example = "Lee")]
    pub last_name: String,
    #[schema(example = "ann.lee@company.com", format = "email")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "Backend Developer")]
    pub role: String,
    #[schema(example = 50000.0)]
    pub salary: f64,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub join_date: NaiveDate,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<()> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        validate_email(&self.email)?;
        validate_salary(self.salary)
    }
}

/// Partial update; only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EmployeeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date")]
    pub join_date: Option<NaiveDate>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.department.is_none()
            && self.role.is_none()
            && self.salary.is_none()
            && self.status.is_none()
            && self.join_date.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(HrmError::validation("update carries no fields"));
        }
        if let Some(name) = &self.first_name {
            require("first_name", name)?;
        }
        if let Some(name) = &self.last_name {
            require("last_name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(salary) = self.salary {
            validate_salary(salary)?;
        }
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HrmError::validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    require("email", email)?;
    if !email.contains('@') {
        return Err(HrmError::validation(format!("`{email}` is not an email address")));
    }
    Ok(())
}

fn validate_salary(salary: f64) -> Result<()> {
    if !salary.is_finite() || salary < 0.0 {
        return Err(HrmError::validation("salary must be a non-negative amount"));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::new_employee;
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_display_names() {
        assert_eq!(EmployeeStatus::OnLeave.to_string(), "On Leave");
        assert_eq!(
            EmployeeStatus::from_str("on leave").unwrap(),
            EmployeeStatus::OnLeave
        );
        assert_eq!(
            serde_json::to_value(EmployeeStatus::OnLeave).unwrap(),
            "On Leave"
        );
    }

    #[rstest]
    #[case::blank_first(new_employee(" ", "Lee", 1.0))]
    #[case::blank_last(new_employee("Ann", "", 1.0))]
    #[case::negative_salary(new_employee("Ann", "Lee", -1.0))]
    #[case::bad_email(NewEmployee { email: "ann.company.com".into(), ..new_employee("Ann", "Lee", 1.0) })]
    fn rejects_invalid_new_employee(#[case] input: NewEmployee) {
        assert!(matches!(input.validate(), Err(HrmError::Validation(_))));
    }

    #[test]
    fn accepts_valid_new_employee() {
        new_employee("Ann", "Lee", 50000.0).validate().unwrap();
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(EmployeeUpdate::default().is_empty());
        assert!(EmployeeUpdate::default().validate().is_err());
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let update = EmployeeUpdate {
            role: Some("Lead".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"role": "Lead"})
        );
    }
}
