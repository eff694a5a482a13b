//! Allowlisted partial updates built from free-form JSON.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{HrmError, Result};

/// The JSON shape a patchable column accepts.
#[derive(Debug, Clone, Copy)]
pub enum ColumnKind {
    Text,
    /// Text that may be cleared with `null`.
    NullableText,
    Email,
    /// Non-negative number.
    Amount,
    /// `YYYY-MM-DD`
    Date,
    /// One of a fixed set of labels, matched case-insensitively.
    Choice(&'static [&'static str]),
}

impl ColumnKind {
    fn describe(&self) -> String {
        match self {
            ColumnKind::Text => "non-empty text".into(),
            ColumnKind::NullableText => "text or null".into(),
            ColumnKind::Email => "an email address".into(),
            ColumnKind::Amount => "a non-negative number".into(),
            ColumnKind::Date => "a YYYY-MM-DD date".into(),
            ColumnKind::Choice(options) => format!("one of {}", options.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// Checks every key of `payload` against `columns` and normalizes the values.
///
/// Keys in `immutable` and keys not listed in `columns` are rejected, as is an
/// empty object.
pub fn build_patch(payload: &Value, columns: &[Column], immutable: &[&str]) -> Result<Value> {
    let obj = payload
        .as_object()
        .ok_or_else(|| HrmError::validation("payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(HrmError::validation("no fields provided for update"));
    }

    let mut patch = Map::with_capacity(obj.len());
    for (key, value) in obj {
        if immutable.contains(&key.as_str()) {
            return Err(HrmError::validation(format!("`{key}` cannot be changed")));
        }
        let column = columns
            .iter()
            .find(|c| c.name == key)
            .ok_or_else(|| HrmError::validation(format!("unknown column `{key}`")))?;
        patch.insert(key.clone(), coerce(column, value)?);
    }

    Ok(Value::Object(patch))
}

fn coerce(column: &Column, value: &Value) -> Result<Value> {
    let mismatch = || {
        HrmError::validation(format!(
            "`{}` expects {}",
            column.name,
            column.kind.describe()
        ))
    };

    match (column.kind, value) {
        (ColumnKind::NullableText, Value::Null) => Ok(Value::Null),
        (ColumnKind::NullableText, Value::String(s)) => Ok(Value::String(s.trim().to_string())),
        (ColumnKind::Text, Value::String(s)) if !s.trim().is_empty() => {
            Ok(Value::String(s.trim().to_string()))
        }
        (ColumnKind::Email, Value::String(s)) if s.contains('@') => {
            Ok(Value::String(s.trim().to_string()))
        }
        (ColumnKind::Amount, Value::Number(n)) => match n.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        (ColumnKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|d| Value::String(d.to_string()))
            .map_err(|_| mismatch()),
        (ColumnKind::Choice(options), Value::String(s)) => options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(s.trim()))
            .map(|o| Value::String(o.to_string()))
            .ok_or_else(mismatch),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    const COLUMNS: &[Column] = &[
        Column::new("first_name", ColumnKind::Text),
        Column::new("phone", ColumnKind::NullableText),
        Column::new("email", ColumnKind::Email),
        Column::new("salary", ColumnKind::Amount),
        Column::new("join_date", ColumnKind::Date),
        Column::new("status", ColumnKind::Choice(&["Active", "On Leave"])),
    ];
    const IMMUTABLE: &[&str] = &["id", "created_at"];

    #[test]
    fn normalizes_accepted_values() {
        let patch = build_patch(
            &json!({
                "first_name": "  Ann ",
                "phone": null,
                "salary": 52000,
                "join_date": "2024-02-01",
                "status": "on leave"
            }),
            COLUMNS,
            IMMUTABLE,
        )
        .unwrap();

        assert_eq!(
            patch,
            json!({
                "first_name": "Ann",
                "phone": null,
                "salary": 52000,
                "join_date": "2024-02-01",
                "status": "On Leave"
            })
        );
    }

    #[rstest]
    #[case::not_object(json!(["first_name"]))]
    #[case::empty(json!({}))]
    #[case::immutable(json!({"id": "x"}))]
    #[case::unknown(json!({"password": "x"}))]
    #[case::blank_text(json!({"first_name": " "}))]
    #[case::bad_email(json!({"email": "nobody"}))]
    #[case::negative(json!({"salary": -5}))]
    #[case::bad_date(json!({"join_date": "01/02/2024"}))]
    #[case::bad_choice(json!({"status": "Retired"}))]
    #[case::null_text(json!({"first_name": null}))]
    fn rejects(#[case] payload: Value) {
        assert!(matches!(
            build_patch(&payload, COLUMNS, IMMUTABLE),
            Err(HrmError::Validation(_))
        ));
    }
}
