//! Access to the hosted table store and its object storage.
//!
//! The store is an external collaborator: this module only describes the
//! operations the dashboard needs (filtered/ordered select, insert, update and
//! delete by filter, object upload) and ships two implementations, a REST
//! client for the hosted service and an in-memory store with the same
//! semantics.

mod error;
pub mod memory;
pub mod rest;

pub use error::GatewayError;
pub use memory::InMemoryGateway;
pub use rest::RestGateway;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Table {
    Employees,
    Attendance,
    LeaveRequests,
    Payroll,
    Documents,
}

/// Equality filter, rendered as `<column>=eq.<value>` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn equals(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

/// An embedded related row (`*,employees(first_name,...)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Embed {
    pub table: Table,
    pub foreign_key: &'static str,
    pub columns: &'static [&'static str],
    /// Inner joins drop parent rows whose related row is missing.
    pub inner: bool,
}

pub const EMPLOYEE_DISPLAY_COLUMNS: &[&str] = &["first_name", "last_name", "avatar_url"];

impl Embed {
    pub fn employee(inner: bool) -> Self {
        Self {
            table: Table::Employees,
            foreign_key: "employee_id",
            columns: EMPLOYEE_DISPLAY_COLUMNS,
            inner,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub embed: Option<Embed>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }

    pub fn where_eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter::equals(column, value));
        self
    }

    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            ascending: false,
        });
        self
    }

    /// The `select=` clause: `*` plus the embedded relation if any.
    pub fn select_clause(&self) -> String {
        match &self.embed {
            None => "*".to_string(),
            Some(embed) => format!(
                "*,{}{}({})",
                embed.table,
                if embed.inner { "!inner" } else { "" },
                embed.columns.join(",")
            ),
        }
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Value>, GatewayError>;

    /// Inserts all rows in one request and returns them as stored.
    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError>;

    /// Applies `patch` to every row matching `filters`; returns the updated rows.
    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError>;

    /// Deletes every row matching `filters`; returns the deleted rows.
    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<Vec<Value>, GatewayError>;

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), GatewayError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, GatewayError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(GatewayError::from))
        .collect()
}

pub fn encode_row<T: Serialize>(row: &T) -> Result<Value, GatewayError> {
    Ok(serde_json::to_value(row)?)
}
