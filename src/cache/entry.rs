use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

use super::CacheKey;
use crate::model::Joined;
use crate::model::attendance::AttendanceRecord;
use crate::model::document::DocumentRecord;
use crate::model::employee::Employee;
use crate::model::leave_request::LeaveRequest;
use crate::model::payroll::PayrollRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CacheStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// A cached collection, one variant per resource.
#[derive(Debug, Clone)]
pub enum Dataset {
    Employees(Arc<Vec<Employee>>),
    Attendance(Arc<Vec<Joined<AttendanceRecord>>>),
    LeaveRequests(Arc<Vec<Joined<LeaveRequest>>>),
    Payroll(Arc<Vec<Joined<PayrollRecord>>>),
    Documents(Arc<Vec<Joined<DocumentRecord>>>),
}

impl Dataset {
    pub fn len(&self) -> usize {
        match self {
            Dataset::Employees(rows) => rows.len(),
            Dataset::Attendance(rows) => rows.len(),
            Dataset::LeaveRequests(rows) => rows.len(),
            Dataset::Payroll(rows) => rows.len(),
            Dataset::Documents(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Row types that can be stored in the cache as a [`Dataset`].
pub trait Collection: Sized + Send + Sync + 'static {
    fn into_dataset(rows: Arc<Vec<Self>>) -> Dataset;
    fn from_dataset(data: Dataset) -> Option<Arc<Vec<Self>>>;
}

macro_rules! collection {
    ($row:ty, $variant:ident) => {
        impl Collection for $row {
            fn into_dataset(rows: Arc<Vec<Self>>) -> Dataset {
                Dataset::$variant(rows)
            }

            fn from_dataset(data: Dataset) -> Option<Arc<Vec<Self>>> {
                match data {
                    Dataset::$variant(rows) => Some(rows),
                    _ => None,
                }
            }
        }
    };
}

collection!(Employee, Employees);
collection!(Joined<AttendanceRecord>, Attendance);
collection!(Joined<LeaveRequest>, LeaveRequests);
collection!(Joined<PayrollRecord>, Payroll);
collection!(Joined<DocumentRecord>, Documents);

/// Status-table row for one key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub status: CacheStatus,
    /// Row count of the last successful fetch.
    pub rows: Option<usize>,
    pub error: Option<String>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// Set by invalidation; the next read re-fetches.
    pub stale: bool,
    pub(crate) generation: u64,
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self {
            status: CacheStatus::Idle,
            rows: None,
            error: None,
            last_fetched_at: None,
            stale: false,
            generation: 0,
        }
    }
}

/// Published on every status change so views can re-render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: CacheKey,
    pub status: CacheStatus,
    pub stale: bool,
}

/// Serializable view of a status-table row.
#[derive(Debug, Serialize, ToSchema)]
pub struct CacheEntrySummary {
    pub key: String,
    pub status: CacheStatus,
    pub stale: bool,
    pub rows: Option<usize>,
    pub error: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl CacheEntrySummary {
    pub fn new(key: &CacheKey, entry: &CacheEntry) -> Self {
        Self {
            key: key.to_string(),
            status: entry.status,
            stale: entry.stale,
            rows: entry.rows,
            error: entry.error.clone(),
            last_fetched_at: entry.last_fetched_at,
        }
    }
}
