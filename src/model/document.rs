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
pub enum DocumentStatus {
    Active,
    Approved,
    #[serde(rename = "Pending Review")]
    #[strum(serialize = "Pending Review")]
    PendingReview,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DocumentRecord {
    pub id: String,
    pub employee_id: String,
    #[schema(example = "Employment Contract.pdf")]
    pub name: String,
    #[schema(example = "Contract")]
    pub doc_type: String,
    #[schema(example = "HR Admin")]
    pub uploaded_by: String,
    #[schema(example = "2024-01-05", value_type = String, format = "date")]
    pub upload_date: NaiveDate,
    #[serde(default)]
    pub size_bytes: u64,
    pub status: DocumentStatus,
    /// Object path inside the document bucket.
    #[serde(default)]
    pub file_path: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DocumentRecord {
    /// Human-readable size, e.g. `2.4 MB`.
    pub fn size_label(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
        let mut size = self.size_bytes as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{} {}", self.size_bytes, UNITS[0])
        } else {
            format!("{size:.1} {}", UNITS[unit])
        }
    }
}
