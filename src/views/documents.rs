use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{EmployeeIndex, matches_choice, matches_search};
use crate::model::Joined;
use crate::model::document::{DocumentRecord, DocumentStatus};
use crate::model::employee::Employee;

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct DocumentFilter {
    /// Matches document name, employee name or type
    pub search: Option<String>,
    #[schema(example = "Contract")]
    pub doc_type: Option<String>,
    /// e.g. `Pending Review` or `all`
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DocumentRow {
    pub id: String,
    pub name: String,
    pub employee_id: String,
    pub employee_name: String,
    pub doc_type: String,
    pub uploaded_by: String,
    #[schema(value_type = String, format = "date")]
    pub upload_date: NaiveDate,
    #[schema(example = "2.4 MB")]
    pub size: String,
    pub status: DocumentStatus,
    pub downloadable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DocumentStats {
    pub total: usize,
    pub pending_review: usize,
    pub approved: usize,
    pub expired: usize,
    pub total_bytes: u64,
}

pub fn rows(
    docs: &[Joined<DocumentRecord>],
    employees: &[Employee],
    filter: &DocumentFilter,
) -> Vec<DocumentRow> {
    let index = EmployeeIndex::new(employees);
    docs.iter()
        .filter(|d| matches_choice(filter.status.as_deref(), &d.status.to_string()))
        .filter(|d| matches_choice(filter.doc_type.as_deref(), &d.doc_type))
        .filter_map(|d| {
            let person = index.resolve(d, &d.employee_id)?;
            if !matches_search(
                filter.search.as_deref(),
                &[d.name.as_str(), person.name.as_str(), d.doc_type.as_str()],
            ) {
                return None;
            }
            Some(DocumentRow {
                id: d.id.clone(),
                name: d.name.clone(),
                employee_id: d.employee_id.clone(),
                employee_name: person.name,
                doc_type: d.doc_type.clone(),
                uploaded_by: d.uploaded_by.clone(),
                upload_date: d.upload_date,
                size: d.size_label(),
                status: d.status,
                downloadable: d.file_path.as_deref().is_some_and(|p| !p.is_empty()),
            })
        })
        .collect()
}

pub fn stats(docs: &[Joined<DocumentRecord>]) -> DocumentStats {
    let count = |status: DocumentStatus| docs.iter().filter(|d| d.status == status).count();
    DocumentStats {
        total: docs.len(),
        pending_review: count(DocumentStatus::PendingReview),
        approved: count(DocumentStatus::Approved),
        expired: count(DocumentStatus::Expired),
        total_bytes: docs.iter().map(|d| d.size_bytes).sum(),
    }
}
