use super::ReportDocument;
use crate::error::{HrmError, Result};

/// Header row first, then the body rows. Title and preamble are left out so
/// the file opens cleanly as a table.
pub(super) fn encode(doc: &ReportDocument) -> Result<Vec<u8>> {
    let mut writer = ::csv::Writer::from_writer(vec![]);
    writer
        .write_record(&doc.header)
        .map_err(|e| HrmError::Export(e.to_string()))?;
    for row in &doc.rows {
        writer
            .write_record(row)
            .map_err(|e| HrmError::Export(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| HrmError::Export(e.to_string()))
}
