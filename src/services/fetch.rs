//! Dual Fetch
//!
//! Rows and summary for a dataset are requested together and only returned
//! when both arrive. A half-successful pair is a failure.

use crate::domain::dataset::DatasetId;
use crate::domain::equipment::EquipmentRow;
use crate::domain::summary::Summary;
use crate::error::{Error, FetchPart, Result};

use super::api::EquipmentApi;

/// Fetch rows and summary for `id` concurrently
///
/// When both requests fail, the rows error is reported.
pub async fn fetch_rows_and_summary(
    api: &dyn EquipmentApi,
    id: &DatasetId,
) -> Result<(Vec<EquipmentRow>, Summary)> {
    tracing::debug!("Fetching rows and summary for dataset {}", id);
    let (detail, summary) = tokio::join!(api.get_dataset(id), api.get_summary(id));

    match (detail, summary) {
        (Ok(detail), Ok(summary)) => {
            Ok((EquipmentRow::from_raw_rows(&detail.raw_data), summary))
        }
        (Err(e), Ok(_)) => Err(partial(FetchPart::Rows, e)),
        (Ok(_), Err(e)) => Err(partial(FetchPart::Summary, e)),
        (Err(e), Err(_)) => Err(e),
    }
}

fn partial(part: FetchPart, source: Error) -> Error {
    tracing::warn!("Fetching {} failed while the other half succeeded", part.label());
    Error::PartialFailure {
        part,
        source: Box::new(source),
    }
}
