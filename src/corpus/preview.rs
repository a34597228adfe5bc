use indexmap::IndexMap;
use serde::Serialize;

use super::{Corpus, DatasetKind};
use crate::errors::DataSetResult;

pub const MAX_PREVIEW_ROWS: usize = 1000;

/// First rows of a source file, exactly as stored.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetPreview {
    pub dataset: DatasetKind,
    pub filename: String,
    pub description: String,
    pub columns: Vec<String>,
    pub total_rows: usize,
    pub data: Vec<IndexMap<String, String>>,
}

pub fn preview(corpus: &Corpus, name: &str, per_page: usize) -> DataSetResult<DatasetPreview> {
    let kind = DatasetKind::parse(name)?;
    let table = corpus.table(kind);
    let rows = per_page.clamp(1, MAX_PREVIEW_ROWS);

    Ok(DatasetPreview {
        dataset: kind,
        filename: table.filename.clone(),
        description: kind.description().to_string(),
        columns: table.columns.clone(),
        total_rows: table.len(),
        data: table.head(rows),
    })
}
