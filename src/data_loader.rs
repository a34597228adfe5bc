use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::errors::DataSetResult;

/// A CSV file read wholesale: header plus every record that parsed.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub filename: String,
    pub columns: Vec<String>,
    pub records: Vec<StringRecord>,
}

impl RawTable {
    pub fn empty(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// Trimmed, non-empty value of `name` in `record`.
    pub fn field<'a>(&self, record: &'a StringRecord, name: &str) -> Option<&'a str> {
        let index = self.column_index(name)?;
        record
            .get(index)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn row_map(&self, record: &StringRecord) -> IndexMap<String, String> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.clone(), record.get(i).unwrap_or("").to_string()))
            .collect()
    }

    pub fn head(&self, n: usize) -> Vec<IndexMap<String, String>> {
        self.records.iter().take(n).map(|r| self.row_map(r)).collect()
    }
}

pub fn read_table(path: &Path) -> DataSetResult<RawTable> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let columns = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                debug!("Skipping malformed row in {}: {}", filename, err);
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} malformed rows in {}", skipped, filename);
    }

    Ok(RawTable {
        filename,
        columns,
        records,
    })
}

/// Loads the first of `candidates` that exists under `dir`.
///
/// Never fails: a missing or unreadable file yields an empty table and a warning.
pub fn load_table(dir: &Path, candidates: &[&str]) -> RawTable {
    for candidate in candidates {
        let path = dir.join(candidate);
        if !path.exists() {
            debug!("{} not present", path.display());
            continue;
        }
        match read_table(&path) {
            Ok(table) => {
                info!("Loaded {} ({} rows)", table.filename, table.len());
                return table;
            }
            Err(err) => {
                warn!("Failed to read {}: {}", path.display(), err);
                return RawTable::empty(candidate);
            }
        }
    }

    let primary = candidates.first().copied().unwrap_or_default();
    warn!("Data file {} not found in {}", primary, dir.display());
    RawTable::empty(primary)
}

/// Largest count accepted from a data file; anything above is a typo or junk.
pub const MAX_COUNT: u64 = 1_000_000_000_000_000;

/// Parses counts such as `1234`, `1,234`, `56.1K` or `1.2M`.
pub fn parse_count(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().replace(',', "").to_uppercase();
    if cleaned.is_empty() {
        return None;
    }
    let (number, multiplier) = if let Some(n) = cleaned.strip_suffix('K') {
        (n, 1_000.0)
    } else if let Some(n) = cleaned.strip_suffix('M') {
        (n, 1_000_000.0)
    } else if let Some(n) = cleaned.strip_suffix('B') {
        (n, 1_000_000_000.0)
    } else {
        (cleaned.as_str(), 1.0)
    };
    let value = number.trim().parse::<f64>().ok()?;
    let count = (value * multiplier).round();
    if !count.is_finite() || count < 0.0 || count > MAX_COUNT as f64 {
        return None;
    }
    Some(count as u64)
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
