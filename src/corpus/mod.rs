//! The in-memory research corpus.
//!
//! Four CSV files are read once at start-up and never mutated afterwards:
//! creators (`cuentas_info.csv`), videos
//! (`combined_tiktok_data_cleaned_with_date.csv`), lexicon words (`data.csv`)
//! and subtitles (`subtitulos_videos_v3.csv`).

pub mod listing;
pub mod models;
pub mod preview;
pub mod summary;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::data_loader::{load_table, parse_count, parse_float, RawTable};
use crate::errors::{DataSetError, DataSetResult};

pub use listing::{list, ListParams, Listable, Page, Pagination, SortValue};
pub use models::{Creator, Perspective, SentimentLabel, Subtitle, Video, Word};

const TITLE_MAX_CHARS: usize = 100;
const UNCLASSIFIED_FAMILY: &str = "Sin clasificar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Creators,
    Videos,
    Words,
    Subtitles,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Creators,
        DatasetKind::Videos,
        DatasetKind::Subtitles,
        DatasetKind::Words,
    ];

    pub fn parse(name: &str) -> DataSetResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "creators" | "accounts" => Ok(DatasetKind::Creators),
            "videos" => Ok(DatasetKind::Videos),
            "words" => Ok(DatasetKind::Words),
            "subtitles" => Ok(DatasetKind::Subtitles),
            _ => Err(DataSetError::UnknownDataset(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Creators => "creators",
            DatasetKind::Videos => "videos",
            DatasetKind::Words => "words",
            DatasetKind::Subtitles => "subtitles",
        }
    }

    /// Files tried in order when loading.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Creators => &["cuentas_info.csv"],
            DatasetKind::Videos => &[
                "combined_tiktok_data_cleaned_with_date.csv",
                "combined_tiktok_data_cleaned.csv",
            ],
            DatasetKind::Words => &["data.csv"],
            DatasetKind::Subtitles => &["subtitulos_videos_v3.csv"],
        }
    }

    /// Columns without which no row of this dataset can be read.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Creators => &["username"],
            DatasetKind::Videos => &[],
            DatasetKind::Words => &["word"],
            DatasetKind::Subtitles => &["username", "subtitles"],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DatasetKind::Creators => "Información de cuentas de TikTok y creadores",
            DatasetKind::Videos => "Datos de videos de TikTok con fechas",
            DatasetKind::Words => "Análisis de palabras y sentimientos",
            DatasetKind::Subtitles => "Subtítulos y transcripciones de videos",
        }
    }

    pub fn contains(&self) -> &'static str {
        match self {
            DatasetKind::Creators => "Datos de perfiles, seguidores, perspectivas políticas",
            DatasetKind::Videos => "Información de videos, visualizaciones, fechas de publicación",
            DatasetKind::Words => "Palabras, análisis de sentimientos, polaridad",
            DatasetKind::Subtitles => "Texto hablado, transcripciones, contenido verbal",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed rows plus the raw table they came from.
#[derive(Debug, Clone)]
pub struct Dataset<T> {
    pub kind: DatasetKind,
    pub table: RawTable,
    pub rows: Vec<T>,
}

impl<T> Dataset<T> {
    pub fn new(kind: DatasetKind, table: RawTable, rows: Vec<T>) -> Self {
        Self { kind, table, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Corpus {
    pub creators: Dataset<Creator>,
    pub videos: Dataset<Video>,
    pub words: Dataset<Word>,
    pub subtitles: Dataset<Subtitle>,
}

impl Default for Corpus {
    fn default() -> Self {
        Self::from_rows(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }
}

impl Corpus {
    pub fn load(data_dir: &Path) -> Self {
        info!("Loading corpus from {}", data_dir.display());

        let creators_table = load_table(data_dir, DatasetKind::Creators.candidates());
        warn_missing_columns(DatasetKind::Creators, &creators_table);
        let creators = creators_from_table(&creators_table);

        let followers_by_user: HashMap<String, u64> = creators
            .iter()
            .map(|c| (c.username.to_lowercase(), c.followers))
            .collect();

        let videos_table = load_table(data_dir, DatasetKind::Videos.candidates());
        warn_missing_columns(DatasetKind::Videos, &videos_table);
        let videos = videos_from_table(&videos_table, &followers_by_user);

        let words_table = load_table(data_dir, DatasetKind::Words.candidates());
        warn_missing_columns(DatasetKind::Words, &words_table);
        let words = words_from_table(&words_table);

        let subtitles_table = load_table(data_dir, DatasetKind::Subtitles.candidates());
        warn_missing_columns(DatasetKind::Subtitles, &subtitles_table);
        let subtitles = subtitles_from_table(&subtitles_table);

        let corpus = Self {
            creators: Dataset::new(DatasetKind::Creators, creators_table, creators),
            videos: Dataset::new(DatasetKind::Videos, videos_table, videos),
            words: Dataset::new(DatasetKind::Words, words_table, words),
            subtitles: Dataset::new(DatasetKind::Subtitles, subtitles_table, subtitles),
        };
        info!(
            "Corpus ready: {} creators, {} videos, {} words, {} subtitles",
            corpus.creators.len(),
            corpus.videos.len(),
            corpus.words.len(),
            corpus.subtitles.len()
        );
        corpus
    }

    /// Builds a corpus from typed rows; raw tables carry only the canonical headers.
    pub fn from_rows(
        creators: Vec<Creator>,
        videos: Vec<Video>,
        words: Vec<Word>,
        subtitles: Vec<Subtitle>,
    ) -> Self {
        fn table(kind: DatasetKind, columns: &[&str]) -> RawTable {
            RawTable {
                filename: kind.candidates()[0].to_string(),
                columns: columns.iter().map(|c| c.to_string()).collect(),
                records: Vec::new(),
            }
        }

        Self {
            creators: Dataset::new(
                DatasetKind::Creators,
                table(
                    DatasetKind::Creators,
                    &["username", "followers", "age", "perspective", "themes"],
                ),
                creators,
            ),
            videos: Dataset::new(
                DatasetKind::Videos,
                table(
                    DatasetKind::Videos,
                    &["username", "title", "views", "followers", "url", "date"],
                ),
                videos,
            ),
            words: Dataset::new(
                DatasetKind::Words,
                table(
                    DatasetKind::Words,
                    &["word", "count", "sentimiento", "type_1", "type_2"],
                ),
                words,
            ),
            subtitles: Dataset::new(
                DatasetKind::Subtitles,
                table(DatasetKind::Subtitles, &["username", "url", "subtitles"]),
                subtitles,
            ),
        }
    }

    pub fn count(&self, kind: DatasetKind) -> usize {
        match kind {
            DatasetKind::Creators => self.creators.len(),
            DatasetKind::Videos => self.videos.len(),
            DatasetKind::Words => self.words.len(),
            DatasetKind::Subtitles => self.subtitles.len(),
        }
    }

    pub fn table(&self, kind: DatasetKind) -> &RawTable {
        match kind {
            DatasetKind::Creators => &self.creators.table,
            DatasetKind::Videos => &self.videos.table,
            DatasetKind::Words => &self.words.table,
            DatasetKind::Subtitles => &self.subtitles.table,
        }
    }

    pub fn total_records(&self) -> usize {
        DatasetKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}

fn warn_missing_columns(kind: DatasetKind, table: &RawTable) {
    if table.is_empty() {
        return;
    }
    for column in kind.required_columns() {
        if table.column_index(column).is_none() {
            let err = DataSetError::MissingColumn {
                filename: table.filename.clone(),
                column: column.to_string(),
            };
            warn!("{}; no {} will be loaded", err, kind);
        }
    }
}

fn creators_from_table(table: &RawTable) -> Vec<Creator> {
    table
        .records
        .iter()
        .filter_map(|record| {
            let username = table.field(record, "username")?.to_string();
            let followers_text = table.field(record, "followers").unwrap_or("").to_string();
            Some(Creator {
                username,
                perspective: Perspective::parse(table.field(record, "perspective").unwrap_or("")),
                followers: parse_count(&followers_text).unwrap_or(0),
                followers_text,
                age: table.field(record, "age").map(str::to_string),
                themes: table.field(record, "themes").unwrap_or("").to_string(),
            })
        })
        .collect()
}

fn videos_from_table(table: &RawTable, followers_by_user: &HashMap<String, u64>) -> Vec<Video> {
    table
        .records
        .iter()
        .filter_map(|record| {
            let url = table.field(record, "url").unwrap_or("").to_string();
            let username = table.field(record, "username").unwrap_or("").to_string();
            if url.is_empty() && username.is_empty() {
                return None;
            }

            let full_title = table
                .field(record, "title")
                .or_else(|| table.field(record, "desc"))
                .unwrap_or("")
                .to_string();
            let views = table.field(record, "views").and_then(parse_count).unwrap_or(0);
            let followers = table
                .field(record, "followers")
                .and_then(parse_count)
                .or_else(|| followers_by_user.get(&username.to_lowercase()).copied())
                .unwrap_or(0);

            Some(Video {
                title: truncate_title(&full_title),
                full_title,
                url,
                username,
                views,
                followers,
                engagement_rate: engagement_rate(views, followers),
                duration: table.field(record, "duration").and_then(parse_float),
                date: table.field(record, "date").and_then(parse_date),
            })
        })
        .collect()
}

fn words_from_table(table: &RawTable) -> Vec<Word> {
    table
        .records
        .iter()
        .filter_map(|record| {
            let word = table.field(record, "word")?.to_string();
            let frequency = table.field(record, "count").and_then(parse_count).unwrap_or(0);
            let sentiment_score = table
                .field(record, "sentimiento")
                .and_then(parse_float)
                .unwrap_or(0.0);
            Some(Word {
                word,
                frequency,
                sentiment_score,
                sentiment_label: SentimentLabel::from_score(sentiment_score),
                family_1: table
                    .field(record, "type_1")
                    .unwrap_or(UNCLASSIFIED_FAMILY)
                    .to_string(),
                family_2: table
                    .field(record, "type_2")
                    .unwrap_or(UNCLASSIFIED_FAMILY)
                    .to_string(),
                engagement_score: frequency as f64 * sentiment_score.abs(),
                videos_count: frequency,
            })
        })
        .collect()
}

fn subtitles_from_table(table: &RawTable) -> Vec<Subtitle> {
    table
        .records
        .iter()
        .filter_map(|record| {
            Some(Subtitle {
                username: table.field(record, "username")?.to_string(),
                url: table.field(record, "url").unwrap_or("").to_string(),
                subtitles: table.field(record, "subtitles")?.to_string(),
            })
        })
        .collect()
}

pub fn engagement_rate(views: u64, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    round2(views as f64 / followers as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_MAX_CHARS {
        let short: String = title.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", short)
    } else {
        title.to_string()
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok())
        .or_else(|| {
            raw.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}
