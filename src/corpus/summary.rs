use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use super::models::{Perspective, SentimentLabel};
use super::{round2, Corpus, DatasetKind};

const SAMPLE_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub filename: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub sample: Vec<IndexMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreatorStats {
    pub total: usize,
    pub perspectives: IndexMap<String, usize>,
    pub avg_followers: f64,
    pub max_followers: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoStats {
    pub total: usize,
    pub total_views: u64,
    pub avg_views: f64,
    pub max_views: u64,
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WordStats {
    pub total: usize,
    pub total_frequency: u64,
    pub sentiment: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusStatistics {
    pub creators: CreatorStats,
    pub videos: VideoStats,
    pub words: WordStats,
    pub subtitles: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusSummary {
    pub datasets: IndexMap<String, DatasetSummary>,
    pub statistics: CorpusStatistics,
}

pub fn summarize(corpus: &Corpus) -> CorpusSummary {
    let datasets = DatasetKind::ALL
        .iter()
        .map(|kind| {
            let table = corpus.table(*kind);
            (
                kind.as_str().to_string(),
                DatasetSummary {
                    filename: table.filename.clone(),
                    rows: corpus.count(*kind),
                    columns: table.columns.clone(),
                    sample: table.head(SAMPLE_ROWS),
                },
            )
        })
        .collect();

    CorpusSummary {
        datasets,
        statistics: statistics(corpus),
    }
}

pub fn statistics(corpus: &Corpus) -> CorpusStatistics {
    CorpusStatistics {
        creators: creator_stats(corpus),
        videos: video_stats(corpus),
        words: word_stats(corpus),
        subtitles: corpus.subtitles.len(),
    }
}

/// Counts per perspective, largest first; ties keep enum order.
pub fn perspective_counts(corpus: &Corpus) -> IndexMap<String, usize> {
    let mut counts: IndexMap<Perspective, usize> = IndexMap::new();
    for creator in &corpus.creators.rows {
        *counts.entry(creator.perspective).or_default() += 1;
    }
    let mut pairs: Vec<_> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    pairs
        .into_iter()
        .map(|(p, n)| (p.as_str().to_string(), n))
        .collect()
}

fn creator_stats(corpus: &Corpus) -> CreatorStats {
    let rows = &corpus.creators.rows;
    let total_followers = rows.iter().map(|c| c.followers).fold(0u64, u64::saturating_add);
    CreatorStats {
        total: rows.len(),
        perspectives: perspective_counts(corpus),
        avg_followers: mean(total_followers as f64, rows.len()),
        max_followers: rows.iter().map(|c| c.followers).max().unwrap_or(0),
    }
}

fn video_stats(corpus: &Corpus) -> VideoStats {
    let rows = &corpus.videos.rows;
    let total_views = rows.iter().map(|v| v.views).fold(0u64, u64::saturating_add);
    let dates = rows.iter().filter_map(|v| v.date);
    let date_range = dates
        .clone()
        .min()
        .zip(dates.max())
        .map(|(start, end)| DateRange { start, end });

    VideoStats {
        total: rows.len(),
        total_views,
        avg_views: mean(total_views as f64, rows.len()),
        max_views: rows.iter().map(|v| v.views).max().unwrap_or(0),
        date_range,
    }
}

fn word_stats(corpus: &Corpus) -> WordStats {
    let rows = &corpus.words.rows;
    let mut sentiment = IndexMap::new();
    for label in [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ] {
        let count = rows.iter().filter(|w| w.sentiment_label == label).count();
        sentiment.insert(label.as_str().to_string(), count);
    }
    WordStats {
        total: rows.len(),
        total_frequency: rows.iter().map(|w| w.frequency).fold(0, u64::saturating_add),
        sentiment,
    }
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        round2(sum / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::models::{Creator, Video};

    #[test]
    fn test_empty_corpus_summary_is_zeroed() {
        let summary = summarize(&Corpus::default());
        assert_eq!(summary.datasets.len(), 4);
        assert!(summary.datasets.values().all(|d| d.rows == 0));
        assert_eq!(summary.statistics.creators.avg_followers, 0.0);
        assert!(summary.statistics.videos.date_range.is_none());
        assert_eq!(summary.statistics.words.sentiment["positive"], 0);
    }

    #[test]
    fn test_statistics() {
        let creators = vec![
            Creator {
                username: "ana".into(),
                perspective: Perspective::Derecha,
                followers_text: "100".into(),
                followers: 100,
                age: None,
                themes: String::new(),
            },
            Creator {
                username: "beto".into(),
                perspective: Perspective::Derecha,
                followers_text: "300".into(),
                followers: 300,
                age: None,
                themes: String::new(),
            },
            Creator {
                username: "cata".into(),
                perspective: Perspective::Izquierda,
                followers_text: "0".into(),
                followers: 0,
                age: None,
                themes: String::new(),
            },
        ];
        let videos = vec![Video {
            url: "u".into(),
            title: "t".into(),
            full_title: "t".into(),
            username: "ana".into(),
            views: 10,
            followers: 100,
            engagement_rate: 10.0,
            duration: None,
            date: NaiveDate::from_ymd_opt(2023, 3, 1),
        }];
        let corpus = Corpus::from_rows(creators, videos, vec![], vec![]);
        let stats = statistics(&corpus);

        assert_eq!(stats.creators.avg_followers, 133.33);
        assert_eq!(stats.creators.max_followers, 300);
        assert_eq!(
            stats.creators.perspectives.keys().collect::<Vec<_>>(),
            vec!["derecha", "izquierda"]
        );
        assert_eq!(stats.videos.total_views, 10);
        assert_eq!(
            stats.videos.date_range.map(|r| r.start),
            NaiveDate::from_ymd_opt(2023, 3, 1)
        );
    }

    #[test]
    fn test_huge_view_counts_do_not_overflow() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("combined_tiktok_data_cleaned_with_date.csv"),
            "username,title,views,url,date\nana,a,1E20,u1,2023-01-01\nana,b,1E20,u2,2023-01-02\n",
        )
        .unwrap();
        let loaded = Corpus::load(dir.path());
        assert_eq!(loaded.videos.rows.iter().map(|v| v.views).collect::<Vec<_>>(), vec![0, 0]);

        let video = |url: &str| Video {
            url: url.into(),
            title: "t".into(),
            full_title: "t".into(),
            username: "ana".into(),
            views: u64::MAX,
            followers: 0,
            engagement_rate: 0.0,
            duration: None,
            date: NaiveDate::from_ymd_opt(2023, 1, 1),
        };
        let corpus = Corpus::from_rows(vec![], vec![video("u1"), video("u2")], vec![], vec![]);
        let summary = summarize(&corpus);
        assert_eq!(summary.statistics.videos.total_views, u64::MAX);
        assert_eq!(summary.statistics.videos.max_views, u64::MAX);
    }
}
