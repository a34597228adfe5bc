use super::counting::{perspective_counts, sentiment_counts, theme_counts, value_counts};
use super::filter::CorpusView;
use super::payload::{DistributionPayload, NameValue, Visualization};

const TOP_THEMES: usize = 15;

/// Half-open view-count ranges, lower bound inclusive.
const VIEW_BINS: &[(&str, u64, u64)] = &[
    ("<1K", 0, 1_000),
    ("1K-10K", 1_000, 10_000),
    ("10K-100K", 10_000, 100_000),
    ("100K-1M", 100_000, 1_000_000),
    (">1M", 1_000_000, u64::MAX),
];

pub fn generate(view: &CorpusView<'_>) -> Result<Visualization, String> {
    let payload = DistributionPayload {
        title: "Distribuciones".to_string(),
        perspective_distribution: perspective_counts(&view.creators),
        age_distribution: value_counts(view.creators.iter().filter_map(|c| c.age.as_deref())),
        theme_distribution: theme_counts(&view.creators, TOP_THEMES),
        views_distribution: views_histogram(view),
        sentiment_distribution: sentiment_counts(&view.words),
        ..Default::default()
    };

    if payload.perspective_distribution.is_empty()
        && payload.age_distribution.is_empty()
        && payload.theme_distribution.is_empty()
        && payload.views_distribution.is_empty()
        && payload.sentiment_distribution.is_empty()
    {
        return Err("No se generaron distribuciones con los datos disponibles.".to_string());
    }

    Ok(Visualization::Distribution(payload))
}

fn views_histogram(view: &CorpusView<'_>) -> Vec<NameValue> {
    if view.videos.is_empty() {
        return Vec::new();
    }
    VIEW_BINS
        .iter()
        .map(|(label, low, high)| {
            let n = view
                .videos
                .iter()
                .filter(|v| v.views >= *low && v.views < *high)
                .count();
            NameValue::new(*label, n as f64)
        })
        .collect()
}
