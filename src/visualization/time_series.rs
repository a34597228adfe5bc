use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::filter::CorpusView;
use super::payload::{CountPoint, StatValue, TimeSeriesPayload, ViewsPoint, Visualization};
use crate::corpus::{round2, Video};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthBucket {
    pub count: u64,
    pub views: u64,
}

/// Dated videos grouped by `YYYY-MM`, in calendar order.
pub fn monthly_buckets(videos: &[&Video]) -> BTreeMap<String, MonthBucket> {
    let mut buckets: BTreeMap<String, MonthBucket> = BTreeMap::new();
    for video in videos {
        if let Some(date) = video.date {
            let bucket = buckets.entry(date.format("%Y-%m").to_string()).or_default();
            bucket.count += 1;
            bucket.views = bucket.views.saturating_add(video.views);
        }
    }
    buckets
}

pub fn generate(view: &CorpusView<'_>) -> Result<Visualization, String> {
    if view.videos.is_empty() {
        return Err("No hay datos de videos disponibles.".to_string());
    }

    let buckets = monthly_buckets(&view.videos);
    if buckets.is_empty() {
        return Err("No se encontraron fechas válidas en los videos.".to_string());
    }

    let data: Vec<CountPoint> = buckets
        .iter()
        .map(|(month, bucket)| CountPoint {
            date: month.clone(),
            count: bucket.count,
        })
        .collect();
    let views_data: Vec<ViewsPoint> = buckets
        .iter()
        .map(|(month, bucket)| ViewsPoint {
            date: month.clone(),
            avg_views: round2(bucket.views as f64 / bucket.count as f64),
        })
        .collect();

    let total: u64 = data.iter().map(|p| p.count).sum();
    // first month wins a tie for the peak
    let peak = data
        .iter()
        .fold(None::<&CountPoint>, |best, p| match best {
            Some(b) if b.count >= p.count => Some(b),
            _ => Some(p),
        });

    let mut stats = IndexMap::new();
    stats.insert("Total Videos".to_string(), StatValue::Int(total as i64));
    stats.insert(
        "Promedio Mensual".to_string(),
        StatValue::Float(round2(total as f64 / data.len() as f64)),
    );
    if let Some(peak) = peak {
        stats.insert("Mes Pico".to_string(), StatValue::Text(peak.date.clone()));
        stats.insert("Máximo Mensual".to_string(), StatValue::Int(peak.count as i64));
    }

    Ok(Visualization::TimeSeries(TimeSeriesPayload {
        title: "Evolución Temporal de Videos".to_string(),
        data,
        views_data,
        stats,
        ..Default::default()
    }))
}
