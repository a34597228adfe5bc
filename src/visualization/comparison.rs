use indexmap::IndexMap;

use super::counting::{perspective_counts, theme_counts, top_followers};
use super::filter::CorpusView;
use super::payload::{ComparisonPayload, ViewsComparison, Visualization};
use crate::corpus::round2;

const TOP: usize = 10;

pub fn generate(view: &CorpusView<'_>) -> Result<Visualization, String> {
    if view.creators.is_empty() && view.videos.is_empty() {
        return Err("No hay datos de cuentas o videos disponibles para comparar.".to_string());
    }

    let payload = ComparisonPayload {
        title: "Comparativas".to_string(),
        follower_comparison: top_followers(&view.creators, TOP),
        perspective_comparison: perspective_counts(&view.creators),
        theme_comparison: theme_counts(&view.creators, TOP),
        views_comparison: views_by_user(view),
        ..Default::default()
    };

    if payload.follower_comparison.is_empty()
        && payload.perspective_comparison.is_empty()
        && payload.theme_comparison.is_empty()
        && payload.views_comparison.is_empty()
    {
        return Err("No se generaron comparaciones con los datos/consulta proporcionados.".to_string());
    }

    Ok(Visualization::Comparison(payload))
}

fn views_by_user(view: &CorpusView<'_>) -> Vec<ViewsComparison> {
    let mut totals: IndexMap<&str, (u64, u64)> = IndexMap::new();
    for video in view.videos.iter().filter(|v| !v.username.is_empty()) {
        let entry = totals.entry(video.username.as_str()).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(video.views);
    }

    let mut rows: Vec<ViewsComparison> = totals
        .into_iter()
        .map(|(username, (count, views))| ViewsComparison {
            username: username.to_string(),
            avg_views: round2(views as f64 / count as f64),
            total_videos: count,
            total_views: views as f64,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.avg_views
            .partial_cmp(&a.avg_views)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(TOP);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Creator, Perspective, Video};

    #[test]
    fn test_views_comparison_orders_by_average() {
        let video = |username: &str, views: u64| Video {
            url: String::new(),
            title: String::new(),
            full_title: String::new(),
            username: username.into(),
            views,
            followers: 0,
            engagement_rate: 0.0,
            duration: None,
            date: None,
        };
        let videos = vec![video("ana", 10), video("beto", 50), video("ana", 30)];
        let creators = vec![Creator {
            username: "ana".into(),
            perspective: Perspective::Izquierda,
            followers_text: "5".into(),
            followers: 5,
            age: None,
            themes: "feminismo, educación".into(),
        }];
        let view = CorpusView {
            creators: creators.iter().collect(),
            videos: videos.iter().collect(),
            ..Default::default()
        };

        let Visualization::Comparison(payload) = generate(&view).unwrap() else {
            panic!("expected comparison");
        };
        assert_eq!(payload.views_comparison[0].username, "beto");
        assert_eq!(payload.views_comparison[1].avg_views, 20.0);
        assert_eq!(payload.views_comparison[1].total_videos, 2);
        assert_eq!(payload.theme_comparison.len(), 2);
        assert_eq!(payload.perspective_comparison[0].name, "izquierda");
    }

    #[test]
    fn test_views_comparison_saturates_totals() {
        let video = Video {
            url: String::new(),
            title: String::new(),
            full_title: String::new(),
            username: "ana".into(),
            views: u64::MAX,
            followers: 0,
            engagement_rate: 0.0,
            duration: None,
            date: None,
        };
        let videos = vec![video.clone(), video];
        let view = CorpusView {
            videos: videos.iter().collect(),
            ..Default::default()
        };

        let rows = views_by_user(&view);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_videos, 2);
        assert_eq!(rows[0].total_views, u64::MAX as f64);
    }

    #[test]
    fn test_empty_view_is_an_error() {
        assert!(generate(&CorpusView::default()).is_err());
    }
}
