use indexmap::IndexMap;

use super::counting::{perspective_counts, sentiment_counts, theme_counts, top, top_followers, value_counts};
use super::filter::CorpusView;
use super::payload::{NameValue, StatValue, SubChart, SubChartType, SummaryPayload, Visualization};
use super::time_series::monthly_buckets;

const TOP: usize = 10;

pub fn generate(view: &CorpusView<'_>) -> Result<Visualization, String> {
    if view.is_empty() {
        return Err("No hay datos disponibles para generar un resumen.".to_string());
    }

    let mut stats = IndexMap::new();
    stats.insert("Cuentas".to_string(), StatValue::Int(view.creators.len() as i64));
    stats.insert("Videos".to_string(), StatValue::Int(view.videos.len() as i64));
    stats.insert("Palabras Léxico".to_string(), StatValue::Int(view.words.len() as i64));
    stats.insert(
        "Con Subtítulos".to_string(),
        StatValue::Int(view.subtitles.len() as i64),
    );

    let timeline: Vec<NameValue> = monthly_buckets(&view.videos)
        .into_iter()
        .map(|(month, bucket)| NameValue::new(month, bucket.count as f64))
        .collect();

    let candidates = [
        (
            "perspective_pie",
            SubChartType::Pie,
            "Distribución por Perspectiva",
            perspective_counts(&view.creators),
        ),
        (
            "themes_bar",
            SubChartType::Bar,
            "Top 10 Temas",
            theme_counts(&view.creators, TOP),
        ),
        (
            "top_accounts_bar",
            SubChartType::Bar,
            "Top 10 Cuentas (Seguidores)",
            top_followers(&view.creators, TOP),
        ),
        (
            "timeline_line",
            SubChartType::Line,
            "Videos Publicados (Mensual)",
            timeline,
        ),
        (
            "top_creators_bar",
            SubChartType::Bar,
            "Top 10 Creadores (Videos)",
            top(
                value_counts(
                    view.videos
                        .iter()
                        .filter(|v| !v.username.is_empty())
                        .map(|v| v.username.as_str()),
                ),
                TOP,
            ),
        ),
        (
            "sentiment_pie",
            SubChartType::Pie,
            "Distribución Sentimiento (Palabras)",
            sentiment_counts(&view.words),
        ),
        (
            "word_types_bar",
            SubChartType::Bar,
            "Top 10 Tipos de Palabra (Tipo 1)",
            top(value_counts(view.words.iter().map(|w| w.family_1.as_str())), TOP),
        ),
    ];

    let charts = candidates
        .into_iter()
        .filter(|(_, _, _, data)| !data.is_empty())
        .map(|(id, chart_type, title, data)| SubChart {
            id: id.to_string(),
            chart_type,
            title: title.to_string(),
            data,
        })
        .collect();

    Ok(Visualization::Summary(SummaryPayload {
        title: "Resumen General de Datos".to_string(),
        stats,
        charts,
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Creator, Perspective};

    #[test]
    fn test_only_populated_charts_are_emitted() {
        let creators = vec![Creator {
            username: "ana".into(),
            perspective: Perspective::Centro,
            followers_text: "10".into(),
            followers: 10,
            age: None,
            themes: String::new(),
        }];
        let view = CorpusView {
            creators: creators.iter().collect(),
            ..Default::default()
        };

        let Visualization::Summary(payload) = generate(&view).unwrap() else {
            panic!("expected summary");
        };
        let ids: Vec<_> = payload.charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["perspective_pie", "top_accounts_bar"]);
        assert_eq!(payload.stats["Cuentas"], StatValue::Int(1));
        assert_eq!(payload.stats["Con Subtítulos"], StatValue::Int(0));
    }

    #[test]
    fn test_empty_view_is_an_error() {
        assert!(generate(&CorpusView::default()).is_err());
    }
}
