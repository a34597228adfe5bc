//! Keyword-driven chart payloads built from the corpus.

pub mod comparison;
pub mod counting;
pub mod detect;
pub mod distribution;
pub mod filter;
pub mod network;
pub mod payload;
pub mod sentiment;
pub mod summary;
pub mod time_series;

use tracing::{info, warn};

use crate::corpus::Corpus;

pub use detect::detect_kind;
pub use filter::{CorpusView, QueryFocus};
pub use payload::{
    FilterInfo, NameValue, StatValue, SubChart, SubChartType, Visualization, VisualizationFailure,
    VisualizationKind, VisualizationPayload,
};

const NO_DATA_SUGGESTION: &str =
    "Intenta con una palabra diferente o consulta términos más generales.";

/// Resolves the chart kind for a request: explicit when recognised, detected when
/// blank or `auto`, `Err` with the raw value when unrecognised.
pub fn resolve_kind(query: &str, requested: Option<&str>) -> Result<VisualizationKind, String> {
    match requested
        .map(str::trim)
        .filter(|raw| !raw.is_empty() && !raw.eq_ignore_ascii_case("auto"))
    {
        Some(raw) => VisualizationKind::parse(raw).ok_or_else(|| raw.to_string()),
        None => Ok(detect_kind(query)),
    }
}

pub fn generate(corpus: &Corpus, query: &str, requested: Option<&str>) -> VisualizationPayload {
    let kind = match resolve_kind(query, requested) {
        Ok(kind) => kind,
        Err(raw) => {
            warn!("Unsupported visualization type '{}'", raw);
            let supported: Vec<&str> = VisualizationKind::ALL.iter().map(|k| k.as_str()).collect();
            return VisualizationFailure {
                kind: None,
                title: "Tipo de Visualización no Soportado".to_string(),
                error: format!("Tipo de visualización desconocido: '{}'", raw),
                suggestion: Some(format!("Tipos disponibles: {}", supported.join(", "))),
                filter_info: None,
            }
            .into();
        }
    };

    let query = query.trim();
    let focus = QueryFocus::from_query(query);
    let view = CorpusView::focused(corpus, &focus);
    info!(
        "Generating '{}' visualization for '{}' ({} of {} records)",
        kind,
        query,
        view.total(),
        corpus.total_records()
    );

    if !focus.is_empty() && view.is_empty() {
        warn!("Query '{}' matched no records", query);
        return VisualizationFailure {
            kind: Some(kind.as_str().to_string()),
            title: "Sin Datos Disponibles".to_string(),
            error: format!(
                "No se encontraron datos relevantes para '{}' en el conjunto de datos disponible.",
                query
            ),
            suggestion: Some(NO_DATA_SUGGESTION.to_string()),
            filter_info: Some(FilterInfo::default()),
        }
        .into();
    }

    let generated = match kind {
        VisualizationKind::TimeSeries => time_series::generate(&view),
        VisualizationKind::Comparison => comparison::generate(&view),
        VisualizationKind::Distribution => distribution::generate(&view),
        VisualizationKind::Sentiment => sentiment::generate(&view, &corpus.words.rows),
        VisualizationKind::Summary => summary::generate(&view),
        VisualizationKind::Network => network::generate(&view),
    };

    let filter_info = if focus.is_empty() {
        FilterInfo::default()
    } else {
        FilterInfo {
            filtered: true,
            query: Some(query.to_string()),
            original_records: Some(corpus.total_records()),
            filtered_records: Some(view.total()),
        }
    };

    match generated {
        Ok(mut chart) => {
            if filter_info.filtered {
                chart.decorate(&format!(" - Filtrado: '{}'", query), filter_info);
            }
            chart.into()
        }
        Err(error) => {
            warn!("Visualization '{}' failed: {}", kind, error);
            VisualizationFailure {
                kind: Some(kind.as_str().to_string()),
                title: format!("Error al Generar Visualización ({})", kind),
                error,
                suggestion: None,
                filter_info: Some(filter_info),
            }
            .into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Creator, Perspective, SentimentLabel, Subtitle, Word};

    fn corpus() -> Corpus {
        Corpus::from_rows(
            vec![Creator {
                username: "ana".into(),
                perspective: Perspective::Izquierda,
                followers_text: "1K".into(),
                followers: 1000,
                age: Some("18-24".into()),
                themes: "feminismo".into(),
            }],
            vec![],
            vec![Word {
                word: "justicia".into(),
                frequency: 2,
                sentiment_score: 1.0,
                sentiment_label: SentimentLabel::Positive,
                family_1: "valores".into(),
                family_2: "Sin clasificar".into(),
                engagement_score: 2.0,
                videos_count: 2,
            }],
            vec![Subtitle {
                username: "ana".into(),
                url: "u1".into(),
                subtitles: "Queremos justicia".into(),
            }],
        )
    }

    #[test]
    fn test_requested_type_is_honoured() {
        let payload = generate(&corpus(), "distribución de sentimientos", Some("sentiment"));
        let Some(Visualization::Sentiment(chart)) = payload.chart() else {
            panic!("expected sentiment, got {:?}", payload);
        };
        assert!(!chart.by_user.is_empty());
        assert!(!chart.filter_info.filtered);
        assert_eq!(chart.title, "Análisis de Sentimiento");
    }

    #[test]
    fn test_auto_detects_from_query() {
        let payload = generate(&corpus(), "red de cuentas", Some("auto"));
        assert_eq!(payload.type_name(), Some("network"));
        let payload = generate(&corpus(), "red de cuentas", None);
        assert_eq!(payload.type_name(), Some("network"));
    }

    #[test]
    fn test_unknown_type_fails_without_type() {
        let payload = generate(&corpus(), "hola", Some("sunburst"));
        assert!(payload.error().is_some());
        assert_eq!(payload.type_name(), None);
    }

    #[test]
    fn test_focused_query_without_matches_is_no_data() {
        let payload = generate(&corpus(), "criptomonedas", Some("summary"));
        assert!(payload.error().unwrap().contains("criptomonedas"));
        assert_eq!(payload.type_name(), Some("summary"));
    }

    #[test]
    fn test_filtered_title_and_info() {
        let payload = generate(&corpus(), "feminismo", Some("summary"));
        let Some(Visualization::Summary(chart)) = payload.chart() else {
            panic!("expected summary");
        };
        assert_eq!(chart.title, "Resumen General de Datos - Filtrado: 'feminismo'");
        assert!(chart.filter_info.filtered);
        assert_eq!(chart.filter_info.original_records, Some(3));
        assert_eq!(chart.filter_info.filtered_records, Some(2));
    }

    #[test]
    fn test_generator_error_keeps_requested_type() {
        let payload = generate(&corpus(), "", Some("time_series"));
        assert_eq!(payload.type_name(), Some("time_series"));
        assert_eq!(
            payload.error(),
            Some("No hay datos de videos disponibles.")
        );
    }
}
