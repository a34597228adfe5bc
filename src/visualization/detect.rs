use once_cell::sync::Lazy;
use regex::Regex;

use super::payload::VisualizationKind;

/// Checked in order; the first hit wins.
static RULES: Lazy<Vec<(Regex, VisualizationKind)>> = Lazy::new(|| {
    [
        (r"(?i)(tiempo|temporal|evoluci[oó]n|tendencia)", VisualizationKind::TimeSeries),
        (r"(?i)(comparar|compara|versus|\bvs\b|diferencia)", VisualizationKind::Comparison),
        (r"(?i)(distribuci[oó]n|histograma)", VisualizationKind::Distribution),
        (r"(?i)(\bred(es)?\b|conexi[oó]n|relaci[oó]n)", VisualizationKind::Network),
        (r"(?i)(sentimiento|emoci[oó]n)", VisualizationKind::Sentiment),
    ]
    .into_iter()
    .map(|(pattern, kind)| {
        (
            Regex::new(pattern).expect("Invalid regex pattern for chart detection"),
            kind,
        )
    })
    .collect()
});

/// Picks a chart kind from the wording of a query, defaulting to a summary.
pub fn detect_kind(query: &str) -> VisualizationKind {
    RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(query))
        .map(|(_, kind)| *kind)
        .unwrap_or(VisualizationKind::Summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_order() {
        assert_eq!(detect_kind("evolución de videos"), VisualizationKind::TimeSeries);
        assert_eq!(detect_kind("Izquierda vs derecha"), VisualizationKind::Comparison);
        assert_eq!(detect_kind("distribución de sentimientos"), VisualizationKind::Distribution);
        assert_eq!(detect_kind("red de creadores"), VisualizationKind::Network);
        assert_eq!(detect_kind("¿qué emoción predomina?"), VisualizationKind::Sentiment);
        assert_eq!(detect_kind("hola"), VisualizationKind::Summary);
    }

    #[test]
    fn test_network_needs_whole_word() {
        assert_eq!(detect_kind("credibilidad"), VisualizationKind::Summary);
        assert_eq!(detect_kind("TENDENCIA mensual"), VisualizationKind::TimeSeries);
    }
}
