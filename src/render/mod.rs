//! Turns a visualization payload into an ordered list of view sections.
//!
//! Rendering is pure: no I/O, no drawing. Each payload shape maps to a fixed
//! sequence of sections and every empty slot becomes [`Section::NoData`], so
//! a front end only has to draw what it is handed.

pub mod format;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::visualization::payload::{
    ComparisonPayload, DistributionPayload, NetworkPayload, SentimentPayload, Stats,
    SummaryPayload, TimeSeriesPayload,
};
use crate::visualization::{NameValue, SubChartType, Visualization, VisualizationPayload};

pub use format::{format_number, format_percent, format_stat, Locale};

/// Pie slices below this share of the total are drawn without a label.
pub const PIE_LABEL_THRESHOLD: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub locale: Locale,
    pub pie_label_threshold: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            pie_label_threshold: PIE_LABEL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Area,
    Bar,
    HorizontalBar,
    Line,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub key: String,
    pub label: String,
    pub axis: Axis,
}

/// One category on the x axis (or one slice); `values` lines up with the
/// chart's `series`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub category: String,
    pub values: Vec<Option<f64>>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub slot: String,
    pub kind: ChartKind,
    pub title: String,
    pub series: Vec<Series>,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub slot: String,
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum Section {
    StatCards { cards: Vec<StatCard> },
    Chart(Chart),
    Table(Table),
    NoData { slot: String, title: String },
    Placeholder { title: String, message: String },
    Error {
        message: String,
        suggestion: Option<String>,
    },
    Unsupported { type_name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedView {
    pub title: String,
    pub sections: Vec<Section>,
}

pub fn render(payload: &VisualizationPayload, options: &RenderOptions) -> RenderedView {
    match payload {
        VisualizationPayload::Failed(failure) => RenderedView {
            title: if failure.title.is_empty() {
                "Error".to_string()
            } else {
                failure.title.clone()
            },
            sections: vec![Section::Error {
                message: failure.error.clone(),
                suggestion: failure.suggestion.clone(),
            }],
        },
        VisualizationPayload::Chart(chart) => RenderedView {
            title: chart.title().to_string(),
            sections: match chart {
                Visualization::TimeSeries(p) => time_series(p, options),
                Visualization::Comparison(p) => comparison(p, options),
                Visualization::Distribution(p) => distribution(p, options),
                Visualization::Sentiment(p) => sentiment(p, options),
                Visualization::Summary(p) => summary(p, options),
                Visualization::Network(p) => network(p, options),
            },
        },
        VisualizationPayload::Unsupported(value) => RenderedView {
            title: value
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("Visualización")
                .to_string(),
            sections: vec![Section::Unsupported {
                type_name: payload.type_name().map(str::to_string),
            }],
        },
    }
}

fn stat_cards(stats: &Stats, options: &RenderOptions) -> Option<Section> {
    if stats.is_empty() {
        return None;
    }
    let cards = stats
        .iter()
        .map(|(label, value)| StatCard {
            label: label.clone(),
            value: format_stat(value, options.locale),
        })
        .collect();
    Some(Section::StatCards { cards })
}

fn no_data(slot: &str, title: &str) -> Section {
    Section::NoData {
        slot: slot.to_string(),
        title: title.to_string(),
    }
}

/// Single-series chart over name/value pairs.
fn name_value_chart(
    slot: &str,
    kind: ChartKind,
    title: &str,
    data: &[NameValue],
    options: &RenderOptions,
) -> Section {
    if data.is_empty() {
        return no_data(slot, title);
    }
    let total: f64 = data.iter().map(|nv| nv.value).sum();
    let points = data
        .iter()
        .map(|nv| {
            let label = match kind {
                ChartKind::Pie => {
                    let share = if total > 0.0 { nv.value / total } else { 0.0 };
                    (share >= options.pie_label_threshold).then(|| {
                        format!("{} {}", nv.name, format_percent(share, options.locale))
                    })
                }
                _ => Some(format_number(nv.value, options.locale)),
            };
            ChartPoint {
                category: nv.name.clone(),
                values: vec![Some(nv.value)],
                label,
            }
        })
        .collect();

    Section::Chart(Chart {
        slot: slot.to_string(),
        kind,
        title: title.to_string(),
        series: vec![Series {
            key: "value".to_string(),
            label: title.to_string(),
            axis: Axis::Left,
        }],
        points,
    })
}

fn time_series(p: &TimeSeriesPayload, options: &RenderOptions) -> Vec<Section> {
    let mut sections: Vec<Section> = stat_cards(&p.stats, options).into_iter().collect();
    let title = "Videos y Vistas Promedio por Mes";
    if p.data.is_empty() && p.views_data.is_empty() {
        sections.push(no_data("timeline", title));
        return sections;
    }

    let mut merged: BTreeMap<&str, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for point in &p.data {
        merged.entry(point.date.as_str()).or_default().0 = Some(point.count as f64);
    }
    for point in &p.views_data {
        merged.entry(point.date.as_str()).or_default().1 = Some(point.avg_views);
    }

    sections.push(Section::Chart(Chart {
        slot: "timeline".to_string(),
        kind: ChartKind::Area,
        title: title.to_string(),
        series: vec![
            Series {
                key: "count".to_string(),
                label: "Videos".to_string(),
                axis: Axis::Left,
            },
            Series {
                key: "avg_views".to_string(),
                label: "Vistas Promedio".to_string(),
                axis: Axis::Right,
            },
        ],
        points: merged
            .into_iter()
            .map(|(date, (count, views))| ChartPoint {
                category: date.to_string(),
                values: vec![count, views],
                label: None,
            })
            .collect(),
    }));
    sections
}

fn comparison(p: &ComparisonPayload, options: &RenderOptions) -> Vec<Section> {
    let views: Vec<NameValue> = p
        .views_comparison
        .iter()
        .map(|v| NameValue::new(v.username.clone(), v.avg_views))
        .collect();
    vec![
        name_value_chart(
            "followers",
            ChartKind::HorizontalBar,
            "Seguidores por Cuenta",
            &p.follower_comparison,
            options,
        ),
        name_value_chart(
            "perspectives",
            ChartKind::Pie,
            "Cuentas por Perspectiva",
            &p.perspective_comparison,
            options,
        ),
        name_value_chart("themes", ChartKind::Bar, "Temas Principales", &p.theme_comparison, options),
        name_value_chart("views", ChartKind::Bar, "Vistas Promedio por Cuenta", &views, options),
    ]
}

fn distribution(p: &DistributionPayload, options: &RenderOptions) -> Vec<Section> {
    vec![
        name_value_chart(
            "perspectives",
            ChartKind::Pie,
            "Distribución por Perspectiva",
            &p.perspective_distribution,
            options,
        ),
        name_value_chart("ages", ChartKind::Bar, "Distribución por Edad", &p.age_distribution, options),
        name_value_chart("themes", ChartKind::Bar, "Distribución de Temas", &p.theme_distribution, options),
        name_value_chart("views", ChartKind::Bar, "Distribución de Vistas", &p.views_distribution, options),
        name_value_chart(
            "sentiment",
            ChartKind::Pie,
            "Distribución de Sentimiento",
            &p.sentiment_distribution,
            options,
        ),
    ]
}

fn sentiment(p: &SentimentPayload, options: &RenderOptions) -> Vec<Section> {
    let averages: Vec<NameValue> = p
        .by_user
        .iter()
        .map(|u| NameValue::new(u.username.clone(), u.avg_sentiment))
        .collect();
    let chart = name_value_chart(
        "by_user",
        ChartKind::Bar,
        "Sentimiento Promedio por Usuario",
        &averages,
        options,
    );

    let table_title = "Detalle por Usuario";
    let table = if p.by_user.is_empty() {
        no_data("details", table_title)
    } else {
        Section::Table(Table {
            slot: "details".to_string(),
            title: table_title.to_string(),
            columns: ["Usuario", "Sentimiento", "Positivas", "Negativas", "Videos"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows: p
                .by_user
                .iter()
                .map(|u| {
                    vec![
                        u.username.clone(),
                        format_number(u.avg_sentiment, options.locale),
                        format_number(u.positive_total as f64, options.locale),
                        format_number(u.negative_total as f64, options.locale),
                        format_number(u.videos_analyzed as f64, options.locale),
                    ]
                })
                .collect(),
        })
    };

    let videos_title = "Detalle por Video";
    let videos = if p.data.is_empty() {
        no_data("videos", videos_title)
    } else {
        Section::Table(Table {
            slot: "videos".to_string(),
            title: videos_title.to_string(),
            columns: ["Usuario", "Video", "Positivas", "Negativas", "Ratio"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows: p
                .data
                .iter()
                .map(|score| {
                    vec![
                        score.username.clone(),
                        score.url.clone().unwrap_or_else(|| "-".to_string()),
                        format_number(score.positive_words as f64, options.locale),
                        format_number(score.negative_words as f64, options.locale),
                        format_number(score.sentiment_ratio, options.locale),
                    ]
                })
                .collect(),
        })
    };
    vec![chart, table, videos]
}

fn summary(p: &SummaryPayload, options: &RenderOptions) -> Vec<Section> {
    let mut sections: Vec<Section> = stat_cards(&p.stats, options).into_iter().collect();
    if p.charts.is_empty() {
        sections.push(no_data("charts", "Gráficos"));
        return sections;
    }
    sections.extend(p.charts.iter().map(|chart| {
        let kind = match chart.chart_type {
            SubChartType::Bar => ChartKind::Bar,
            SubChartType::Line => ChartKind::Line,
            SubChartType::Pie => ChartKind::Pie,
        };
        name_value_chart(&chart.id, kind, &chart.title, &chart.data, options)
    }));
    sections
}

fn network(p: &NetworkPayload, options: &RenderOptions) -> Vec<Section> {
    let message = if p.summary.is_empty() {
        format!(
            "{} nodos, {} conexiones",
            format_number(p.nodes.len() as f64, options.locale),
            format_number(p.links.len() as f64, options.locale)
        )
    } else {
        p.summary.clone()
    };
    vec![Section::Placeholder {
        title: "Visualización de red".to_string(),
        message,
    }]
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        for section in &self.sections {
            writeln!(f)?;
            match section {
                Section::StatCards { cards } => {
                    for card in cards {
                        writeln!(f, "  {}: {}", card.label, card.value)?;
                    }
                }
                Section::Chart(chart) => {
                    writeln!(f, "## {} [{:?}]", chart.title, chart.kind)?;
                    for point in &chart.points {
                        let values: Vec<String> = point
                            .values
                            .iter()
                            .map(|v| v.map_or_else(|| "-".to_string(), |v| v.to_string()))
                            .collect();
                        match &point.label {
                            Some(label) => {
                                writeln!(f, "  {}: {} ({})", point.category, values.join(" / "), label)?
                            }
                            None => writeln!(f, "  {}: {}", point.category, values.join(" / "))?,
                        }
                    }
                }
                Section::Table(table) => {
                    writeln!(f, "## {}", table.title)?;
                    writeln!(f, "  {}", table.columns.join(" | "))?;
                    for row in &table.rows {
                        writeln!(f, "  {}", row.join(" | "))?;
                    }
                }
                Section::NoData { title, .. } => {
                    writeln!(f, "## {}", title)?;
                    writeln!(f, "  Sin datos")?;
                }
                Section::Placeholder { title, message } => {
                    writeln!(f, "## {}", title)?;
                    writeln!(f, "  {}", message)?;
                }
                Section::Error { message, suggestion } => {
                    writeln!(f, "  Error: {}", message)?;
                    if let Some(suggestion) = suggestion {
                        writeln!(f, "  {}", suggestion)?;
                    }
                }
                Section::Unsupported { type_name } => writeln!(
                    f,
                    "  Tipo de visualización no soportado: {}",
                    type_name.as_deref().unwrap_or("desconocido")
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::payload::{CountPoint, SentimentScore, UserSentiment, ViewsPoint};
    use crate::visualization::{StatValue, SubChart, VisualizationFailure};
    use serde_json::json;

    fn sections(payload: VisualizationPayload) -> Vec<Section> {
        render(&payload, &RenderOptions::default()).sections
    }

    #[test]
    fn test_time_series_merges_by_date() {
        let mut stats = Stats::new();
        stats.insert("Total Videos".into(), StatValue::Int(1500));
        let payload = Visualization::TimeSeries(TimeSeriesPayload {
            title: "T".into(),
            data: vec![
                CountPoint { date: "2023-02".into(), count: 3 },
                CountPoint { date: "2023-01".into(), count: 1 },
            ],
            views_data: vec![ViewsPoint { date: "2023-01".into(), avg_views: 10.5 }],
            stats,
            ..Default::default()
        });

        let sections = sections(payload.into());
        assert_eq!(
            sections[0],
            Section::StatCards {
                cards: vec![StatCard { label: "Total Videos".into(), value: "1.500".into() }]
            }
        );
        let Section::Chart(chart) = &sections[1] else {
            panic!("expected chart");
        };
        assert_eq!(chart.kind, ChartKind::Area);
        assert_eq!(chart.series[1].axis, Axis::Right);
        assert_eq!(chart.points[0].category, "2023-01");
        assert_eq!(chart.points[0].values, vec![Some(1.0), Some(10.5)]);
        assert_eq!(chart.points[1].values, vec![Some(3.0), None]);
    }

    #[test]
    fn test_small_pie_slices_lose_their_label() {
        let payload = Visualization::Distribution(DistributionPayload {
            title: "D".into(),
            perspective_distribution: vec![NameValue::new("izquierda", 98.0), NameValue::new("centro", 2.0)],
            ..Default::default()
        });
        let sections = sections(payload.into());
        let Section::Chart(pie) = &sections[0] else {
            panic!("expected pie");
        };
        assert_eq!(pie.points[0].label.as_deref(), Some("izquierda 98%"));
        assert_eq!(pie.points[1].label, None);
        assert_eq!(pie.points[1].values, vec![Some(2.0)]);
    }

    #[test]
    fn test_empty_slots_become_no_data() {
        let payload = Visualization::Comparison(ComparisonPayload {
            title: "C".into(),
            follower_comparison: vec![NameValue::new("ana", 10.0)],
            ..Default::default()
        });
        let sections = sections(payload.into());
        assert_eq!(sections.len(), 4);
        assert!(matches!(sections[0], Section::Chart(_)));
        assert!(sections[1..].iter().all(|s| matches!(s, Section::NoData { .. })));
    }

    #[test]
    fn test_sentiment_has_chart_and_table() {
        let payload = Visualization::Sentiment(SentimentPayload {
            title: "S".into(),
            by_user: vec![UserSentiment {
                username: "ana".into(),
                avg_sentiment: 0.5,
                positive_total: 3,
                negative_total: 1,
                videos_analyzed: 2,
            }],
            ..Default::default()
        });
        let sections = sections(payload.into());
        assert!(matches!(sections[0], Section::Chart(_)));
        let Section::Table(table) = &sections[1] else {
            panic!("expected table");
        };
        assert_eq!(table.rows[0], vec!["ana", "0,5", "3", "1", "2"]);
        assert!(matches!(&sections[2], Section::NoData { slot, .. } if slot == "videos"));
    }

    #[test]
    fn test_sentiment_rows_per_video_without_users() {
        let payload = Visualization::Sentiment(SentimentPayload {
            title: "S".into(),
            data: vec![SentimentScore {
                username: "ana".into(),
                url: Some("https://t/1".into()),
                positive_words: 2,
                negative_words: 1,
                sentiment_ratio: 0.33,
            }],
            ..Default::default()
        });
        let view = render(&payload.into(), &RenderOptions::default());
        assert!(matches!(&view.sections[0], Section::NoData { slot, .. } if slot == "by_user"));
        let Section::Table(table) = &view.sections[2] else {
            panic!("expected per-video table");
        };
        assert_eq!(table.rows[0], vec!["ana", "https://t/1", "2", "1", "0,33"]);
        assert!(view.to_string().contains("https://t/1"));
    }

    #[test]
    fn test_summary_sub_charts_follow_their_type() {
        let payload = Visualization::Summary(SummaryPayload {
            title: "R".into(),
            charts: vec![
                SubChart {
                    id: "timeline_line".into(),
                    chart_type: SubChartType::Line,
                    title: "Línea".into(),
                    data: vec![NameValue::new("2023-01", 4.0)],
                },
                SubChart {
                    id: "themes_bar".into(),
                    chart_type: SubChartType::Bar,
                    title: "Temas".into(),
                    data: vec![],
                },
            ],
            ..Default::default()
        });
        let sections = sections(payload.into());
        let Section::Chart(line) = &sections[0] else {
            panic!("expected line");
        };
        assert_eq!(line.kind, ChartKind::Line);
        assert!(matches!(&sections[1], Section::NoData { slot, .. } if slot == "themes_bar"));
    }

    #[test]
    fn test_failure_and_unsupported() {
        let failure = VisualizationFailure {
            kind: Some("time_series".into()),
            title: "Error al Generar Visualización (time_series)".into(),
            error: "sin fechas".into(),
            suggestion: None,
            filter_info: None,
        };
        let view = render(&failure.into(), &RenderOptions::default());
        assert_eq!(view.title, "Error al Generar Visualización (time_series)");
        assert!(matches!(&view.sections[0], Section::Error { message, .. } if message == "sin fechas"));

        let unknown: VisualizationPayload =
            serde_json::from_value(json!({"type": "sunburst", "title": "Sol"})).unwrap();
        let view = render(&unknown, &RenderOptions::default());
        assert_eq!(view.title, "Sol");
        assert_eq!(
            view.sections,
            vec![Section::Unsupported { type_name: Some("sunburst".into()) }]
        );
    }

    #[test]
    fn test_network_is_a_placeholder() {
        let payload = Visualization::Network(NetworkPayload {
            title: "N".into(),
            summary: "Red de 2 usuarios con 1 conexiones basadas en perspectivas políticas".into(),
            ..Default::default()
        });
        let view = render(&payload.into(), &RenderOptions::default());
        assert!(matches!(&view.sections[0], Section::Placeholder { message, .. } if message.starts_with("Red de 2")));
        assert!(view.to_string().contains("Red de 2 usuarios"));
    }
}
