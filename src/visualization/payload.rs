//! Wire types for chart payloads.
//!
//! A payload is either one of six chart shapes, tagged by `type`, or a
//! failure object carrying `error`. Clients decoding a payload they do not
//! understand land in [`VisualizationPayload::Unsupported`] instead of failing.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationKind {
    TimeSeries,
    Comparison,
    Distribution,
    Sentiment,
    Summary,
    Network,
}

impl VisualizationKind {
    pub const ALL: [VisualizationKind; 6] = [
        VisualizationKind::TimeSeries,
        VisualizationKind::Comparison,
        VisualizationKind::Distribution,
        VisualizationKind::Sentiment,
        VisualizationKind::Summary,
        VisualizationKind::Network,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualizationKind::TimeSeries => "time_series",
            VisualizationKind::Comparison => "comparison",
            VisualizationKind::Distribution => "distribution",
            VisualizationKind::Sentiment => "sentiment",
            VisualizationKind::Summary => "summary",
            VisualizationKind::Network => "network",
        }
    }
}

impl fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: f64,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Text(String),
}

pub type Stats = IndexMap<String, StatValue>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterInfo {
    pub filtered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_records: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountPoint {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewsPoint {
    pub date: String,
    pub avg_views: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSeriesPayload {
    pub title: String,
    pub data: Vec<CountPoint>,
    pub views_data: Vec<ViewsPoint>,
    pub stats: Stats,
    pub filter_info: FilterInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewsComparison {
    pub username: String,
    pub avg_views: f64,
    pub total_videos: u64,
    pub total_views: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonPayload {
    pub title: String,
    pub follower_comparison: Vec<NameValue>,
    pub perspective_comparison: Vec<NameValue>,
    pub theme_comparison: Vec<NameValue>,
    pub views_comparison: Vec<ViewsComparison>,
    pub filter_info: FilterInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionPayload {
    pub title: String,
    pub perspective_distribution: Vec<NameValue>,
    pub age_distribution: Vec<NameValue>,
    pub theme_distribution: Vec<NameValue>,
    pub views_distribution: Vec<NameValue>,
    pub sentiment_distribution: Vec<NameValue>,
    pub filter_info: FilterInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub positive_words: u64,
    pub negative_words: u64,
    pub sentiment_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSentiment {
    pub username: String,
    pub avg_sentiment: f64,
    #[serde(default)]
    pub positive_total: u64,
    #[serde(default)]
    pub negative_total: u64,
    #[serde(default)]
    pub videos_analyzed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentPayload {
    pub title: String,
    pub data: Vec<SentimentScore>,
    pub by_user: Vec<UserSentiment>,
    pub filter_info: FilterInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubChartType {
    Bar,
    Line,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubChart {
    pub id: String,
    #[serde(rename = "type")]
    pub chart_type: SubChartType,
    pub title: String,
    #[serde(default)]
    pub data: Vec<NameValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPayload {
    pub title: String,
    pub stats: Stats,
    pub charts: Vec<SubChart>,
    pub filter_info: FilterInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    pub label: String,
    pub group: String,
    pub size: u64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLink {
    pub source: String,
    pub target: String,
    pub strength: u32,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPayload {
    pub title: String,
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
    pub summary: String,
    pub filter_info: FilterInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Visualization {
    TimeSeries(TimeSeriesPayload),
    Comparison(ComparisonPayload),
    Distribution(DistributionPayload),
    Sentiment(SentimentPayload),
    Summary(SummaryPayload),
    Network(NetworkPayload),
}

impl Visualization {
    pub fn kind(&self) -> VisualizationKind {
        match self {
            Visualization::TimeSeries(_) => VisualizationKind::TimeSeries,
            Visualization::Comparison(_) => VisualizationKind::Comparison,
            Visualization::Distribution(_) => VisualizationKind::Distribution,
            Visualization::Sentiment(_) => VisualizationKind::Sentiment,
            Visualization::Summary(_) => VisualizationKind::Summary,
            Visualization::Network(_) => VisualizationKind::Network,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Visualization::TimeSeries(p) => &p.title,
            Visualization::Comparison(p) => &p.title,
            Visualization::Distribution(p) => &p.title,
            Visualization::Sentiment(p) => &p.title,
            Visualization::Summary(p) => &p.title,
            Visualization::Network(p) => &p.title,
        }
    }

    pub(crate) fn decorate(&mut self, suffix: &str, info: FilterInfo) {
        fn apply(title: &mut String, filter_info: &mut FilterInfo, suffix: &str, info: FilterInfo) {
            title.push_str(suffix);
            *filter_info = info;
        }

        match self {
            Visualization::TimeSeries(p) => apply(&mut p.title, &mut p.filter_info, suffix, info),
            Visualization::Comparison(p) => apply(&mut p.title, &mut p.filter_info, suffix, info),
            Visualization::Distribution(p) => apply(&mut p.title, &mut p.filter_info, suffix, info),
            Visualization::Sentiment(p) => apply(&mut p.title, &mut p.filter_info, suffix, info),
            Visualization::Summary(p) => apply(&mut p.title, &mut p.filter_info, suffix, info),
            Visualization::Network(p) => apply(&mut p.title, &mut p.filter_info, suffix, info),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationFailure {
    /// Requested chart kind, when one was resolved
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_info: Option<FilterInfo>,
}

/// Everything a `visualize` call can hand back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisualizationPayload {
    Failed(VisualizationFailure),
    Chart(Visualization),
    /// Any JSON this build does not recognise; never produced by the server
    Unsupported(Value),
}

impl VisualizationPayload {
    pub fn error(&self) -> Option<&str> {
        match self {
            VisualizationPayload::Failed(failure) => Some(&failure.error),
            _ => None,
        }
    }

    pub fn chart(&self) -> Option<&Visualization> {
        match self {
            VisualizationPayload::Chart(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            VisualizationPayload::Chart(chart) => Some(chart.kind().as_str()),
            VisualizationPayload::Failed(failure) => failure.kind.as_deref(),
            VisualizationPayload::Unsupported(value) => value.get("type").and_then(Value::as_str),
        }
    }
}

impl From<Visualization> for VisualizationPayload {
    fn from(chart: Visualization) -> Self {
        VisualizationPayload::Chart(chart)
    }
}

impl From<VisualizationFailure> for VisualizationPayload {
    fn from(failure: VisualizationFailure) -> Self {
        VisualizationPayload::Failed(failure)
    }
}
