use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    Izquierda,
    Derecha,
    Centro,
    Periodista,
    Unclassified,
}

impl Perspective {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "izquierda" => Perspective::Izquierda,
            "derecha" => Perspective::Derecha,
            "centro" | "central" => Perspective::Centro,
            "periodista" => Perspective::Periodista,
            _ => Perspective::Unclassified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Perspective::Izquierda => "izquierda",
            Perspective::Derecha => "derecha",
            Perspective::Centro => "centro",
            Perspective::Periodista => "periodista",
            Perspective::Unclassified => "unclassified",
        }
    }

    /// Node colour used by the network chart.
    pub fn color(&self) -> &'static str {
        match self {
            Perspective::Izquierda => "#ef4444",
            Perspective::Derecha => "#3b82f6",
            Perspective::Centro => "#10b981",
            Perspective::Periodista => "#f59e0b",
            Perspective::Unclassified => "#6b7280",
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "positive" | "positivo" => Some(SentimentLabel::Positive),
            "negative" | "negativo" => Some(SentimentLabel::Negative),
            "neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }

    /// Spanish label used in chart data.
    pub fn display_name(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positivo",
            SentimentLabel::Negative => "Negativo",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub username: String,
    pub perspective: Perspective,
    /// Follower count as written in the source, e.g. `56.1K`
    pub followers_text: String,
    pub followers: u64,
    pub age: Option<String>,
    pub themes: String,
}

impl Creator {
    pub fn theme_list(&self) -> impl Iterator<Item = &str> {
        self.themes
            .split(',')
            .map(str::trim)
            .filter(|theme| !theme.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub url: String,
    /// Display title, shortened to 100 characters
    pub title: String,
    pub full_title: String,
    pub username: String,
    pub views: u64,
    pub followers: u64,
    pub engagement_rate: f64,
    pub duration: Option<f64>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub frequency: u64,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub family_1: String,
    pub family_2: String,
    pub engagement_score: f64,
    pub videos_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtitle {
    pub username: String,
    pub url: String,
    pub subtitles: String,
}
