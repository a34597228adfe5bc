//! Lexicon-based sentiment per video and per creator.
//!
//! Each text counts its distinct lexicon words with a positive and a negative
//! score; `ratio = (pos - neg) / (pos + neg)`, 0 when nothing matched. Subtitles
//! are scored when present, otherwise video titles stand in.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::filter::CorpusView;
use super::payload::{SentimentPayload, SentimentScore, UserSentiment, Visualization};
use crate::corpus::Word;

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w+\b").expect("Invalid regex pattern for words"));

const MAX_ROWS: usize = 50;

struct ScoredText<'a> {
    username: &'a str,
    url: &'a str,
    text: &'a str,
}

pub fn generate(view: &CorpusView<'_>, lexicon: &[Word]) -> Result<Visualization, String> {
    let polarity: HashMap<String, f64> = lexicon
        .iter()
        .filter(|w| w.sentiment_score != 0.0)
        .map(|w| (w.word.to_lowercase(), w.sentiment_score))
        .collect();
    if polarity.is_empty() {
        return Err("No hay palabras con sentimiento válidas.".to_string());
    }

    let texts: Vec<ScoredText<'_>> = if !view.subtitles.is_empty() {
        view.subtitles
            .iter()
            .map(|s| ScoredText {
                username: &s.username,
                url: &s.url,
                text: &s.subtitles,
            })
            .collect()
    } else {
        view.videos
            .iter()
            .filter(|v| !v.full_title.is_empty())
            .map(|v| ScoredText {
                username: &v.username,
                url: &v.url,
                text: &v.full_title,
            })
            .collect()
    };
    if texts.is_empty() {
        return Err("No hay subtítulos válidos para analizar.".to_string());
    }

    let mut scores: Vec<SentimentScore> = Vec::with_capacity(texts.len());
    let mut by_user: IndexMap<&str, UserSentiment> = IndexMap::new();

    for text in &texts {
        let lowered = text.text.to_lowercase();
        let distinct: HashSet<&str> = WORD.find_iter(&lowered).map(|m| m.as_str()).collect();
        let (mut positive, mut negative) = (0u64, 0u64);
        for word in distinct {
            match polarity.get(word) {
                Some(score) if *score > 0.0 => positive += 1,
                Some(score) if *score < 0.0 => negative += 1,
                _ => {}
            }
        }

        scores.push(SentimentScore {
            username: text.username.to_string(),
            url: (!text.url.is_empty()).then(|| text.url.to_string()),
            positive_words: positive,
            negative_words: negative,
            sentiment_ratio: ratio(positive, negative),
        });

        let user = by_user.entry(text.username).or_insert_with(|| UserSentiment {
            username: text.username.to_string(),
            avg_sentiment: 0.0,
            positive_total: 0,
            negative_total: 0,
            videos_analyzed: 0,
        });
        user.positive_total += positive;
        user.negative_total += negative;
        user.videos_analyzed += 1;
    }

    let mut by_user: Vec<UserSentiment> = by_user
        .into_values()
        .map(|mut user| {
            user.avg_sentiment = ratio(user.positive_total, user.negative_total);
            user
        })
        .collect();
    by_user.sort_by(|a, b| {
        b.avg_sentiment
            .partial_cmp(&a.avg_sentiment)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    scores.sort_by(|a, b| {
        b.sentiment_ratio
            .partial_cmp(&a.sentiment_ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scores.truncate(MAX_ROWS);

    Ok(Visualization::Sentiment(SentimentPayload {
        title: "Análisis de Sentimiento".to_string(),
        data: scores,
        by_user,
        ..Default::default()
    }))
}

fn ratio(positive: u64, negative: u64) -> f64 {
    let total = positive + negative;
    if total == 0 {
        0.0
    } else {
        (positive as f64 - negative as f64) / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{SentimentLabel, Subtitle, Video};

    fn word(word: &str, score: f64) -> Word {
        Word {
            word: word.into(),
            frequency: 1,
            sentiment_score: score,
            sentiment_label: SentimentLabel::from_score(score),
            family_1: "x".into(),
            family_2: "y".into(),
            engagement_score: score.abs(),
            videos_count: 1,
        }
    }

    fn lexicon() -> Vec<Word> {
        vec![word("esperanza", 1.0), word("alegría", 1.0), word("miedo", -1.0), word("mesa", 0.0)]
    }

    #[test]
    fn test_distinct_words_are_counted_once() {
        let subtitles = vec![
            Subtitle {
                username: "ana".into(),
                url: "u1".into(),
                subtitles: "Esperanza, esperanza y alegría pese al miedo".into(),
            },
            Subtitle {
                username: "beto".into(),
                url: "u2".into(),
                subtitles: "Miedo en la mesa".into(),
            },
        ];
        let view = CorpusView {
            subtitles: subtitles.iter().collect(),
            ..Default::default()
        };

        let Visualization::Sentiment(payload) = generate(&view, &lexicon()).unwrap() else {
            panic!("expected sentiment");
        };
        assert_eq!(payload.data[0].username, "ana");
        assert_eq!(payload.data[0].positive_words, 2);
        assert_eq!(payload.data[0].negative_words, 1);
        assert!((payload.data[0].sentiment_ratio - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(payload.by_user.len(), 2);
        assert_eq!(payload.by_user[1].username, "beto");
        assert_eq!(payload.by_user[1].avg_sentiment, -1.0);
    }

    #[test]
    fn test_titles_stand_in_for_missing_subtitles() {
        let videos = vec![Video {
            url: "u9".into(),
            title: "Mucha esperanza".into(),
            full_title: "Mucha esperanza".into(),
            username: "carla".into(),
            views: 1,
            followers: 1,
            engagement_rate: 100.0,
            duration: None,
            date: None,
        }];
        let view = CorpusView {
            videos: videos.iter().collect(),
            ..Default::default()
        };
        let Visualization::Sentiment(payload) = generate(&view, &lexicon()).unwrap() else {
            panic!("expected sentiment");
        };
        assert_eq!(payload.by_user[0].username, "carla");
        assert_eq!(payload.by_user[0].avg_sentiment, 1.0);
    }

    #[test]
    fn test_missing_lexicon_is_an_error() {
        assert!(generate(&CorpusView::default(), &[]).is_err());
    }
}
