//! Which datasets does a free-text question touch?

use serde::{Deserialize, Serialize};

use crate::corpus::{Corpus, DatasetKind};

/// Score given to every non-empty dataset when no keyword matched.
pub const DEFAULT_RELEVANCE: f64 = 0.3;

/// Keyword hits needed for a dataset to reach full relevance.
const SATURATION_HITS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceBucket {
    Low,
    Medium,
    High,
}

impl RelevanceBucket {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            RelevanceBucket::High
        } else if score >= 0.4 {
            RelevanceBucket::Medium
        } else {
            RelevanceBucket::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedDataset {
    pub kind: DatasetKind,
    pub score: f64,
}

pub trait RelevanceRanker: Send + Sync {
    /// Non-empty datasets with a positive score, best first.
    fn rank(&self, query: &str, corpus: &Corpus) -> Vec<RankedDataset>;
}

/// Bilingual keyword matching.
pub struct KeywordRanker {
    keywords: Vec<(DatasetKind, Vec<String>)>,
}

impl Default for KeywordRanker {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|w| w.to_string()).collect()
        }

        Self {
            keywords: vec![
                (
                    DatasetKind::Creators,
                    words(&[
                        "cuenta", "creador", "usuario", "perfil", "seguidor", "influencer",
                        "perspectiva", "ideología", "política", "orientación", "biografía",
                        "followers", "creator", "account", "profile", "perspective", "ideology",
                    ]),
                ),
                (
                    DatasetKind::Videos,
                    words(&[
                        "video", "contenido", "publicación", "post", "views", "visualización",
                        "fecha", "tiempo", "temporal", "evolución", "tendencia", "viral",
                        "content", "publication", "date", "time", "trend", "evolution",
                    ]),
                ),
                (
                    DatasetKind::Subtitles,
                    words(&[
                        "subtítulo", "transcripción", "texto", "habla", "dice", "menciona",
                        "palabra", "frase", "discurso", "conversación", "diálogo",
                        "subtitle", "transcription", "text", "speech", "word", "phrase",
                        "dialogue",
                    ]),
                ),
                (
                    DatasetKind::Words,
                    words(&[
                        "palabra", "término", "sentimiento", "emoción", "análisis", "semántico",
                        "significado", "connotación", "polaridad", "positivo", "negativo",
                        "word", "term", "sentiment", "emotion", "meaning", "positive", "negative",
                    ]),
                ),
            ],
        }
    }
}

impl KeywordRanker {
    pub fn new(keywords: Vec<(DatasetKind, Vec<String>)>) -> Self {
        Self { keywords }
    }
}

impl RelevanceRanker for KeywordRanker {
    fn rank(&self, query: &str, corpus: &Corpus) -> Vec<RankedDataset> {
        let query = query.to_lowercase();

        let mut ranked: Vec<RankedDataset> = self
            .keywords
            .iter()
            .filter(|(kind, _)| corpus.count(*kind) > 0)
            .filter_map(|(kind, keywords)| {
                let hits = keywords.iter().filter(|k| query.contains(k.as_str())).count();
                (hits > 0).then(|| RankedDataset {
                    kind: *kind,
                    score: (hits as f64 / SATURATION_HITS).min(1.0),
                })
            })
            .collect();

        if ranked.is_empty() {
            ranked = DatasetKind::ALL
                .iter()
                .filter(|kind| corpus.count(**kind) > 0)
                .map(|kind| RankedDataset {
                    kind: *kind,
                    score: DEFAULT_RELEVANCE,
                })
                .collect();
        }

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::models::{Creator, Perspective, SentimentLabel, Word};

    fn corpus() -> Corpus {
        let creators = vec![Creator {
            username: "ana".into(),
            perspective: Perspective::Centro,
            followers_text: "1".into(),
            followers: 1,
            age: None,
            themes: String::new(),
        }];
        let words = vec![Word {
            word: "paz".into(),
            frequency: 1,
            sentiment_score: 1.0,
            sentiment_label: SentimentLabel::Positive,
            family_1: "x".into(),
            family_2: "y".into(),
            engagement_score: 1.0,
            videos_count: 1,
        }];
        Corpus::from_rows(creators, vec![], words, vec![])
    }

    #[test]
    fn test_keyword_hits_rank_datasets() {
        let ranked = KeywordRanker::default().rank(
            "¿Qué sentimiento positivo o negativo domina en cada perfil?",
            &corpus(),
        );
        assert_eq!(ranked[0].kind, DatasetKind::Words);
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[1].kind, DatasetKind::Creators);
        assert!((ranked[1].score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_hits_falls_back_to_default_for_non_empty() {
        let ranked = KeywordRanker::default().rank("hola", &corpus());
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.score == DEFAULT_RELEVANCE));
        assert!(ranked.iter().all(|r| r.kind != DatasetKind::Videos));
    }

    #[test]
    fn test_empty_datasets_never_reported() {
        let ranked = KeywordRanker::default().rank("video viral", &corpus());
        assert!(ranked.iter().all(|r| r.kind != DatasetKind::Videos));
    }

    #[test]
    fn test_buckets() {
        assert_eq!(RelevanceBucket::from_score(0.3), RelevanceBucket::Low);
        assert_eq!(RelevanceBucket::from_score(0.4), RelevanceBucket::Medium);
        assert_eq!(RelevanceBucket::from_score(0.7), RelevanceBucket::High);
    }
}
