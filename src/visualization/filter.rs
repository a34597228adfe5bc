//! Narrowing the corpus to what a query is about.
//!
//! Chart-intent vocabulary ("distribución", "gráfico", ...) and stop words are
//! dropped; whatever remains, plus any `@handle`, selects records. Matches in one
//! dataset pull related rows from the others.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::corpus::{Corpus, Creator, Subtitle, Video, Word};

static HANDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\w+)").expect("Invalid regex pattern for handles"));

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+").expect("Invalid regex pattern for tokens"));

const MIN_TERM_CHARS: usize = 3;

const IGNORED_WORDS: &[&str] = &[
    // Spanish stop words
    "los", "las", "del", "por", "para", "con", "que", "qué", "cómo", "como", "una", "uno", "unos",
    "unas", "sobre", "entre", "cada", "más", "mas", "muy", "son", "hay", "sus", "este", "esta",
    "estos", "estas", "ese", "esa", "cual", "cuál", "cuales", "cuáles", "cuantos", "cuántos",
    "cuantas", "cuántas", "donde", "dónde", "quien", "quién", "quienes", "quiénes", "todo", "todos",
    "todas", "les", "nos", "mis", "tus", "han", "ser", "está", "están", "tiene", "tienen", "según",
    "hacia", "desde", "hasta", "durante", "sin", "pero", "también", "solo", "sólo",
    // English stop words
    "the", "and", "for", "with", "what", "how", "which", "who", "are", "from", "about", "into",
    "all", "per", "this", "that", "these", "those", "show", "give",
    // Requests and chart vocabulary
    "muestra", "muéstrame", "muestrame", "mostrar", "dame", "quiero", "ver", "genera", "generar",
    "crea", "crear", "haz", "hacer", "gráfico", "grafico", "gráficos", "graficos", "gráfica",
    "grafica", "visualización", "visualizacion", "visualiza", "visualizar", "chart", "graph", "plot",
    "resumen", "summary", "general", "datos", "data", "información", "informacion", "análisis",
    "analisis", "analiza", "analizar", "estadísticas", "estadisticas",
    "tiempo", "temporal", "evolución", "evolucion", "tendencia", "tendencias", "mensual", "time",
    "trend", "trends", "comparar", "compara", "comparación", "comparacion", "comparativa",
    "versus", "diferencia", "diferencias", "compare", "comparison", "distribución", "distribucion",
    "distribuciones", "histograma", "distribution", "red", "redes", "conexión", "conexion",
    "conexiones", "relación", "relacion", "relaciones", "network", "sentimiento", "sentimientos",
    "emoción", "emocion", "emociones", "sentiment",
    // Dataset nouns
    "video", "videos", "cuenta", "cuentas", "creador", "creadores", "usuario", "usuarios",
    "palabra", "palabras", "subtítulo", "subtítulos", "subtitulos", "seguidores", "vistas",
    "visualizaciones", "tiktok",
];

/// Terms and handles a query narrows the corpus by.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFocus {
    pub terms: Vec<String>,
    pub usernames: Vec<String>,
}

impl QueryFocus {
    pub fn from_query(query: &str) -> Self {
        let usernames: Vec<String> = HANDLE
            .captures_iter(query)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_lowercase()))
            .collect();
        let without_handles = HANDLE.replace_all(query, " ").to_lowercase();

        let mut terms: Vec<String> = Vec::new();
        for token in TOKEN.find_iter(&without_handles) {
            let token = token.as_str();
            if token.chars().count() < MIN_TERM_CHARS
                || token.chars().all(|c| c.is_ascii_digit())
                || IGNORED_WORDS.contains(&token)
            {
                continue;
            }
            if !terms.iter().any(|t| t == token) {
                terms.push(token.to_string());
            }
        }

        Self { terms, usernames }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.usernames.is_empty()
    }

    fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.terms.iter().any(|term| text.contains(term.as_str()))
    }

    fn names_user(&self, username: &str) -> bool {
        self.usernames.iter().any(|u| u.eq_ignore_ascii_case(username))
    }
}

/// Borrowed subset of the corpus handed to chart generators.
#[derive(Debug, Clone, Default)]
pub struct CorpusView<'a> {
    pub creators: Vec<&'a Creator>,
    pub videos: Vec<&'a Video>,
    pub words: Vec<&'a Word>,
    pub subtitles: Vec<&'a Subtitle>,
}

impl<'a> CorpusView<'a> {
    pub fn full(corpus: &'a Corpus) -> Self {
        Self {
            creators: corpus.creators.rows.iter().collect(),
            videos: corpus.videos.rows.iter().collect(),
            words: corpus.words.rows.iter().collect(),
            subtitles: corpus.subtitles.rows.iter().collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.creators.len() + self.videos.len() + self.words.len() + self.subtitles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Applies `focus`; an empty focus returns the full corpus.
    pub fn focused(corpus: &'a Corpus, focus: &QueryFocus) -> Self {
        if focus.is_empty() {
            return Self::full(corpus);
        }

        let creators: Vec<&Creator> = corpus
            .creators
            .rows
            .iter()
            .filter(|c| {
                focus.names_user(&c.username)
                    || focus.matches(&c.username)
                    || focus.matches(c.perspective.as_str())
                    || focus.matches(&c.themes)
            })
            .collect();
        let matched_users: HashSet<String> =
            creators.iter().map(|c| c.username.to_lowercase()).collect();
        let is_matched_user = |username: &str| {
            focus.names_user(username) || matched_users.contains(&username.to_lowercase())
        };

        let words: Vec<&Word> = corpus
            .words
            .rows
            .iter()
            .filter(|w| focus.matches(&w.word) || focus.matches(&w.family_1))
            .collect();
        let matched_words: Vec<String> = words.iter().map(|w| w.word.to_lowercase()).collect();

        let subtitles: Vec<&Subtitle> = corpus
            .subtitles
            .rows
            .iter()
            .filter(|s| {
                if is_matched_user(&s.username) || focus.matches(&s.subtitles) {
                    return true;
                }
                let text = s.subtitles.to_lowercase();
                TOKEN
                    .find_iter(&text)
                    .any(|token| matched_words.iter().any(|w| w == token.as_str()))
            })
            .collect();
        let subtitle_urls: HashSet<&str> = subtitles
            .iter()
            .map(|s| s.url.as_str())
            .filter(|url| !url.is_empty())
            .collect();

        let videos: Vec<&Video> = corpus
            .videos
            .rows
            .iter()
            .filter(|v| {
                is_matched_user(&v.username)
                    || focus.matches(&v.full_title)
                    || focus.matches(&v.url)
                    || subtitle_urls.contains(v.url.as_str())
            })
            .collect();

        Self {
            creators,
            videos,
            words,
            subtitles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Perspective, SentimentLabel};

    fn corpus() -> Corpus {
        let creator = |username: &str, perspective, themes: &str| Creator {
            username: username.into(),
            perspective,
            followers_text: "1K".into(),
            followers: 1000,
            age: None,
            themes: themes.into(),
        };
        let video = |username: &str, url: &str, title: &str| Video {
            url: url.into(),
            title: title.into(),
            full_title: title.into(),
            username: username.into(),
            views: 10,
            followers: 1000,
            engagement_rate: 1.0,
            duration: None,
            date: None,
        };
        Corpus::from_rows(
            vec![
                creator("ana", Perspective::Izquierda, "feminismo"),
                creator("beto", Perspective::Derecha, "economía"),
            ],
            vec![
                video("ana", "u1", "Marcha 8M"),
                video("beto", "u2", "Impuestos"),
                video("carla", "u3", "Clase de historia"),
            ],
            vec![Word {
                word: "libertad".into(),
                frequency: 3,
                sentiment_score: 1.0,
                sentiment_label: SentimentLabel::Positive,
                family_1: "valores".into(),
                family_2: "Sin clasificar".into(),
                engagement_score: 3.0,
                videos_count: 3,
            }],
            vec![Subtitle {
                username: "carla".into(),
                url: "u3".into(),
                subtitles: "Hablemos de libertad y memoria".into(),
            }],
        )
    }

    #[test]
    fn test_intent_only_query_has_no_focus() {
        assert!(QueryFocus::from_query("distribución de sentimientos").is_empty());
        assert!(QueryFocus::from_query("Muéstrame un gráfico de la evolución temporal").is_empty());
    }

    #[test]
    fn test_handles_and_terms() {
        let focus = QueryFocus::from_query("compara @Ana con feminismo");
        assert_eq!(focus.usernames, vec!["ana"]);
        assert_eq!(focus.terms, vec!["feminismo"]);
    }

    #[test]
    fn test_creator_match_pulls_videos() {
        let corpus = corpus();
        let view = CorpusView::focused(&corpus, &QueryFocus::from_query("feminismo"));
        assert_eq!(view.creators.len(), 1);
        assert_eq!(view.videos.len(), 1);
        assert_eq!(view.videos[0].url, "u1");
    }

    #[test]
    fn test_word_match_pulls_subtitles_and_videos() {
        let corpus = corpus();
        let view = CorpusView::focused(&corpus, &QueryFocus::from_query("libertad"));
        assert_eq!(view.words.len(), 1);
        assert_eq!(view.subtitles.len(), 1);
        assert_eq!(view.videos.len(), 1);
        assert_eq!(view.videos[0].username, "carla");
    }

    #[test]
    fn test_unknown_term_yields_empty_view() {
        let corpus = corpus();
        let view = CorpusView::focused(&corpus, &QueryFocus::from_query("criptomonedas"));
        assert!(view.is_empty());
    }
}
