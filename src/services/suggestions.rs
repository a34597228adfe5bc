use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::corpus::Word;

pub const DEFAULT_SUGGESTIONS: usize = 10;
pub const MAX_SUGGESTIONS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionCount {
    pub text: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    pub suggestions: Vec<String>,
    pub suggestions_with_counts: Vec<SuggestionCount>,
}

/// Lexicon words for search-as-you-type: prefix matches before substring
/// matches, each group by frequency.
pub fn word_suggestions(words: &[Word], query: &str, limit: usize) -> Suggestions {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Suggestions::default();
    }
    let limit = limit.clamp(1, MAX_SUGGESTIONS);

    let mut prefixed: Vec<&Word> = Vec::new();
    let mut containing: Vec<&Word> = Vec::new();
    for word in words {
        let lowered = word.word.to_lowercase();
        if lowered.starts_with(&needle) {
            prefixed.push(word);
        } else if lowered.contains(&needle) {
            containing.push(word);
        }
    }
    prefixed.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    containing.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    let mut seen = HashSet::new();
    let picked: Vec<SuggestionCount> = prefixed
        .into_iter()
        .chain(containing)
        .filter(|w| seen.insert(w.word.to_lowercase()))
        .take(limit)
        .map(|w| SuggestionCount {
            text: w.word.clone(),
            count: w.frequency,
        })
        .collect();

    Suggestions {
        suggestions: picked.iter().map(|s| s.text.clone()).collect(),
        suggestions_with_counts: picked,
    }
}
