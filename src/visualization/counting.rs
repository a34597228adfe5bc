use indexmap::IndexMap;

use super::payload::NameValue;
use crate::corpus::{Creator, Word};

/// Occurrences per label, most frequent first; ties keep first-seen order.
pub fn value_counts<I, S>(items: I) -> Vec<NameValue>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for item in items {
        *counts.entry(item.into()).or_default() += 1;
    }
    let mut pairs: Vec<(String, u64)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    pairs
        .into_iter()
        .map(|(name, count)| NameValue::new(name, count as f64))
        .collect()
}

pub fn top(mut values: Vec<NameValue>, n: usize) -> Vec<NameValue> {
    values.truncate(n);
    values
}

pub fn perspective_counts(creators: &[&Creator]) -> Vec<NameValue> {
    value_counts(creators.iter().map(|c| c.perspective.as_str()))
}

pub fn theme_counts(creators: &[&Creator], n: usize) -> Vec<NameValue> {
    top(value_counts(creators.iter().flat_map(|c| c.theme_list())), n)
}

pub fn top_followers(creators: &[&Creator], n: usize) -> Vec<NameValue> {
    let mut sorted: Vec<&&Creator> = creators.iter().collect();
    sorted.sort_by(|a, b| b.followers.cmp(&a.followers));
    sorted
        .into_iter()
        .take(n)
        .map(|c| NameValue::new(c.username.clone(), c.followers as f64))
        .collect()
}

/// Lexicon entries per sentiment sign, in Negativo/Neutral/Positivo order.
pub fn sentiment_counts(words: &[&Word]) -> Vec<NameValue> {
    use crate::corpus::SentimentLabel::{Negative, Neutral, Positive};

    [Negative, Neutral, Positive]
        .into_iter()
        .map(|label| {
            let n = words.iter().filter(|w| w.sentiment_label == label).count();
            NameValue::new(label.display_name(), n as f64)
        })
        .filter(|nv| nv.value > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_counts_order() {
        let counts = value_counts(vec!["b", "a", "b", "c", "a", "b"]);
        let names: Vec<_> = counts.iter().map(|nv| nv.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(counts[0].value, 3.0);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let counts = value_counts(vec!["x", "y", "z"]);
        let names: Vec<_> = counts.iter().map(|nv| nv.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }
}
