//! Paginated, searchable, sortable listings over corpus rows.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::models::{Creator, SentimentLabel, Video, Word};
use crate::errors::{DataSetError, DataSetResult};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub filter_by: Option<String>,
    pub filter_value: Option<String>,
    /// Shorthand for `filter_by=username` on videos
    pub creator: Option<String>,
    /// Shorthand for `filter_by=sentiment` on words
    pub sentiment: Option<String>,
}

impl ListParams {
    pub fn filters(&self) -> Vec<(String, String)> {
        let mut filters = Vec::new();
        if let (Some(field), Some(value)) = (non_blank(&self.filter_by), non_blank(&self.filter_value)) {
            filters.push((field.to_lowercase(), value.to_string()));
        }
        if let Some(creator) = non_blank(&self.creator) {
            filters.push(("username".to_string(), creator.to_string()));
        }
        if let Some(sentiment) = non_blank(&self.sentiment) {
            filters.push(("sentiment".to_string(), sentiment.to_string()));
        }
        filters
    }

    pub fn validate(&self) -> DataSetResult<()> {
        match non_blank(&self.sort_order).map(str::to_lowercase).as_deref() {
            None | Some("asc") | Some("desc") => Ok(()),
            Some(other) => Err(DataSetError::InvalidQuery(format!(
                "sort_order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }

    fn descending(&self) -> bool {
        !matches!(
            non_blank(&self.sort_order).map(str::to_lowercase).as_deref(),
            Some("asc")
        )
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
    Missing,
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortValue::Text(a), SortValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
            (SortValue::Missing, _) => Ordering::Less,
            (_, SortValue::Missing) => Ordering::Greater,
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// Row types that can be served through [`list`].
pub trait Listable: Clone {
    const DEFAULT_SORT: &'static str;
    const SORT_FIELDS: &'static [&'static str];

    /// `needle` is already lower-cased.
    fn matches_search(&self, needle: &str) -> bool;

    /// `None` when `field` is not filterable for this row type.
    fn matches_filter(&self, field: &str, value: &str) -> Option<bool>;

    fn sort_value(&self, field: &str) -> SortValue;
}

pub fn list<T: Listable>(rows: &[T], params: &ListParams) -> Page<T> {
    let needle = non_blank(&params.search).map(str::to_lowercase);
    let filters = params.filters();

    let mut matched: Vec<&T> = rows
        .iter()
        .filter(|row| needle.as_deref().map_or(true, |n| row.matches_search(n)))
        .filter(|row| {
            filters
                .iter()
                .all(|(field, value)| row.matches_filter(field, value).unwrap_or(true))
        })
        .collect();

    let sort_field = non_blank(&params.sort_by)
        .map(str::to_lowercase)
        .filter(|field| T::SORT_FIELDS.contains(&field.as_str()))
        .unwrap_or_else(|| T::DEFAULT_SORT.to_string());
    let descending = params.descending();

    // sort_by is stable, so ties keep file order in both directions
    matched.sort_by(|a, b| {
        let ordering = a.sort_value(&sort_field).compare(&b.sort_value(&sort_field));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = params.page.unwrap_or(1).max(1);
    let total = matched.len();
    let pages = total.div_ceil(limit);

    let rows = matched
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .cloned()
        .collect();

    Page {
        rows,
        pagination: Pagination {
            page,
            limit,
            total,
            pages,
        },
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl Listable for Creator {
    const DEFAULT_SORT: &'static str = "followers";
    const SORT_FIELDS: &'static [&'static str] =
        &["followers", "username", "perspective", "age", "themes"];

    fn matches_search(&self, needle: &str) -> bool {
        contains(&self.username, needle)
            || contains(self.perspective.as_str(), needle)
            || contains(&self.themes, needle)
    }

    fn matches_filter(&self, field: &str, value: &str) -> Option<bool> {
        match field {
            "perspective" => Some(self.perspective.as_str().eq_ignore_ascii_case(value.trim())),
            "age" => Some(
                self.age
                    .as_deref()
                    .is_some_and(|age| age.eq_ignore_ascii_case(value.trim())),
            ),
            "username" => Some(self.username.eq_ignore_ascii_case(value.trim())),
            _ => None,
        }
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "followers" => SortValue::Number(self.followers as f64),
            "username" => SortValue::Text(self.username.clone()),
            "perspective" => SortValue::Text(self.perspective.as_str().to_string()),
            "age" => self
                .age
                .clone()
                .map(SortValue::Text)
                .unwrap_or(SortValue::Missing),
            "themes" => SortValue::Text(self.themes.clone()),
            _ => SortValue::Missing,
        }
    }
}

impl Listable for Video {
    const DEFAULT_SORT: &'static str = "views";
    const SORT_FIELDS: &'static [&'static str] = &[
        "views",
        "engagement_rate",
        "followers",
        "date",
        "username",
        "title",
        "duration",
    ];

    fn matches_search(&self, needle: &str) -> bool {
        contains(&self.username, needle) || contains(&self.full_title, needle)
    }

    fn matches_filter(&self, field: &str, value: &str) -> Option<bool> {
        match field {
            "creator" | "username" => Some(self.username.eq_ignore_ascii_case(value.trim())),
            _ => None,
        }
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "views" => SortValue::Number(self.views as f64),
            "engagement_rate" => SortValue::Number(self.engagement_rate),
            "followers" => SortValue::Number(self.followers as f64),
            "date" => self
                .date
                .map(|d| SortValue::Text(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(SortValue::Missing),
            "username" => SortValue::Text(self.username.clone()),
            "title" => SortValue::Text(self.full_title.clone()),
            "duration" => self.duration.map(SortValue::Number).unwrap_or(SortValue::Missing),
            _ => SortValue::Missing,
        }
    }
}

impl Listable for Word {
    const DEFAULT_SORT: &'static str = "frequency";
    const SORT_FIELDS: &'static [&'static str] = &[
        "frequency",
        "word",
        "sentiment_score",
        "engagement_score",
        "videos_count",
        "family_1",
        "family_2",
    ];

    fn matches_search(&self, needle: &str) -> bool {
        contains(&self.word, needle) || contains(&self.family_1, needle) || contains(&self.family_2, needle)
    }

    fn matches_filter(&self, field: &str, value: &str) -> Option<bool> {
        match field {
            "sentiment" | "sentiment_label" => {
                Some(SentimentLabel::parse(value) == Some(self.sentiment_label))
            }
            "family" => Some(
                self.family_1.eq_ignore_ascii_case(value.trim())
                    || self.family_2.eq_ignore_ascii_case(value.trim()),
            ),
            "family_1" => Some(self.family_1.eq_ignore_ascii_case(value.trim())),
            "family_2" => Some(self.family_2.eq_ignore_ascii_case(value.trim())),
            _ => None,
        }
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "frequency" => SortValue::Number(self.frequency as f64),
            "word" => SortValue::Text(self.word.clone()),
            "sentiment_score" => SortValue::Number(self.sentiment_score),
            "engagement_score" => SortValue::Number(self.engagement_score),
            "videos_count" => SortValue::Number(self.videos_count as f64),
            "family_1" => SortValue::Text(self.family_1.clone()),
            "family_2" => SortValue::Text(self.family_2.clone()),
            _ => SortValue::Missing,
        }
    }
}
