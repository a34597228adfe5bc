use std::fmt;

use serde::{Deserialize, Serialize};

use crate::visualization::StatValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "es-CL")]
    EsCl,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "es-cl" | "es" => Some(Locale::EsCl),
            "en-us" | "en" => Some(Locale::EnUs),
            _ => None,
        }
    }

    /// (group, decimal) separators
    fn separators(&self) -> (char, char) {
        match self {
            Locale::EsCl => ('.', ','),
            Locale::EnUs => (',', '.'),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::EsCl => f.write_str("es-CL"),
            Locale::EnUs => f.write_str("en-US"),
        }
    }
}

/// Groups thousands and keeps at most two decimals, trailing zeros dropped.
pub fn format_number(value: f64, locale: Locale) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let (group, decimal) = locale.separators();
    let rounded = (value.abs() * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if value < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(group);
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push(decimal);
        out.push_str(frac_part);
    }
    out
}

pub fn format_percent(fraction: f64, locale: Locale) -> String {
    let pct = (fraction * 1000.0).round() / 10.0;
    format!("{}%", format_number(pct, locale))
}

pub fn format_stat(value: &StatValue, locale: Locale) -> String {
    match value {
        StatValue::Int(n) => format_number(*n as f64, locale),
        StatValue::Float(n) => format_number(*n, locale),
        StatValue::Text(text) => text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_per_locale() {
        assert_eq!(format_number(1_234_567.5, Locale::EsCl), "1.234.567,5");
        assert_eq!(format_number(1_234_567.5, Locale::EnUs), "1,234,567.5");
        assert_eq!(format_number(999.0, Locale::EsCl), "999");
        assert_eq!(format_number(1000.0, Locale::EnUs), "1,000");
    }

    #[test]
    fn test_decimals_and_sign() {
        assert_eq!(format_number(-0.456, Locale::EnUs), "-0.46");
        assert_eq!(format_number(-0.001, Locale::EnUs), "0");
        assert_eq!(format_number(2.50, Locale::EsCl), "2,5");
        assert_eq!(format_number(f64::NAN, Locale::EsCl), "-");
    }

    #[test]
    fn test_percent_and_stats() {
        assert_eq!(format_percent(0.125, Locale::EsCl), "12,5%");
        assert_eq!(format_stat(&StatValue::Int(12000), Locale::EnUs), "12,000");
        assert_eq!(format_stat(&StatValue::Text("2023-05".into()), Locale::EnUs), "2023-05");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("en_US"), Some(Locale::EnUs));
        assert_eq!(Locale::parse("es-cl"), Some(Locale::EsCl));
        assert_eq!(Locale::parse("fr"), None);
    }
}
