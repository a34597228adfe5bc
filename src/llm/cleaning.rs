use once_cell::sync::Lazy;
use regex::Regex;

static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<think>.*?</think>").expect("Invalid regex pattern for think blocks")
});

static LEADING_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(RESPUESTA:|Según los datos disponibles,?)\s*")
        .expect("Invalid regex pattern for answer prefixes")
});

static TRAILING_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\[(FIN|END)\]\s*$").expect("Invalid regex pattern for answer suffixes")
});

/// Strips reasoning blocks and template scaffolding from a model answer.
pub fn clean_llm_response(raw: &str) -> String {
    let without_thinking = THINK_BLOCK.replace_all(raw, "");
    let trimmed = without_thinking.trim();
    let without_prefix = LEADING_MARKERS.replace_all(trimmed, "");
    let without_suffix = TRAILING_MARKERS.replace(&without_prefix, "");
    without_suffix.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_think_block() {
        let raw = "<think>\nthe user wants counts\n</think>\n\nHay 12 cuentas.";
        assert_eq!(clean_llm_response(raw), "Hay 12 cuentas.");
    }

    #[test]
    fn test_removes_prefixes_and_suffixes() {
        assert_eq!(clean_llm_response("RESPUESTA: Hay 3 videos [FIN]"), "Hay 3 videos");
        assert_eq!(clean_llm_response("Respuesta:   Sí.\n[END]"), "Sí.");
        assert_eq!(
            clean_llm_response("Según los datos disponibles, la derecha domina."),
            "la derecha domina."
        );
    }

    #[test]
    fn test_plain_answer_untouched() {
        assert_eq!(clean_llm_response("  Nada que limpiar  "), "Nada que limpiar");
    }
}
