//! Text helpers for post metadata: abbreviated counters and caption limits.

use crate::patterns::COUNTER_NUMBER;

/// Parse a displayed counter such as `"1,234 likes"`, `"12.5K"` or `"3M views"`.
///
/// Thousands separators (`,` or `.`) are dropped unless a `K`/`M` suffix
/// makes the dot a decimal point.
#[must_use]
pub fn parse_counter(text: &str) -> Option<u64> {
    let found = COUNTER_NUMBER.find(text)?;
    let number = found.as_str().trim_end_matches([',', '.']);

    let mut rest = text[found.end()..].trim_start().chars();
    let multiplier = match (rest.next(), rest.next()) {
        (Some('k' | 'K'), next) if !next.is_some_and(char::is_alphabetic) => Some(1_000.0),
        (Some('m' | 'M'), next) if !next.is_some_and(char::is_alphabetic) => Some(1_000_000.0),
        _ => None,
    };

    match multiplier {
        Some(multiplier) => {
            let value: f64 = number.replace(',', "").parse().ok()?;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some((value * multiplier).round() as u64)
        }
        None => number.replace([',', '.'], "").parse().ok(),
    }
}

/// Cut `text` to `limit` characters, marking the cut with `...`.
#[must_use]
pub fn truncate_caption(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
