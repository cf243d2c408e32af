//! Text helpers shared by every SEO strategy.

pub const TITLE_MAX_CHARS: usize = 70;
pub const DESCRIPTION_MAX_CHARS: usize = 160;
pub const BODY_MIN_WORDS: usize = 120;
pub const BODY_MAX_WORDS: usize = 300;

const ELLIPSIS: char = '…';

/// Bound `text` to `max` characters, ending with an ellipsis when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let head: String = text.chars().take(max - 1).collect();
    let mut out = head.trim().to_string();
    out.push(ELLIPSIS);
    out
}

/// Uppercase the first letter of every word longer than one character.
///
/// Single-letter connectors such as `y` or `e` are left untouched.
pub fn safe_title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            if word.chars().count() <= 1 {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"Comuna, Region"`, either part alone, or `None` when both are blank.
pub fn location_label(comuna: Option<&str>, region: Option<&str>) -> Option<String> {
    let parts: Vec<String> = [comuna, region]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(safe_title_case)
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Join paragraphs and force the result into `[min, max]` words.
///
/// A body under `min` gets `filler` appended once; anything over `max` is cut
/// at a word boundary.
pub fn fit_word_count(paragraphs: &[String], filler: &str, min: usize, max: usize) -> String {
    let mut body = paragraphs
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if word_count(&body) < min && word_count(filler) > 0 {
        if !body.is_empty() {
            body.push(' ');
        }
        body.push_str(filler.trim());
    }

    if word_count(&body) > max {
        body = body.split_whitespace().take(max).collect::<Vec<_>>().join(" ");
    }

    body
}

/// Format whole pesos as `$12.000`.
pub fn format_clp(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Comma-separated list terminated by a period, e.g. `"A, B, C."`.
pub fn sentence_list(items: &[&str]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(format!("{}.", items.join(", ")))
    }
}
