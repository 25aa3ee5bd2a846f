//! Text clipping and normalisation helpers

/// Clip `text` to at most `max_chars` characters, appending `...` when cut.
///
/// Operates on character boundaries so multi-byte content is never split.
#[must_use]
pub fn clip(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_owned();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Deduplicate strings preserving first-seen order, dropping blanks.
#[must_use]
pub fn dedupe_preserve_order<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for v in values {
        let sv = v.as_ref().trim();
        if sv.is_empty() || !seen.insert(sv.to_owned()) {
            continue;
        }
        out.push(sv.to_owned());
    }
    out
}
