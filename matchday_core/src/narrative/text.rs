//! Sentence assembly and length bounding.

/// Ellipsis appended by [`truncate_text`].
pub const ELLIPSIS: char = '…';

/// Join the parts of a narrative into one sentence.
///
/// `"{opener}, {core} {temporal}, {qualifier}."`, with absent parts left out.
pub fn assemble(
    opener: Option<&str>,
    core: &str,
    temporal: Option<&str>,
    qualifier: Option<&str>,
) -> String {
    let mut text = String::new();
    if let Some(opener) = opener.map(str::trim).filter(|s| !s.is_empty()) {
        text.push_str(opener);
        text.push_str(", ");
    }
    text.push_str(core.trim());
    if let Some(temporal) = temporal.map(str::trim).filter(|s| !s.is_empty()) {
        text.push(' ');
        text.push_str(temporal);
    }
    if let Some(qualifier) = qualifier.map(str::trim).filter(|s| !s.is_empty()) {
        text.push_str(", ");
        text.push_str(qualifier);
    }
    if !text.ends_with(['.', '!', '?']) {
        text.push('.');
    }
    text
}

/// Bound `text` to `max_chars` characters.
///
/// Longer text is cut and ends in [`ELLIPSIS`]. The cut falls on a word
/// boundary when that keeps at least two thirds of the bound.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let kept: String = text.chars().take(max_chars - 1).collect();
    let min_keep = max_chars * 2 / 3;

    let cut = match kept.rfind(' ') {
        Some(index) if kept[..index].chars().count() >= min_keep => {
            kept[..index].trim_end_matches([',', ';', ':', '-', '–', ' '])
        }
        _ => kept.as_str(),
    };

    let mut out = cut.to_string();
    out.push(ELLIPSIS);
    out
}
