use std::borrow::Cow;

use cotdex_models::Decision;

use crate::error::{ExtractionError, ParseError};

/// Typographic quotes that some input methods substitute for ASCII ones.
const QUOTE_REPLACEMENTS: [(char, char); 4] = [
    ('\u{201C}', '"'),
    ('\u{201D}', '"'),
    ('\u{2018}', '\''),
    ('\u{2019}', '\''),
];

/// Return the reasoning narrative: everything before the first `[`, trimmed.
///
/// When the response has no `[` at all, the whole trimmed response is the
/// narrative. Never fails.
pub fn extract_narrative(text: &str) -> &str {
    match text.find('[') {
        Some(start) => text[..start].trim(),
        None => text.trim(),
    }
}

/// Find the `]` that closes the `[` at byte offset `start`.
///
/// Plain depth counting: brackets inside JSON string values are counted too.
pub fn find_matching_bracket(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'[') {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract the first complete `[ ... ]` from the response.
pub fn extract_array(text: &str) -> Result<&str, ExtractionError> {
    let start = text.find('[').ok_or(ExtractionError::MissingArrayStart)?;
    let end =
        find_matching_bracket(text, start).ok_or(ExtractionError::UnterminatedArray { start })?;
    Ok(&text[start..=end])
}

/// Replace typographic double and single quotes with their ASCII forms.
pub fn normalize_quotes(json: &str) -> Cow<'_, str> {
    if !json.contains(|c: char| QUOTE_REPLACEMENTS.iter().any(|(from, _)| *from == c)) {
        return Cow::Borrowed(json);
    }

    let normalized = json
        .chars()
        .map(|c| {
            QUOTE_REPLACEMENTS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect();
    Cow::Owned(normalized)
}

/// Decode a normalized array substring. A single malformed element fails the
/// whole array.
pub fn decode_decisions(json: &str) -> Result<Vec<Decision>, ParseError> {
    serde_json::from_str(json).map_err(|e| ParseError::Decode {
        message: e.to_string(),
        json: json.to_string(),
    })
}

/// Locate, normalize and decode the decision array in a raw response.
pub fn extract_decisions(text: &str) -> Result<Vec<Decision>, ParseError> {
    let array = extract_array(text)?;
    let normalized = normalize_quotes(array);
    decode_decisions(&normalized)
}
