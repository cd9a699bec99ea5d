//! Text normalization for name and category fields.
//!
//! Account names, account categories, page names, and page categories are
//! trimmed and title-cased on every write path, including bulk and quick
//! edits. Title-casing starts a new word at any non-alphabetic character,
//! so `o'neil` becomes `O'Neil` and `abc3de` becomes `Abc3De`.

/// Trim surrounding whitespace and title-case the result.
#[must_use]
pub fn normalize(text: &str) -> String {
    title_case(text.trim())
}

/// Title-case a string: uppercase the first letter of each alphabetic run,
/// lowercase the rest.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if word_start {
                out.extend(ch.to_uppercase());
                word_start = false;
            } else {
                out.extend(ch.to_lowercase());
            }
        } else {
            out.push(ch);
            word_start = true;
        }
    }

    out
}
