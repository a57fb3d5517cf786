//! Accent folding for name matching.
//!
//! Text is decomposed to NFD and the combining diacritical marks
//! (U+0300 to U+036F) are dropped, so "Pérez", "Pe\u{301}rez" and "Perez"
//! compare equal.

use unicode_normalization::UnicodeNormalization;

/// Strip diacritics from `input`, leaving other characters untouched.
/// The result is in NFD.
pub fn strip_accents(input: &str) -> String {
    input.nfd().filter(|&ch| !is_diacritic(ch)).collect()
}

/// Case- and accent-insensitive key for token lookups.
pub fn fold_key(input: &str) -> String {
    strip_accents(&input.to_lowercase())
}

/// Canonical composed form.
pub fn to_nfc(input: &str) -> String {
    input.nfc().collect()
}

/// Canonical decomposed form.
pub fn to_nfd(input: &str) -> String {
    input.nfd().collect()
}

/// Whether `ch` counts toward a word for boundary purposes: letters, digits,
/// underscore and combining marks.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || unicode_normalization::char::is_combining_mark(ch)
}

fn is_diacritic(ch: char) -> bool {
    matches!(ch, '\u{0300}'..='\u{036F}')
}
