//! Text normalization for option keys and SKU tokens.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Maximum length of the SKU token derived from a single option value.
pub const SKU_TOKEN_LEN: usize = 8;

/// Token used when a value has no ASCII letters or digits left after normalization.
pub const EMPTY_SKU_TOKEN: &str = "X";

/// Remove accents: NFD-decompose, then drop combining marks ("Tamaño" -> "Tamano").
pub fn strip_diacritics(input: &str) -> String {
    input.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Derive the join key for an option name.
///
/// Lower-cased, accent-free, with every run of characters outside `[a-z0-9]`
/// collapsed into one `_`. Leading and trailing separators are dropped, so
/// `"  Color!! "` becomes `"color"`. May return an empty string.
pub fn option_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in strip_diacritics(name).chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !key.is_empty() {
                key.push('_');
            }
            pending_separator = false;
            key.push(c);
        } else {
            pending_separator = true;
        }
    }

    key
}

/// Derive the compact SKU token for one option value.
///
/// Accent-free, ASCII alphanumerics only, upper-cased, at most
/// [`SKU_TOKEN_LEN`] characters. Values differing only by case or accents
/// produce the same token.
pub fn sku_token(value: &str) -> String {
    let token: String = strip_diacritics(value)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(SKU_TOKEN_LEN)
        .collect();

    if token.is_empty() {
        EMPTY_SKU_TOKEN.to_string()
    } else {
        token
    }
}
