//! Text folding for order item keys
//!
//! Two mentions of the same dish must collapse onto one basket line even when
//! the transcriber varies casing, Latin accents, Arabic harakat, tatweel or
//! hamza placement on alef.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const TATWEEL: char = '\u{0640}';

/// Fold an item name into its merge key.
///
/// Canonical decomposition splits hamza/madda off alef so that `أ`, `إ`, `آ`
/// all become `ا` once combining marks are dropped.
pub fn fold_key(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c) && *c != TATWEEL)
        .map(|c| match c {
            'ى' => 'ي',
            'ة' => 'ه',
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
