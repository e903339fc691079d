//! Title normalization.
//!
//! Turns a free-text title into the key every comparison runs on. Two titles a
//! reader would call "the same string" must produce the same key.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize a title into its comparison key.
///
/// Steps, in order:
/// 1. case fold
/// 2. NFKC (full-width / half-width / compatibility forms), folded again
/// 3. NFD, then drop combining diacritical marks (U+0300..=U+036F)
/// 4. drop hyphens, apostrophes and whitespace without inserting a separator
/// 5. drop punctuation, brackets and other symbols (script marks such as
///    kana voicing survive and recompose)
/// 6. fold long-vowel marks to the plain vowel
///
/// The result is recomposed (NFC) so native scripts such as Hangul stay intact.
/// Total and idempotent. An empty result means "no signal".
pub fn normalize_title(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let folded = text.to_lowercase();
    let compat = folded.nfkc().collect::<String>().to_lowercase();

    compat
        .nfd()
        .filter(|c| !is_diacritic(*c))
        .filter(|c| !is_joiner(*c))
        .filter(|c| c.is_alphanumeric() || is_combining_mark(*c))
        .map(fold_long_vowel)
        .nfc()
        .collect()
}

/// Same as [`normalize_title`] but `None` for titles that carry no signal.
pub fn normalized_key(text: &str) -> Option<String> {
    let key = normalize_title(text);
    (!key.is_empty()).then_some(key)
}

fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

fn is_joiner(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '-' | '\'' | '\u{2010}' | '\u{2011}' | '\u{2018}' | '\u{2019}' | '\u{02BC}'
        )
}

// Long vowels that reach this point undecomposed.
fn fold_long_vowel(c: char) -> char {
    match c {
        'ā' | 'â' => 'a',
        'ē' | 'ê' => 'e',
        'ī' | 'î' => 'i',
        'ō' | 'ô' => 'o',
        'ū' | 'û' => 'u',
        other => other,
    }
}
