use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_ALPHANUMERIC_RUN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 ]+").expect("Static pattern must compile."));
static WHITESPACE_RUN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s+").expect("Static pattern must compile."));

/// Folds `text` to ASCII and optionally strips punctuation.
///
/// Accented characters are decomposed (NFKD) and reduced to their ASCII base; characters with no
/// ASCII base are dropped. When `strip_non_alphanumeric` is set, every run of characters outside
/// `[A-Za-z0-9 ]` becomes a single space (`keep_whitespace`) or is deleted. Whitespace runs are
/// always collapsed and the result is trimmed.
pub fn normalize(text: &str, keep_whitespace: bool, strip_non_alphanumeric: bool) -> String {
	if text.is_empty() {
		return String::new();
	}

	let folded = fold_ascii(text);
	let stripped = match (strip_non_alphanumeric, keep_whitespace) {
		(true, true) => NON_ALPHANUMERIC_RUN.replace_all(&folded, " "),
		(true, false) => NON_ALPHANUMERIC_RUN.replace_all(&folded, ""),
		(false, _) => folded.as_str().into(),
	};

	WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// [`normalize`] with the defaults used for titles: punctuation deleted, not replaced.
pub fn normalize_default(text: &str) -> String {
	normalize(text, false, true)
}

/// Lower-cased [`normalize_default`]; the form stored in `title_normalized`.
pub fn normalize_title(text: &str) -> String {
	normalize_default(text).to_lowercase()
}

fn fold_ascii(text: &str) -> String {
	text.nfkd().filter(char::is_ascii).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn folds_diacritics() {
		assert_eq!(fold_ascii("Ação"), "Acao");
		assert_eq!(fold_ascii("Ærø"), "r");
	}

	#[test]
	fn keeps_ascii_untouched() {
		assert_eq!(fold_ascii("The Godfather"), "The Godfather");
	}
}
