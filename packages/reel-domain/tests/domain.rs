use reel_domain::{
	stopwords::{PORTUGUESE_PREPOSITIONS, StopwordSet},
	text,
};

#[test]
fn strips_accents_and_punctuation() {
	assert_eq!(
		text::normalize("Amélie: O Fabuloso Destino!", false, true),
		"Amelie O Fabuloso Destino"
	);
	assert_eq!(text::normalize("Spider-Man", false, true), "SpiderMan");
}

#[test]
fn punctuation_becomes_space_when_whitespace_is_kept() {
	assert_eq!(text::normalize("Spider-Man: No Way Home", true, true), "Spider Man No Way Home");
	assert_eq!(text::normalize("--Wall-E--", true, true), "Wall E");
}

#[test]
fn accent_stripping_only_keeps_punctuation() {
	assert_eq!(text::normalize("  Cidade   de Deus?! ", false, false), "Cidade de Deus?!");
	assert_eq!(text::normalize("Pokémon: O Filme", true, false), "Pokemon: O Filme");
}

#[test]
fn characters_without_ascii_base_are_dropped() {
	assert_eq!(text::normalize("千と千尋の神隠し", false, true), "");
	assert_eq!(text::normalize("Straße", false, true), "Strae");
}

#[test]
fn empty_input_passes_through() {
	assert_eq!(text::normalize("", true, true), "");
	assert_eq!(text::normalize_title(""), "");
}

#[test]
fn whitespace_is_collapsed_and_trimmed() {
	assert_eq!(text::normalize("\tThe \n\n Godfather  ", false, true), "The Godfather");
}

#[test]
fn normalization_is_idempotent() {
	let samples = [
		"The Godfather",
		"  Amélie: O Fabuloso Destino!  ",
		"Spider-Man: Into the Spider-Verse",
		"À Bout de Souffle",
		"8½",
		"Crouching Tiger, Hidden Dragon (臥虎藏龍)",
		"\u{0301}\u{0301}",
		"",
	];

	for sample in samples {
		let once = text::normalize_default(sample);
		let twice = text::normalize_default(&once);

		assert_eq!(once, twice, "Normalization of {sample:?} is not idempotent.");
	}
}

#[test]
fn title_normalization_lowercases() {
	assert_eq!(text::normalize_title("O Auto da Compadecida"), "o auto da compadecida");
	assert_eq!(text::normalize_title("ÉDEN"), "eden");
}

#[test]
fn default_stopwords_are_portuguese_prepositions() {
	let stopwords = StopwordSet::default();

	assert_eq!(stopwords.len(), PORTUGUESE_PREPOSITIONS.len());
	assert!(stopwords.contains("a"));
	assert!(stopwords.contains("dos"));
	assert!(!stopwords.contains("the"));
}

#[test]
fn custom_stopwords_are_lowercased_and_trimmed() {
	let stopwords = StopwordSet::new([" The ", "OF", ""]);

	assert_eq!(stopwords.len(), 2);
	assert!(stopwords.contains("the"));
	assert!(stopwords.contains("of"));
	assert!(StopwordSet::empty().is_empty());
}
