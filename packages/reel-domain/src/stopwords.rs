use std::collections::BTreeSet;

/// Portuguese prepositions and contractions that carry no weight in a title.
pub const PORTUGUESE_PREPOSITIONS: [&str; 13] =
	["a", "de", "em", "ao", "aos", "na", "nas", "no", "nos", "da", "das", "do", "dos"];

/// Words an ordered span match skips over instead of matching.
///
/// Each skipped word widens the span's slop by one so the gap it leaves is still allowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopwordSet {
	words: BTreeSet<String>,
}
impl StopwordSet {
	pub fn new<I, S>(words: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let words = words
			.into_iter()
			.map(|word| word.as_ref().trim().to_lowercase())
			.filter(|word| !word.is_empty())
			.collect();

		Self { words }
	}

	pub fn empty() -> Self {
		Self { words: BTreeSet::new() }
	}

	pub fn portuguese_prepositions() -> Self {
		Self::new(PORTUGUESE_PREPOSITIONS)
	}

	pub fn contains(&self, word: &str) -> bool {
		self.words.contains(word)
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}
}
impl Default for StopwordSet {
	fn default() -> Self {
		Self::portuguese_prepositions()
	}
}
