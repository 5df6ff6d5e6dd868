use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_FUZZINESS: &str = "AUTO:1,8";
pub const DEFAULT_SLOP: i64 = 1;
pub const DEFAULT_SCAN_SIZE: u32 = 1_000;

/// Title search body accepted by `POST /api/v1/movies/titles`.
///
/// `titles` are ORed together; `n_titles` exclude matches. Each list carries its own matching
/// flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchMoviesRequest {
	/// Scroll batch size used while scanning the index.
	#[serde(default = "default_size")]
	pub size: u32,
	#[serde(default)]
	pub titles: Vec<String>,
	#[serde(default)]
	pub exact_match: bool,
	#[serde(default = "default_true")]
	pub keep_order_span: bool,
	#[serde(default = "default_fuzziness", deserialize_with = "fuzziness_from_wire")]
	pub fuzziness: String,
	#[serde(default = "default_slop")]
	pub slop: i64,
	#[serde(default)]
	pub n_titles: Vec<String>,
	#[serde(default)]
	pub n_titles_exact_match: bool,
	#[serde(default = "default_true")]
	pub n_titles_keep_order_span: bool,
	#[serde(default = "default_fuzziness", deserialize_with = "fuzziness_from_wire")]
	pub n_titles_fuzziness: String,
	#[serde(default = "default_slop")]
	pub n_titles_slop: i64,
}
impl SearchMoviesRequest {
	pub fn positive(&self) -> TitleGroup<'_> {
		TitleGroup {
			titles: &self.titles,
			exact_match: self.exact_match,
			keep_order_span: self.keep_order_span,
			fuzziness: &self.fuzziness,
			slop: self.slop,
		}
	}

	pub fn negative(&self) -> TitleGroup<'_> {
		TitleGroup {
			titles: &self.n_titles,
			exact_match: self.n_titles_exact_match,
			keep_order_span: self.n_titles_keep_order_span,
			fuzziness: &self.n_titles_fuzziness,
			slop: self.n_titles_slop,
		}
	}

	/// Same request with both title lists normalized, deduplicated and sorted.
	///
	/// Requests that differ only in title order, case, accents or duplicates canonicalize to the
	/// same value.
	pub fn canonical(&self) -> Self {
		Self {
			titles: self.positive().accepted_titles(),
			n_titles: self.negative().accepted_titles(),
			..self.clone()
		}
	}
}
impl Default for SearchMoviesRequest {
	fn default() -> Self {
		Self {
			size: DEFAULT_SCAN_SIZE,
			titles: Vec::new(),
			exact_match: false,
			keep_order_span: true,
			fuzziness: DEFAULT_FUZZINESS.to_string(),
			slop: DEFAULT_SLOP,
			n_titles: Vec::new(),
			n_titles_exact_match: false,
			n_titles_keep_order_span: true,
			n_titles_fuzziness: DEFAULT_FUZZINESS.to_string(),
			n_titles_slop: DEFAULT_SLOP,
		}
	}
}

/// One side of a [`SearchMoviesRequest`] with its matching flags.
#[derive(Clone, Copy, Debug)]
pub struct TitleGroup<'a> {
	pub titles: &'a [String],
	pub exact_match: bool,
	pub keep_order_span: bool,
	pub fuzziness: &'a str,
	pub slop: i64,
}
impl TitleGroup<'_> {
	/// Lower-cased titles, accent and punctuation stripped unless matching exactly, with empty
	/// results dropped. Sorted and deduplicated.
	pub fn accepted_titles(&self) -> Vec<String> {
		let accepted: BTreeSet<String> = self
			.titles
			.iter()
			.map(|title| {
				if self.exact_match {
					title.to_lowercase()
				} else {
					reel_domain::text::normalize_title(title)
				}
			})
			.filter(|title| !title.is_empty())
			.collect();

		accepted.into_iter().collect()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireFuzziness {
	Text(String),
	Integer(i64),
}

fn fuzziness_from_wire<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match WireFuzziness::deserialize(deserializer)? {
		WireFuzziness::Text(text) => text,
		WireFuzziness::Integer(number) => number.to_string(),
	})
}

fn default_size() -> u32 {
	DEFAULT_SCAN_SIZE
}

fn default_true() -> bool {
	true
}

fn default_fuzziness() -> String {
	DEFAULT_FUZZINESS.to_string()
}

fn default_slop() -> i64 {
	DEFAULT_SLOP
}
