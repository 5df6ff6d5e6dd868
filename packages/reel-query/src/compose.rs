use reel_domain::stopwords::StopwordSet;

use crate::{
	dsl::{BoolQuery, FieldSelector, Query},
	fragments,
	request::{SearchMoviesRequest, TitleGroup},
};

/// Index fields a title search runs against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleFields {
	/// Analyzed field used by fuzzy and span matching.
	pub analyzed: String,
	/// Untouched keyword field used by exact matching.
	pub keyword: String,
}
impl Default for TitleFields {
	fn default() -> Self {
		Self {
			analyzed: "title_normalized".to_string(),
			keyword: "title_normalized.keyword".to_string(),
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct QueryComposer {
	fields: TitleFields,
	stopwords: StopwordSet,
}
impl QueryComposer {
	pub fn new(fields: TitleFields, stopwords: StopwordSet) -> Self {
		Self { fields, stopwords }
	}

	pub fn fields(&self) -> &TitleFields {
		&self.fields
	}

	/// Translates `request` into one `bool` query: `titles` under `should`, `n_titles` under
	/// `must_not`. A side with no usable titles leaves its branch out, so an empty request
	/// renders as `{"bool": {}}`.
	pub fn compose(&self, request: &SearchMoviesRequest) -> Query {
		let mut query = BoolQuery::default();

		if let Some(fragment) = self.group_fragment(request.positive()) {
			query.should.push(fragment);
		}
		if let Some(fragment) = self.group_fragment(request.negative()) {
			query.must_not.push(fragment);
		}

		Query::Bool(query)
	}

	fn group_fragment(&self, group: TitleGroup<'_>) -> Option<Query> {
		let titles = group.accepted_titles();

		if titles.is_empty() {
			return None;
		}

		if group.exact_match {
			Some(fragments::term_or_terms(&self.fields.keyword, &titles))
		} else if group.keep_order_span {
			fragments::span_near_query(
				&self.fields.analyzed,
				&titles,
				group.fuzziness,
				group.slop,
				&self.stopwords,
			)
		} else {
			Some(fragments::match_query(
				&FieldSelector::Single(self.fields.analyzed.clone()),
				&titles,
				group.fuzziness,
			))
		}
	}
}
