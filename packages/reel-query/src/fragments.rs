//! Fragment builders. Each turns a field and a non-empty list of already normalized, sorted
//! values into one query fragment.

use reel_domain::stopwords::StopwordSet;

use crate::dsl::{BoolQuery, FieldSelector, MatchOptions, Operator, Query, SpanClause, SpanNear};

pub const MATCH_MINIMUM_SHOULD_MATCH: &str = "3<75%";
/// Fuzziness forced onto a span when one of its words is a single character.
pub const SHORT_WORD_FUZZINESS: &str = "AUTO:8,13";
pub const SHORT_WORD_CHARS: usize = 2;

pub fn term_or_terms(field: &str, values: &[String]) -> Query {
	match values {
		[value] => Query::term(field, value.as_str()),
		_ => Query::terms(field, values.to_vec()),
	}
}

pub fn match_query(fields: &FieldSelector, values: &[String], fuzziness: &str) -> Query {
	let clauses = values
		.iter()
		.map(|value| {
			let options = MatchOptions {
				query: value.clone(),
				fuzziness: Some(fuzziness.to_string()),
				fuzzy_transpositions: Some(false),
				minimum_should_match: Some(MATCH_MINIMUM_SHOULD_MATCH.to_string()),
				operator: Some(Operator::And),
			};

			match fields {
				FieldSelector::Single(field) => Query::Match { field: field.clone(), options },
				FieldSelector::Multi(fields) =>
					Query::MultiMatch { fields: fields.clone(), options },
			}
		})
		.collect();

	any_of(clauses).unwrap_or(Query::Bool(BoolQuery::default()))
}

/// Builds ordered fuzzy span matches, one per value.
///
/// Values are split on single spaces. Stopwords are not matched; each one widens the slop by
/// one. A value made only of stopwords yields no fragment, and `None` is returned when no value
/// yields one.
pub fn span_near_query(
	field: &str,
	values: &[String],
	fuzziness: &str,
	slop: i64,
	stopwords: &StopwordSet,
) -> Option<Query> {
	let spans = values
		.iter()
		.filter_map(|value| {
			let span = span_for_value(field, value, fuzziness, slop, stopwords);

			if span.is_none() {
				tracing::debug!(value = %value, "Title has no matchable words; skipping span.");
			}

			span
		})
		.map(Query::SpanNear)
		.collect();

	any_of(spans)
}

fn span_for_value(
	field: &str,
	value: &str,
	fuzziness: &str,
	slop: i64,
	stopwords: &StopwordSet,
) -> Option<SpanNear> {
	let words: Vec<&str> = value.split(' ').filter(|word| !word.is_empty()).collect();
	let fuzziness = if words.iter().any(|word| word.chars().count() < SHORT_WORD_CHARS) {
		SHORT_WORD_FUZZINESS
	} else {
		fuzziness
	};
	let mut extra_slop = 0;
	let mut clauses = Vec::with_capacity(words.len());

	for word in words {
		let word = word.to_lowercase();

		if stopwords.contains(&word) {
			extra_slop += 1;

			continue;
		}

		clauses.push(SpanClause {
			field: field.to_string(),
			value: word,
			fuzziness: fuzziness.to_string(),
		});
	}

	if clauses.is_empty() {
		return None;
	}

	Some(SpanNear { clauses, in_order: true, slop: slop + extra_slop })
}

/// A single clause is returned as is; several are wrapped in a `bool.should` requiring one.
fn any_of(mut clauses: Vec<Query>) -> Option<Query> {
	match clauses.len() {
		0 => None,
		1 => clauses.pop(),
		_ => Some(Query::Bool(BoolQuery {
			should: clauses,
			must_not: Vec::new(),
			minimum_should_match: Some(1),
		})),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn any_of_unwraps_single_clause() {
		let clause = Query::term("id", 1);

		assert_eq!(any_of(vec![clause.clone()]), Some(clause));
		assert_eq!(any_of(Vec::new()), None);
	}

	#[test]
	fn short_word_loosens_whole_span() {
		let span = span_for_value("t", "x men", "AUTO:1,8", 1, &StopwordSet::empty())
			.expect("Span must be built.");

		assert!(span.clauses.iter().all(|clause| clause.fuzziness == SHORT_WORD_FUZZINESS));
		assert_eq!(span.clauses.len(), 2);
	}

	#[test]
	fn repeated_spaces_do_not_create_empty_clauses() {
		let span = span_for_value("t", "blade  runner", "1", 0, &StopwordSet::empty())
			.expect("Span must be built.");

		assert_eq!(span.clauses.len(), 2);
		assert_eq!(span.slop, 0);
	}
}
