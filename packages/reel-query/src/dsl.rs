//! Typed subset of the OpenSearch query DSL.
//!
//! Every variant renders to exactly one JSON shape through [`Query::to_dsl`]. Object keys are
//! emitted through `serde_json::Map`, so equal queries always render to equal bytes.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

#[derive(Clone, Debug, PartialEq)]
pub enum Query {
	MatchAll,
	Term { field: String, value: TermValue },
	Terms { field: String, values: Vec<String> },
	Match { field: String, options: MatchOptions },
	MultiMatch { fields: Vec<String>, options: MatchOptions },
	SpanNear(SpanNear),
	Bool(BoolQuery),
}
impl Query {
	pub fn term(field: impl Into<String>, value: impl Into<TermValue>) -> Self {
		Self::Term { field: field.into(), value: value.into() }
	}

	pub fn terms(field: impl Into<String>, values: Vec<String>) -> Self {
		Self::Terms { field: field.into(), values }
	}

	/// A bare `match` with only the query text, rendered as `{"match": {field: text}}`.
	pub fn plain_match(field: impl Into<String>, query: impl Into<String>) -> Self {
		Self::Match { field: field.into(), options: MatchOptions::plain(query) }
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Self::MatchAll => "match_all",
			Self::Term { .. } => "term",
			Self::Terms { .. } => "terms",
			Self::Match { .. } => "match",
			Self::MultiMatch { .. } => "multi_match",
			Self::SpanNear(_) => "span_near",
			Self::Bool(_) => "bool",
		}
	}

	pub fn to_dsl(&self) -> Value {
		match self {
			Self::MatchAll => json!({ "match_all": {} }),
			Self::Term { field, value } => json!({ "term": { field.as_str(): value.to_value() } }),
			Self::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
			Self::Match { field, options } if options.is_plain() =>
				json!({ "match": { field.as_str(): options.query } }),
			Self::Match { field, options } =>
				json!({ "match": { field.as_str(): options.to_value(None) } }),
			Self::MultiMatch { fields, options } =>
				json!({ "multi_match": options.to_value(Some(fields)) }),
			Self::SpanNear(span) => json!({ "span_near": span.to_value() }),
			Self::Bool(bool_query) => json!({ "bool": bool_query.to_value() }),
		}
	}
}
impl Serialize for Query {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.to_dsl().serialize(serializer)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TermValue {
	Text(String),
	Integer(i64),
}
impl TermValue {
	fn to_value(&self) -> Value {
		match self {
			Self::Text(text) => Value::String(text.clone()),
			Self::Integer(number) => Value::from(*number),
		}
	}
}
impl From<String> for TermValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<&str> for TermValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}
impl From<i64> for TermValue {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}

/// Target of a match clause: one field renders `match`, several render `multi_match`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSelector {
	Single(String),
	Multi(Vec<String>),
}
impl From<&str> for FieldSelector {
	fn from(value: &str) -> Self {
		Self::Single(value.to_string())
	}
}
impl From<Vec<String>> for FieldSelector {
	fn from(value: Vec<String>) -> Self {
		Self::Multi(value)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
	And,
	Or,
}
impl Operator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::And => "and",
			Self::Or => "or",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOptions {
	pub query: String,
	pub fuzziness: Option<String>,
	pub fuzzy_transpositions: Option<bool>,
	pub minimum_should_match: Option<String>,
	pub operator: Option<Operator>,
}
impl MatchOptions {
	pub fn plain(query: impl Into<String>) -> Self {
		Self {
			query: query.into(),
			fuzziness: None,
			fuzzy_transpositions: None,
			minimum_should_match: None,
			operator: None,
		}
	}

	pub fn is_plain(&self) -> bool {
		self.fuzziness.is_none()
			&& self.fuzzy_transpositions.is_none()
			&& self.minimum_should_match.is_none()
			&& self.operator.is_none()
	}

	fn to_value(&self, fields: Option<&Vec<String>>) -> Value {
		let mut out = Map::new();

		out.insert("query".to_string(), Value::String(self.query.clone()));

		if let Some(fields) = fields {
			out.insert("fields".to_string(), json!(fields));
		}
		if let Some(fuzziness) = self.fuzziness.as_ref() {
			out.insert("fuzziness".to_string(), Value::String(fuzziness.clone()));
		}
		if let Some(transpositions) = self.fuzzy_transpositions {
			out.insert("fuzzy_transpositions".to_string(), Value::Bool(transpositions));
		}
		if let Some(minimum) = self.minimum_should_match.as_ref() {
			out.insert("minimum_should_match".to_string(), Value::String(minimum.clone()));
		}
		if let Some(operator) = self.operator {
			out.insert("operator".to_string(), Value::String(operator.as_str().to_string()));
		}

		Value::Object(out)
	}
}

/// One fuzzy term inside a span query, rendered as `span_multi` over `fuzzy`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanClause {
	pub field: String,
	pub value: String,
	pub fuzziness: String,
}
impl SpanClause {
	fn to_value(&self) -> Value {
		json!({
			"span_multi": {
				"match": {
					"fuzzy": {
						self.field.as_str(): {
							"fuzziness": self.fuzziness,
							"value": self.value,
						}
					}
				}
			}
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanNear {
	pub clauses: Vec<SpanClause>,
	pub in_order: bool,
	pub slop: i64,
}
impl SpanNear {
	fn to_value(&self) -> Value {
		let clauses: Vec<Value> = self.clauses.iter().map(SpanClause::to_value).collect();

		json!({ "clauses": clauses, "in_order": self.in_order, "slop": self.slop })
	}
}

/// Boolean container. Empty branches are omitted from the rendered DSL.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoolQuery {
	pub should: Vec<Query>,
	pub must_not: Vec<Query>,
	pub minimum_should_match: Option<u32>,
}
impl BoolQuery {
	pub fn is_empty(&self) -> bool {
		self.should.is_empty() && self.must_not.is_empty()
	}

	fn to_value(&self) -> Value {
		let mut out = Map::new();

		if let Some(minimum) = self.minimum_should_match {
			out.insert("minimum_should_match".to_string(), Value::from(minimum));
		}
		if !self.should.is_empty() {
			out.insert(
				"should".to_string(),
				Value::Array(self.should.iter().map(Query::to_dsl).collect()),
			);
		}
		if !self.must_not.is_empty() {
			out.insert(
				"must_not".to_string(),
				Value::Array(self.must_not.iter().map(Query::to_dsl).collect()),
			);
		}

		Value::Object(out)
	}
}
