pub mod compose;
pub mod dsl;
pub mod fragments;
pub mod request;

pub use compose::{QueryComposer, TitleFields};
pub use dsl::{
	BoolQuery, FieldSelector, MatchOptions, Operator, Query, SpanClause, SpanNear, TermValue,
};
pub use request::{SearchMoviesRequest, TitleGroup};
