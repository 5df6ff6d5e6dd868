pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("size field cannot be 0")]
	EmptySize,
	#[error("Query result is too large")]
	ResultTooLarge { size: u32, max: u32 },
	#[error("Unknown fields: {}", fields.join(", "))]
	UnknownFields { fields: Vec<String> },
	#[error("Cache key derivation failed: {message}")]
	CacheKey { message: String },
	#[error("Cache error: {message}")]
	Cache { message: String },
	#[error("Search engine error: {message}")]
	SearchEngine { message: String },
	#[error("Error validating search movies response: {message}")]
	InvalidResponse { message: String },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl From<reel_providers::Error> for Error {
	fn from(err: reel_providers::Error) -> Self {
		Self::SearchEngine { message: err.to_string() }
	}
}

impl From<reel_storage::Error> for Error {
	fn from(err: reel_storage::Error) -> Self {
		Self::Cache { message: err.to_string() }
	}
}
