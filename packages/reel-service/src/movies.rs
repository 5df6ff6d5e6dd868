use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use reel_providers::opensearch::{PageRequest, ScanRequest, SearchHit};
use reel_query::{Query, SearchMoviesRequest};

use crate::{CacheKey, Error, ReelService, Result};

pub const LIST_MOVIES_PREFIX: &str = "list_movies";
pub const SEARCH_MOVIES_PREFIX: &str = "search_movies_by_titles";
pub const MOVIE_FIELDS: [&str; 8] = [
	"id",
	"imdb_id",
	"title",
	"title_normalized",
	"release_year",
	"genre",
	"director",
	"additional_data",
];

const LOOKUP_SIZE: u32 = 10;
const DEFAULT_PAGE_SIZE: u32 = 100;

/// One indexed movie document. Fields left out of a projection come back as `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Movie {
	#[serde(default)]
	pub id: Option<i64>,
	#[serde(default)]
	pub imdb_id: Option<String>,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub title_normalized: Option<String>,
	#[serde(default)]
	pub release_year: Option<i32>,
	#[serde(default)]
	pub genre: Option<String>,
	#[serde(default)]
	pub director: Option<String>,
	#[serde(default)]
	pub additional_data: Option<AdditionalData>,
}
impl Movie {
	pub fn from_source(source: Map<String, Value>) -> Result<Self> {
		serde_json::from_value(Value::Object(source))
			.map_err(|err| Error::InvalidResponse { message: err.to_string() })
	}

	/// Keeps only `fields`; an empty selection keeps everything.
	pub fn project(mut self, fields: &BTreeSet<String>) -> Self {
		if fields.is_empty() {
			return self;
		}

		let keep = |name: &str| fields.contains(name);

		if !keep("id") {
			self.id = None;
		}
		if !keep("imdb_id") {
			self.imdb_id = None;
		}
		if !keep("title") {
			self.title = None;
		}
		if !keep("title_normalized") {
			self.title_normalized = None;
		}
		if !keep("release_year") {
			self.release_year = None;
		}
		if !keep("genre") {
			self.genre = None;
		}
		if !keep("director") {
			self.director = None;
		}
		if !keep("additional_data") {
			self.additional_data = None;
		}

		self
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalData {
	Object(Map<String, Value>),
	List(Vec<Value>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub total: u64,
	pub page: u32,
	pub page_size: u32,
	pub total_pages: u64,
}
impl<T> Page<T> {
	pub fn new(items: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
		let total_pages = if page_size == 0 { 0 } else { total.div_ceil(u64::from(page_size)) };

		Self { items, total, page, page_size, total_pages }
	}
}

/// Query string of `GET /api/v1/movies`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMoviesRequest {
	/// Comma separated projection; blank selects every field.
	#[serde(default)]
	pub fields: String,
	#[serde(default = "default_page")]
	pub page: u32,
	/// Page size, 100 unless given. The search engine's window (`search.max_size`) bounds
	/// `page * size`, not the default.
	#[serde(default = "default_page_size")]
	pub size: u32,
}
impl ListMoviesRequest {
	pub fn field_list(&self) -> BTreeSet<String> {
		parse_fields(&self.fields)
	}
}
impl Default for ListMoviesRequest {
	fn default() -> Self {
		Self { fields: String::new(), page: default_page(), size: default_page_size() }
	}
}

impl ReelService {
	pub async fn list_movies(&self, request: ListMoviesRequest) -> Result<Page<Movie>> {
		let fields = request.field_list();
		let key = CacheKey::builder(LIST_MOVIES_PREFIX)
			.arg(&ListMoviesRequest {
				fields: fields.iter().cloned().collect::<Vec<_>>().join(","),
				..request.clone()
			})?
			.build();

		self.route_cache()
			.get_or_compute(&key, || async { self.list_movies_uncached(&request, &fields).await })
			.await
	}

	pub async fn search_movies(&self, request: SearchMoviesRequest) -> Result<Vec<Movie>> {
		let request = request.canonical();
		let key = CacheKey::builder(SEARCH_MOVIES_PREFIX).arg(&request)?.build();

		self.route_cache()
			.get_or_compute(&key, || async { self.search_movies_uncached(&request).await })
			.await
	}

	/// Looks a movie up by id or exact normalized title, then by a plain title match.
	pub async fn fetch_movie(&self, value: &str) -> Result<Vec<Movie>> {
		let value = value.trim();
		let query = match value.parse::<i64>() {
			Ok(id) => Query::term("id", id),
			Err(_) => Query::term("title_normalized", value.to_lowercase()),
		};
		let movies = self.lookup(&query).await?;

		if !movies.is_empty() || is_all_digits(value) {
			return Ok(movies);
		}

		tracing::debug!(value, "Exact lookup found nothing. Falling back to title match.");

		self.lookup(&Query::plain_match("title", value)).await
	}

	fn route_cache(&self) -> crate::ReadThrough {
		self.cache.with_ttl(Duration::from_secs(self.cfg.cache.route_ttl_seconds))
	}

	async fn list_movies_uncached(
		&self,
		request: &ListMoviesRequest,
		fields: &BTreeSet<String>,
	) -> Result<Page<Movie>> {
		self.check_size(request.size)?;
		check_fields(fields)?;

		if request.page == 0 {
			return Err(Error::InvalidRequest { message: "page must be at least 1.".to_string() });
		}

		let from = u64::from(request.page - 1) * u64::from(request.size);

		if from + u64::from(request.size) > u64::from(self.cfg.search.max_size) {
			return Err(Error::ResultTooLarge {
				size: request.size,
				max: self.cfg.search.max_size,
			});
		}

		let page = PageRequest {
			index: self.cfg.search.index.clone(),
			body: json!({ "query": Query::MatchAll }),
			from,
			size: request.size,
		};
		let hits = self.search.page(&page).await?;
		let items = shape(hits.hits, fields)?;

		tracing::info!(
			page = request.page,
			size = request.size,
			returned = items.len(),
			total = hits.total,
			"Listed movies."
		);

		Ok(Page::new(items, hits.total, request.page, request.size))
	}

	async fn search_movies_uncached(&self, request: &SearchMoviesRequest) -> Result<Vec<Movie>> {
		self.check_size(request.size)?;

		let query = self.composer.compose(request);
		let fields: BTreeSet<String> = [self.composer.fields().analyzed.clone()].into();
		let scan = ScanRequest {
			index: self.cfg.search.index.clone(),
			body: json!({ "query": query, "_source": fields }),
			size: request.size,
			scroll: self.cfg.search.scroll.clone(),
		};
		let hits = self.search.scan(&scan).await?;
		let movies = shape(hits.hits, &fields)?;

		tracing::info!(
			titles = request.titles.len(),
			n_titles = request.n_titles.len(),
			returned = movies.len(),
			"Searched movies by title."
		);

		Ok(movies)
	}

	async fn lookup(&self, query: &Query) -> Result<Vec<Movie>> {
		let scan = ScanRequest {
			index: self.cfg.search.index.clone(),
			body: json!({ "query": query }),
			size: LOOKUP_SIZE,
			scroll: self.cfg.search.scroll.clone(),
		};
		let hits = self.search.scan(&scan).await?;

		shape(hits.hits, &BTreeSet::new())
	}

	fn check_size(&self, size: u32) -> Result<()> {
		if size == 0 {
			return Err(Error::EmptySize);
		}
		if size > self.cfg.search.max_size {
			return Err(Error::ResultTooLarge { size, max: self.cfg.search.max_size });
		}

		Ok(())
	}
}

/// Splits a comma separated field list, ignoring blanks and inner spaces.
pub fn parse_fields(raw: &str) -> BTreeSet<String> {
	raw.split(',')
		.map(|field| field.chars().filter(|ch| !ch.is_whitespace()).collect::<String>())
		.filter(|field| !field.is_empty())
		.collect()
}

fn check_fields(fields: &BTreeSet<String>) -> Result<()> {
	let unknown: Vec<String> =
		fields.iter().filter(|field| !MOVIE_FIELDS.contains(&field.as_str())).cloned().collect();

	if unknown.is_empty() { Ok(()) } else { Err(Error::UnknownFields { fields: unknown }) }
}

fn shape(hits: Vec<SearchHit>, fields: &BTreeSet<String>) -> Result<Vec<Movie>> {
	hits.into_iter()
		.map(|hit| Movie::from_source(hit.source).map(|movie| movie.project(fields)))
		.collect()
}

fn is_all_digits(value: &str) -> bool {
	!value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

fn default_page() -> u32 {
	1
}

fn default_page_size() -> u32 {
	DEFAULT_PAGE_SIZE
}
