// std
use std::time::Duration as StdDuration;

// crates.io
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Scroll scan over every hit of `body`, `size` hits per round trip.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScanRequest {
	pub index: String,
	pub body: Value,
	pub size: u32,
	pub scroll: String,
}

/// One `from`/`size` window of `body`'s hits.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageRequest {
	pub index: String,
	pub body: Value,
	pub from: u64,
	pub size: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
	#[serde(rename = "_id", default)]
	pub id: Option<String>,
	#[serde(rename = "_source", default)]
	pub source: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
	pub hits: Vec<SearchHit>,
	pub total: u64,
}

/// HTTP client for an OpenSearch (or Elasticsearch) cluster.
#[derive(Clone)]
pub struct OpenSearchClient {
	client: Client,
	base_url: Url,
}
impl OpenSearchClient {
	pub fn new(cfg: &reel_config::Search) -> Result<Self> {
		let client = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;
		let base_url = parse_base_url(&cfg.url)?;

		tracing::info!(url = %base_url, "OpenSearch client initialized.");

		Ok(Self { client, base_url })
	}

	pub async fn scan(&self, request: &ScanRequest) -> Result<SearchHits> {
		let url = self.endpoint(&[request.index.as_str(), "_search"])?;
		let body = with_size(&request.body, request.size)?;
		let json: Value = self
			.client
			.post(url)
			.query(&[("scroll", request.scroll.as_str())])
			.json(&body)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		let mut page = parse_search_response(json)?;
		let mut hits = Vec::new();

		loop {
			let batch_len = page.hits.len();

			hits.append(&mut page.hits);

			let Some(scroll_id) = page.scroll_id.take() else {
				break;
			};

			if batch_len == 0 {
				self.clear_scroll(&scroll_id).await;

				break;
			}

			page = match self.next_scroll(&scroll_id, &request.scroll).await {
				Ok(page) => page,
				Err(err) => {
					self.clear_scroll(&scroll_id).await;

					return Err(err);
				},
			};

			if page.scroll_id.is_none() {
				page.scroll_id = Some(scroll_id);
			}
		}

		tracing::debug!(index = %request.index, hits = hits.len(), "Scroll scan finished.");

		let total = hits.len() as u64;

		Ok(SearchHits { hits, total })
	}

	pub async fn page(&self, request: &PageRequest) -> Result<SearchHits> {
		let url = self.endpoint(&[request.index.as_str(), "_search"])?;
		let mut body = with_size(&request.body, request.size)?;

		if let Value::Object(map) = &mut body {
			map.insert("from".to_string(), Value::from(request.from));
			map.insert("track_total_hits".to_string(), Value::Bool(true));
		}

		let json: Value = self
			.client
			.post(url)
			.json(&body)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		let page = parse_search_response(json)?;
		let total = page.total.unwrap_or(page.hits.len() as u64);

		Ok(SearchHits { hits: page.hits, total })
	}

	async fn next_scroll(&self, scroll_id: &str, scroll: &str) -> Result<ParsedPage> {
		let url = self.endpoint(&["_search", "scroll"])?;
		let body = serde_json::json!({ "scroll": scroll, "scroll_id": scroll_id });
		let json: Value = self
			.client
			.post(url)
			.json(&body)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		parse_search_response(json)
	}

	async fn clear_scroll(&self, scroll_id: &str) {
		let result = async {
			let url = self.endpoint(&["_search", "scroll"])?;
			let body = serde_json::json!({ "scroll_id": [scroll_id] });

			self.client.delete(url).json(&body).send().await?.error_for_status()?;

			Ok::<_, Error>(())
		}
		.await;

		if let Err(err) = result {
			tracing::warn!(error = %err, "Failed to clear scroll context.");
		}
	}

	fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| Error::InvalidConfig {
				message: format!("Search URL {} cannot be a base.", self.base_url),
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}
}

#[derive(Debug)]
struct ParsedPage {
	hits: Vec<SearchHit>,
	scroll_id: Option<String>,
	total: Option<u64>,
}

fn parse_base_url(raw: &str) -> Result<Url> {
	Url::parse(raw).map_err(|err| Error::InvalidConfig {
		message: format!("Invalid search URL {raw:?}: {err}"),
	})
}

fn with_size(body: &Value, size: u32) -> Result<Value> {
	let Value::Object(map) = body else {
		return Err(Error::InvalidResponse {
			message: "Search body must be a JSON object.".to_string(),
		});
	};
	let mut map = map.clone();

	map.insert("size".to_string(), Value::from(size));

	Ok(Value::Object(map))
}

fn parse_search_response(json: Value) -> Result<ParsedPage> {
	let scroll_id = json.get("_scroll_id").and_then(Value::as_str).map(str::to_string);
	let hits_obj = json.get("hits").ok_or_else(|| Error::InvalidResponse {
		message: "Search response is missing hits.".to_string(),
	})?;
	// Elasticsearch 6 reports a bare number, later versions an object with `value`.
	let total = match hits_obj.get("total") {
		Some(Value::Number(number)) => number.as_u64(),
		Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
		_ => None,
	};
	let raw_hits = hits_obj.get("hits").cloned().unwrap_or(Value::Array(Vec::new()));
	let hits: Vec<SearchHit> = serde_json::from_value(raw_hits)?;

	Ok(ParsedPage { hits, scroll_id, total })
}
