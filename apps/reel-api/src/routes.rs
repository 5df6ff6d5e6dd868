use axum::{
	Json, Router,
	extract::{
		Path, Query, Request, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::{HeaderValue, StatusCode},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::state::AppState;
use reel_providers::slack::{self, SlackAlert};
use reel_query::SearchMoviesRequest;
use reel_service::{Error as ServiceError, ListMoviesRequest, Movie, Page};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(root))
		.route("/health", get(health))
		.route("/api/v1/movies", get(list_movies))
		.route("/api/v1/movies/titles", post(search_movies_by_titles))
		.route("/api/v1/movies/{value}", get(fetch_movie))
		.layer(middleware::from_fn_with_state(state.clone(), report_failures))
		.with_state(state)
}

async fn root() -> Json<Value> {
	Json(json!({ "message": "Welcome to the Movie Database API" }))
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_movies(
	State(state): State<AppState>,
	query: Result<Query<ListMoviesRequest>, QueryRejection>,
) -> Result<Json<Page<Movie>>, ApiError> {
	let Query(request) = query?;
	let response = state.service.list_movies(request).await?;

	Ok(Json(response))
}

async fn search_movies_by_titles(
	State(state): State<AppState>,
	payload: Result<Json<SearchMoviesRequest>, JsonRejection>,
) -> Result<Json<Vec<Movie>>, ApiError> {
	let Json(request) = payload?;
	let response = state.service.search_movies(request).await?;

	Ok(Json(response))
}

async fn fetch_movie(
	State(state): State<AppState>,
	Path(value): Path<String>,
) -> Result<Json<Vec<Movie>>, ApiError> {
	let response = state.service.fetch_movie(&value).await?;

	Ok(Json(response))
}

/// Tags every response with a request id and pages Slack about server errors.
async fn report_failures(State(state): State<AppState>, request: Request, next: Next) -> Response {
	let request_id = Uuid::new_v4().to_string();
	let route = format!("{} {}", request.method(), request.uri().path());
	let mut response = next.run(request).await;

	if let Ok(value) = HeaderValue::from_str(&request_id) {
		response.headers_mut().insert(REQUEST_ID_HEADER, value);
	}

	if !response.status().is_server_error() {
		return response;
	}

	let message = response
		.extensions()
		.get::<FailureMessage>()
		.map(|failure| failure.0.clone())
		.unwrap_or_else(|| response.status().to_string());

	tracing::error!(%request_id, %route, %message, "Request failed.");

	let cfg = &state.service.cfg;

	if let Some(slack_cfg) = cfg.slack.clone()
		&& !cfg.service.is_local
	{
		let alert = SlackAlert { title: "Internal error".to_string(), request_id, route, message };

		tokio::spawn(async move {
			if let Err(err) = slack::notify(&slack_cfg, &alert).await {
				tracing::warn!(error = %err, "Slack notification failed.");
			}
		});
	}

	response
}

#[derive(Clone, Debug)]
struct FailureMessage(String);

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::InvalidRequest { .. } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::EmptySize =>
				Self::new(StatusCode::BAD_REQUEST, "empty_size", message, None),
			ServiceError::ResultTooLarge { .. } =>
				Self::new(StatusCode::BAD_REQUEST, "result_too_large", message, None),
			ServiceError::UnknownFields { fields } =>
				Self::new(StatusCode::BAD_REQUEST, "unknown_fields", message, Some(fields)),
			ServiceError::CacheKey { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "cache_key_error", message, None),
			ServiceError::Cache { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "cache_error", message, None),
			ServiceError::SearchEngine { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "search_engine_error", message, None),
			ServiceError::InvalidResponse { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "invalid_response", message, None),
			ServiceError::Internal { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message, None),
		}
	}
}
impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text(), None)
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let failure = self.status.is_server_error().then(|| FailureMessage(self.message.clone()));
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };
		let mut response = (self.status, Json(body)).into_response();

		if let Some(failure) = failure {
			response.extensions_mut().insert(failure);
		}

		response
	}
}
