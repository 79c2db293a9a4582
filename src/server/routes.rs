// crates.io
use axum::{
	Json, Router,
	extract::{
		DefaultBodyLimit, Path as UrlPath, Query, Request, State,
		rejection::{BytesRejection, PathRejection, QueryRejection},
	},
	http::{HeaderMap, HeaderValue, header},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, put},
};
// self
use crate::{
	_prelude::*,
	auth::{self, AuthError},
	page::{self, ListPage, ListQuery, MAX_PAGE_LIMIT},
	server::{ApiError, AppState},
	store::ObjectMetadata,
};

/// Raw listing parameters; `limit` is validated by hand so failures keep the JSON error body.
#[derive(Debug, Deserialize)]
struct ListParams {
	prefix: Option<String>,
	limit: Option<String>,
	cursor: Option<String>,
}
impl ListParams {
	fn into_query(self) -> Result<ListQuery, ApiError> {
		let limit = match self.limit.as_deref() {
			None => page::DEFAULT_PAGE_LIMIT,
			Some(raw) => raw
				.trim()
				.parse::<usize>()
				.ok()
				.filter(|limit| (1..=MAX_PAGE_LIMIT).contains(limit))
				.ok_or_else(|| {
					ApiError::bad_request(format!("limit must be between 1 and {MAX_PAGE_LIMIT}"))
				})?,
		};

		Ok(ListQuery { prefix: self.prefix, limit, cursor: self.cursor })
	}
}

/// Builds the object routes over `state`.
///
/// Every route authenticates first; requests without a valid bearer token never reach the store.
pub fn router(state: AppState) -> Router {
	let body_limit = state.max_object_bytes;

	Router::new()
		.route("/objects", get(list_objects))
		.route(
			"/objects/{key}",
			put(put_object).get(get_object).head(head_object).delete(delete_object),
		)
		.route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
		.method_not_allowed_fallback(method_not_allowed)
		.fallback(unknown_route)
		.layer(DefaultBodyLimit::max(body_limit))
		.with_state(state)
}

async fn authenticate(
	State(state): State<AppState>,
	mut request: Request,
	next: Next,
) -> Result<Response, ApiError> {
	let token = bearer_token(request.headers())?.to_owned();
	let record = state.tokens.validate(&token).await?;

	auth::authorize_route(&record, request.method())?;
	request.extensions_mut().insert(record);

	Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
	let value = headers.get(header::AUTHORIZATION).ok_or(AuthError::MissingCredentials)?;
	let value = value.to_str().map_err(|_| AuthError::Malformed)?;
	let (scheme, token) = value.trim().split_once(' ').ok_or(AuthError::Malformed)?;
	let token = token.trim();

	if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
		return Err(AuthError::Malformed);
	}

	Ok(token)
}

async fn put_object(
	State(state): State<AppState>,
	key: Result<UrlPath<String>, PathRejection>,
	body: Result<Bytes, BytesRejection>,
) -> Result<Json<ObjectMetadata>, ApiError> {
	let UrlPath(key) = key?;
	let body = body?;
	let metadata = state.store.put(&key, body).await.map_err(ApiError::from_put)?;

	Ok(Json(metadata))
}

async fn get_object(
	State(state): State<AppState>,
	key: Result<UrlPath<String>, PathRejection>,
) -> Result<Response, ApiError> {
	let UrlPath(key) = key?;
	let data = state.store.get(&key).await.map_err(ApiError::from_store)?;
	let content_type = HeaderValue::from_static("application/octet-stream");

	Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

async fn head_object(
	State(state): State<AppState>,
	key: Result<UrlPath<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
	let UrlPath(key) = key?;
	let found = state.store.exists(&key).await.map_err(ApiError::from_store)?;

	Ok(if found { StatusCode::OK } else { StatusCode::NOT_FOUND })
}

async fn delete_object(
	State(state): State<AppState>,
	key: Result<UrlPath<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
	let UrlPath(key) = key?;

	state.store.delete(&key).await.map_err(ApiError::from_store)?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_objects(
	State(state): State<AppState>,
	params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListPage>, ApiError> {
	let Query(params) = params?;
	let query = params.into_query()?;
	let keys = state.store.keys().await.map_err(ApiError::from_store)?;

	Ok(Json(page::paginate(keys, &query)?))
}

async fn method_not_allowed() -> ApiError {
	ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn unknown_route() -> ApiError {
	ApiError::new(StatusCode::NOT_FOUND, "Route not found")
}
