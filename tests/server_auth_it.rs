#![cfg(feature = "server")]

mod support;

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Method, RequestBuilder, StatusCode, header::WWW_AUTHENTICATE};
use serde_json::Value;
use time::Duration;
// self
use objstore::{
	auth::{self, TokenCache},
	cursor,
	server::{self, AppState},
	store::{MemoryStore, ObjectStore},
};
use support::{ALL_SCOPES, TestServer};

struct Reply {
	status: StatusCode,
	challenge: Option<String>,
	body: Vec<u8>,
}
impl Reply {
	fn json(&self) -> Value {
		serde_json::from_slice(&self.body).expect("Body should be JSON.")
	}

	fn error_message(&self) -> String {
		let body = self.json();

		assert_eq!(body["error"]["code"], self.status.as_u16().to_string());

		body["error"]["message"].as_str().expect("Error message should be a string.").to_owned()
	}
}

async fn send(request: RequestBuilder) -> Reply {
	let response = request.send().await.expect("Request should reach the server.");
	let status = response.status();
	let challenge = response
		.headers()
		.get(WWW_AUTHENTICATE)
		.map(|value| value.to_str().expect("Challenge should be ASCII.").to_owned());
	let body = response.bytes().await.expect("Body should be readable.").to_vec();

	Reply { status, challenge, body }
}

async fn call(server: &TestServer, method: Method, path: &str, token: Option<&str>) -> Reply {
	let mut request = Client::new().request(method, format!("{}{path}", server.base_url()));

	if let Some(token) = token {
		request = request.bearer_auth(token);
	}

	send(request).await
}

#[tokio::test]
async fn missing_or_malformed_credentials_are_challenged() {
	let (server, _issued) = TestServer::start("server_missing", ALL_SCOPES);
	let reply = send(Client::new().put(format!("{}/objects/k", server.base_url())).body("x")).await;

	assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
	assert_eq!(reply.challenge.as_deref(), Some("Bearer"));
	assert_eq!(reply.error_message(), "Invalid or missing token");

	for header in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer    ", "Token abc"] {
		let reply = send(
			Client::new()
				.get(format!("{}/objects", server.base_url()))
				.header("authorization", header),
		)
		.await;

		assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "header {header:?} must be rejected");
		assert_eq!(reply.challenge.as_deref(), Some("Bearer"));
	}

	assert!(server.store.is_empty());
}

#[tokio::test]
async fn unknown_and_expired_tokens_are_unauthorized() {
	let (server, _issued) = TestServer::start("server_expired", ALL_SCOPES);
	let expired = server.issue("stale", ALL_SCOPES, Duration::hours(-1));
	let unknown = call(&server, Method::GET, "/objects", Some("guessed-token")).await;

	assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
	assert_eq!(unknown.error_message(), "Invalid or missing token");

	let reply = call(&server, Method::GET, "/objects", Some(expired.secret.expose())).await;

	assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
	assert_eq!(reply.challenge.as_deref(), Some("Bearer"));
	assert_eq!(reply.error_message(), "Token expired");
}

#[tokio::test]
async fn each_route_requires_its_scope() {
	let (server, reader) = TestServer::start("server_scopes", &["read"]);
	let writer = server.issue("writer", &["write"], Duration::hours(1));
	let reader = reader.secret.expose();
	let writer = writer.secret.expose();
	let denied = call(&server, Method::PUT, "/objects/k", Some(reader)).await;

	assert_eq!(denied.status, StatusCode::FORBIDDEN);
	assert_eq!(denied.challenge, None);
	assert_eq!(denied.error_message(), "Missing required scopes: write");
	assert_eq!(call(&server, Method::PUT, "/objects/k", Some(writer)).await.status, StatusCode::OK);

	for method in [Method::GET, Method::HEAD] {
		assert_eq!(
			call(&server, method.clone(), "/objects/k", Some(writer)).await.status,
			StatusCode::FORBIDDEN,
			"{method} needs the read scope",
		);
		assert_eq!(call(&server, method, "/objects/k", Some(reader)).await.status, StatusCode::OK);
	}

	for token in [reader, writer] {
		let reply = call(&server, Method::DELETE, "/objects/k", Some(token)).await;

		assert_eq!(reply.status, StatusCode::FORBIDDEN);
		assert_eq!(reply.error_message(), "Missing required scopes: delete");
	}

	assert_eq!(server.store.len(), 1);
}

#[tokio::test]
async fn token_file_edits_apply_without_restart() {
	let server = TestServer::start_empty("server_reload");

	assert_eq!(
		call(&server, Method::GET, "/objects", Some("anything")).await.status,
		StatusCode::UNAUTHORIZED,
		"a missing token file admits nobody",
	);

	let first = server.issue("ci", &["read"], Duration::hours(1));

	assert_eq!(
		call(&server, Method::GET, "/objects", Some(first.secret.expose())).await.status,
		StatusCode::OK
	);

	let rotated = auth::rotate(&server.tokens_file, "ci", Duration::hours(1), None)
		.expect("Rotation should succeed.");

	server.bump();

	assert_eq!(
		call(&server, Method::GET, "/objects", Some(first.secret.expose())).await.status,
		StatusCode::UNAUTHORIZED
	);
	assert_eq!(
		call(&server, Method::GET, "/objects", Some(rotated.secret.expose())).await.status,
		StatusCode::OK
	);

	auth::revoke(&server.tokens_file, "ci").expect("Revocation should succeed.");
	server.bump();

	assert_eq!(
		call(&server, Method::GET, "/objects", Some(rotated.secret.expose())).await.status,
		StatusCode::UNAUTHORIZED
	);
	assert_eq!(server.tokens.load_count(), 3);
}

#[tokio::test]
async fn corrupt_token_file_fails_closed_until_fixed() {
	let (server, issued) = TestServer::start("server_corrupt", ALL_SCOPES);
	let secret = issued.secret.expose();
	let valid = std::fs::read(&server.tokens_file).expect("Token file should be readable.");

	assert_eq!(call(&server, Method::GET, "/objects", Some(secret)).await.status, StatusCode::OK);

	std::fs::write(&server.tokens_file, b"{ not json").expect("Token file should be writable.");
	server.bump();

	for _ in 0..2 {
		let reply = call(&server, Method::GET, "/objects", Some(secret)).await;

		assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(reply.error_message(), "Token configuration is invalid");
	}

	std::fs::write(&server.tokens_file, valid).expect("Token file should be writable.");
	server.bump();

	assert_eq!(call(&server, Method::GET, "/objects", Some(secret)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn listing_parameters_are_validated() {
	let (server, issued) = TestServer::start("server_list_params", ALL_SCOPES);
	let secret = issued.secret.expose();

	for limit in ["0", "1001", "-1", "ten"] {
		let reply =
			call(&server, Method::GET, &format!("/objects?limit={limit}"), Some(secret)).await;

		assert_eq!(reply.status, StatusCode::BAD_REQUEST, "limit {limit:?} must be rejected");
		assert_eq!(reply.error_message(), "limit must be between 1 and 1000");
	}

	let reply = call(&server, Method::GET, "/objects?limit=1000", Some(secret)).await;

	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.json(), serde_json::json!({ "keys": [], "next_cursor": null, "has_more": false }));

	let stale = cursor::encode("never-stored");
	let reply = call(&server, Method::GET, &format!("/objects?cursor={stale}"), Some(secret)).await;

	assert_eq!(reply.status, StatusCode::BAD_REQUEST);
	assert_eq!(reply.error_message(), "Invalid cursor");

	let listed = STANDARD.encode(r#"["b"]"#);
	let reply = call(&server, Method::GET, &format!("/objects?cursor={listed}"), Some(secret)).await;

	assert_eq!(reply.status, StatusCode::BAD_REQUEST);
	assert_eq!(reply.error_message(), "Invalid cursor");

	let reply = call(&server, Method::GET, "/objects?limit=2&limit=3", Some(secret)).await;

	assert_eq!(reply.status, StatusCode::BAD_REQUEST);
	assert!(!reply.error_message().is_empty());
}

#[tokio::test]
async fn framework_rejections_keep_the_error_envelope() {
	let (server, issued) = TestServer::start("server_rejections", ALL_SCOPES);
	let secret = issued.secret.expose();
	let reply = call(&server, Method::POST, "/objects/k", Some(secret)).await;

	assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
	assert_eq!(reply.error_message(), "Method not allowed");

	let reply = call(&server, Method::GET, "/objects/%FF", Some(secret)).await;

	assert_eq!(reply.status, StatusCode::BAD_REQUEST);
	assert!(!reply.error_message().is_empty());

	let reply = call(&server, Method::GET, "/buckets", Some(secret)).await;

	assert_eq!(reply.status, StatusCode::NOT_FOUND);
	assert_eq!(reply.error_message(), "Route not found");
}

#[tokio::test]
async fn listing_filters_by_prefix() {
	let (server, issued) = TestServer::start("server_prefix", ALL_SCOPES);
	let secret = issued.secret.expose();

	for key in ["img%2F1", "doc%2F1", "img%2F2"] {
		let reply = call(&server, Method::PUT, &format!("/objects/{key}"), Some(secret)).await;

		assert_eq!(reply.status, StatusCode::OK);
	}

	let reply = call(&server, Method::GET, "/objects?prefix=img%2F&limit=1", Some(secret)).await;
	let body = reply.json();

	assert_eq!(body["keys"], serde_json::json!(["img/1"]));
	assert_eq!(body["has_more"], true);
	assert_eq!(body["next_cursor"], cursor::encode("img/1"));

	let reply = call(&server, Method::GET, "/objects?prefix=", Some(secret)).await;

	assert_eq!(reply.json()["keys"], serde_json::json!(["doc/1", "img/1", "img/2"]));
}

#[tokio::test]
async fn objects_are_served_as_raw_bytes() {
	let (server, issued) = TestServer::start("server_raw", ALL_SCOPES);
	let secret = issued.secret.expose();
	let put = send(
		Client::new()
			.put(format!("{}/objects/data.bin", server.base_url()))
			.bearer_auth(secret)
			.body(vec![0_u8, 159, 146, 150]),
	)
	.await;
	let meta = put.json();

	assert_eq!(meta["key"], "data.bin");
	assert_eq!(meta["size"], 4);
	assert!(meta["created_at"].is_string());

	let response = Client::new()
		.get(format!("{}/objects/data.bin", server.base_url()))
		.bearer_auth(secret)
		.send()
		.await
		.expect("Request should reach the server.");

	assert_eq!(
		response.headers().get("content-type").map(|v| v.as_bytes()),
		Some(&b"application/octet-stream"[..])
	);
	assert_eq!(response.bytes().await.expect("Body should be readable.").as_ref(), [0, 159, 146, 150]);

	let missing = call(&server, Method::GET, "/objects/absent", Some(secret)).await;

	assert_eq!(missing.status, StatusCode::NOT_FOUND);
	assert_eq!(missing.error_message(), "Object not found");
	assert_eq!(
		call(&server, Method::HEAD, "/objects/absent", Some(secret)).await.status,
		StatusCode::NOT_FOUND
	);

	let deleted = call(&server, Method::DELETE, "/objects/data.bin", Some(secret)).await;

	assert_eq!(deleted.status, StatusCode::NO_CONTENT);
	assert!(deleted.body.is_empty());
}

#[tokio::test]
async fn oversized_bodies_are_refused() {
	let dir = support::temp_dir("server_body_limit");
	let tokens_file = dir.join("tokens.json");
	let issued = auth::issue(&tokens_file, "primary", Duration::hours(1), support::scopes(ALL_SCOPES))
		.expect("Token should be issued.");
	let store = MemoryStore::new();
	let state = AppState::new(Arc::new(store.clone()), Arc::new(TokenCache::new(&tokens_file)))
		.with_max_object_bytes(8);
	let base_url = format!("http://{}", support::spawn_router(server::router(state)));
	let put = |body: &'static str| {
		Client::new()
			.put(format!("{base_url}/objects/k"))
			.bearer_auth(issued.secret.expose())
			.body(body)
	};

	assert_eq!(send(put("12345678")).await.status, StatusCode::OK);
	let reply = send(put("123456789")).await;

	assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
	assert!(!reply.error_message().is_empty());
	assert_eq!(store.get("k").await.map(|data| data.len()), Ok(8));

	let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn responses_carry_no_rate_limit_headers() {
	let (server, issued) = TestServer::start("server_no_rate_headers", ALL_SCOPES);
	let response = Client::new()
		.get(format!("{}/objects", server.base_url()))
		.bearer_auth(issued.secret.expose())
		.send()
		.await
		.expect("Request should reach the server.");

	assert_eq!(response.status(), StatusCode::OK);
	assert!(
		response.headers().keys().all(|name| !name.as_str().starts_with("x-ratelimit")),
		"unexpected headers: {:?}",
		response.headers()
	);
}
