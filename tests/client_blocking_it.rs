#![cfg(all(feature = "blocking", feature = "server"))]

mod support;

// self
use objstore::{
	client::{BlockingClient, ClientConfig},
	cursor::CursorError,
	error::Error,
	page::ListQuery,
};
use support::{ALL_SCOPES, TestServer};

fn client(server: &TestServer, issued: &objstore::auth::IssuedToken) -> BlockingClient {
	BlockingClient::new(server.config(issued)).expect("Blocking client should build.")
}

#[test]
fn objects_round_trip_through_the_live_router() {
	let (server, issued) = TestServer::start("blocking_round_trip", ALL_SCOPES);
	let client = client(&server, &issued);
	let meta = client.put("dir/file.txt", "hello").expect("Put should succeed.");

	assert_eq!(meta.key, "dir/file.txt");
	assert_eq!(meta.size, 5);
	assert_eq!(client.get("dir/file.txt").expect("Get should succeed.").as_ref(), b"hello");
	assert!(client.exists("dir/file.txt").expect("Exists should succeed."));

	client.delete("dir/file.txt").expect("Delete should succeed.");

	assert!(!client.exists("dir/file.txt").expect("Exists should succeed."));
	assert!(client.delete("dir/file.txt").expect_err("Second delete must fail.").is_not_found());
	assert!(client.get("dir/file.txt").expect_err("Get after delete must fail.").is_not_found());
}

#[test]
fn empty_objects_are_stored() {
	let (server, issued) = TestServer::start("blocking_empty", ALL_SCOPES);
	let client = client(&server, &issued);
	let meta = client.put("empty", Vec::<u8>::new()).expect("Empty put should succeed.");

	assert_eq!(meta.size, 0);
	assert!(client.get("empty").expect("Get should succeed.").is_empty());
	assert!(client.exists("empty").expect("Exists should succeed."));
}

#[test]
fn empty_keys_are_rejected_locally() {
	let (server, issued) = TestServer::start("blocking_empty_key", ALL_SCOPES);
	let client = client(&server, &issued);

	assert!(matches!(client.get(""), Err(Error::Config(_))));
	assert!(server.store.is_empty());
}

#[test]
fn listing_pages_through_the_key_space() {
	let (server, issued) = TestServer::start("blocking_list", ALL_SCOPES);
	let client = client(&server, &issued);

	for key in ["c", "a", "b"] {
		client.put(key, "x").expect("Put should succeed.");
	}

	let first = client.list(&ListQuery::new(2)).expect("First page should load.");

	assert_eq!(first.keys, ["a", "b"]);
	assert!(first.has_more);

	let cursor = first.next_cursor.expect("First page should carry a cursor.");
	let second = client.list(&ListQuery::new(2).with_cursor(cursor)).expect("Second page.");

	assert_eq!(second.keys, ["c"]);
	assert!(!second.has_more);

	let everything = client.list(&ListQuery::default()).expect("Default page should load.");

	assert_eq!(everything.keys, ["a", "b", "c"]);
	assert_eq!(everything.next_cursor, None);
}

#[test]
fn key_iterator_drains_every_page_under_a_prefix() {
	let (server, issued) = TestServer::start("blocking_keys", ALL_SCOPES);
	let config = ClientConfig::builder(server.base_url(), issued.secret.expose())
		.page_size(3)
		.build()
		.expect("Client config should build.");
	let client = BlockingClient::new(config).expect("Blocking client should build.");
	let mut expected = Vec::new();

	for i in 0..10 {
		let key = format!("batch/{i:02}");

		client.put(&key, "x").expect("Put should succeed.");
		expected.push(key);
	}

	client.put("other", "x").expect("Put should succeed.");

	let keys = client
		.keys(Some("batch/"))
		.collect::<Result<Vec<_>, _>>()
		.expect("Key iterator should drain.");

	assert_eq!(keys, expected);
	assert_eq!(client.keys(None).count(), 11);
}

#[test]
fn rejected_cursors_surface_as_invalid_cursor() {
	let (server, issued) = TestServer::start("blocking_bad_cursor", ALL_SCOPES);
	let client = client(&server, &issued);

	client.put("a", "x").expect("Put should succeed.");

	let err = client
		.list(&ListQuery::new(1).with_cursor("%%%"))
		.expect_err("A malformed cursor must fail.");

	assert!(
		matches!(err, Error::InvalidCursor(CursorError::Rejected { ref message }) if message == "Invalid cursor"),
		"unexpected error: {err:?}"
	);
}

#[test]
fn wrong_credentials_are_unauthorized() {
	let (server, _issued) = TestServer::start("blocking_wrong_key", ALL_SCOPES);
	let config = ClientConfig::builder(server.base_url(), "not-a-real-token")
		.build()
		.expect("Client config should build.");
	let client = BlockingClient::new(config).expect("Blocking client should build.");
	let err = client.put("k", "x").expect_err("Unknown tokens must be rejected.");

	assert!(
		matches!(err, Error::Unauthorized { ref message } if message == "Invalid or missing token"),
		"unexpected error: {err:?}"
	);
	assert!(server.store.is_empty());
}

#[test]
fn read_only_tokens_cannot_write() {
	let (server, issued) = TestServer::start("blocking_read_only", &["read"]);
	let client = client(&server, &issued);
	let err = client.put("k", "x").expect_err("Writes need the write scope.");

	assert!(
		matches!(err, Error::Forbidden { ref message } if message == "Missing required scopes: write"),
		"unexpected error: {err:?}"
	);
	assert!(!client.exists("k").expect("Reads are allowed."));
}

#[test]
fn unlistable_backends_surface_as_unsupported() {
	let (server, issued) = TestServer::start_unlistable("blocking_unlistable", ALL_SCOPES);
	let client = client(&server, &issued);

	client.put("k", "x").expect("Put should still succeed.");
	assert_eq!(client.get("k").expect("Get should still succeed.").as_ref(), b"x");

	let err = client.list(&ListQuery::new(10)).expect_err("Listing must be refused.");

	assert!(matches!(err, Error::Unsupported { .. }), "unexpected error: {err:?}");

	let mut keys = client.keys(None);

	assert!(matches!(keys.next(), Some(Err(Error::Unsupported { .. }))));
	assert!(keys.next().is_none());
}
