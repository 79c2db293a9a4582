//! Fixtures shared by the integration suites.

#![allow(dead_code)]

// std
use std::{
	fs::File,
	net::SocketAddr,
	path::{Path, PathBuf},
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
		mpsc,
	},
	thread,
	time::{Duration as StdDuration, SystemTime},
};
// crates.io
use axum::Router;
use bytes::Bytes;
use time::{Duration, OffsetDateTime};
use tokio::{net::TcpListener, runtime::Builder};
// self
use objstore::{
	auth::{self, IssuedToken, ScopeSet, TokenCache},
	client::ClientConfig,
	server::{self, AppState},
	store::{MemoryStore, ObjectMetadata, ObjectStore, StoreError, StoreFuture},
};

/// Every scope the routes know about.
pub const ALL_SCOPES: &[&str] = &["read", "write", "delete"];

/// Returns a unique, not-yet-created directory under the system temp dir.
pub fn temp_dir(label: &str) -> PathBuf {
	std::env::temp_dir().join(format!(
		"objstore_it_{label}_{}_{}",
		std::process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	))
}

/// Builds a scope set from string literals.
pub fn scopes(raw: &[&str]) -> ScopeSet {
	ScopeSet::new(raw.iter().copied()).expect("Scope fixture should be valid.")
}

/// Moves the file's modification time so the token cache notices the change.
pub fn touch(path: &Path, offset_secs: u64) {
	File::options()
		.write(true)
		.open(path)
		.and_then(|file| file.set_modified(SystemTime::now() + StdDuration::from_secs(offset_secs)))
		.expect("Token file mtime should be updated.");
}

/// Serves `router` on an ephemeral local port from a dedicated runtime thread.
///
/// The thread lives for the rest of the test process, so both blocking and async tests can talk
/// to it.
pub fn spawn_router(router: Router) -> SocketAddr {
	let (tx, rx) = mpsc::channel();

	thread::spawn(move || {
		let runtime =
			Builder::new_current_thread().enable_all().build().expect("Server runtime should build.");

		runtime.block_on(async move {
			let listener = TcpListener::bind("127.0.0.1:0").await.expect("Listener should bind.");

			tx.send(listener.local_addr().expect("Listener should have an address."))
				.expect("Address should be delivered.");
			axum::serve(listener, router).await.expect("Server should keep running.");
		});
	});

	rx.recv().expect("Server thread should report its address.")
}

/// In-memory store that cannot enumerate its keys.
#[derive(Clone, Default)]
pub struct UnlistableStore(pub MemoryStore);
impl ObjectStore for UnlistableStore {
	fn put<'a>(&'a self, key: &'a str, data: Bytes) -> StoreFuture<'a, ObjectMetadata> {
		self.0.put(key, data)
	}

	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Bytes> {
		self.0.get(key)
	}

	fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
		self.0.exists(key)
	}

	fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		self.0.delete(key)
	}

	fn keys(&self) -> StoreFuture<'_, Vec<String>> {
		Box::pin(async {
			Err(StoreError::Unsupported { message: "listing is disabled".into() })
		})
	}
}

/// A live route layer over an in-memory store, running on its own runtime thread.
pub struct TestServer {
	/// Address the router listens on.
	pub addr: SocketAddr,
	/// Backing store, shared with the router.
	pub store: MemoryStore,
	/// Token file consulted by the router.
	pub tokens_file: PathBuf,
	/// Token cache used by the router.
	pub tokens: Arc<TokenCache>,
	dir: PathBuf,
	revision: AtomicU64,
}
impl TestServer {
	/// Starts a server and issues a token named `primary` with `scopes`.
	pub fn start(label: &str, scopes_held: &[&str]) -> (Self, IssuedToken) {
		let server = Self::start_empty(label);
		let issued = server.issue("primary", scopes_held, Duration::hours(1));

		(server, issued)
	}

	/// Starts a server whose token file does not exist yet.
	pub fn start_empty(label: &str) -> Self {
		let store = MemoryStore::new();

		Self::launch(label, store.clone(), Arc::new(store))
	}

	/// Starts a server whose backend refuses to list keys, with a `primary` token.
	pub fn start_unlistable(label: &str, scopes_held: &[&str]) -> (Self, IssuedToken) {
		let store = MemoryStore::new();
		let server = Self::launch(label, store.clone(), Arc::new(UnlistableStore(store)));
		let issued = server.issue("primary", scopes_held, Duration::hours(1));

		(server, issued)
	}

	fn launch(label: &str, store: MemoryStore, backend: Arc<dyn ObjectStore>) -> Self {
		let dir = temp_dir(label);
		let tokens_file = dir.join("tokens.json");
		let tokens = Arc::new(TokenCache::new(&tokens_file));
		let state = AppState::new(backend, tokens.clone());
		let addr = spawn_router(server::router(state));

		Self { addr, store, tokens_file, tokens, dir, revision: AtomicU64::new(0) }
	}

	/// Root URL of the server.
	pub fn base_url(&self) -> String {
		format!("http://{}", self.addr)
	}

	/// Issues another token and makes sure the cache sees the new file.
	pub fn issue(&self, name: &str, scopes_held: &[&str], ttl: Duration) -> IssuedToken {
		let issued = auth::issue(&self.tokens_file, name, ttl, scopes(scopes_held))
			.expect("Token should be issued.");

		self.bump();

		issued
	}

	/// Pushes the token file mtime strictly past every previous value.
	///
	/// File timestamps are coarse, so edits made within one tick would otherwise look unchanged.
	pub fn bump(&self) {
		let revision = self.revision.fetch_add(1, Ordering::Relaxed) + 1;

		touch(&self.tokens_file, revision);
	}

	/// Client settings with short retry delays, authenticated with `token`.
	pub fn config(&self, token: &IssuedToken) -> ClientConfig {
		ClientConfig::builder(self.base_url(), token.secret.expose())
			.retry_delay(Duration::milliseconds(10))
			.build()
			.expect("Client config should build.")
	}
}
impl Drop for TestServer {
	fn drop(&mut self) {
		let _ = std::fs::remove_dir_all(&self.dir);
	}
}
