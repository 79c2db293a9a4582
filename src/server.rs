//! HTTP route layer: binds the object routes to an [`ObjectStore`], authenticating every request
//! against a [`TokenCache`] and checking the scope of its verb before the store is touched.

mod config;
mod error;
mod routes;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::router;

// crates.io
use tokio::net::TcpListener;
// self
use crate::{_prelude::*, auth::TokenCache, error::TransportError, obs, store::ObjectStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	/// Object storage capability.
	pub store: Arc<dyn ObjectStore>,
	/// Bearer-token cache.
	pub tokens: Arc<TokenCache>,
	/// Largest accepted request body.
	pub max_object_bytes: usize,
}
impl AppState {
	/// Creates state with the default body limit.
	pub fn new(store: Arc<dyn ObjectStore>, tokens: Arc<TokenCache>) -> Self {
		Self { store, tokens, max_object_bytes: ServerConfig::DEFAULT_MAX_OBJECT_BYTES }
	}

	/// Overrides the largest accepted request body.
	pub fn with_max_object_bytes(mut self, max_object_bytes: usize) -> Self {
		self.max_object_bytes = max_object_bytes;

		self
	}
}
impl Debug for AppState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppState")
			.field("tokens", &self.tokens)
			.field("max_object_bytes", &self.max_object_bytes)
			.finish_non_exhaustive()
	}
}

/// Binds `config.bind` and serves `store` until the future is dropped or the listener fails.
///
/// Uses the process-wide [`TokenCache::global`], pointed at `config.tokens_file`.
pub async fn serve(config: ServerConfig, store: Arc<dyn ObjectStore>) -> Result<()> {
	let tokens = TokenCache::global();

	tokens.set_path(&config.tokens_file).await;

	let listener = TcpListener::bind(config.bind).await.map_err(TransportError::from)?;
	let state = AppState::new(store, tokens).with_max_object_bytes(config.max_object_bytes);

	serve_listener(listener, state).await
}

/// Serves the routes on an already bound listener.
pub async fn serve_listener(listener: TcpListener, state: AppState) -> Result<()> {
	if let Ok(addr) = listener.local_addr() {
		obs::server_listening(addr);
	}

	axum::serve(listener, router(state)).await.map_err(|e| TransportError::from(e).into())
}
