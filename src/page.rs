//! Cursor-based pagination over a lexicographically sorted key space.
//!
//! The listing contract is defined entirely by the sort order: the server sorts the full key
//! space ascending, filters it by prefix, and resolves the cursor's `last_key` against that same
//! sequence. There is no snapshot isolation. A cursor whose key was deleted between calls fails
//! with [`CursorError::UnknownKey`], and keys inserted before the cursor position are never seen
//! by an in-progress scan.

// self
use crate::{_prelude::*, cursor::{self, CursorError}};

/// Default number of keys per page.
pub const DEFAULT_PAGE_LIMIT: usize = 100;
/// Largest page the route layer accepts.
pub const MAX_PAGE_LIMIT: usize = 1_000;

/// One page of a listing, exactly as it travels on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
	/// Keys in ascending order.
	pub keys: Vec<String>,
	/// Cursor resuming after the last key of this page, when more results exist.
	#[serde(default)]
	pub next_cursor: Option<String>,
	/// Whether keys remain past this page.
	#[serde(default)]
	pub has_more: bool,
}

/// Listing parameters (`GET /objects?prefix&limit&cursor`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
	/// Only keys starting with this prefix are listed; empty means no filter.
	#[serde(default)]
	pub prefix: Option<String>,
	/// Maximum number of keys to return.
	#[serde(default = "default_limit")]
	pub limit: usize,
	/// Cursor returned by the previous page.
	#[serde(default)]
	pub cursor: Option<String>,
}
impl ListQuery {
	/// Creates a query for the first page with the provided limit.
	pub fn new(limit: usize) -> Self {
		Self { prefix: None, limit, cursor: None }
	}

	/// Restricts the listing to keys starting with `prefix`.
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());

		self
	}

	/// Resumes the listing after the key encoded in `cursor`.
	pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
		self.cursor = Some(cursor.into());

		self
	}

	/// The effective prefix filter, treating an empty string as absent.
	pub fn prefix_filter(&self) -> Option<&str> {
		self.prefix.as_deref().filter(|p| !p.is_empty())
	}
}
impl Default for ListQuery {
	fn default() -> Self {
		Self::new(DEFAULT_PAGE_LIMIT)
	}
}

/// Computes one page over `all_keys`.
///
/// The keys are sorted and deduplicated here, so callers may pass them in store order.
pub fn paginate<I>(all_keys: I, query: &ListQuery) -> Result<ListPage, CursorError>
where
	I: IntoIterator<Item = String>,
{
	let mut keys = all_keys.into_iter().collect::<BTreeSet<_>>().into_iter().collect::<Vec<_>>();

	if let Some(prefix) = query.prefix_filter() {
		keys.retain(|key| key.starts_with(prefix));
	}

	let start = match query.cursor.as_deref() {
		Some(raw) => {
			let last_key = cursor::decode(raw)?;

			keys.binary_search(&last_key).map_err(|_| CursorError::UnknownKey)? + 1
		},
		None => 0,
	};
	let end = start.saturating_add(query.limit);
	let has_more = end < keys.len();
	let page = keys.get(start..end.min(keys.len())).map(<[String]>::to_vec).unwrap_or_default();
	let next_cursor = if has_more { page.last().map(|key| cursor::encode(key)) } else { None };

	Ok(ListPage { keys: page, next_cursor, has_more })
}

fn default_limit() -> usize {
	DEFAULT_PAGE_LIMIT
}
