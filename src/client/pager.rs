// std
use std::collections::VecDeque;
// self
use crate::page::{ListPage, ListQuery};

/// Buffer and cursor bookkeeping shared by the key iterator and the key stream.
///
/// The pager never performs I/O itself: the owner asks for [`KeyPager::query`] whenever
/// [`KeyPager::pop`] runs dry and feeds the resulting page back through [`KeyPager::absorb`].
#[derive(Debug)]
pub(crate) struct KeyPager {
	query: ListQuery,
	buffer: VecDeque<String>,
	done: bool,
}
impl KeyPager {
	pub(crate) fn new(prefix: Option<&str>, page_size: usize) -> Self {
		let mut query = ListQuery::new(page_size);

		query.prefix = prefix.filter(|p| !p.is_empty()).map(str::to_owned);

		Self { query, buffer: VecDeque::new(), done: false }
	}

	pub(crate) fn pop(&mut self) -> Option<String> {
		self.buffer.pop_front()
	}

	pub(crate) fn is_done(&self) -> bool {
		self.done && self.buffer.is_empty()
	}

	pub(crate) fn query(&self) -> &ListQuery {
		&self.query
	}

	pub(crate) fn absorb(&mut self, page: ListPage) {
		self.buffer.extend(page.keys);

		match page.next_cursor {
			Some(cursor) if page.has_more => self.query.cursor = Some(cursor),
			// `has_more` without a cursor cannot be resumed; stop instead of looping.
			_ => self.done = true,
		}
	}

	pub(crate) fn finish(&mut self) {
		self.buffer.clear();
		self.done = true;
	}
}
