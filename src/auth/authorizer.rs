//! Scope authorization for validated tokens.

// self
use crate::{
	_prelude::*,
	auth::{AuthError, ScopeSet, TokenRecord},
};

/// Succeeds iff `record` holds every scope in `required`.
///
/// On failure the error lists exactly the missing scopes, sorted.
pub fn authorize(record: &TokenRecord, required: &ScopeSet) -> Result<(), AuthError> {
	let missing = record.scopes.missing(required);

	if missing.is_empty() { Ok(()) } else { Err(AuthError::Forbidden { missing }) }
}

/// Checks the scope an object route requires for `method`.
///
/// Methods without a route scope are let through so the router can answer them itself.
pub fn authorize_route(record: &TokenRecord, method: &Method) -> Result<(), AuthError> {
	match route_scope(method) {
		Some(scope) => authorize(record, &ScopeSet::single(scope)),
		None => Ok(()),
	}
}

/// Scope an object route requires for `method`, if the method is routed at all.
pub fn route_scope(method: &Method) -> Option<&'static str> {
	match *method {
		Method::GET | Method::HEAD => Some(ScopeSet::READ),
		Method::PUT => Some(ScopeSet::WRITE),
		Method::DELETE => Some(ScopeSet::DELETE),
		_ => None,
	}
}
