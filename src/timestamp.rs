//! ISO-8601 timestamp handling shared by the token file and the wire types.
//!
//! Timestamps are always written as RFC 3339 in UTC. Reading accepts RFC 3339 with any offset
//! as well as offset-less ISO-8601 date-times, which are interpreted as UTC.

// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
use time::{
	PrimitiveDateTime, UtcOffset,
	format_description::well_known::{Iso8601, Rfc3339},
};
// self
use crate::_prelude::*;

/// Parses an ISO-8601 timestamp, assuming UTC when no offset is present.
pub fn parse(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
	let raw = raw.trim();

	match OffsetDateTime::parse(raw, &Rfc3339) {
		Ok(instant) => Ok(instant),
		Err(rfc_err) => match OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
			Ok(instant) => Ok(instant),
			Err(_) => PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
				.map(PrimitiveDateTime::assume_utc)
				.map_err(|_| rfc_err),
		},
	}
}

/// Formats an instant as RFC 3339 in UTC.
pub fn format(instant: OffsetDateTime) -> Result<String, time::error::Format> {
	instant.to_offset(UtcOffset::UTC).format(&Rfc3339)
}

/// Serde adapter for required timestamps.
pub mod iso8601 {
	// self
	use super::*;

	/// Serializes as RFC 3339 UTC.
	pub fn serialize<S>(instant: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let text = format(*instant).map_err(serde::ser::Error::custom)?;

		serializer.serialize_str(&text)
	}

	/// Deserializes any ISO-8601 date-time, defaulting to UTC.
	pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		parse(&raw).map_err(DeError::custom)
	}

	/// Serde adapter for optional timestamps (`null` maps to `None`).
	pub mod option {
		// self
		use super::*;

		/// Serializes `Some` as RFC 3339 UTC and `None` as `null`.
		pub fn serialize<S>(
			instant: &Option<OffsetDateTime>,
			serializer: S,
		) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			match instant {
				Some(instant) => super::serialize(instant, serializer),
				None => serializer.serialize_none(),
			}
		}

		/// Deserializes an optional ISO-8601 date-time.
		pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
		where
			D: Deserializer<'de>,
		{
			let raw = <Option<String>>::deserialize(deserializer)?;

			raw.map(|raw| parse(&raw).map_err(DeError::custom)).transpose()
		}
	}
}
