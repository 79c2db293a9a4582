//! Token records, secrets, and the JSON file that stores them.

pub mod file;
pub mod record;
pub mod secret;
