//! Domain types and pure functions. No I/O, no async.

pub mod error;
pub mod profile;
pub mod template;
