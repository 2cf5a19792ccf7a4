//! Core domain types for the opac-term catalog client.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod call_number;
pub mod holding;
pub mod marc;
pub mod page;
pub mod query;
pub mod record;
pub mod types;
