//! Anonymous catalog client for Koha-style library systems.
//!
//! [`client::HttpCatalogClient`] searches the structured REST endpoint and
//! falls back to scraping the OPAC web pages; [`demo::DemoCatalog`] serves a
//! fixed sample collection with no network at all.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod demo;
pub mod error;
pub mod normalize;
pub mod source;
pub mod transport;
