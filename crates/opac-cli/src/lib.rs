//! opac-term command-line front end: subcommands, settings and rendering.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

/// CLI subcommand implementations.
pub mod commands;
/// CLI configuration, read/write `~/.config/opac-term/config.toml`.
pub mod config;
pub mod render;
