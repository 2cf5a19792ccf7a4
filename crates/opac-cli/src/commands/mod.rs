use std::future::Future;

use anyhow::{anyhow, bail, Result};
use opac_client::error::CatalogError;

use crate::render::describe_error;

/// `opac libraries`.
pub mod libraries;
/// `opac search`.
pub mod search;
/// `opac config`.
pub mod settings;
/// `opac show` and `opac marc`.
pub mod show;

/// Await `request` unless Ctrl-C arrives first; the pending response is then
/// dropped.
///
/// # Errors
///
/// Returns the catalog error as a one-line message, or `cancelled`.
pub async fn cancellable<T>(request: impl Future<Output = Result<T, CatalogError>>) -> Result<T> {
    tokio::select! {
        result = request => result.map_err(|e| anyhow!(describe_error(&e))),
        _ = tokio::signal::ctrl_c() => bail!("cancelled"),
    }
}
