use anyhow::Result;
use opac_client::client::CatalogClient;

use super::cancellable;
use crate::render;

/// Print every library code and name.
///
/// # Errors
///
/// Returns an error if the list cannot be fetched or the user cancels.
pub async fn run_libraries(client: &dyn CatalogClient) -> Result<()> {
    let libraries = cancellable(client.get_libraries()).await?;
    print!("{}", render::libraries(&libraries));
    Ok(())
}
