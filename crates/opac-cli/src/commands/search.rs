use anyhow::Result;
use opac_client::client::CatalogClient;
use opac_client::config::CatalogConfig;
use opac_client::error::CatalogError;
use opac_core::query::{SearchField, SearchQuery};

use super::cancellable;
use crate::render;

/// Search for `terms` and print one page of results.
///
/// # Errors
///
/// Returns an error if the query is unusable, the search fails, or the user
/// cancels.
pub async fn run_search(
    client: &dyn CatalogClient,
    config: &CatalogConfig,
    terms: &[String],
    field: Option<SearchField>,
    page: u32,
) -> Result<()> {
    let term = terms.join(" ");
    let query = SearchQuery::new(&term, field, page, config.page_size)
        .map_err(|e| anyhow::anyhow!(render::describe_error(&CatalogError::from(e))))?;

    let results = cancellable(client.search(&query)).await?;
    print!("{}", render::header(config));
    println!("{} search: {}\n", query.field(), query.term());
    print!("{}", render::results(&results, &config.call_number_label));
    Ok(())
}
