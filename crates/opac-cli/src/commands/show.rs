use anyhow::Result;
use log::warn;
use opac_client::client::CatalogClient;
use opac_client::config::CatalogConfig;
use opac_core::record::RawRecord;
use opac_core::types::RecordId;

use super::cancellable;
use crate::render;

/// Print the full record for `id` with its holdings.
///
/// A holdings failure is reported inline; the record is still shown.
///
/// # Errors
///
/// Returns an error if the record cannot be fetched or the user cancels.
pub async fn run_show(client: &dyn CatalogClient, config: &CatalogConfig, id: RecordId) -> Result<()> {
    let detail = cancellable(client.get_detail(id)).await?;
    let holdings = match cancellable(async { Ok(client.get_holdings(id).await) }).await? {
        Ok(holdings) => holdings,
        Err(e) => {
            warn!("holdings for {id}: {e}");
            println!("Holdings: {}", render::describe_error(&e));
            Vec::new()
        }
    };
    print!("{}", render::header(config));
    print!("{}", render::detail(&detail, &holdings, &config.call_number_label));
    Ok(())
}

/// Print the raw MARC record for `id`.
///
/// # Errors
///
/// Returns an error if the record cannot be fetched or the user cancels.
pub async fn run_marc(client: &dyn CatalogClient, id: RecordId) -> Result<()> {
    let detail = cancellable(client.get_detail(id)).await?;
    match &detail.raw {
        RawRecord::Marc(record) => print!("{record}"),
        RawRecord::OpacPage { url } => {
            println!("No MARC record available; details were read from {url}");
        }
    }
    Ok(())
}
