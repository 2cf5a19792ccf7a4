use std::path::Path;

use anyhow::Result;
use opac_client::config::CatalogConfig;

use crate::config::{save_config, CliConfig};

/// Print the effective configuration as TOML, optionally saving it to `path`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized or saved.
pub fn run_config(catalog: &CatalogConfig, path: &Path, save: bool) -> Result<()> {
    let cfg = CliConfig {
        catalog: catalog.clone(),
    };
    if save {
        save_config(&cfg, path)?;
        println!("# saved to {}", path.display());
    } else {
        println!("# {}", path.display());
    }
    print!("{}", toml::to_string(&cfg)?);
    Ok(())
}
