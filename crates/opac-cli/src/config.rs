//! CLI configuration: read/write `~/.config/opac-term/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use opac_client::config::CatalogConfig;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured base URL.
pub const BASE_URL_ENV: &str = "OPAC_BASE_URL";

/// Persisted CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Catalog connection and display settings.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Values given on the command line, applied over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--server`.
    pub server: Option<String>,
    /// `--library`.
    pub library: Option<String>,
}

/// Return the default path for the CLI config file.
///
/// Uses `$XDG_CONFIG_HOME/opac-term/config.toml` when set, otherwise
/// `~/.config/opac-term/config.toml`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_owned());
            PathBuf::from(home).join(".config")
        });
    base.join("opac-term").join("config.toml")
}

/// Write `cfg` to `path`, creating parent directories if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn save_config(cfg: &CliConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string(cfg)?)?;
    Ok(())
}

/// Load and deserialize a [`CliConfig`] from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialized.
pub fn load_config(path: &Path) -> Result<CliConfig> {
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

/// Build the effective catalog settings: file, then `env_base_url`, then
/// `overrides`. A missing file means defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed, or if the
/// resulting settings are invalid.
pub fn resolve_config(
    path: &Path,
    env_base_url: Option<String>,
    overrides: &Overrides,
) -> Result<CatalogConfig> {
    let mut cfg = if path.exists() {
        load_config(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        debug!("no config at {}, using defaults", path.display());
        CliConfig::default()
    };
    if let Some(url) = env_base_url.filter(|u| !u.trim().is_empty()) {
        debug!("{BASE_URL_ENV} overrides base URL");
        cfg.catalog.base_url = url;
    }
    if let Some(server) = &overrides.server {
        cfg.catalog.base_url.clone_from(server);
    }
    if let Some(library) = &overrides.library {
        cfg.catalog.library_name.clone_from(library);
    }
    cfg.catalog.validate()?;
    Ok(cfg.catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opac_core::call_number::CallNumberDisplay;
    use tempfile::tempdir;

    #[test]
    fn config_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("opac-term").join("config.toml");
        let cfg = CliConfig {
            catalog: CatalogConfig {
                base_url: "https://catalog.example.org".to_owned(),
                call_number_display: CallNumberDisplay::Dewey,
                call_number_label: "Shelfmark".to_owned(),
                ..CatalogConfig::default()
            },
        };
        save_config(&cfg, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[catalog]\npage_size = 25\n").unwrap();

        let cfg = resolve_config(&path, None, &Overrides::default()).unwrap();

        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.call_number_label, "Call Number");
    }

    #[test]
    fn flags_beat_environment_beat_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[catalog]\nbase_url = \"https://file.example.org\"\n").unwrap();

        let from_env = resolve_config(
            &path,
            Some("https://env.example.org".to_owned()),
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(from_env.base_url, "https://env.example.org");

        let overrides = Overrides {
            server: Some("https://flag.example.org".to_owned()),
            library: Some("Midway Public Library".to_owned()),
        };
        let from_flag =
            resolve_config(&path, Some("https://env.example.org".to_owned()), &overrides).unwrap();
        assert_eq!(from_flag.base_url, "https://flag.example.org");
        assert_eq!(from_flag.library_name, "Midway Public Library");
    }

    #[test]
    fn invalid_server_is_rejected() {
        let dir = tempdir().unwrap();
        let overrides = Overrides {
            server: Some("not a url".to_owned()),
            library: None,
        };
        assert!(resolve_config(&dir.path().join("missing.toml"), None, &overrides).is_err());
    }
}
