//! `relocost.toml` configuration.
//!
//! ```toml
//! [store]
//! path = "tables.json"
//!
//! [rates]
//! tenant = "acme"
//! default_limit = 10
//! ```
//!
//! Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_CONFIG_FILE: &str = "relocost.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub rates: RatesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StoreConfig {
    /// Table fixture JSON file. Relative paths resolve against the config
    /// file's directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RatesConfig {
    pub tenant: Option<String>,
    pub default_limit: Option<usize>,
}

/// Load configuration.
///
/// An explicit path must exist. Without one, `./relocost.toml` is read if
/// present and defaults are used otherwise.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<Config, String> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                read_config(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

pub(crate) fn read_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    let mut config: Config = toml::from_str(&content)
        .map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;

    if let (Some(store_path), Some(dir)) = (&config.store.path, path.parent()) {
        if store_path.is_relative() && !dir.as_os_str().is_empty() {
            config.store.path = Some(dir.join(store_path));
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn full_file() {
        let config: Config = toml::from_str(
            r#"
            [store]
            path = "tables.json"

            [rates]
            tenant = "acme"
            default_limit = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.store.path, Some(PathBuf::from("tables.json")));
        assert_eq!(config.rates.tenant.as_deref(), Some("acme"));
        assert_eq!(config.rates.default_limit, Some(10));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Config, _> = toml::from_str("[store]\nurl = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/relocost.toml"))).unwrap_err();
        assert!(err.contains("could not read"));
    }
}
