mod check;
mod eval;
mod rate;

use std::path::PathBuf;

use relocost_storage::MemoryTableStore;

use crate::config::Config;

pub(crate) use check::cmd_check;
pub(crate) use eval::cmd_eval;
pub(crate) use rate::{cmd_rate, RateArgs};

/// The tables file to load: the flag wins over `[store] path`.
fn tables_path(flag: Option<PathBuf>, config: &Config) -> Option<PathBuf> {
    flag.or_else(|| config.store.path.clone())
}

fn load_store(path: &std::path::Path) -> Result<MemoryTableStore, String> {
    let store = MemoryTableStore::load(path).map_err(|e| e.to_string())?;
    tracing::debug!(path = %path.display(), "loaded tables");
    Ok(store)
}
