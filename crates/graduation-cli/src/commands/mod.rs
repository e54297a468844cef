//! CLI Command Implementations
//!
//! - [`serve`]: run the prediction form server
//! - [`predict`]: one-shot prediction from flags

mod predict;
mod serve;

pub use predict::PredictCommand;
pub use serve::ServeCommand;

use anyhow::{Context, Result};
use graduation_serving::ServerConfig;
use std::path::Path;

/// Read and validate the optional configuration file, falling back to the
/// defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<ServerConfig> {
    let Some(path) = path else {
        return Ok(ServerConfig::default());
    };
    let config = ServerConfig::from_json_file(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(config)
}
