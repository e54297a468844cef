//! Serve Command Implementation
//!
//! Runs the prediction form over HTTP until Ctrl-C.

use super::load_config;
use anyhow::{Context, Result};
use clap::Args;
use graduation_serving::{Server, ServerConfig, ServerConfigBuilder};
use std::path::PathBuf;
use tracing::info;

/// Serve the prediction form over HTTP
///
/// The model is loaded before the listener is bound; the command exits with
/// an error if the artifact is missing or unreadable.
///
/// # Example
///
/// ```bash
/// graduation serve --model /srv/models/model_graduation.json --port 8501
/// ```
#[derive(Args, Debug, Clone, Default)]
pub struct ServeCommand {
    /// Path to the model artifact
    #[arg(long, short = 'm', env = "GRADUATION_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// Host address to bind to [default: 127.0.0.1]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on [default: 8501]
    #[arg(long, short = 'p', env = "GRADUATION_PORT")]
    pub port: Option<u16>,

    /// JSON configuration file; flags override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

impl ServeCommand {
    /// Resolve the server configuration from the file and the flags.
    pub fn server_config(&self) -> Result<ServerConfig> {
        let mut builder = ServerConfigBuilder::from_config(load_config(self.config.as_deref())?);
        if let Some(model) = &self.model {
            builder = builder.model_path(model.clone());
        }
        if let Some(host) = &self.host {
            builder = builder.host(host.clone());
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        Ok(builder.build())
    }

    /// Execute the serve command
    pub async fn run(&self) -> Result<()> {
        let config = self.server_config()?;
        info!("Model artifact: {:?}", config.model_path);
        info!("Listening on {}", config.socket_addr());

        let server = Server::new(config).context("invalid server configuration")?;
        server.serve().await.context("prediction server failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_come_from_server_config() {
        let config = ServeCommand::default().server_config().unwrap();
        assert_eq!(config.socket_addr(), "127.0.0.1:8501");
        assert_eq!(config.model_path, PathBuf::from("model_graduation.json"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graduation.json");
        std::fs::write(
            &path,
            r#"{"host": "0.0.0.0", "port": 9000, "model_path": "from_file.json"}"#,
        )
        .unwrap();

        let cmd = ServeCommand {
            model: Some(PathBuf::from("from_flag.json")),
            port: Some(9100),
            config: Some(path),
            ..Default::default()
        };
        let config = cmd.server_config().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9100);
        assert_eq!(config.model_path, PathBuf::from("from_flag.json"));
    }

    #[test]
    fn test_unreadable_config_file() {
        let cmd = ServeCommand {
            config: Some(PathBuf::from("/nonexistent/graduation.json")),
            ..Default::default()
        };
        let err = cmd.server_config().unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
