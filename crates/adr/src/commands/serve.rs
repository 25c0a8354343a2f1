//! `adr serve` command implementation.

use adr_config::{CliSettings, Config};
use adr_server::{ServerConfig, run_server};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;
use crate::settings::{CommonArgs, site_config};

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable caching (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable caching.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let cache_enabled = self.resolve_cache_enabled();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            source_dir: self.common.source_dir,
            cache_enabled,
            ..CliSettings::default()
        };
        let config = Config::load(self.common.config.as_deref(), Some(&cli_settings))?;

        output.highlight(&format!(
            "Serving ADRs on http://{}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Source directory: {}",
            config.paths_resolved.source_dir.display()
        ));
        if config.site.cache_enabled {
            output.info("Cache: enabled");
        } else {
            output.info("Cache: disabled");
        }
        output.info("Press Ctrl+C to stop");

        run_server(server_config(&config, version))
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }

    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        self.no_cache.then_some(false).or(self.cache)
    }
}

fn server_config(config: &Config, version: &str) -> ServerConfig {
    let static_dir = &config.paths_resolved.static_dir;
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        static_dir: static_dir.is_dir().then(|| static_dir.clone()),
        version: version.to_owned(),
        ..ServerConfig::new(site_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cache: Option<bool>, no_cache: bool) -> ServeArgs {
        ServeArgs {
            common: CommonArgs::default(),
            host: None,
            port: None,
            cache,
            no_cache,
        }
    }

    #[test]
    fn test_resolve_cache_enabled() {
        assert_eq!(args(None, false).resolve_cache_enabled(), None);
        assert_eq!(args(None, true).resolve_cache_enabled(), Some(false));
        assert_eq!(args(Some(true), false).resolve_cache_enabled(), Some(true));
    }

    #[test]
    fn test_server_config_uses_existing_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adr.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        let server = server_config(&config, "1.2.3");
        assert_eq!(server.port, 9000);
        assert_eq!(server.version, "1.2.3");
        assert_eq!(server.site.source_dir, dir.path().join("adr"));
        assert!(server.static_dir.is_none());

        std::fs::create_dir(dir.path().join("static")).unwrap();
        let server = server_config(&config, "1.2.3");
        assert_eq!(server.static_dir, Some(dir.path().join("static")));
    }
}
