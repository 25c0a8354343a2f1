//! `adr build` command implementation.

use std::path::PathBuf;

use adr_config::{CliSettings, Config};
use adr_site::SiteBuilder;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;
use crate::settings::{CommonArgs, site_config};

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Prefix for generated links (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// Disable the render cache.
    #[arg(long)]
    no_cache: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.common.source_dir,
            output_dir: self.output_dir,
            base_url: self.base_url,
            cache_enabled: self.no_cache.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.common.config.as_deref(), Some(&cli_settings))?;
        let paths = &config.paths_resolved;

        output.info(&format!("Source: {}", paths.source_dir.display()));
        output.info(&format!("Output: {}", paths.output_dir.display()));

        let stats = SiteBuilder::new(site_config(&config), &paths.output_dir)
            .with_static_dir(&paths.static_dir)
            .build()?;

        output.info(&format!(
            "{} ADRs, {} pages, {} assets, {} diagrams",
            stats.adr_count, stats.page_count, stats.asset_count, stats.diagram_count
        ));
        output.success(&format!(
            "Site built successfully to {}",
            paths.output_dir.display()
        ));
        Ok(())
    }
}
