//! `adr new` command implementation.

use adr_config::{CliSettings, Config};
use adr_site::{AdrCreator, NewAdr};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;
use crate::settings::{CommonArgs, site_config};

/// Arguments for the new command.
#[derive(Args)]
pub(crate) struct NewArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Title of the decision; several words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    title: Vec<String>,

    /// Initial status.
    #[arg(long, default_value = "Proposed")]
    status: String,

    /// Overwrite an existing file with the same name.
    #[arg(short, long)]
    force: bool,
}

impl NewArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.common.source_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.common.config.as_deref(), Some(&cli_settings))?;
        let site = site_config(&config);

        let adr = NewAdr {
            title: self.title.join(" "),
            status: self.status,
            force: self.force,
        };
        let path = AdrCreator::new(&site).create(&adr)?;

        output.success(&format!("Created {}", path.display()));
        Ok(())
    }
}
