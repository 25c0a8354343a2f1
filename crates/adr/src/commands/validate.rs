//! `adr validate` command implementation.

use adr_config::{CliSettings, Config};
use adr_site::{IssueLevel, ValidationReport, Validator};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;
use crate::settings::{CommonArgs, site_config};

/// Arguments for the validate command.
#[derive(Args)]
pub(crate) struct ValidateArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Also warn about long lines and trailing whitespace.
    #[arg(long)]
    strict: bool,
}

impl ValidateArgs {
    /// Execute the validate command.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Validation`] when any record has errors.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.common.source_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.common.config.as_deref(), Some(&cli_settings))?;
        let site = site_config(&config);

        output.info(&format!("Validating {}", site.source_dir.display()));
        let report = Validator::new(&site, self.strict).validate_dir(&site.source_dir)?;
        print_report(&output, &report);

        if report.has_errors() {
            return Err(CliError::Validation(report.error_count));
        }
        output.success("All ADRs are valid");
        Ok(())
    }
}

fn print_report(output: &Output, report: &ValidationReport) {
    for issue in &report.issues {
        let location = if issue.line == 0 {
            issue.file.clone()
        } else {
            format!("{}:{}", issue.file, issue.line)
        };
        let line = format!("{location}: {}: {}", issue.level, issue.message);
        match issue.level {
            IssueLevel::Error => output.error(&line),
            IssueLevel::Warning => output.warning(&line),
        }
    }
    output.info(&format!(
        "{} files, {} diagrams, {} errors, {} warnings",
        report.file_count, report.diagram_count, report.error_count, report.warning_count
    ));
}
