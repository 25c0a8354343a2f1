//! Mapping from the configuration file to library settings.

use std::path::PathBuf;

use adr_config::Config;
use adr_site::{SiteConfig, StatusStyle};
use clap::Args;

/// Options shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover adr.toml).
    #[arg(short, long, env = "ADR_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// ADR source directory (overrides config).
    #[arg(short, long)]
    pub(crate) source_dir: Option<PathBuf>,

    /// Enable verbose output (info-level logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// Build loading and rendering settings from `config`.
pub(crate) fn site_config(config: &Config) -> SiteConfig {
    let paths = &config.paths_resolved;
    tracing::debug!(
        config = ?config.config_path,
        source = %paths.source_dir.display(),
        "Resolved site settings"
    );
    SiteConfig {
        base_url: config.site.base_url.clone(),
        default_category: config.categories.default.clone(),
        allowed_categories: config.categories.allowed.clone(),
        allowed_statuses: config.statuses.allowed.clone(),
        status_styles: config
            .statuses
            .styles
            .iter()
            .map(|(status, style)| {
                (
                    status.clone(),
                    StatusStyle::new(&style.icon, &style.color, &style.css_class),
                )
            })
            .collect(),
        diagram_languages: config.site.diagram_languages.clone(),
        fail_fast: config.site.fail_fast,
        cache_enabled: config.site.cache_enabled,
        templates_dir: paths.templates_dir.clone(),
        readme_path: paths.readme.clone(),
        ..SiteConfig::new(&paths.source_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_site_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adr.toml");
        fs::write(
            &path,
            r#"
[paths]
source_dir = "decisions"
templates_dir = "theme"

[site]
base_url = "/adr"
fail_fast = false
diagram_languages = ["mermaid", "plantuml"]

[statuses]
allowed = ["Draft", "Accepted"]

[statuses.styles.Draft]
icon = "~"
color = "blue"
css_class = "bg-blue-500"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        let site = site_config(&config);

        assert_eq!(site.source_dir, dir.path().join("decisions"));
        assert_eq!(site.templates_dir, Some(dir.path().join("theme")));
        assert_eq!(site.readme_path, dir.path().join("README.md"));
        assert_eq!(site.base_url(), "/adr");
        assert!(!site.fail_fast);
        assert_eq!(site.diagram_languages, ["mermaid", "plantuml"]);
        assert!(site.is_valid_status("Draft"));
        assert!(!site.is_valid_status("Proposed"));
        assert_eq!(site.status_style("Draft").css_class, "bg-blue-500");
        assert_eq!(site.status_style("Accepted").css_class, "bg-gray-500");
    }

    #[test]
    fn test_default_styles_survive_mapping() {
        let site = site_config(&Config::default());
        assert_eq!(site.status_style("Accepted").icon, "✓");
        assert_eq!(site.default_category(), "General");
        assert!(site.cache_enabled);
    }
}
