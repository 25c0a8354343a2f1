//! Read-only site settings consumed by the loader and renderers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use adr_renderer::PipelineConfig;
use serde::Serialize;

/// Display style for a record status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusStyle {
    /// Short symbol shown next to the status.
    pub icon: String,
    /// Color name.
    pub color: String,
    /// CSS class applied to status badges.
    pub css_class: String,
}

impl StatusStyle {
    /// Create a style from its parts.
    #[must_use]
    pub fn new(icon: &str, color: &str, css_class: &str) -> Self {
        Self {
            icon: icon.to_owned(),
            color: color.to_owned(),
            css_class: css_class.to_owned(),
        }
    }

    /// Style used for statuses without a configured style.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new("?", "gray", "bg-gray-500")
    }
}

/// Settings for loading and rendering a collection of records.
///
/// The site crate never reads configuration files; callers build this from
/// their own configuration source.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Directory containing `NNNN-title.md` records.
    pub source_dir: PathBuf,
    /// Prefix for generated links. Empty means root-relative.
    pub base_url: String,
    /// Category assigned when a record has none or an unknown one.
    pub default_category: String,
    /// Accepted category names.
    pub allowed_categories: Vec<String>,
    /// Accepted status names.
    pub allowed_statuses: Vec<String>,
    /// Display style per status.
    pub status_styles: BTreeMap<String, StatusStyle>,
    /// Fence languages treated as diagrams.
    pub diagram_languages: Vec<String>,
    /// Abort the whole load when one record fails to convert.
    pub fail_fast: bool,
    /// Keep rendered pages in memory between requests.
    pub cache_enabled: bool,
    /// Directory with template overrides, matched by file name.
    pub templates_dir: Option<PathBuf>,
    /// Markdown file rendered as the documentation page.
    pub readme_path: PathBuf,
}

impl SiteConfig {
    /// Create settings with default categories, statuses and styles.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        let status_styles = [
            ("Accepted", StatusStyle::new("✓", "green", "bg-green-500")),
            ("Proposed", StatusStyle::new("●", "yellow", "bg-yellow-500")),
            ("Deprecated", StatusStyle::new("✗", "red", "bg-red-500")),
            ("Superseded", StatusStyle::new("↑", "purple", "bg-purple-500")),
        ]
        .into_iter()
        .map(|(name, style)| (name.to_owned(), style))
        .collect();

        Self {
            source_dir: source_dir.into(),
            base_url: String::new(),
            default_category: "General".to_owned(),
            allowed_categories: [
                "Core Architecture",
                "Data Management",
                "Frontend Development",
                "Security",
                "Infrastructure",
                "General",
            ]
            .map(str::to_owned)
            .to_vec(),
            allowed_statuses: ["Proposed", "Accepted", "Deprecated", "Superseded"]
                .map(str::to_owned)
                .to_vec(),
            status_styles,
            diagram_languages: vec!["mermaid".to_owned()],
            fail_fast: true,
            cache_enabled: true,
            templates_dir: None,
            readme_path: PathBuf::from("README.md"),
        }
    }

    /// Whether `category` is in the allow-list.
    #[must_use]
    pub fn is_valid_category(&self, category: &str) -> bool {
        self.allowed_categories.iter().any(|c| c == category)
    }

    /// Whether `status` is in the allow-list.
    #[must_use]
    pub fn is_valid_status(&self, status: &str) -> bool {
        self.allowed_statuses.iter().any(|s| s == status)
    }

    #[must_use]
    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Display style for a status, falling back to [`StatusStyle::unknown`].
    #[must_use]
    pub fn status_style(&self, status: &str) -> StatusStyle {
        self.status_styles
            .get(status)
            .cloned()
            .unwrap_or_else(StatusStyle::unknown)
    }

    /// Settings for the markdown pipeline.
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            base_url: self.base_url.clone(),
            diagram_languages: self.diagram_languages.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allow_lists() {
        let config = SiteConfig::new("adr");
        assert!(config.is_valid_category("Security"));
        assert!(!config.is_valid_category("security"));
        assert!(config.is_valid_status("Superseded"));
        assert_eq!(config.default_category(), "General");
        assert_eq!(config.base_url(), "");
    }

    #[test]
    fn test_status_style_fallback() {
        let config = SiteConfig::new("adr");
        assert_eq!(config.status_style("Accepted").css_class, "bg-green-500");
        assert_eq!(config.status_style("Rejected"), StatusStyle::unknown());
    }

    #[test]
    fn test_pipeline_config() {
        let mut config = SiteConfig::new("adr");
        config.base_url = "https://x.io".to_owned();
        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.base_url, "https://x.io");
        assert_eq!(pipeline.diagram_languages, ["mermaid"]);
    }
}
