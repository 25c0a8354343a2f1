//! Configuration management for the ADR site generator.
//!
//! Parses `adr.toml` with serde and discovers the file in the current
//! directory or any of its parents. Values given on the command line are
//! applied on top through [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` references are expanded in:
//! - `server.host`
//! - `site.base_url`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "adr.toml";

/// CLI settings that override configuration file values.
///
/// Only `Some` fields take effect.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the ADR source directory.
    pub source_dir: Option<PathBuf>,
    /// Override the static build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the public base URL.
    pub base_url: Option<String>,
    /// Override the render cache flag.
    pub cache_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Development server settings.
    pub server: ServerConfig,
    /// Paths as written in the file, relative to the config directory.
    paths: PathsConfigRaw,
    /// Rendering settings.
    pub site: SiteSettings,
    /// Category allow-list.
    pub categories: CategoriesConfig,
    /// Status allow-list and presentation.
    pub statuses: StatusesConfig,

    /// Resolved absolute paths (set after loading).
    #[serde(skip)]
    pub paths_resolved: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Development server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PathsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    readme: Option<String>,
    static_dir: Option<String>,
    templates_dir: Option<String>,
}

/// Resolved filesystem locations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    /// Directory holding the `NNNN-title.md` records.
    pub source_dir: PathBuf,
    /// Directory the static build writes to.
    pub output_dir: PathBuf,
    /// Project README rendered as the documentation page.
    pub readme: PathBuf,
    /// Directory copied to `<output>/static/` and served under `/static/`.
    pub static_dir: PathBuf,
    /// Optional directory with template overrides.
    pub templates_dir: Option<PathBuf>,
}

/// Rendering settings from the `[site]` section.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SiteSettings {
    /// Prefix for generated links. Empty means root-relative links.
    pub base_url: String,
    /// Whether rendered pages are cached in memory.
    pub cache_enabled: bool,
    /// Abort the whole load when one record fails to convert.
    pub fail_fast: bool,
    /// Fenced code block languages treated as diagrams.
    pub diagram_languages: Vec<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            cache_enabled: true,
            fail_fast: true,
            diagram_languages: vec!["mermaid".to_owned()],
        }
    }
}

/// Category allow-list from the `[categories]` section.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CategoriesConfig {
    /// Category used when a record names none or an unknown one.
    pub default: String,
    /// Accepted category names.
    pub allowed: Vec<String>,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            default: "General".to_owned(),
            allowed: [
                "Core Architecture",
                "Data Management",
                "Frontend Development",
                "Security",
                "Infrastructure",
                "General",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        }
    }
}

impl CategoriesConfig {
    /// Check whether `category` is in the allow-list (exact match).
    #[must_use]
    pub fn is_valid(&self, category: &str) -> bool {
        self.allowed.iter().any(|allowed| allowed == category)
    }
}

/// Visual representation of one status.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StatusStyle {
    /// Short glyph shown next to the status.
    pub icon: String,
    /// Color name.
    pub color: String,
    /// CSS class applied to status badges.
    pub css_class: String,
}

impl StatusStyle {
    fn new(icon: &str, color: &str, css_class: &str) -> Self {
        Self {
            icon: icon.to_owned(),
            color: color.to_owned(),
            css_class: css_class.to_owned(),
        }
    }
}

/// Status allow-list from the `[statuses]` section.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StatusesConfig {
    /// Accepted status values.
    pub allowed: Vec<String>,
    /// Per-status presentation, keyed by status text.
    pub styles: BTreeMap<String, StatusStyle>,
}

impl Default for StatusesConfig {
    fn default() -> Self {
        let styles = [
            ("Accepted", StatusStyle::new("✓", "green", "bg-green-500")),
            ("Proposed", StatusStyle::new("●", "yellow", "bg-yellow-500")),
            ("Deprecated", StatusStyle::new("✗", "red", "bg-red-500")),
            ("Superseded", StatusStyle::new("↑", "purple", "bg-purple-500")),
        ]
        .into_iter()
        .map(|(name, style)| (name.to_owned(), style))
        .collect();

        Self {
            allowed: ["Proposed", "Accepted", "Deprecated", "Superseded"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            styles,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.base_url`").
        field: String,
        /// Error message (e.g., "${`ADR_BASE_URL`} is not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Base URL must be empty, an absolute http(s) URL, or a root-relative path.
fn require_base_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if url.is_empty()
        || url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with('/')
    {
        return Ok(());
    }
    Err(ConfigError::Validation(format!(
        "{field} must be empty, start with http:// or https://, or start with /"
    )))
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `adr.toml` in the current directory and its parents, falling back
    /// to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, the file
    /// cannot be parsed, or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.paths_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.paths_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(base_url) = &settings.base_url {
            self.site.base_url.clone_from(base_url);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.site.cache_enabled = cache_enabled;
        }
    }

    /// Search for the config file in the current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to `base`.
    fn default_with_base(base: &Path) -> Self {
        let raw = PathsConfigRaw::default();
        Self {
            server: ServerConfig::default(),
            paths_resolved: raw.resolve(base),
            paths: raw,
            site: SiteSettings::default(),
            categories: CategoriesConfig::default(),
            statuses: StatusesConfig::default(),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.paths_resolved = config.paths.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any check fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_site()?;
        self.validate_categories()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_base_url(&self.site.base_url, "site.base_url")?;
        for language in &self.site.diagram_languages {
            require_non_empty(language, "site.diagram_languages")?;
        }
        Ok(())
    }

    fn validate_categories(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.categories.default, "categories.default")?;
        if !self.categories.is_valid(&self.categories.default) {
            return Err(ConfigError::Validation(format!(
                "categories.default \"{}\" is not listed in categories.allowed",
                self.categories.default
            )));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.site.base_url = expand::expand_env(&self.site.base_url, "site.base_url")?;
        Ok(())
    }
}

impl PathsConfigRaw {
    fn resolve(&self, base: &Path) -> PathsConfig {
        let resolve = |path: Option<&str>, default: &str| base.join(path.unwrap_or(default));
        PathsConfig {
            source_dir: resolve(self.source_dir.as_deref(), "adr"),
            output_dir: resolve(self.output_dir.as_deref(), "docs"),
            readme: resolve(self.readme.as_deref(), "README.md"),
            static_dir: resolve(self.static_dir.as_deref(), "static"),
            templates_dir: self.templates_dir.as_deref().map(|dir| base.join(dir)),
        }
    }
}
