//! Page templates.
//!
//! Default templates are compiled into the binary. A configured templates
//! directory overrides any of them by file name.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use minijinja::{Environment, Value, context};

use crate::renderer::RenderError;
use crate::settings::{SiteConfig, StatusStyle};

/// Embedded default templates, by name.
const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("adr.html", include_str!("../templates/adr.html")),
    ("search.html", include_str!("../templates/search.html")),
    ("docs.html", include_str!("../templates/docs.html")),
];

/// Template environment with the site helpers registered.
///
/// Helpers available to templates:
///
/// - `status_class(status)`, `status_icon(status)`, `status_color(status)`
/// - `records|group_by_category`: `[{name, adrs}]` sorted by category name
/// - `value is containing(needle)`: case-insensitive substring test
pub struct TemplateEngine {
    env: Environment<'static>,
    executions: AtomicUsize,
}

impl TemplateEngine {
    /// Create the environment, applying overrides from `config.templates_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if an override cannot be read and
    /// [`RenderError::Template`] if a template does not compile.
    pub fn new(config: &SiteConfig) -> Result<Self, RenderError> {
        let mut env = Environment::new();

        for (name, source) in DEFAULT_TEMPLATES {
            let source = match &config.templates_dir {
                Some(dir) => read_override(dir, name)?.unwrap_or_else(|| (*source).to_owned()),
                None => (*source).to_owned(),
            };
            env.add_template_owned(*name, source)
                .map_err(|source| RenderError::Template {
                    template: (*name).to_owned(),
                    source,
                })?;
        }

        register_helpers(&mut env, config);

        Ok(Self {
            env,
            executions: AtomicUsize::new(0),
        })
    }

    /// Render a template with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if the template is unknown or fails.
    pub fn render(&self, name: &str, ctx: Value) -> Result<String, RenderError> {
        self.executions.fetch_add(1, Ordering::Relaxed);
        let template_err = |source| RenderError::Template {
            template: name.to_owned(),
            source,
        };
        self.env
            .get_template(name)
            .map_err(template_err)?
            .render(ctx)
            .map_err(template_err)
    }

    /// Number of template executions so far.
    #[must_use]
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::Relaxed)
    }
}

fn read_override(dir: &Path, name: &str) -> Result<Option<String>, RenderError> {
    let path = dir.join(name);
    if !path.is_file() {
        return Ok(None);
    }
    tracing::debug!(path = %path.display(), "Using template override");
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|source| RenderError::Io { path, source })
}

fn register_helpers(env: &mut Environment<'static>, config: &SiteConfig) {
    let site = Arc::new(config.clone());
    let style_fn = |pick: fn(&StatusStyle) -> &str| {
        let site = Arc::clone(&site);
        move |status: &str| -> String { pick(&site.status_style(status)).to_owned() }
    };
    env.add_function("status_class", style_fn(|s| s.css_class.as_str()));
    env.add_function("status_icon", style_fn(|s| s.icon.as_str()));
    env.add_function("status_color", style_fn(|s| s.color.as_str()));

    let default_category = config.default_category().to_owned();
    env.add_filter("group_by_category", move |records: Vec<Value>| -> Value {
        let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for record in records {
            let category = record
                .get_attr("category")
                .ok()
                .and_then(|v| v.as_str().map(str::to_owned))
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| default_category.clone());
            groups.entry(category).or_default().push(record);
        }
        groups
            .into_iter()
            .map(|(name, adrs)| context! { name => name, adrs => adrs })
            .collect::<Vec<_>>()
            .into()
    });

    env.add_test("containing", |value: &str, needle: &str| -> bool {
        value.to_lowercase().contains(&needle.to_lowercase())
    });
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn engine_with(dir: &Path, name: &str, source: &str) -> TemplateEngine {
        std::fs::write(dir.join(name), source).unwrap();
        let mut config = SiteConfig::new("adr");
        config.templates_dir = Some(dir.to_path_buf());
        TemplateEngine::new(&config).unwrap()
    }

    #[test]
    fn test_default_templates_compile() {
        let engine = TemplateEngine::new(&SiteConfig::new("adr")).unwrap();
        for (name, _) in DEFAULT_TEMPLATES {
            assert!(engine.env.get_template(name).is_ok(), "{name}");
        }
        assert_eq!(engine.executions(), 0);
    }

    #[test]
    fn test_status_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_with(
            dir.path(),
            "index.html",
            "{{ status_class('Accepted') }} {{ status_icon('Deprecated') }} {{ status_color('Nope') }}",
        );
        let html = engine.render("index.html", context! {}).unwrap();
        assert_eq!(html, "bg-green-500 ✗ gray");
        assert_eq!(engine.executions(), 1);
    }

    #[test]
    fn test_status_helpers_follow_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "{{ status_icon('Draft') }} {{ status_class('Draft') }} {{ status_icon('Nope') }}",
        )
        .unwrap();
        let mut config = SiteConfig::new("adr");
        config.templates_dir = Some(dir.path().to_path_buf());
        config
            .status_styles
            .insert("Draft".to_owned(), StatusStyle::new("✎", "blue", "bg-blue-500"));
        let engine = TemplateEngine::new(&config).unwrap();

        let html = engine.render("index.html", context! {}).unwrap();
        assert_eq!(html, format!("✎ bg-blue-500 {}", config.status_style("Nope").icon));
    }

    #[test]
    fn test_group_by_category_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_with(
            dir.path(),
            "index.html",
            "{% for group in adrs|group_by_category %}{{ group.name }}:{% for a in group.adrs %}{{ a.number }}{% endfor %};{% endfor %}",
        );
        let adrs = vec![
            context! { number => "0001", category => "Security" },
            context! { number => "0002", category => "" },
            context! { number => "0003", category => "Data Management" },
            context! { number => "0004", category => "Security" },
        ];
        let html = engine.render("index.html", context! { adrs }).unwrap();
        assert_eq!(html, "Data Management:0003;General:0002;Security:00010004;");
    }

    #[test]
    fn test_containing_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_with(
            dir.path(),
            "search.html",
            "{{ 'Use Postgres' is containing('postgres') }} {{ 'x' is containing('y') }}",
        );
        let html = engine.render("search.html", context! {}).unwrap();
        assert_eq!(html, "true false");
    }

    #[test]
    fn test_unknown_template() {
        let engine = TemplateEngine::new(&SiteConfig::new("adr")).unwrap();
        let err = engine.render("missing.html", context! {}).unwrap_err();
        assert!(matches!(err, RenderError::Template { template, .. } if template == "missing.html"));
    }

    #[test]
    fn test_broken_override_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("adr.html"), "{% if %}").unwrap();
        let mut config = SiteConfig::new("adr");
        config.templates_dir = Some(dir.path().to_path_buf());
        let err = TemplateEngine::new(&config).err().unwrap();
        assert!(matches!(err, RenderError::Template { template, .. } if template == "adr.html"));
    }
}
