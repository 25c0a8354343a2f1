//! End-to-end tests: record directory in, static site out.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use adr_cache::MemoryCache;
use adr_site::{
    BuildStats, PageKind, PageRenderer, RenderError, SEARCH_INDEX_FILE, SearchIndex, SiteBuilder,
    SiteConfig, load_collection,
};
use pretty_assertions::assert_eq;

const POSTGRES: &str = "# Use Postgres\n\n## Status\n\nAccepted\n\n## Context\n\nWe need a relational store.\n\n## Decision\n\nUse Postgres 16.\n\n## Consequences\n\nOperations owns backups.\n";

const EVENTS: &str = "# Event Bus\n\nCategory: Infrastructure\n\n## Status\n\nProposed\n\n## Context\n\nBuilds on [storage](0001-use-postgres.md).\n\n```mermaid\nsequenceDiagram\n  A->>B: publish\n```\n\n## Decision\n\nNATS.\n\n## Consequences\n\nAnother service.\n";

fn write_records(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("0001-use-postgres.md"), POSTGRES).unwrap();
    fs::write(dir.join("0002-event-bus.md"), EVENTS).unwrap();
    fs::write(dir.join("template.md"), "# Template\n").unwrap();
}

#[test]
fn test_load_and_render_record() {
    let root = tempfile::tempdir().unwrap();
    let source = root.path().join("adr");
    write_records(&source);

    let config = SiteConfig::new(&source);
    let collection = Arc::new(load_collection(&source, &config).unwrap());
    assert_eq!(collection.len(), 2);

    let record = &collection.records()[0];
    assert_eq!(record.number, "0001");
    assert_eq!(record.title, "Use Postgres");
    assert_eq!(record.status, "Accepted");

    let renderer = PageRenderer::new(collection, &config, &MemoryCache::new()).unwrap();
    let html = renderer.render(&PageKind::Adr("0001".to_owned())).unwrap().html;
    assert!(html.contains("Use Postgres"));
    assert!(html.contains("bg-green-500"));
    assert!(html.contains("✓ Accepted"));

    let events = renderer.render(&PageKind::Adr("0002".to_owned())).unwrap().html;
    assert!(events.contains(r#"<a href="/adr-0001.html">storage</a>"#));
    assert!(events.contains(r#"id="diagram-1""#));

    let err = renderer.render(&PageKind::Adr("0099".to_owned())).unwrap_err();
    assert!(matches!(err, RenderError::NotFound(_)));
}

#[test]
fn test_build_writes_site() {
    let root = tempfile::tempdir().unwrap();
    let source = root.path().join("adr");
    let output = root.path().join("docs");
    write_records(&source);
    fs::write(root.path().join("README.md"), "# Project\n\nDocs.\n").unwrap();

    let mut config = SiteConfig::new(&source);
    config.readme_path = root.path().join("README.md");
    let stats = SiteBuilder::new(config, &output).build().unwrap();

    assert_eq!(
        stats,
        BuildStats {
            adr_count: 2,
            page_count: 5,
            asset_count: adr_assets::iter().count(),
            diagram_count: 1,
        }
    );
    for name in ["index.html", "adr-0001.html", "adr-0002.html", "search.html", "docs.html"] {
        assert!(output.join(name).is_file(), "{name}");
    }
    assert!(output.join("static/css/main.css").is_file());
    assert!(output.join("static/js/main.js").is_file());

    let json = fs::read_to_string(output.join(SEARCH_INDEX_FILE)).unwrap();
    let index: SearchIndex = serde_json::from_str(&json).unwrap();
    assert_eq!(index.generated, 2);
    assert_eq!(index.items[1].diagram_type, "Sequence");
    assert_eq!(index.items[1].url, "adr-0002.html");
}

#[test]
fn test_build_without_readme_skips_docs() {
    let root = tempfile::tempdir().unwrap();
    let source = root.path().join("adr");
    let output = root.path().join("docs");
    write_records(&source);

    let mut config = SiteConfig::new(&source);
    config.readme_path = root.path().join("README.md");
    let stats = SiteBuilder::new(config, &output).build().unwrap();

    assert_eq!(stats.page_count, 4);
    assert!(!output.join("docs.html").exists());
}

#[test]
fn test_build_copies_static_dir() {
    let root = tempfile::tempdir().unwrap();
    let source = root.path().join("adr");
    let output = root.path().join("docs");
    let static_dir = root.path().join("static");
    write_records(&source);
    fs::create_dir_all(static_dir.join("img")).unwrap();
    fs::write(static_dir.join("img/logo.svg"), "<svg/>").unwrap();

    let stats = SiteBuilder::new(SiteConfig::new(&source), &output)
        .with_static_dir(&static_dir)
        .build()
        .unwrap();

    assert_eq!(stats.asset_count, 1);
    assert!(output.join("static/img/logo.svg").is_file());
    assert!(!output.join("static/css/main.css").exists());
}

#[test]
fn test_build_is_deterministic() {
    let root = tempfile::tempdir().unwrap();
    let source = root.path().join("adr");
    write_records(&source);

    let first = root.path().join("first");
    let second = root.path().join("second");
    SiteBuilder::new(SiteConfig::new(&source), &first).build().unwrap();
    SiteBuilder::new(SiteConfig::new(&source), &second).build().unwrap();

    for name in ["index.html", "adr-0002.html", "search.html", SEARCH_INDEX_FILE] {
        assert_eq!(
            fs::read_to_string(first.join(name)).unwrap(),
            fs::read_to_string(second.join(name)).unwrap(),
            "{name}"
        );
    }
}

#[test]
fn test_changed_record_only_invalidates_its_own_page() {
    let root = tempfile::tempdir().unwrap();
    let source = root.path().join("adr");
    write_records(&source);
    let config = SiteConfig::new(&source);
    let cache = MemoryCache::new();

    let before = PageRenderer::new(
        Arc::new(load_collection(&source, &config).unwrap()),
        &config,
        &cache,
    )
    .unwrap();
    for kind in [
        PageKind::Index,
        PageKind::Adr("0001".to_owned()),
        PageKind::Adr("0002".to_owned()),
    ] {
        before.render(&kind).unwrap();
    }

    fs::write(source.join("0002-event-bus.md"), EVENTS.replace("NATS", "Kafka")).unwrap();
    let after = PageRenderer::new(
        Arc::new(load_collection(&source, &config).unwrap()),
        &config,
        &cache,
    )
    .unwrap();

    assert!(after.render(&PageKind::Adr("0001".to_owned())).unwrap().from_cache);
    assert!(!after.render(&PageKind::Adr("0002".to_owned())).unwrap().from_cache);
    assert!(!after.render(&PageKind::Index).unwrap().from_cache);
}
