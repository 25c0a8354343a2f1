//! Default frontend assets for generated ADR sites.
//!
//! The stylesheet and scripts under `assets/` are compiled into the binary.
//! They are used when a project has no static directory of its own: the
//! static build writes them to `<output>/static/` and the development server
//! serves them under `/static/`.

use std::borrow::Cow;
use std::io;
use std::path::Path;

#[derive(rust_embed::RustEmbed)]
#[folder = "assets"]
#[prefix = ""]
struct Assets;

/// Get an embedded asset by path relative to `assets/`, e.g. `css/main.css`.
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Iterate all embedded asset paths.
pub fn iter() -> impl Iterator<Item = Cow<'static, str>> {
    Assets::iter()
}

/// Return the MIME type string for the given file path.
pub fn mime_for(path: &str) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}

/// Write every embedded asset below `dir`, creating directories as needed.
///
/// Returns the number of files written.
///
/// # Errors
///
/// Returns the first I/O error encountered.
pub fn write_all(dir: &Path) -> io::Result<usize> {
    let mut written = 0;
    for path in iter() {
        let Some(data) = get(&path) else {
            continue;
        };
        let target = dir.join(path.as_ref());
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, data)?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_known_types() {
        assert_eq!(mime_for("css/main.css"), "text/css");
        assert_eq!(mime_for("js/main.js"), "text/javascript");
        assert_eq!(mime_for("index.html"), "text/html");
        assert_eq!(mime_for("logo.png"), "image/png");
    }

    #[test]
    fn test_mime_for_unknown_type() {
        assert_eq!(mime_for("file.unknown_ext_xyz"), "application/octet-stream");
    }

    #[test]
    fn test_default_assets_embedded() {
        let paths: Vec<_> = iter().collect();
        assert!(paths.iter().any(|p| p == "css/main.css"));
        assert!(paths.iter().any(|p| p == "js/main.js"));

        let js = get("js/main.js").unwrap();
        let js = std::str::from_utf8(&js).unwrap();
        assert!(js.contains("function openDiagramFullscreen"));
        assert!(js.contains("function copyDiagramSource"));
    }

    #[test]
    fn test_get_nonexistent_asset() {
        assert!(get("nonexistent_file_that_does_not_exist.txt").is_none());
    }

    #[test]
    fn test_write_all() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_all(dir.path()).unwrap();
        assert_eq!(written, iter().count());
        assert!(dir.path().join("css/main.css").is_file());
        assert!(dir.path().join("js/main.js").is_file());
    }
}
