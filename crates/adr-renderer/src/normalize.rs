//! Source normalization applied before markdown parsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::util::fence_marker;

static ATX_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}#{1,6}\s+\S").unwrap());

/// Normalize markdown source.
///
/// - `\r\n` and lone `\r` line endings become `\n`
/// - ATX headings outside fenced code blocks get exactly one blank line
///   before and after them when a neighbouring line is not already blank
///
/// The function is idempotent: `normalize(&normalize(s)) == normalize(s)`.
#[must_use]
pub fn normalize(source: &str) -> String {
    let source = source.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(source.len() + 64);
    let mut open_fence: Option<String> = None;
    let mut previous_blank = true;
    let mut blank_needed = false;

    for line in source.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let is_blank = content.trim().is_empty();

        if let Some(fence) = &open_fence {
            if fence_marker(content).is_some_and(|marker| marker.starts_with(fence.as_str()))
                && content.trim().chars().all(|c| c == '`' || c == '~')
            {
                open_fence = None;
            }
            out.push_str(line);
            previous_blank = is_blank;
            continue;
        }

        if blank_needed && !is_blank {
            out.push('\n');
            previous_blank = true;
        }
        blank_needed = false;

        if let Some(marker) = fence_marker(content) {
            open_fence = Some(marker.to_owned());
        } else if ATX_HEADING.is_match(content) {
            if !previous_blank {
                out.push('\n');
            }
            blank_needed = true;
        }

        out.push_str(line);
        if !line.ends_with('\n') && blank_needed {
            // Heading on the last line: nothing follows it.
            blank_needed = false;
        }
        previous_blank = is_blank;
    }

    out
}
