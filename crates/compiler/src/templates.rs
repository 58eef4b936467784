//! Template discovery in a templates directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the optional shared helpers file.
pub const HELPERS_FILE: &str = "helpers.rb";

/// Lists template files directly inside `dir`, sorted by file name.
///
/// A template is a regular file whose name ends in `.{extension}` and does not
/// start with `_`. Subdirectories are not searched.
pub fn find_templates(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let suffix = format!(".{extension}");
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            log::debug!("skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if name.starts_with('_') || !name.ends_with(&suffix) {
            continue;
        }
        if entry.path().is_file() {
            found.push(entry.path());
        }
    }
    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(found)
}

/// Derives the transform name from a template path.
///
/// Everything from the first `.` of the file name is dropped, then a leading
/// `block_`.
///
/// # Examples
///
/// ```
/// use convgen_compiler::templates::transform_name_from_path;
/// use std::path::Path;
///
/// assert_eq!(transform_name_from_path(Path::new("t/block_paragraph.html.slim")), "paragraph");
/// assert_eq!(transform_name_from_path(Path::new("inline_anchor.slim")), "inline_anchor");
/// ```
pub fn transform_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    stem.strip_prefix("block_").unwrap_or(stem).to_string()
}

/// Reads `helpers.rb` from `dir`, or returns an empty string when there is
/// none.
pub fn read_helpers(dir: &Path) -> io::Result<String> {
    let path = dir.join(HELPERS_FILE);
    if path.is_file() {
        fs::read_to_string(path)
    } else {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_names() {
        let cases = [
            ("document.html.slim", "document"),
            ("block_paragraph.slim", "paragraph"),
            ("block_.slim", ""),
            ("inline_block_x.slim", "inline_block_x"),
            ("dir/block_block_x.slim", "block_x"),
            ("noext", "noext"),
        ];
        for (path, expected) in cases {
            assert_eq!(transform_name_from_path(Path::new(path)), expected, "{path}");
        }
    }

    #[test]
    fn test_find_templates_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.slim", "a.html.slim", "_partial.slim", "c.erb", "helpers.rb"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.slim")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("d.slim"), "x").unwrap();

        let found = find_templates(dir.path(), "slim").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.html.slim", "b.slim"]);
    }

    #[test]
    fn test_read_helpers_defaults_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_helpers(dir.path()).unwrap(), "");

        fs::write(dir.path().join(HELPERS_FILE), "module Helpers\nend\n").unwrap();
        assert_eq!(read_helpers(dir.path()).unwrap(), "module Helpers\nend\n");
    }
}
