//! Detection of template-engine internals left in compiled code.

use regex::Regex;

/// Finds absolute constant references (`::Slim::Helpers`, `::Temple::Utils`)
/// into any of `namespaces`, in order of first appearance and without repeats.
///
/// Returns an empty list when `namespaces` is empty.
///
/// # Examples
///
/// ```
/// use convgen_core::scan::find_namespace_references;
///
/// let code = "_buf << ::Temple::Utils.escape_html(x); ::Slim::Helpers; ::Temple::Utils";
/// assert_eq!(
///     find_namespace_references(code, &["Slim", "Temple"]),
///     vec!["::Temple::Utils", "::Slim::Helpers"],
/// );
/// ```
pub fn find_namespace_references(code: &str, namespaces: &[&str]) -> Vec<String> {
    if namespaces.is_empty() {
        return Vec::new();
    }
    let alternatives = namespaces
        .iter()
        .map(|ns| regex::escape(ns))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"::(?:{alternatives})(?:::\w+)*\b");
    let Ok(re) = Regex::new(&pattern) else {
        log::warn!("cannot build namespace pattern from {:?}", namespaces);
        return Vec::new();
    };

    let mut found: Vec<String> = Vec::new();
    for m in re.find_iter(code) {
        if !found.iter().any(|f| f == m.as_str()) {
            found.push(m.as_str().to_string());
        }
    }
    found
}
