use thiserror::Error;

/// Structural problem found while checking Ruby source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    /// Line number (1-indexed) where the problem was detected.
    pub line: usize,
    /// Human readable description, phrased like Ruby's own parser errors.
    pub message: String,
}

impl SyntaxError {
    /// Create a syntax error at the given line.
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Non-fatal findings reported while compiling a converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A compiled fragment refers to a constant from the template engine's own
    /// namespace, so the generated converter would need the engine at runtime.
    LeakedConstant {
        /// Template the fragment was compiled from.
        template: String,
        /// The constant path as it appears in the fragment, e.g. `::Slim::Helpers`.
        constant: String,
    },
    /// Two templates map to the same transform name; the later one wins when
    /// the generated class is loaded.
    DuplicateTransform {
        /// Transform name shared by both templates.
        name: String,
        /// Template that redefines the transform.
        template: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::LeakedConstant { template, constant } => write!(
                f,
                "Compiled template '{}' references constant {}",
                template, constant
            ),
            Diagnostic::DuplicateTransform { name, template } => write!(
                f,
                "Template '{}' redefines transform '{}'",
                template, name
            ),
        }
    }
}

/// Collection of diagnostics gathered during one compile run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// List of non-fatal warnings, in discovery order.
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the collection
    pub fn add_warning(&mut self, warning: Diagnostic) {
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Total number of diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    /// Iterate over the collected warnings
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.warnings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::new(3, "unexpected `end`");
        assert_eq!(err.to_string(), "line 3: unexpected `end`");
    }

    #[test]
    fn test_diagnostics_collection() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_warnings());

        diagnostics.add_warning(Diagnostic::LeakedConstant {
            template: "paragraph.html.slim".into(),
            constant: "::Slim::Helpers".into(),
        });
        diagnostics.add_warning(Diagnostic::DuplicateTransform {
            name: "paragraph".into(),
            template: "block_paragraph.html.slim".into(),
        });

        assert!(diagnostics.has_warnings());
        assert_eq!(diagnostics.count(), 2);
        assert_eq!(
            diagnostics.warnings[0].to_string(),
            "Compiled template 'paragraph.html.slim' references constant ::Slim::Helpers"
        );
        assert_eq!(
            diagnostics.iter().nth(1).map(ToString::to_string).as_deref(),
            Some("Template 'block_paragraph.html.slim' redefines transform 'paragraph'")
        );
    }
}
