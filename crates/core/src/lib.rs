#![deny(missing_docs)]
//! Convgen core: Ruby code beautifier, source literals and diagnostics.

/// Re-indentation and structural checks for Ruby code.
pub mod beautify;
/// Core error and diagnostic types.
pub mod error;
/// Ruby literal and indentation helpers.
pub mod literal;
/// Scans compiled code for references to template-engine internals.
pub mod scan;

pub use beautify::{FormatOptions, check_syntax, format_code, is_syntactically_valid, pretty_print};
pub use error::{Diagnostic, Diagnostics, SyntaxError};
pub use literal::{indent, string_literal, symbol_literal};
pub use scan::find_namespace_references;
