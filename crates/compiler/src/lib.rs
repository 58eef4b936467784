#![deny(missing_docs)]
//! Convgen compiler: runs a template engine over a templates directory and
//! assembles the results into one Asciidoctor converter class.

/// The templates compiler and its options.
pub mod compiler;
/// Orchestration errors.
pub mod error;
/// Template engine interface.
pub mod engine;
/// Template discovery and naming.
pub mod templates;

pub use compiler::{CompileOptions, CompileOutput, TemplatesCompiler, compile_converter};
pub use engine::{EngineOptions, TemplateEngine};
pub use error::CompilerError;
