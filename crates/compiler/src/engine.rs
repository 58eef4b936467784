//! The seam between the compiler and a concrete template engine.

use std::path::Path;

use convgen_asciidoctor::BackendInfo;

/// Free-form options handed to the template engine unchanged.
pub type EngineOptions = serde_json::Map<String, serde_json::Value>;

/// A template engine that compiles one template file into a Ruby fragment.
///
/// The fragment is the body of a transform method: it runs with the node as
/// `self` and evaluates to the converted output.
///
/// Engines are shared between worker threads while templates compile, so
/// implementations must be [`Sync`].
pub trait TemplateEngine: Sync {
    /// Error raised when a template fails to compile.
    type Error: std::error::Error + Send + Sync + 'static;

    /// File extension of templates this engine understands, without the dot.
    fn extension(&self) -> &str;

    /// Compiles the template at `path` into Ruby code.
    fn compile(&self, path: &Path, options: &EngineOptions) -> Result<String, Self::Error>;

    /// Adjusts engine options for the target backend before any template is
    /// compiled.
    fn configure(&self, _options: &mut EngineOptions, _backend_info: &BackendInfo) {}

    /// Rewrites the shared helpers source so it declares `module Helpers`.
    fn adapt_helpers(&self, helpers: String) -> String {
        helpers
    }

    /// Top-level namespaces of the engine's runtime. Compiled code that still
    /// refers to them is reported.
    fn internal_namespaces(&self) -> &[&str] {
        &[]
    }
}
