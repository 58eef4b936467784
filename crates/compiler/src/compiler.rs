//! Compiles a templates directory into converter source.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use convgen_asciidoctor::{
    BackendInfo, ConverterConfig, ConverterGenerator, RegistrationList, TransformSet,
};
use convgen_core::{Diagnostic, Diagnostics, find_namespace_references, pretty_print};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::{EngineOptions, TemplateEngine};
use crate::error::CompilerError;
use crate::templates::{HELPERS_FILE, find_templates, read_helpers, transform_name_from_path};

/// Indentation width of pretty-printed fragments.
const PRETTY_INDENT: usize = 2;

/// Options of one compile run.
///
/// Deserializes from camelCase or snake_case keys; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Directory holding the templates and the optional `helpers.rb`.
    #[serde(alias = "templates_dir")]
    pub templates_dir: PathBuf,
    /// Options passed to the template engine.
    #[serde(alias = "engine_options", alias = "engineOpts", alias = "engine_opts")]
    pub engine_options: EngineOptions,
    /// Pretty-print each compiled template.
    pub pretty: bool,
    /// Upper bound on worker threads compiling templates. Uses rayon's global
    /// pool when unset.
    #[serde(alias = "max_threads", skip_serializing_if = "Option::is_none")]
    pub max_threads: Option<usize>,
    /// Fully qualified name of the generated class.
    #[serde(alias = "class_name")]
    pub class_name: String,
    /// Backend names to register the converter for.
    #[serde(alias = "register_for")]
    pub register_for: RegistrationList,
    /// Backend descriptor of the converter.
    #[serde(alias = "backend_info")]
    pub backend_info: BackendInfo,
    /// Backend that handles nodes without a template.
    #[serde(alias = "delegate_backend", skip_serializing_if = "Option::is_none")]
    pub delegate_backend: Option<String>,
}

impl CompileOptions {
    /// Options for compiling `templates_dir` into a class named `class_name`.
    pub fn new(templates_dir: impl Into<PathBuf>, class_name: impl Into<String>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            class_name: class_name.into(),
            ..Self::default()
        }
    }
}

/// Result of a successful compile run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// Source of the generated converter class.
    pub code: String,
    /// Transform names in the order their methods appear in `code`.
    pub transforms: Vec<String>,
    /// Advisory findings; they never change `code`.
    pub diagnostics: Diagnostics,
}

/// [`CompileOptions`] with the engine's adjustments applied.
#[derive(Debug)]
struct InternalCompileConfig {
    engine_options: EngineOptions,
    pool: Option<rayon::ThreadPool>,
}

impl InternalCompileConfig {
    fn new<E: TemplateEngine>(options: &CompileOptions, engine: &E) -> Self {
        let mut engine_options = options.engine_options.clone();
        engine.configure(&mut engine_options, &options.backend_info);

        // Configure thread pool if max_threads is specified
        let pool = options.max_threads.and_then(|max_threads| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(max_threads)
                .build()
                .ok()
        });

        Self {
            engine_options,
            pool,
        }
    }
}

/// Compiles every template of a directory with one engine and assembles the
/// fragments into a converter class.
#[derive(Debug, Clone, Default)]
pub struct TemplatesCompiler<E> {
    engine: E,
}

impl<E: TemplateEngine> TemplatesCompiler<E> {
    /// Creates a compiler driving `engine`.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// The engine templates are compiled with.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Compiles the templates in `options.templates_dir` into converter source.
    ///
    /// Templates compile in parallel, but the transforms keep file name order.
    /// The first template that fails to compile, in that order, aborts the run
    /// with the engine's error.
    pub fn compile_converter(
        &self,
        options: &CompileOptions,
    ) -> Result<CompileOutput, CompilerError<E::Error>> {
        let dir = options.templates_dir.as_path();
        if !dir.is_dir() {
            return Err(CompilerError::TemplatesDirNotFound(dir.to_path_buf()));
        }

        let templates = find_templates(dir, self.engine.extension())
            .map_err(|source| CompilerError::io(dir, source))?;
        log::debug!(
            "found {} .{} templates in {}",
            templates.len(),
            self.engine.extension(),
            dir.display()
        );

        let config = InternalCompileConfig::new(options, &self.engine);
        let compile =
            |path: &PathBuf| self.compile_template(path, &config.engine_options, options.pretty);
        let results: Vec<_> = match &config.pool {
            Some(pool) => pool.install(|| templates.par_iter().map(compile).collect()),
            None => templates.par_iter().map(compile).collect(),
        };

        let mut diagnostics = Diagnostics::new();
        let mut transforms = TransformSet::new();
        let mut seen = HashSet::new();
        for (path, result) in templates.iter().zip(results) {
            let code = result.map_err(CompilerError::Engine)?;
            let template = path.display().to_string();
            for constant in find_namespace_references(&code, self.engine.internal_namespaces()) {
                log::warn!(
                    "Compiled template '{}' references constant {}",
                    template,
                    constant
                );
                diagnostics.add_warning(Diagnostic::LeakedConstant {
                    template: template.clone(),
                    constant,
                });
            }

            let name = transform_name_from_path(path);
            if !seen.insert(name.clone()) {
                diagnostics.add_warning(Diagnostic::DuplicateTransform {
                    name: name.clone(),
                    template,
                });
            }
            transforms.push(name, code);
        }

        let helpers =
            read_helpers(dir).map_err(|source| CompilerError::io(dir.join(HELPERS_FILE), source))?;
        let helpers = self.engine.adapt_helpers(helpers);

        let converter = ConverterConfig {
            class_name: options.class_name.clone(),
            transforms,
            helpers_code: Some(helpers),
            register_for: options.register_for.clone(),
            backend_info: options.backend_info.clone(),
            delegate_backend: options.delegate_backend.clone(),
        };
        let generator = ConverterGenerator::new(converter)?;
        let code = generator.generate();
        let transforms = generator
            .config()
            .transforms
            .iter()
            .map(|t| t.name.clone())
            .collect();

        Ok(CompileOutput {
            code,
            transforms,
            diagnostics,
        })
    }

    fn compile_template(
        &self,
        path: &Path,
        options: &EngineOptions,
        pretty: bool,
    ) -> Result<String, E::Error> {
        let code = self.engine.compile(path, options)?;
        log::debug!("compiled {} ({} bytes)", path.display(), code.len());
        Ok(if pretty {
            pretty_print(&code, PRETTY_INDENT)
        } else {
            code
        })
    }
}

/// Compiles a templates directory with `engine` in one call.
pub fn compile_converter<E: TemplateEngine>(
    engine: E,
    options: &CompileOptions,
) -> Result<CompileOutput, CompilerError<E::Error>> {
    TemplatesCompiler::new(engine).compile_converter(options)
}
