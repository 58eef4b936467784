//! Ruby source generation for the converter class.
//!
//! The generated class extends `::Asciidoctor::Converter::Base`. Each transform
//! becomes a method that evaluates its fragment in the context of the node, so
//! fragments can call node methods (`title`, `content`, ...) directly. The
//! pieces are written by the `emit_*` functions below, in file order.

use std::collections::HashSet;
use std::fmt::{self, Write as FmtWrite};

use convgen_core::literal::{indent, string_literal};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{BackendValue, ConverterConfig, Transform};
use crate::error::ValidationError;

static HELPERS_MODULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bmodule Helpers[\s#]").unwrap());

const BASE_CLASS: &str = "::Asciidoctor::Converter::Base";
const FACTORY: &str = "::Asciidoctor::Converter::Factory";

/// Separator comments are centered in this many columns, plus the two `#`.
const SEPARATOR_WIDTH: usize = 76;

/// Generates the source of an Asciidoctor converter class.
///
/// Validation happens once in [`ConverterGenerator::new`]; generating never
/// fails and always produces the same text for the same configuration.
///
/// # Examples
///
/// ```
/// use convgen_asciidoctor::{ConverterConfig, ConverterGenerator};
///
/// let config = ConverterConfig::new("My::Converter")
///     .with_transform("paragraph", "\"<p>#{content}</p>\"");
/// let source = ConverterGenerator::new(config).unwrap().generate();
///
/// assert!(source.starts_with("# This file has been generated!\n"));
/// assert!(source.contains("class My::Converter < ::Asciidoctor::Converter::Base\n"));
/// assert!(source.contains("  def paragraph(node, opts = {})\n"));
/// ```
#[derive(Debug, Clone)]
pub struct ConverterGenerator {
    config: ConverterConfig,
    helpers: Option<String>,
    eval: EvalContext,
    delegate: Option<DelegateResolution>,
}

impl ConverterGenerator {
    /// Validates `config` and prepares a generator for it.
    pub fn new(config: ConverterConfig) -> Result<Self, ValidationError> {
        let helpers = config
            .helpers_code
            .clone()
            .filter(|code| !code.trim().is_empty());
        if let Some(code) = &helpers
            && !HELPERS_MODULE.is_match(code)
        {
            return Err(ValidationError::MissingHelpersModule);
        }

        let mut seen = HashSet::new();
        for transform in &config.transforms {
            if !seen.insert(transform.name.as_str()) {
                log::warn!(
                    "Transform '{}' is defined more than once, the last definition wins",
                    transform.name
                );
            }
        }

        let eval = EvalContext {
            helpers: helpers.is_some(),
        };
        let delegate = config
            .delegate_backend
            .clone()
            .map(|backend| DelegateResolution { backend });

        Ok(Self {
            config,
            helpers,
            eval,
            delegate,
        })
    }

    /// The configuration this generator was built from.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Generates the complete converter source.
    pub fn generate(&self) -> String {
        let mut code = String::with_capacity(self.estimated_len());

        emit_head(&mut code, &self.config.class_name);
        code.push('\n');
        if let Some(helpers) = &self.helpers {
            emit_helpers(&mut code, helpers);
            code.push('\n');
        }
        self.emit_initializer(&mut code);
        code.push('\n');
        emit_convert_method(&mut code, self.delegate.as_ref());
        code.push('\n');
        self.emit_transform_methods(&mut code);
        emit_support_methods(&mut code);
        code.push('\n');
        let _ = writeln!(code, "end");

        log::debug!(
            "generated converter {} with {} transforms ({} bytes)",
            self.config.class_name,
            self.config.transforms.len(),
            code.len()
        );
        code
    }

    /// Generates the source and writes it to `out` in one piece, returning
    /// `out` afterwards.
    pub fn generate_into<W: fmt::Write>(&self, mut out: W) -> Result<W, fmt::Error> {
        out.write_str(&self.generate())?;
        Ok(out)
    }

    fn estimated_len(&self) -> usize {
        let fragments: usize = self.config.transforms.iter().map(|t| t.code.len() + 256).sum();
        2048 + fragments + self.helpers.as_ref().map_or(0, String::len)
    }

    fn emit_initializer(&self, code: &mut String) {
        let mut parts: Vec<String> = Vec::new();

        if !self.config.register_for.is_empty() {
            let backends: Vec<String> = self
                .config
                .register_for
                .iter()
                .map(|id| id.to_ruby())
                .collect();
            parts.push(format!("register_for {}\n", backends.join(", ")));
        }
        parts.push("def initialize(backend, opts = {})".to_string());
        parts.push("  super".to_string());
        if !self.config.backend_info.is_empty() {
            let traits: Vec<String> = self
                .config
                .backend_info
                .iter()
                .map(|(key, value)| match value {
                    BackendValue::Flag(true) => format!("  {key}"),
                    other => format!("  {key} {}", other.to_ruby()),
                })
                .collect();
            parts.push(traits.join("\n"));
        }
        if let Some(delegate) = &self.delegate {
            parts.push(delegate.constructor_code());
        }
        parts.push("end".to_string());
        parts.push(String::new());

        code.push_str(&indent(&parts.join("\n"), 2));
    }

    fn emit_transform_methods(&self, code: &mut String) {
        let _ = write!(code, "  {}", separator("Begin of generated transformation methods"));
        for transform in &self.config.transforms {
            self.emit_transform(code, transform);
        }
        let _ = write!(code, "  {}", separator("End of generated transformation methods"));
    }

    fn emit_transform(&self, code: &mut String, transform: &Transform) {
        let _ = writeln!(code);
        let _ = writeln!(code, "  def {}(node, opts = {{}})", transform.name);
        self.eval.emit_enter(code);
        code.push_str(&indent(&transform.code, 6));
        code.push('\n');
        self.eval.emit_leave(code);
        let _ = writeln!(code, "  end");
    }
}

/// Shortcut for `ConverterGenerator::new(config)?.generate()`.
pub fn generate_converter(config: ConverterConfig) -> Result<String, ValidationError> {
    Ok(ConverterGenerator::new(config)?.generate())
}

/// How a transform body sees the world.
///
/// The body runs with the node as `self`, optionally extended with the helper
/// methods, and with each entry of the call options bound as a local variable.
#[derive(Debug, Clone, Copy)]
struct EvalContext {
    helpers: bool,
}

impl EvalContext {
    fn emit_enter(&self, code: &mut String) {
        if self.helpers {
            let _ = writeln!(code, "    node.extend(Helpers)");
        }
        let _ = writeln!(code, "    node.instance_eval do");
        let _ = writeln!(
            code,
            "      converter.set_local_variables(binding, opts) unless opts.empty?"
        );
    }

    fn emit_leave(&self, code: &mut String) {
        let _ = writeln!(code, "    end");
    }
}

/// Fallback converter for nodes without a transform.
///
/// The backend can be overridden per instance through `opts[:delegate_backend]`.
/// When the factory hands back the converter being constructed (this class is
/// registered for the delegate backend too), a fresh factory is asked instead.
#[derive(Debug, Clone)]
struct DelegateResolution {
    backend: String,
}

impl DelegateResolution {
    fn constructor_code(&self) -> String {
        let mut code = String::new();
        let _ = writeln!(code);
        let _ = writeln!(
            code,
            "  delegate_backend = (opts[:delegate_backend] || {}).to_s",
            string_literal(&self.backend)
        );
        let _ = writeln!(code, "  factory = {FACTORY}");
        let _ = writeln!(code);
        let _ = writeln!(code, "  converter = factory.create(delegate_backend, backend_info)");
        let _ = writeln!(code, "  @delegate_converter = if converter == self");
        let _ = writeln!(code, "    factory.new.create(delegate_backend, backend_info)");
        let _ = writeln!(code, "  else");
        let _ = writeln!(code, "    converter");
        let _ = write!(code, "  end");
        code
    }

    fn receiver(&self) -> &'static str {
        "respond_to?(transform) ? self : @delegate_converter"
    }
}

fn separator(title: &str) -> String {
    let dashes = "-".repeat(SEPARATOR_WIDTH.saturating_sub(title.chars().count()) / 2);
    format!("#{dashes} {title} {dashes}#\n")
}

/// `A::B::C` needs `A` and `A::B` to exist before `class A::B::C` can be
/// declared: `module A; module B; end end`.
fn namespace_prologue(class_name: &str) -> String {
    let segments: Vec<&str> = class_name.split("::").collect();
    let namespaces: Vec<&str> = match segments.split_last() {
        Some((_, init)) => init.iter().copied().filter(|s| !s.is_empty()).collect(),
        None => Vec::new(),
    };
    if namespaces.is_empty() {
        return String::new();
    }
    let opens: Vec<String> = namespaces.iter().map(|ns| format!("module {ns};")).collect();
    let closes = vec!["end"; namespaces.len()];
    format!("{} {}", opens.join(" "), closes.join(" "))
}

fn emit_head(code: &mut String, class_name: &str) {
    let _ = writeln!(code, "# This file has been generated!");
    let _ = writeln!(code);
    let _ = writeln!(code, "{}", namespace_prologue(class_name));
    let _ = writeln!(code, "class {} < {}", class_name, BASE_CLASS);
}

fn emit_helpers(code: &mut String, helpers: &str) {
    let mut block = String::new();
    let _ = writeln!(block, "{}", separator("Begin of Helpers"));
    let _ = writeln!(block, "{}", helpers);
    let _ = writeln!(block);
    let _ = writeln!(block, "# Make Helpers' constants accessible from transform methods.");
    let _ = writeln!(block, "Helpers.constants.each do |const|");
    let _ = writeln!(block, "  const_set(const, Helpers.const_get(const))");
    let _ = writeln!(block, "end");
    let _ = writeln!(block);
    let _ = writeln!(block, "{}", separator("End of Helpers"));
    code.push_str(&indent(&block, 2));
}

fn emit_convert_method(code: &mut String, delegate: Option<&DelegateResolution>) {
    let receiver = delegate.map_or("self", DelegateResolution::receiver);
    let _ = writeln!(code, "  def convert(node, transform = nil, opts = {{}})");
    let _ = writeln!(code, "    transform ||= node.node_name");
    let _ = writeln!(code, "    converter = {receiver}");
    let _ = writeln!(code);
    let _ = writeln!(code, "    if opts.empty?");
    let _ = writeln!(code, "      converter.send(transform, node)");
    let _ = writeln!(code, "    else");
    let _ = writeln!(code, "      converter.send(transform, node, opts)");
    let _ = writeln!(code, "    end");
    let _ = writeln!(code, "  end");
}

fn emit_support_methods(code: &mut String) {
    let _ = writeln!(code, "  def set_local_variables(binding, vars)");
    let _ = writeln!(code, "    vars.each do |key, val|");
    let _ = writeln!(code, "      binding.local_variable_set(key.to_sym, val)");
    let _ = writeln!(code, "    end");
    let _ = writeln!(code, "  end");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_is_centered() {
        let sep = separator("Begin of Helpers");
        assert_eq!(sep.len(), 81);
        let dashes = "-".repeat(30);
        assert_eq!(sep, format!("#{dashes} Begin of Helpers {dashes}#\n"));
    }

    #[test]
    fn test_separator_with_long_title() {
        let title = "x".repeat(90);
        assert_eq!(separator(&title), format!("# {title} #\n"));
    }

    #[test]
    fn test_namespace_prologue() {
        assert_eq!(namespace_prologue("Conv"), "");
        assert_eq!(namespace_prologue("A::Conv"), "module A; end");
        assert_eq!(namespace_prologue("A::B::C"), "module A; module B; end end");
        assert_eq!(namespace_prologue("::Top"), "");
    }

    #[test]
    fn test_delegate_constructor_code_uses_configured_backend() {
        let delegate = DelegateResolution {
            backend: "docbook5".into(),
        };
        let code = delegate.constructor_code();
        assert!(code.starts_with("\n  delegate_backend = (opts[:delegate_backend] || \"docbook5\").to_s\n"));
        assert!(code.ends_with("\n  end"));
    }

    #[test]
    fn test_eval_context_without_helpers() {
        let mut code = String::new();
        EvalContext { helpers: false }.emit_enter(&mut code);
        assert!(!code.contains("extend(Helpers)"));
        assert!(code.starts_with("    node.instance_eval do\n"));
    }
}
