#![deny(missing_docs)]
//! Convgen Asciidoctor: assembles compiled template fragments into the source
//! of a single Asciidoctor converter class.

/// Converter source generation.
pub mod codegen;
/// Converter configuration types.
pub mod config;
/// Validation and configuration errors.
pub mod error;

pub use codegen::{ConverterGenerator, generate_converter};
pub use config::{
    BackendId, BackendInfo, BackendValue, ConverterConfig, RegistrationList, Transform,
    TransformSet,
};
pub use error::{ConfigError, ValidationError};
