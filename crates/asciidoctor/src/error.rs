use thiserror::Error;

/// Rejected converter configuration, raised before any code is generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Helper code was given but does not declare `module Helpers`.
    #[error("The helpers_code does not contain module Helpers")]
    MissingHelpersModule,
}

/// Failure to load a [`ConverterConfig`](crate::ConverterConfig) from text.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed into a configuration.
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The YAML document could not be parsed into a configuration.
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
