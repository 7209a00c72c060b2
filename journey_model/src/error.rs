//! Errors raised while building the journey model.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JourneyError {
    #[error("route path has no vertices")]
    EmptyPath,
    #[error("route vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },
    #[error("invalid configuration value `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
