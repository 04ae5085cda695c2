//! Error types for island map generation

use std::fmt;

/// Errors that can occur during map generation
#[derive(Debug, Clone)]
pub enum MapError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// Generation failed due to geometry issues
    GenerationFailed(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            MapError::GenerationFailed(msg) => write!(f, "generation failed: {}", msg),
        }
    }
}

impl std::error::Error for MapError {}

/// Result type alias for map generation operations
pub type Result<T> = std::result::Result<T, MapError>;
