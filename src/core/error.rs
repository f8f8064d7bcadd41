use thiserror::Error;

/// Crate-wide error type aggregating the per-module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::loader::ConfigError),

    /// Artifact resolution or parsing error
    #[error("artifact error: {0}")]
    Artifact(#[from] crate::artifacts::ArtifactError),

    /// SDK generation error
    #[error("generator error: {0}")]
    Generator(#[from] crate::generators::GeneratorError),

    /// Build cache error
    #[error("cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
