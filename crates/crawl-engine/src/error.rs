//! Error types for the engine binary.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crawl_core::ConfigError,
    },

    /// Loading, assembling, or ticking the floor failed.
    #[error("level error: {source}")]
    Level {
        /// The underlying level error.
        #[from]
        source: crawl_core::LevelError,
    },
}
