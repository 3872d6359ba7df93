use thiserror::Error;

/// Top-level error type for extrumap.
#[derive(Debug, Error)]
pub enum ExtrumapError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to shapes and extruded geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

/// Errors related to cap triangulation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("triangulation failed: {0}")]
    Failed(String),
}

/// Errors related to loading tabular input data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("malformed dataset: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Convenience type alias for results using [`ExtrumapError`].
pub type Result<T> = std::result::Result<T, ExtrumapError>;
