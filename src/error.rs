use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid repository URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Malformed package specification '{spec}': {reason}")]
    MalformedSpec { spec: String, reason: String },

    #[error("Repository '{repository}' unavailable: {reason}")]
    RepositoryUnavailable { repository: String, reason: String },

    #[error("No mutually satisfiable version for {identity}: {reason}")]
    UnresolvableConflict { identity: String, reason: String },

    #[error("Failed to materialize '{artifact}': {reason}")]
    Materialization { artifact: String, reason: String },

    #[error("{0}")]
    Other(String),
}
