use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrmError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP server error: {0}")]
    Server(#[from] hyper::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GraphQL error: {message}")]
    GraphQL { message: String },
}

pub type Result<T> = std::result::Result<T, CrmError>;
