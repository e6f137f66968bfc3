use thiserror::Error;

/// Failures talking to either external catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode: {0}")]
    Decode(String),

    #[error("database: {0}")]
    Database(String),

    #[error("{0} timed out")]
    Timeout(&'static str),
}

impl From<tiberius::error::Error> for CatalogError {
    fn from(e: tiberius::error::Error) -> Self {
        CatalogError::Database(e.to_string())
    }
}
