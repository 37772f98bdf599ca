use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load catalog: {0}")]
    DataLoad(String),

    #[error("Item '{0}' not found in catalog")]
    ItemNotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Engine not ready: {0}")]
    EngineNotReady(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// The queried title, for `ItemNotFound` errors
    pub fn missing_title(&self) -> Option<&str> {
        match self {
            Error::ItemNotFound(title) => Some(title),
            _ => None,
        }
    }
}
