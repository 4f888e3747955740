//! Types d'erreurs pour pmoqueue

/// Erreurs de gestion de la file de lecture
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Index not found: {0}")]
    IndexNotFound(usize),

    #[error("Cache worker unavailable: {0}")]
    WorkerUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type Result spécialisé pour pmoqueue
pub type Result<T> = std::result::Result<T, Error>;
