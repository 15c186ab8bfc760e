use thiserror::Error;

#[derive(Error, Debug)]
pub enum MovieError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "db")]
    #[error("Database error: {message}")]
    Database { message: String },
}

impl MovieError {
    pub fn person_not_found(id: crate::domain::PersonId) -> Self {
        MovieError::NotFound {
            entity: "Person",
            id: id.get(),
        }
    }

    pub fn movie_not_found(id: crate::domain::MovieId) -> Self {
        MovieError::NotFound {
            entity: "Movie",
            id: id.get(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MovieError>;
