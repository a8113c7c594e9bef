use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

// Where the caller should send the user when a step is reached without its prerequisites
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Login,
    MovieDetails(String),
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redirect::Login => write!(f, "login"),
            Redirect::MovieDetails(movie_id) => write!(f, "movie details for {}", movie_id),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Redirect to {0}")]
    Redirect(Redirect),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

// Form validation failures are surfaced inline, so keep the validator's messages
impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<Redirect> for AppError {
    fn from(redirect: Redirect) -> Self {
        AppError::Redirect(redirect)
    }
}

// Define a type alias for the result type
pub type AppResult<T> = Result<T, AppError>;
