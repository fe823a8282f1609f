use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("transport unavailable: {0}")]
    Transport(String),
    #[error("service returned status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::Status(status.as_u16())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}
