use thiserror::Error;

use crate::services::ServiceError;

/// Conditions the turn-taking machine handles itself.
/// Only `ClassificationMiss` is recoverable without a restart.
#[derive(Debug, Clone, Error)]
pub enum TurnError {
    #[error("could not resolve dialog '{name}': {reason}")]
    ResolutionFailure { name: String, reason: String },
    #[error("{what} request rejected: {source}")]
    RequestRejected {
        what: &'static str,
        #[source]
        source: ServiceError,
    },
    #[error("dialog exchange requested before the dialog id was resolved")]
    DialogUnresolved,
    #[error("question pipeline '{0}' returned no usable answer")]
    EmptyResult(String),
    #[error("could not classify input: {0}")]
    ClassificationMiss(String),
}

impl TurnError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TurnError::ClassificationMiss(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_misses_are_recoverable() {
        assert!(!TurnError::ClassificationMiss("noise".into()).is_fatal());
        assert!(TurnError::DialogUnresolved.is_fatal());
        let rejected = TurnError::RequestRejected {
            what: "question",
            source: ServiceError::Status(500),
        };
        assert!(rejected.is_fatal());
        assert_eq!(
            rejected.to_string(),
            "question request rejected: service returned status 500"
        );
    }
}
