use gni_store::StoreError;
use gni_types::TypeError;

/// Errors produced while reconciling events.
///
/// `MalformedInput` and `IntegrityViolation` are fatal for the event that
/// raised them: none of its writes land. Store errors come from the
/// persistence backend and propagate unchanged.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Returns `true` for errors that abort a single event rather than the run.
    pub fn is_event_fatal(&self) -> bool {
        matches!(self, Self::MalformedInput(_) | Self::IntegrityViolation(_))
    }
}

impl From<TypeError> for PipelineError {
    fn from(e: TypeError) -> Self {
        Self::MalformedInput(e.to_string())
    }
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, key } => {
                Self::IntegrityViolation(format!("required {kind} {key} does not exist"))
            }
            other => Self::Store(other),
        }
    }
}

/// Failure to retrieve or decode a metadata document.
///
/// Always recovered locally: the affected display fields are reset.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("content not found: {0}")]
    NotFound(String),

    #[error("content fetching is not configured")]
    Unavailable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unparsable content: {0}")]
    Parse(String),
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use gni_store::EntityKind;
    use gni_types::EntityKey;

    #[test]
    fn not_found_maps_to_integrity_violation() {
        let err: PipelineError = StoreError::NotFound {
            kind: EntityKind::Subgraph,
            key: EntityKey::new("S").unwrap(),
        }
        .into();
        assert!(matches!(err, PipelineError::IntegrityViolation(_)));
        assert!(err.is_event_fatal());
    }

    #[test]
    fn backend_errors_are_not_event_fatal() {
        let err: PipelineError = StoreError::LockPoisoned("boom".into()).into();
        assert!(matches!(err, PipelineError::Store(_)));
        assert!(!err.is_event_fatal());
    }

    #[test]
    fn type_errors_are_malformed_input() {
        let err: PipelineError = TypeError::MalformedInput("odd".into()).into();
        assert!(matches!(err, PipelineError::MalformedInput(_)));
    }
}
