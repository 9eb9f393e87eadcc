use thiserror::Error;

/// Errors raised while resolving CITDL expressions against a CIT.
///
/// `NotFound` and `UnexpectedShape` indicate a broken scope reference or a
/// malformed tree and are surfaced to the caller. Everything else is a
/// resolution failure: swallowed and logged inside component loops, and
/// turned into an empty reply at the evaluation surface.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("scope path step '{0}' not found")]
    NotFound(String),
    #[error("could not resolve first part of '{0}'")]
    UnresolvedFirstPart(String),
    #[error("could not resolve {0}")]
    Unresolved(String),
    #[error("no type information for {0}")]
    NoTypeInfo(String),
    #[error("recursion limit reached evaluating '{0}'")]
    Recursion(String),
    #[error("import of '{0}' failed")]
    ImportFailed(String),
    #[error("unexpected element shape: {0}")]
    UnexpectedShape(String),
}

impl EvalError {
    /// True for errors that mean "the expression did not resolve", as
    /// opposed to a broken tree or scope reference.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            EvalError::UnresolvedFirstPart(_)
                | EvalError::Unresolved(_)
                | EvalError::NoTypeInfo(_)
                | EvalError::Recursion(_)
                | EvalError::ImportFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
