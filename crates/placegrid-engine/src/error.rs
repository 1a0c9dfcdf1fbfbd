use thiserror::Error;

/// Request-fatal failures of the search engine.
///
/// Upstream failures are deliberately absent: a failing tile degrades to an
/// empty tile inside the orchestrator, and a failing geocode attempt maps
/// to [`SearchError::NotFound`]. Only input validation escalates to the
/// caller as an error of its own kind.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),
}
