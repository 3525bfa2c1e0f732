use thiserror::Error;

/// Errors surfaced by document parsing and serialization.
///
/// Recoverable misses (a path that matches nothing, an unsupported value)
/// are recorded on the `Document` diagnostics log instead, never raised.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Path(#[from] weft_xpath::PathError),
}
