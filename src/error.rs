use thiserror::Error;

/// A failed render surfaces as one error naming the template and the root
/// cause; mid-render diagnostics stay aggregated on the `Document`.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("view '{0}' not found")]
    ViewNotFound(String),

    #[error("template '{view}' could not be parsed: {detail}")]
    UnparsableTemplate { view: String, detail: String },

    #[error("recursion limit exceeded while rendering '{view}'")]
    RecursionLimit { view: String },

    #[error(transparent)]
    Dom(#[from] weft_dom::DomError),
}
