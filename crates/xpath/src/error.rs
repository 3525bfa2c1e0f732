use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PathError {
    #[error("Path parse error in '{0}': {1}")]
    PathParse(String, String),

    #[error("Function '{function}' error: {message}")]
    FunctionError { function: String, message: String },

    #[error("Type error: {0}")]
    TypeError(String),
}
