use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NestedModelError {
    /// A required input was not supplied, or cannot be used in this position.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, NestedModelError>;
