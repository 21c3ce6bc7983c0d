use thiserror::Error;

/// Rejection of a model input before any computation runs.
///
/// Every operation that accepts raw numbers validates them up front and
/// fails the whole call with this error; there are no partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("invalid parameter `{name}` = {value}: must be {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },
}

impl ParamError {
    pub fn invalid(name: &'static str, value: f64, constraint: &'static str) -> Self {
        ParamError::InvalidParameter {
            name,
            value,
            constraint,
        }
    }

    /// Name of the rejected field.
    pub fn parameter(&self) -> &'static str {
        match self {
            ParamError::InvalidParameter { name, .. } => name,
        }
    }
}
