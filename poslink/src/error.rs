//! Mapper-level errors.

/// Failures raised while assembling a gateway request.
///
/// All of these fail fast: no request is serialized and no network call is
/// attempted once one is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MapperError {
    /// The operation exists in the gateway dialect but this mapping does not
    /// build it yet. A programming error, not a retryable condition.
    #[error("operation not implemented: {0}")]
    NotImplemented(&'static str),

    /// The operation is not offered for this capture family at all.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// The transaction snapshot is missing data the request cannot be built
    /// without.
    #[error("transaction snapshot missing required field: {0}")]
    MissingField(&'static str),
}
