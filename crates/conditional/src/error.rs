/// Errors raised while validating a conditional request.
///
/// Malformed client input never produces one of these: unparsable
/// headers and dates resolve to letting the request through. An
/// [`Error`] means a validator and the gate disagree about what the
/// request contains, which is a wiring defect rather than a client
/// problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A validator reported that it applies to a request (its
    /// `evaluate` returned true) but then found none of the
    /// conditional headers it handles.
    #[error("{validator} evaluated the request but none of its conditional headers are present")]
    MissingConditionalHeader {
        /// the name of the validator that broke its contract
        validator: &'static str,
    },
}

/// this crate's result type
pub type Result<T, E = Error> = std::result::Result<T, E>;
