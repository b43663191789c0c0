use thiserror::Error;

/// Fatal error kinds of a simulation run.
///
/// Raised as (or attached as context to) [`anyhow::Error`] values, so the kind
/// can be recovered with `downcast_ref::<SimError>()` anywhere up the chain.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// A configuration value failed validation. Raised before any round runs.
    #[error("invalid config value `{field}`")]
    InvalidConfig { field: &'static str },

    /// A probability vector broke its sum, sign or finiteness invariant.
    #[error("invalid distribution: {reason}")]
    InvalidDistribution { reason: String },
}
