use thiserror::Error;

/// Error kinds surfaced by the core to the dispatcher. Per-case errors are
/// recorded in the response JSON; they never abort the batch.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("division by zero")]
    DivByZero,
    #[error("bad argument: {0}")]
    BadArgument(String),
    #[error("attack failed: {0}")]
    AttackFailed(String),
}
