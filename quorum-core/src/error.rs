//! Errors surfaced by the cluster API.

use thiserror::Error;

/// More than one live leader was observed at once.
///
/// A correctly functioning cluster never produces this; it indicates
/// the election invariant was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("more than one leader in the cluster")]
pub struct TooManyLeaders;
