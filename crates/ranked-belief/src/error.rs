//! Error types for ranked belief operations.

use crate::rank::Rank;
use std::fmt;
use thiserror::Error;

/// Rank arithmetic operation that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOp {
    /// Checked addition of two ranks.
    Add,
    /// Checked subtraction of two ranks.
    Sub,
}

impl fmt::Display for RankOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("+"),
            Self::Sub => f.write_str("-"),
        }
    }
}

/// Errors that can occur while constructing or evaluating rankings.
///
/// Errors raised during lazy evaluation are cached in the promise that
/// produced them; every later force of the same promise returns an
/// identical clone of the cached error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankingError {
    /// Addition overflow or subtraction underflow on finite ranks.
    #[error("rank arithmetic failed: {lhs} {op} {rhs}")]
    RankArithmetic {
        /// The operation that failed.
        op: RankOp,
        /// Left operand.
        lhs: Rank,
        /// Right operand.
        rhs: Rank,
    },

    /// A finite-only query (such as the numeric value) applied to ∞.
    #[error("operation requires a finite rank")]
    RankDomain,

    /// Out-of-range rank construction or malformed constructor input.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the input.
        reason: String,
    },

    /// A user callback failed during lazy evaluation, either by returning
    /// an error from a fallible combinator or by panicking.
    #[error("user callback failed: {message}")]
    Callback {
        /// The captured failure.
        message: String,
    },

    /// A code path in the lazy machinery that should be unreachable.
    /// Seeing this error indicates a bug in this crate.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl RankingError {
    /// Wraps a user-side failure observed during lazy evaluation.
    pub fn callback(message: impl fmt::Display) -> Self {
        Self::Callback {
            message: message.to_string(),
        }
    }

    /// Builds an [`RankingError::InvalidArgument`] from a reason.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error originated in a user callback.
    #[inline]
    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback { .. })
    }

    /// Returns `true` if this error indicates a bug in the lazy machinery
    /// rather than a caller fault.
    #[inline]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}
