//! Error type used to report failure in low-level serialization
//!
//! The write path has exactly one intrinsic failure mode: exhausting
//! the bounded growth budget of the output buffer. Everything else
//! that can go wrong with serialization is a property of the input
//! value, and is rejected ahead of time by schema validators (see
//! [`ValidationError`](crate::error::ValidationError)).

use std::error::Error;
use std::fmt::{Display, Formatter, Result};

/// Error case when a write would require the output buffer to grow
/// beyond its configured maximum size.
///
/// No silent truncation and no wraparound is ever performed: the
/// failing write leaves the buffer contents and cursor untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    /// Total number of bytes the buffer would have had to hold
    pub needed: usize,
    /// Configured `max_size` the requirement collided with
    pub limit: usize,
}

impl Display for CapacityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "write requires {} bytes of buffer, exceeding the maximum size of {}",
            self.needed, self.limit
        )
    }
}

impl Error for CapacityError {}

/// Type alias for Result with an error type of [`CapacityError`]
pub type WriteResult<T> = std::result::Result<T, CapacityError>;
