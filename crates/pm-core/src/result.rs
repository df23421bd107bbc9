//! Result type aliases

use crate::error::PmError;

/// Standard Result type for ProManager operations
pub type PmResult<T> = Result<T, PmError>;
