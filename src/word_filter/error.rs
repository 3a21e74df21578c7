// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error kinds surfaced by the word filter core

use pyo3::exceptions::{PyMemoryError, PyTypeError, PyValueError};
use pyo3::PyErr;
use thiserror::Error;

/// Errors returned by filter operations.
///
/// No core operation panics on bad input; the binding layer decides how each
/// kind reaches the host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("filter id overstep the boundary: [{id}] (valid ids are 1..={max})")]
    InvalidSlotId { id: usize, max: usize },

    #[error("filter already created, filter id: [{0}]")]
    SlotAlreadyCreated(usize),

    #[error("filter not created, filter id: [{0}]")]
    SlotNotCreated(usize),

    #[error("phrase is {len} bytes, limit is {max}")]
    PhraseTooLong { len: usize, max: usize },

    #[error("arena allocation failed for size class {class}")]
    AllocationFailure { class: u8 },

    #[error("malformed input: {0}")]
    MalformedInput(String),
}

pub type FilterResult<T> = Result<T, FilterError>;

impl From<FilterError> for PyErr {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::AllocationFailure { .. } => PyMemoryError::new_err(err.to_string()),
            FilterError::MalformedInput(_) => PyTypeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FilterError::InvalidSlotId { id: 11, max: 10 };
        assert_eq!(
            err.to_string(),
            "filter id overstep the boundary: [11] (valid ids are 1..=10)"
        );
        assert_eq!(
            FilterError::PhraseTooLong { len: 300, max: 255 }.to_string(),
            "phrase is 300 bytes, limit is 255"
        );
    }
}
