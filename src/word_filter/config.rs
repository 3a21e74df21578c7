// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for the word filter

use pyo3::prelude::*;
use pyo3::types::PyDict;
use serde::{Deserialize, Serialize};

use super::error::{FilterError, FilterResult};

/// Longest phrase or filler token accepted, in bytes.
pub const MAX_WORD_LENGTH: usize = 0xFF;

/// Number of slots in the process-wide registry.
pub const DEFAULT_FILTER_SLOTS: usize = 10;

/// Number of children-array size classes (block sizes 1, 3, 7 ... 255).
pub const SIZE_CLASSES: usize = 8;

pub const DEFAULT_MASK_CHAR: char = '*';

/// Per-instance filter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Fold ASCII letters to lowercase on insert and on match.
    /// Must be settled before the first insertion.
    pub ignore_case: bool,

    /// Replacement emitted once per masked character
    pub mask_char: char,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore_case: false,
            mask_char: DEFAULT_MASK_CHAR,
        }
    }
}

impl FilterConfig {
    /// Extract configuration from Python dict
    ///
    /// Recognised keys: `ignore_case` (bool) and `mask_char` (single-character str).
    pub fn from_py_dict(dict: &Bound<'_, PyDict>) -> PyResult<Self> {
        let mut config = Self::default();

        if let Some(value) = dict.get_item("ignore_case")? {
            config.ignore_case = value.extract()?;
        }

        if let Some(value) = dict.get_item("mask_char")? {
            let mask: String = value.extract()?;
            config.mask_char = parse_mask_char(&mask)?;
        }

        Ok(config)
    }

    /// Parse configuration from a JSON object, e.g. `{"ignore_case": true, "mask_char": "#"}`.
    pub fn from_json(json: &str) -> FilterResult<Self> {
        serde_json::from_str(json).map_err(|e| FilterError::MalformedInput(e.to_string()))
    }
}

/// Validate that `s` is exactly one character.
pub fn parse_mask_char(s: &str) -> FilterResult<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(FilterError::MalformedInput(format!(
            "mask word must be a single character, got {:?}",
            s
        ))),
    }
}
