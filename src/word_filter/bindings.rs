// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PyO3 bindings over the process-wide filter registry
//
// Function names follow the host API (newctx, updateword, filter, ...).
// Matching and insertion run with the GIL released.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyString};

use super::config::{parse_mask_char, FilterConfig};
use super::error::FilterError;
use super::registry;

/// Negative ids map to 0, which is never a valid slot.
fn slot_id(filter_id: i64) -> usize {
    usize::try_from(filter_id).unwrap_or(0)
}

fn type_name(obj: &Bound<'_, PyAny>) -> String {
    obj.get_type()
        .name()
        .map(|name| name.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Collect a Python iterable of `str` into owned strings.
fn extract_strings(items: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
    if items.is_instance_of::<PyString>() {
        return Err(FilterError::MalformedInput("list expect, got type[str]".to_string()).into());
    }

    let mut strings = Vec::new();
    for item in items.try_iter()? {
        let item = item?;
        let text: String = item.extract().map_err(|_| {
            FilterError::MalformedInput(format!("string expect, got type[{}]", type_name(&item)))
        })?;
        strings.push(text);
    }
    Ok(strings)
}

/// Create filter `filter_id` (1-based).
///
/// # Example (Python)
/// ```python
/// import wordfilter
///
/// wordfilter.newctx(1, ignore_case=True)
/// wordfilter.updateword(1, ["bad", "word"])
/// wordfilter.updateskipword(1, [" ", "*", "."])
/// wordfilter.filter(1, "b a d day")  # (True, "* * * day", ["bad"])
/// ```
#[pyfunction]
#[pyo3(signature = (filter_id, ignore_case = false))]
pub fn newctx(filter_id: i64, ignore_case: bool) -> PyResult<bool> {
    let config = FilterConfig {
        ignore_case,
        ..Default::default()
    };
    registry::global().create(slot_id(filter_id), config)?;
    Ok(true)
}

/// Create filter `filter_id` from a config dict (`ignore_case`, `mask_char`).
#[pyfunction]
pub fn newctx_from_config(filter_id: i64, config: &Bound<'_, PyDict>) -> PyResult<bool> {
    let config = FilterConfig::from_py_dict(config)?;
    registry::global().create(slot_id(filter_id), config)?;
    Ok(true)
}

#[pyfunction]
pub fn cleanctx(py: Python<'_>, filter_id: i64) -> PyResult<()> {
    py.detach(|| registry::global().clean(slot_id(filter_id)))?;
    Ok(())
}

#[pyfunction]
pub fn freectx(py: Python<'_>, filter_id: i64) -> PyResult<()> {
    py.detach(|| registry::global().free(slot_id(filter_id)))?;
    Ok(())
}

#[pyfunction]
pub fn setignorecase(filter_id: i64, ignore_case: bool) -> PyResult<()> {
    registry::global().set_ignore_case(slot_id(filter_id), ignore_case)?;
    Ok(())
}

#[pyfunction]
pub fn setmaskword(filter_id: i64, mask_word: &str) -> PyResult<()> {
    let mask_char = parse_mask_char(mask_word)?;
    registry::global().set_mask_char(slot_id(filter_id), mask_char)?;
    Ok(())
}

/// Add filler tokens that may appear between the characters of a phrase.
#[pyfunction]
pub fn updateskipword(py: Python<'_>, filter_id: i64, words: &Bound<'_, PyAny>) -> PyResult<bool> {
    let words = extract_strings(words)?;
    py.detach(|| registry::global().insert_fillers(slot_id(filter_id), &words))?;
    Ok(true)
}

/// Add banned phrases.
#[pyfunction]
pub fn updateword(py: Python<'_>, filter_id: i64, words: &Bound<'_, PyAny>) -> PyResult<bool> {
    let words = extract_strings(words)?;
    py.detach(|| registry::global().insert_phrases(slot_id(filter_id), &words))?;
    Ok(true)
}

/// Mask banned phrases in `text`.
///
/// # Returns
/// Tuple of (found: bool, masked_text: str, phrases: list[str])
#[pyfunction]
pub fn filter(py: Python<'_>, filter_id: i64, text: &str) -> PyResult<(bool, String, Vec<String>)> {
    let output = py.detach(|| registry::global().filter(slot_id(filter_id), text))?;
    Ok((output.found, output.masked, output.phrases))
}

/// Find banned phrases in `text` without masking.
///
/// # Returns
/// Tuple of (found: bool, phrases: list[str])
#[pyfunction]
pub fn check(py: Python<'_>, filter_id: i64, text: &str) -> PyResult<(bool, Vec<String>)> {
    let result = py.detach(|| registry::global().check(slot_id(filter_id), text))?;
    Ok((result.found, result.phrases))
}

#[pyfunction]
pub fn empty(filter_id: i64) -> PyResult<bool> {
    Ok(registry::global().is_empty(slot_id(filter_id))?)
}

/// Bytes of trie storage held by all filters in the process.
#[pyfunction]
pub fn memory() -> usize {
    super::arena::memory_usage()
}

/// Per size class `(tail, capacity)` of the filter's node pools.
#[pyfunction]
pub fn capacity(filter_id: i64) -> PyResult<Vec<(usize, usize)>> {
    let stats = registry::global().pool_stats(slot_id(filter_id))?;
    Ok(stats
        .iter()
        .map(|pool| (pool.tail, pool.capacity))
        .collect())
}

/// Register every binding on `m`.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(newctx, m)?)?;
    m.add_function(wrap_pyfunction!(newctx_from_config, m)?)?;
    m.add_function(wrap_pyfunction!(cleanctx, m)?)?;
    m.add_function(wrap_pyfunction!(freectx, m)?)?;
    m.add_function(wrap_pyfunction!(setignorecase, m)?)?;
    m.add_function(wrap_pyfunction!(setmaskword, m)?)?;
    m.add_function(wrap_pyfunction!(updateskipword, m)?)?;
    m.add_function(wrap_pyfunction!(updateword, m)?)?;
    m.add_function(wrap_pyfunction!(filter, m)?)?;
    m.add_function(wrap_pyfunction!(check, m)?)?;
    m.add_function(wrap_pyfunction!(empty, m)?)?;
    m.add_function(wrap_pyfunction!(memory, m)?)?;
    m.add_function(wrap_pyfunction!(capacity, m)?)?;
    Ok(())
}
