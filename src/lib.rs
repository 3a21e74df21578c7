// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Rust word filter for MCP Gateway
// Built with PyO3 for seamless Python integration

use pyo3::prelude::*;

pub mod word_filter;

pub use word_filter::{
    CheckResult, FilterConfig, FilterContext, FilterError, FilterOutput, FilterRegistry,
    FilterResult,
};

/// Python module: wordfilter
///
/// Banned-phrase filtering with obfuscation-aware matching. Up to ten
/// independent filters live in numbered slots.
///
/// # Examples
///
/// ```python
/// import wordfilter
///
/// wordfilter.newctx(1, True)
/// wordfilter.updateword(1, ["bad", "word"])
/// wordfilter.updateskipword(1, [" ", "*", "."])
///
/// found, phrases = wordfilter.check(1, "b.a.d")
/// print(found, phrases)  # True ['bad']
///
/// found, masked, phrases = wordfilter.filter(1, "a BAD word")
/// print(masked)  # "a *** ****"
/// ```
#[pymodule]
fn wordfilter(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Route `log` records into Python's logging module
    pyo3_log::init();

    word_filter::bindings::register(m)?;

    // Module metadata
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add(
        "__doc__",
        "Banned-phrase filtering with filler-token skipping and masking",
    )?;

    Ok(())
}
