// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Word Filter - Rust Implementation
//
// Banned-phrase detection and masking using:
// - Byte tries stored in size-classed arena pools (32-bit packed nodes)
// - Longest-match search that skips filler tokens inside a phrase
// - Per-slot reader/writer locks for concurrent checks

pub mod arena;
pub mod bindings;
pub mod config;
pub mod context;
pub mod error;
pub mod masking;
pub mod matcher;
pub mod registry;
pub mod trie;

pub use arena::{memory_usage, PoolStats};
pub use config::{FilterConfig, DEFAULT_FILTER_SLOTS, MAX_WORD_LENGTH};
pub use context::FilterContext;
pub use error::{FilterError, FilterResult};
pub use masking::FilterOutput;
pub use matcher::{CheckResult, Match};
pub use registry::FilterRegistry;
