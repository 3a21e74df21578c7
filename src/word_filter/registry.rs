// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Fixed table of lockable filter slots
//
// Lock order: every operation takes exactly one slot lock. create/free then
// take the lifecycle mutex inside it, only to swap the slot's contents.

use log::info;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use super::arena::PoolStats;
use super::config::{FilterConfig, DEFAULT_FILTER_SLOTS, SIZE_CLASSES};
use super::context::FilterContext;
use super::error::{FilterError, FilterResult};
use super::masking::FilterOutput;
use super::matcher::CheckResult;

static GLOBAL: Lazy<FilterRegistry> = Lazy::new(FilterRegistry::new);

/// Process-wide registry with [`DEFAULT_FILTER_SLOTS`] slots.
pub fn global() -> &'static FilterRegistry {
    &GLOBAL
}

/// Slots addressed by id `1..=capacity`, each empty or holding one context.
///
/// Writers (insertions, clean, settings) on a slot exclude each other and all
/// readers of that slot; readers (check, filter) run concurrently.
pub struct FilterRegistry {
    slots: Vec<RwLock<Option<FilterContext>>>,
    lifecycle: Mutex<()>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FILTER_SLOTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| RwLock::new(None)).collect(),
            lifecycle: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, id: usize) -> FilterResult<&RwLock<Option<FilterContext>>> {
        if id == 0 || id > self.slots.len() {
            return Err(FilterError::InvalidSlotId {
                id,
                max: self.slots.len(),
            });
        }
        Ok(&self.slots[id - 1])
    }

    /// Run `f` under the slot's read lock.
    fn read<T>(&self, id: usize, f: impl FnOnce(&FilterContext) -> T) -> FilterResult<T> {
        let guard = self.slot(id)?.read();
        let ctx = guard.as_ref().ok_or(FilterError::SlotNotCreated(id))?;
        Ok(f(ctx))
    }

    /// Run `f` under the slot's write lock.
    fn write<T>(
        &self,
        id: usize,
        f: impl FnOnce(&mut FilterContext) -> FilterResult<T>,
    ) -> FilterResult<T> {
        let mut guard = self.slot(id)?.write();
        let ctx = guard.as_mut().ok_or(FilterError::SlotNotCreated(id))?;
        f(ctx)
    }

    pub fn create(&self, id: usize, config: FilterConfig) -> FilterResult<()> {
        let mut guard = self.slot(id)?.write();
        let ignore_case = config.ignore_case;
        {
            let _lifecycle = self.lifecycle.lock();
            if guard.is_some() {
                return Err(FilterError::SlotAlreadyCreated(id));
            }
            *guard = Some(FilterContext::new(config));
        }
        info!("created filter {} (ignore_case={})", id, ignore_case);
        Ok(())
    }

    /// Destroy the context in `id`, releasing all of its memory.
    pub fn free(&self, id: usize) -> FilterResult<()> {
        let freed = {
            let mut guard = self.slot(id)?.write();
            let _lifecycle = self.lifecycle.lock();
            guard.take().ok_or(FilterError::SlotNotCreated(id))?
        };
        let bytes = freed.memory_usage();
        drop(freed);
        info!("freed filter {} ({} bytes released)", id, bytes);
        Ok(())
    }

    /// Remove every phrase and filler token; the slot stays created.
    pub fn clean(&self, id: usize) -> FilterResult<()> {
        self.write(id, |ctx| {
            ctx.clean();
            Ok(())
        })?;
        info!("cleaned filter {}", id);
        Ok(())
    }

    pub fn set_ignore_case(&self, id: usize, ignore_case: bool) -> FilterResult<()> {
        self.write(id, |ctx| {
            ctx.set_ignore_case(ignore_case);
            Ok(())
        })
    }

    pub fn set_mask_char(&self, id: usize, mask_char: char) -> FilterResult<()> {
        self.write(id, |ctx| {
            ctx.set_mask_char(mask_char);
            Ok(())
        })
    }

    /// Insert banned phrases as one write-locked operation.
    pub fn insert_phrases<S: AsRef<str>>(&self, id: usize, phrases: &[S]) -> FilterResult<()> {
        self.write(id, |ctx| ctx.insert_phrases(phrases))
    }

    /// Insert filler tokens as one write-locked operation.
    pub fn insert_fillers<S: AsRef<str>>(&self, id: usize, tokens: &[S]) -> FilterResult<()> {
        self.write(id, |ctx| ctx.insert_fillers(tokens))
    }

    pub fn filter(&self, id: usize, text: &str) -> FilterResult<FilterOutput> {
        self.read(id, |ctx| ctx.filter(text))
    }

    pub fn check(&self, id: usize, text: &str) -> FilterResult<CheckResult> {
        self.read(id, |ctx| ctx.check(text))
    }

    /// True when the slot holds no phrases, including when it was never created.
    pub fn is_empty(&self, id: usize) -> FilterResult<bool> {
        let guard = self.slot(id)?.read();
        Ok(guard.as_ref().map_or(true, FilterContext::is_empty))
    }

    pub fn is_created(&self, id: usize) -> FilterResult<bool> {
        Ok(self.slot(id)?.read().is_some())
    }

    pub fn pool_stats(&self, id: usize) -> FilterResult<[PoolStats; SIZE_CLASSES]> {
        self.read(id, FilterContext::pool_stats)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
