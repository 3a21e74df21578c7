// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// One independently configured filter instance

use log::{debug, warn};

use super::arena::{Arena, PoolStats};
use super::config::{FilterConfig, SIZE_CLASSES};
use super::error::FilterResult;
use super::masking::{mask_text, FilterOutput};
use super::matcher::{CheckResult, Match, Matcher};
use super::trie::Trie;

/// Which trie a bulk insertion targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrieKind {
    Words,
    Fillers,
}

impl TrieKind {
    fn as_str(&self) -> &'static str {
        match self {
            TrieKind::Words => "word",
            TrieKind::Fillers => "skip word",
        }
    }
}

/// Banned phrases, filler tokens and the arena that stores both.
///
/// A context is not synchronised; share it through
/// [`FilterRegistry`](super::registry::FilterRegistry) or an outer lock.
pub struct FilterContext {
    arena: Arena,
    words: Trie,
    fillers: Trie,
    config: FilterConfig,
}

impl FilterContext {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            arena: Arena::new(),
            words: Trie::new(),
            fillers: Trie::new(),
            config,
        }
    }

    /// Change case folding. Phrases already inserted keep the folding they
    /// were inserted with.
    pub fn set_ignore_case(&mut self, ignore_case: bool) {
        if ignore_case != self.config.ignore_case && !self.is_empty() {
            warn!("ignore_case changed after phrases were inserted; existing phrases are not re-folded");
        }
        self.config.ignore_case = ignore_case;
    }

    pub fn set_mask_char(&mut self, mask_char: char) {
        self.config.mask_char = mask_char;
    }

    pub fn insert_phrase(&mut self, phrase: &str) -> FilterResult<()> {
        self.words
            .insert(&mut self.arena, phrase.as_bytes(), self.config.ignore_case)
    }

    pub fn insert_filler(&mut self, token: &str) -> FilterResult<()> {
        self.fillers
            .insert(&mut self.arena, token.as_bytes(), self.config.ignore_case)
    }

    /// Insert phrases in order, stopping at the first failure. Phrases before
    /// the failing one stay inserted.
    pub fn insert_phrases<S: AsRef<str>>(&mut self, phrases: &[S]) -> FilterResult<()> {
        self.insert_all(TrieKind::Words, phrases)
    }

    pub fn insert_fillers<S: AsRef<str>>(&mut self, tokens: &[S]) -> FilterResult<()> {
        self.insert_all(TrieKind::Fillers, tokens)
    }

    fn insert_all<S: AsRef<str>>(&mut self, kind: TrieKind, items: &[S]) -> FilterResult<()> {
        let before = self.arena.allocated_bytes();

        for (index, item) in items.iter().enumerate() {
            let item = item.as_ref();
            let result = match kind {
                TrieKind::Words => self.insert_phrase(item),
                TrieKind::Fillers => self.insert_filler(item),
            };
            if let Err(err) = result {
                warn!(
                    "insert {} error after {} of {} items: {}",
                    kind.as_str(),
                    index,
                    items.len(),
                    err
                );
                return Err(err);
            }
        }

        debug!(
            "inserted {} {}s, arena {} -> {} bytes",
            items.len(),
            kind.as_str(),
            before,
            self.arena.allocated_bytes()
        );
        Ok(())
    }

    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(
            &self.arena,
            &self.words,
            &self.fillers,
            self.config.ignore_case,
        )
    }

    /// Longest phrase starting at the first byte of `text`.
    pub fn match_at(&self, text: &str) -> Option<Match> {
        self.matcher().match_at(text.as_bytes())
    }

    pub fn check(&self, text: &str) -> CheckResult {
        self.matcher().scan(text)
    }

    pub fn filter(&self, text: &str) -> FilterOutput {
        let (phrases, masked) = mask_text(&self.matcher(), text, self.config.mask_char);
        FilterOutput {
            found: !phrases.is_empty(),
            masked: masked.into_owned(),
            phrases: phrases.into_vec(),
        }
    }

    /// True when no banned phrase has been inserted.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn phrase_count(&self) -> usize {
        self.words.phrase_count(&self.arena)
    }

    pub fn filler_count(&self) -> usize {
        self.fillers.phrase_count(&self.arena)
    }

    /// Drop every phrase and filler token. Pool storage is kept for reuse.
    pub fn clean(&mut self) {
        self.words.release(&mut self.arena);
        self.fillers.release(&mut self.arena);
        self.arena.reset_idle();
    }

    /// Bytes of node storage held by this context.
    pub fn memory_usage(&self) -> usize {
        self.arena.allocated_bytes()
    }

    pub fn pool_stats(&self) -> [PoolStats; SIZE_CLASSES] {
        self.arena.stats()
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}
