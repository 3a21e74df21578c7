// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Longest-match search over the word trie with filler-token skipping

use std::collections::HashSet;

use super::arena::{Arena, NULL_BLOCK};
use super::trie::{fold, Trie};

/// Encoded width of the UTF-8 character starting with `lead`.
///
/// Bytes that do not look like a lead byte count as one byte wide.
#[inline]
pub fn char_width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// A phrase matched at one text position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Raw bytes consumed, filler included
    pub len: usize,
    /// Word-trie bytes of the matched phrase, filler excluded
    pub phrase: Vec<u8>,
}

/// Distinct phrases found during one scan, kept in discovery order.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    phrases: Vec<String>,
    seen: HashSet<Vec<u8>>,
}

impl MatchSet {
    pub fn insert(&mut self, phrase: Vec<u8>) -> bool {
        if self.seen.contains(&phrase) {
            return false;
        }
        self.phrases
            .push(String::from_utf8_lossy(&phrase).into_owned());
        self.seen.insert(phrase);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.seen.contains(phrase.as_bytes())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.phrases
    }
}

/// Result of checking text without producing a masked copy
#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub found: bool,
    pub phrases: Vec<String>,
}

/// Read-only view over the two tries of one filter context.
#[derive(Clone, Copy)]
pub struct Matcher<'a> {
    pub(crate) arena: &'a Arena,
    pub(crate) words: &'a Trie,
    pub(crate) fillers: &'a Trie,
    pub(crate) ignore_case: bool,
}

impl<'a> Matcher<'a> {
    pub fn new(arena: &'a Arena, words: &'a Trie, fillers: &'a Trie, ignore_case: bool) -> Self {
        Self {
            arena,
            words,
            fillers,
            ignore_case,
        }
    }

    /// Consume as many complete filler tokens as possible from the start of
    /// `text`, longest token first at each step. Returns the bytes consumed.
    pub fn skip(&self, text: &[u8]) -> usize {
        if self.fillers.is_empty() {
            return 0;
        }

        let mut consumed = 0;
        loop {
            let mut node = self.fillers.root();
            let mut token = 0;
            for (offset, &raw) in text[consumed..].iter().enumerate() {
                match Trie::child(self.arena, node, fold(raw, self.ignore_case)) {
                    Some(child) => {
                        node = child;
                        if child.is_word_end() {
                            token = offset + 1;
                        }
                    }
                    None => break,
                }
            }

            if token == 0 {
                return consumed;
            }
            consumed += token;
        }
    }

    /// Longest phrase starting exactly at `text[0]`.
    ///
    /// Filler is only skipped once at least one phrase byte has matched, and
    /// only where the next byte does not continue the phrase. The reported
    /// length covers filler up to the end of the longest phrase, not past it.
    pub fn match_at(&self, text: &[u8]) -> Option<Match> {
        let mut node = self.words.root();
        let mut phrase = Vec::new();
        let mut best: Option<(usize, usize)> = None;
        let mut pos = 0;

        while pos < text.len() {
            let byte = fold(text[pos], self.ignore_case);
            match Trie::child(self.arena, node, byte) {
                Some(child) => {
                    phrase.push(byte);
                    node = child;
                    pos += 1;
                    if child.is_word_end() {
                        best = Some((phrase.len(), pos));
                    }
                    if child.children() == NULL_BLOCK {
                        break;
                    }
                }
                None => {
                    if phrase.is_empty() {
                        break;
                    }
                    let skipped = self.skip(&text[pos..]);
                    if skipped == 0 {
                        break;
                    }
                    pos += skipped;
                }
            }
        }

        best.map(|(phrase_len, len)| {
            phrase.truncate(phrase_len);
            Match { len, phrase }
        })
    }

    /// Visit every match in `text`, left to right without overlap. After a
    /// position fails to match the scan moves on by one character.
    pub fn for_each_match<F>(&self, text: &[u8], mut on_match: F)
    where
        F: FnMut(usize, Option<Match>),
    {
        let mut pos = 0;
        while pos < text.len() {
            match self.match_at(&text[pos..]) {
                Some(found) => {
                    let len = found.len;
                    on_match(pos, Some(found));
                    pos += len;
                }
                None => {
                    on_match(pos, None);
                    pos += char_width(text[pos]).min(text.len() - pos);
                }
            }
        }
    }

    /// Find every distinct phrase occurring in `text`.
    pub fn scan(&self, text: &str) -> CheckResult {
        let mut phrases = MatchSet::default();
        if !self.words.is_empty() {
            self.for_each_match(text.as_bytes(), |_, found| {
                if let Some(found) = found {
                    phrases.insert(found.phrase);
                }
            });
        }

        CheckResult {
            found: !phrases.is_empty(),
            phrases: phrases.into_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        arena: Arena,
        words: Trie,
        fillers: Trie,
        ignore_case: bool,
    }

    impl Fixture {
        fn new(words: &[&str], fillers: &[&str], ignore_case: bool) -> Self {
            let mut arena = Arena::new();
            let mut word_trie = Trie::new();
            let mut filler_trie = Trie::new();
            for word in words {
                word_trie
                    .insert(&mut arena, word.as_bytes(), ignore_case)
                    .unwrap();
            }
            for filler in fillers {
                filler_trie
                    .insert(&mut arena, filler.as_bytes(), ignore_case)
                    .unwrap();
            }
            Self {
                arena,
                words: word_trie,
                fillers: filler_trie,
                ignore_case,
            }
        }

        fn matcher(&self) -> Matcher<'_> {
            Matcher::new(&self.arena, &self.words, &self.fillers, self.ignore_case)
        }
    }

    #[test]
    fn test_char_width() {
        assert_eq!(char_width(b'a'), 1);
        assert_eq!(char_width("é".as_bytes()[0]), 2);
        assert_eq!(char_width("屏".as_bytes()[0]), 3);
        assert_eq!(char_width("😀".as_bytes()[0]), 4);
        assert_eq!(char_width(0x80), 1);
        assert_eq!(char_width(0xFF), 1);
    }

    #[test]
    fn test_longest_match_wins() {
        let fx = Fixture::new(&["he", "hello"], &[], false);
        let found = fx.matcher().match_at(b"hello world").unwrap();
        assert_eq!(found.len, 5);
        assert_eq!(found.phrase, b"hello");

        let short = fx.matcher().match_at(b"help").unwrap();
        assert_eq!(short.len, 2);
        assert_eq!(short.phrase, b"he");
    }

    #[test]
    fn test_match_requires_phrase_at_start() {
        let fx = Fixture::new(&["bad"], &[" "], false);
        assert!(fx.matcher().match_at(b"xbad").is_none());
        assert!(fx.matcher().match_at(b" bad").is_none());
        assert!(fx.matcher().match_at(b"ba").is_none());
    }

    #[test]
    fn test_skip_consumes_consecutive_fillers() {
        let fx = Fixture::new(&[], &[" ", "*", "--"], false);
        assert_eq!(fx.matcher().skip(b"  *--x"), 5);
        assert_eq!(fx.matcher().skip(b"-x"), 0);
        assert_eq!(fx.matcher().skip(b"x  "), 0);
    }

    #[test]
    fn test_filler_inside_match() {
        let fx = Fixture::new(&["bad"], &[" ", ".", "*"], false);
        let found = fx.matcher().match_at(b"b. a**d!").unwrap();
        assert_eq!(found.len, 7);
        assert_eq!(found.phrase, b"bad");
    }

    #[test]
    fn test_trailing_filler_not_consumed() {
        let fx = Fixture::new(&["bad"], &[" "], false);
        let found = fx.matcher().match_at(b"bad   ").unwrap();
        assert_eq!(found.len, 3);
    }

    #[test]
    fn test_filler_before_shorter_word_end() {
        let fx = Fixture::new(&["ab", "abcd"], &[" "], false);
        let found = fx.matcher().match_at(b"a b c x").unwrap();
        assert_eq!(found.len, 3);
        assert_eq!(found.phrase, b"ab");
    }

    #[test]
    fn test_ignore_case_match() {
        let fx = Fixture::new(&["bad"], &[], true);
        let result = fx.matcher().scan("so BAD, so Bad");
        assert!(result.found);
        assert_eq!(result.phrases, vec!["bad".to_string()]);
    }

    #[test]
    fn test_scan_dedupes_and_orders_by_discovery() {
        let fx = Fixture::new(&["hi", "hello"], &[], false);
        let result = fx.matcher().scan("say hello hi hello hi");
        assert!(result.found);
        assert_eq!(result.phrases, vec!["hello".to_string(), "hi".to_string()]);
    }

    #[test]
    fn test_scan_multibyte() {
        let fx = Fixture::new(&["屏蔽词", "屏蔽", "词"], &[" "], false);
        let result = fx.matcher().scan("我 是 屏 蔽 词!");
        assert!(result.found);
        assert_eq!(result.phrases, vec!["屏蔽词".to_string()]);

        let partial = fx.matcher().scan("屏蔽xx");
        assert_eq!(partial.phrases, vec!["屏蔽".to_string()]);
    }

    #[test]
    fn test_scan_empty_inputs() {
        let fx = Fixture::new(&[], &[" "], false);
        assert!(!fx.matcher().scan("anything").found);

        let fx = Fixture::new(&["x"], &[], false);
        let result = fx.matcher().scan("");
        assert!(!result.found);
        assert!(result.phrases.is_empty());
    }

    #[test]
    fn test_match_set() {
        let mut set = MatchSet::default();
        assert!(set.insert(b"bad".to_vec()));
        assert!(!set.insert(b"bad".to_vec()));
        assert!(set.insert(b"word".to_vec()));
        assert_eq!(set.len(), 2);
        assert!(set.contains("word"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["bad", "word"]);
    }
}
