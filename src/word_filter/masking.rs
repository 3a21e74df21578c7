// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Masking of matched phrases

use std::borrow::Cow;

use super::matcher::{char_width, MatchSet, Matcher};
use super::trie::fold;

/// Result of filtering text: the masked copy plus what was found
#[derive(Debug, Clone, Default)]
pub struct FilterOutput {
    pub found: bool,
    pub masked: String,
    pub phrases: Vec<String>,
}

/// Replace every matched phrase in `text` with `mask_char`, one mask character
/// per phrase character. Filler inside a match is copied through unchanged.
///
/// # Returns
/// The distinct phrases found and the masked text, borrowed when nothing matched
pub fn mask_text<'a>(
    matcher: &Matcher<'_>,
    text: &'a str,
    mask_char: char,
) -> (MatchSet, Cow<'a, str>) {
    let mut phrases = MatchSet::default();
    if matcher.words.is_empty() {
        return (phrases, Cow::Borrowed(text));
    }

    let bytes = text.as_bytes();
    let mut buf = [0u8; 4];
    let mask = mask_char.encode_utf8(&mut buf).as_bytes();
    let mut out = Vec::with_capacity(bytes.len());

    matcher.for_each_match(bytes, |pos, found| match found {
        Some(found) => {
            mask_span(
                &bytes[pos..pos + found.len],
                &found.phrase,
                matcher.ignore_case,
                mask,
                &mut out,
            );
            phrases.insert(found.phrase);
        }
        None => {
            let width = char_width(bytes[pos]).min(bytes.len() - pos);
            out.extend_from_slice(&bytes[pos..pos + width]);
        }
    });

    if phrases.is_empty() {
        // Zero-copy when nothing matched
        return (phrases, Cow::Borrowed(text));
    }

    let masked = match String::from_utf8(out) {
        Ok(masked) => masked,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    };
    (phrases, Cow::Owned(masked))
}

/// Mask one matched span.
///
/// Raw bytes that agree with the next phrase byte start a phrase character,
/// which is replaced by a single mask; anything else is filler and is copied.
fn mask_span(span: &[u8], phrase: &[u8], ignore_case: bool, mask: &[u8], out: &mut Vec<u8>) {
    let mut raw = 0;
    let mut cursor = 0;

    while raw < span.len() {
        let byte = span[raw];
        if phrase.get(cursor) != Some(&fold(byte, ignore_case)) {
            out.push(byte);
            raw += 1;
            continue;
        }

        let width = char_width(byte).min(span.len() - raw);
        raw += width;
        cursor += width;
        out.extend_from_slice(mask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_filter::arena::Arena;
    use crate::word_filter::trie::Trie;

    fn build(words: &[&str], fillers: &[&str], ignore_case: bool) -> (Arena, Trie, Trie) {
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
        (arena, word_trie, filler_trie)
    }

    #[test]
    fn test_mask_span_ascii() {
        let mut out = Vec::new();
        mask_span(b"b a d", b"bad", false, b"*", &mut out);
        assert_eq!(out, b"* * *");
    }

    #[test]
    fn test_mask_span_multibyte() {
        let mut out = Vec::new();
        mask_span("屏.蔽".as_bytes(), "屏蔽".as_bytes(), false, b"#", &mut out);
        assert_eq!(out, b"#.#");
    }

    #[test]
    fn test_mask_span_folds_case() {
        let mut out = Vec::new();
        mask_span(b"B-A-D", b"bad", true, b"*", &mut out);
        assert_eq!(out, b"*-*-*");
    }

    #[test]
    fn test_mask_adjacent_phrases() {
        let (arena, words, fillers) = build(&["bad", "word"], &[], false);
        let matcher = Matcher::new(&arena, &words, &fillers, false);
        let (phrases, masked) = mask_text(&matcher, "badword", '*');
        assert_eq!(masked, "*******");
        assert_eq!(phrases.len(), 2);
    }

    #[test]
    fn test_mask_keeps_surrounding_text() {
        let (arena, words, fillers) = build(&["屏蔽词"], &["~"], false);
        let matcher = Matcher::new(&arena, &words, &fillers, false);
        let (phrases, masked) = mask_text(&matcher, "我~是~屏~蔽~词~", '*');
        assert_eq!(masked, "我~是~*~*~*~");
        assert!(phrases.contains("屏蔽词"));
    }

    #[test]
    fn test_mask_no_match_borrows() {
        let (arena, words, fillers) = build(&["bad"], &[], false);
        let matcher = Matcher::new(&arena, &words, &fillers, false);
        let (phrases, masked) = mask_text(&matcher, "all good here", '*');
        assert!(phrases.is_empty());
        assert!(matches!(masked, Cow::Borrowed(_)));
    }

    #[test]
    fn test_mask_with_multibyte_mask_char() {
        let (arena, words, fillers) = build(&["bad"], &[], false);
        let matcher = Matcher::new(&arena, &words, &fillers, false);
        let (_, masked) = mask_text(&matcher, "a bad day", '■');
        assert_eq!(masked, "a ■■■ day");
    }
}
