// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Byte-valued prefix tree stored in arena blocks
//
// Children of a node live in one arena block of the node's size class, sorted
// ascending by byte value. Unused trailing slots hold the empty node (value 0).

use std::cmp::Ordering;

use super::arena::{Arena, BlockRef, NULL_BLOCK};
use super::config::{MAX_WORD_LENGTH, SIZE_CLASSES};
use super::error::{FilterError, FilterResult};

const VALUE_MASK: u32 = 0xFF;
const WORD_END: u32 = 1 << 8;
const CLASS_SHIFT: u32 = 9;
const CLASS_MASK: u32 = 0x7;
const CHILDREN_SHIFT: u32 = 12;
const CHILDREN_MASK: u32 = 0xF_FFFF;

/// One trie node packed into 32 bits:
/// - bits 0..8: byte value (0 marks an empty slot)
/// - bit 8: a phrase ends here
/// - bits 9..12: size class of the children block
/// - bits 12..32: children block index (0 = no children)
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Node(u32);

impl Node {
    pub const EMPTY: Node = Node(0);

    #[inline]
    pub fn new(value: u8) -> Self {
        Node(value as u32)
    }

    #[inline]
    pub fn value(self) -> u8 {
        (self.0 & VALUE_MASK) as u8
    }

    #[inline]
    pub fn is_word_end(self) -> bool {
        self.0 & WORD_END != 0
    }

    #[inline]
    pub fn set_word_end(&mut self) {
        self.0 |= WORD_END;
    }

    #[inline]
    pub fn class(self) -> u8 {
        ((self.0 >> CLASS_SHIFT) & CLASS_MASK) as u8
    }

    #[inline]
    pub fn children(self) -> BlockRef {
        (self.0 >> CHILDREN_SHIFT) & CHILDREN_MASK
    }

    #[inline]
    pub fn set_children(&mut self, class: u8, block: BlockRef) {
        debug_assert!((class as usize) < SIZE_CLASSES);
        debug_assert!(block <= CHILDREN_MASK);
        let keep = self.0 & (VALUE_MASK | WORD_END);
        self.0 = keep | ((class as u32) << CLASS_SHIFT) | (block << CHILDREN_SHIFT);
    }
}

/// Empty slots sort after every real byte, so the occupied prefix of a block
/// can be binary searched without knowing its length.
#[inline]
fn compare_slot(slot: Node, byte: u8) -> Ordering {
    match slot.value() {
        0 => Ordering::Greater,
        value => value.cmp(&byte),
    }
}

/// Position of `byte` among a block's children: `Ok` if present, `Err` with
/// the sorted insertion index otherwise.
#[inline]
pub fn search_block(block: &[Node], byte: u8) -> Result<usize, usize> {
    block.binary_search_by(|slot| compare_slot(*slot, byte))
}

#[inline]
fn occupied_len(block: &[Node]) -> usize {
    block.partition_point(|slot| slot.value() != 0)
}

#[inline]
pub fn fold(byte: u8, ignore_case: bool) -> u8 {
    if ignore_case {
        byte.to_ascii_lowercase()
    } else {
        byte
    }
}

/// Where a node lives: the trie root, or a slot inside an arena block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Root,
    Child {
        class: u8,
        block: BlockRef,
        index: usize,
    },
}

/// A prefix tree whose descendants are stored in a shared [`Arena`].
#[derive(Debug, Default)]
pub struct Trie {
    root: Node,
}

impl Trie {
    pub fn new() -> Self {
        Self { root: Node::EMPTY }
    }

    pub fn root(&self) -> Node {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children() == NULL_BLOCK
    }

    /// Look up the child of `node` carrying `byte`.
    #[inline]
    pub fn child(arena: &Arena, node: Node, byte: u8) -> Option<Node> {
        let block = arena.block(node.class(), node.children())?;
        search_block(block, byte).ok().map(|index| block[index])
    }

    fn load(&self, arena: &Arena, slot: Slot) -> Node {
        match slot {
            Slot::Root => self.root,
            Slot::Child {
                class,
                block,
                index,
            } => {
                let node = arena.block(class, block).map(|nodes| nodes[index]);
                debug_assert!(node.is_some(), "dangling slot ({}, {})", class, block);
                node.unwrap_or_default()
            }
        }
    }

    fn store(&mut self, arena: &mut Arena, slot: Slot, node: Node) {
        match slot {
            Slot::Root => self.root = node,
            Slot::Child {
                class,
                block,
                index,
            } => match arena.block_mut(class, block) {
                Some(nodes) => nodes[index] = node,
                None => debug_assert!(false, "dangling slot ({}, {})", class, block),
            },
        }
    }

    /// Insert a phrase, folding ASCII case when `ignore_case` is set.
    ///
    /// Every block the insertion can need is reserved before the trie is
    /// touched, so a failed insertion leaves the trie unchanged.
    pub fn insert(
        &mut self,
        arena: &mut Arena,
        phrase: &[u8],
        ignore_case: bool,
    ) -> FilterResult<()> {
        if phrase.len() > MAX_WORD_LENGTH {
            return Err(FilterError::PhraseTooLong {
                len: phrase.len(),
                max: MAX_WORD_LENGTH,
            });
        }
        if phrase.contains(&0) {
            return Err(FilterError::MalformedInput(
                "phrase contains a NUL byte".to_string(),
            ));
        }
        if phrase.is_empty() {
            return Ok(());
        }

        // Follow the part of the phrase that already exists.
        let mut slot = Slot::Root;
        let mut node = self.root;
        let mut depth = 0;
        for &raw in phrase {
            let byte = fold(raw, ignore_case);
            let Some(block) = arena.block(node.class(), node.children()) else {
                break;
            };
            let Ok(index) = search_block(block, byte) else {
                break;
            };
            slot = Slot::Child {
                class: node.class(),
                block: node.children(),
                index,
            };
            node = block[index];
            depth += 1;
        }

        if depth < phrase.len() {
            arena.reserve(&Self::blocks_needed(arena, node, phrase.len() - depth))?;
            for &raw in &phrase[depth..] {
                slot = self.add_child(arena, slot, fold(raw, ignore_case))?;
            }
        }

        let mut end = self.load(arena, slot);
        end.set_word_end();
        self.store(arena, slot, end);
        Ok(())
    }

    /// Blocks consumed by hanging `remaining` new nodes below `node`.
    fn blocks_needed(arena: &Arena, node: Node, remaining: usize) -> [usize; SIZE_CLASSES] {
        let mut needed = [0usize; SIZE_CLASSES];
        match arena.block(node.class(), node.children()) {
            None => needed[0] += 1,
            Some(block) if occupied_len(block) == block.len() => {
                needed[node.class() as usize + 1] += 1
            }
            Some(_) => {}
        }
        // Every new node except the last receives a one-slot children block.
        needed[0] += remaining - 1;
        needed
    }

    /// Insert `byte` among the children of the node at `parent` and return the
    /// slot of the new child.
    fn add_child(&mut self, arena: &mut Arena, parent: Slot, byte: u8) -> FilterResult<Slot> {
        let mut node = self.load(arena, parent);

        if node.children() == NULL_BLOCK {
            let block = arena.allocate(0)?;
            node.set_children(0, block);
            self.store(arena, parent, node);
        } else {
            let full = arena
                .block(node.class(), node.children())
                .is_some_and(|block| occupied_len(block) == block.len());
            if full {
                let block = arena.promote(node.class(), node.children())?;
                node.set_children(node.class() + 1, block);
                self.store(arena, parent, node);
            }
        }

        let class = node.class();
        let block = node.children();
        let nodes = arena
            .block_mut(class, block)
            .ok_or(FilterError::AllocationFailure { class })?;

        let index = match search_block(nodes, byte) {
            Ok(index) => index,
            Err(index) => {
                let len = occupied_len(nodes);
                nodes.copy_within(index..len, index + 1);
                nodes[index] = Node::new(byte);
                index
            }
        };

        Ok(Slot::Child {
            class,
            block,
            index,
        })
    }

    /// Release every children block reachable from the root back to the arena.
    pub fn release(&mut self, arena: &mut Arena) {
        let mut pending = vec![(self.root.class(), self.root.children())];

        while let Some((class, block)) = pending.pop() {
            if let Some(nodes) = arena.block(class, block) {
                pending.extend(
                    nodes
                        .iter()
                        .take_while(|node| node.value() != 0)
                        .filter(|node| node.children() != NULL_BLOCK)
                        .map(|node| (node.class(), node.children())),
                );
                arena.release(class, block);
            }
        }

        self.root = Node::EMPTY;
    }

    /// Number of phrases stored, counted by walking the trie.
    pub fn phrase_count(&self, arena: &Arena) -> usize {
        let mut count = 0;
        let mut pending = vec![self.root];

        while let Some(node) = pending.pop() {
            if let Some(nodes) = arena.block(node.class(), node.children()) {
                for child in nodes.iter().take_while(|child| child.value() != 0) {
                    if child.is_word_end() {
                        count += 1;
                    }
                    pending.push(*child);
                }
            }
        }

        count
    }

    /// Children of the root, in sorted order.
    #[cfg(test)]
    fn first_bytes(&self, arena: &Arena) -> Vec<u8> {
        arena
            .block(self.root.class(), self.root.children())
            .map(|nodes| {
                nodes
                    .iter()
                    .take_while(|node| node.value() != 0)
                    .map(|node| node.value())
                    .collect()
            })
            .unwrap_or_default()
    }
}
