// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Size-classed node pools backing every trie of one filter context
//
// Blocks are addressed by (class, BlockRef) and never by reference: growing a
// pool may move its storage, so callers re-resolve a block after any call
// that can allocate in the same class.

use std::collections::VecDeque;
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::config::SIZE_CLASSES;
use super::error::{FilterError, FilterResult};
use super::trie::Node;

/// 1-based block index inside one size-class pool; 0 means "no block".
pub type BlockRef = u32;

pub const NULL_BLOCK: BlockRef = 0;

/// Largest block index representable in a node's children field.
pub const MAX_BLOCKS: usize = (1 << 20) - 1;

/// Minimum number of blocks added per growth, by class.
const GROW_STEP: [usize; SIZE_CLASSES] = [8, 8, 4, 4, 2, 2, 1, 1];

/// Bytes held by every live arena in the process.
static MEMORY_USAGE: AtomicUsize = AtomicUsize::new(0);

/// Process-wide arena footprint in bytes.
pub fn memory_usage() -> usize {
    MEMORY_USAGE.load(Ordering::Relaxed)
}

/// Node slots in one block of `class`.
#[inline]
pub const fn block_len(class: u8) -> usize {
    (1 << (class as usize + 1)) - 1
}

/// Occupancy of one pool, as reported to introspection callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub class: u8,
    /// Highest block index handed out from the end of the pool
    pub tail: usize,
    /// Blocks the backing storage can hold without growing
    pub capacity: usize,
}

struct Pool {
    class: u8,
    nodes: Vec<Node>,
    tail: usize,
    free: VecDeque<BlockRef>,
}

impl Pool {
    fn new(class: u8) -> Self {
        Self {
            class,
            nodes: Vec::new(),
            tail: 0,
            free: VecDeque::new(),
        }
    }

    fn capacity(&self) -> usize {
        self.nodes.len() / block_len(self.class)
    }

    fn available(&self) -> usize {
        self.free.len() + (self.capacity() - self.tail)
    }

    fn bytes(&self) -> usize {
        self.nodes.len() * mem::size_of::<Node>()
    }

    fn range(&self, block: BlockRef) -> std::ops::Range<usize> {
        let len = block_len(self.class);
        let start = (block as usize - 1) * len;
        start..start + len
    }

    /// Grow the backing storage by at least `extra` zeroed blocks.
    fn grow(&mut self, extra: usize) -> FilterResult<usize> {
        let failure = FilterError::AllocationFailure { class: self.class };
        let capacity = self.capacity();
        let headroom = MAX_BLOCKS - capacity;
        if extra > headroom {
            return Err(failure);
        }

        let step = extra
            .max(GROW_STEP[self.class as usize])
            .max(capacity / 2)
            .min(headroom);
        let added_nodes = step * block_len(self.class);

        self.nodes
            .try_reserve_exact(added_nodes)
            .map_err(|_| failure)?;
        self.nodes.resize(self.nodes.len() + added_nodes, Node::EMPTY);

        Ok(added_nodes * mem::size_of::<Node>())
    }

    fn allocate(&mut self) -> FilterResult<(BlockRef, usize)> {
        if let Some(block) = self.free.pop_front() {
            return Ok((block, 0));
        }

        let grown = if self.tail == self.capacity() {
            self.grow(1)?
        } else {
            0
        };
        self.tail += 1;
        Ok((self.tail as BlockRef, grown))
    }

    fn release(&mut self, block: BlockRef) {
        let range = self.range(block);
        self.nodes[range].fill(Node::EMPTY);

        if block as usize == self.tail {
            self.tail -= 1;
        } else {
            self.free.push_back(block);
        }
    }

    fn block(&self, block: BlockRef) -> Option<&[Node]> {
        if block == NULL_BLOCK {
            return None;
        }
        let range = self.range(block);
        self.nodes.get(range)
    }

    fn block_mut(&mut self, block: BlockRef) -> Option<&mut [Node]> {
        if block == NULL_BLOCK {
            return None;
        }
        let range = self.range(block);
        self.nodes.get_mut(range)
    }
}

/// Node storage shared by the word trie and the filler trie of one context.
pub struct Arena {
    pools: [Pool; SIZE_CLASSES],
    allocated: usize,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            pools: std::array::from_fn(|class| Pool::new(class as u8)),
            allocated: 0,
        }
    }

    /// Bytes of node storage owned by this arena.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated
    }

    fn account(&mut self, bytes: usize) {
        if bytes > 0 {
            self.allocated += bytes;
            MEMORY_USAGE.fetch_add(bytes, Ordering::Relaxed);
        }
    }

    /// Hand out a zeroed block of `class`, preferring previously released ones.
    pub fn allocate(&mut self, class: u8) -> FilterResult<BlockRef> {
        let (block, grown) = self.pools[class as usize].allocate()?;
        self.account(grown);
        Ok(block)
    }

    /// Return a block to its pool. The block is zeroed immediately.
    pub fn release(&mut self, class: u8, block: BlockRef) {
        if block != NULL_BLOCK {
            self.pools[class as usize].release(block);
        }
    }

    /// Make sure the next `needed[class]` allocations of every class cannot fail.
    pub fn reserve(&mut self, needed: &[usize; SIZE_CLASSES]) -> FilterResult<()> {
        for (class, &count) in needed.iter().enumerate() {
            let pool = &mut self.pools[class];
            let available = pool.available();
            if count > available {
                let grown = pool.grow(count - available)?;
                self.account(grown);
            }
        }
        Ok(())
    }

    pub fn block(&self, class: u8, block: BlockRef) -> Option<&[Node]> {
        self.pools[class as usize].block(block)
    }

    pub fn block_mut(&mut self, class: u8, block: BlockRef) -> Option<&mut [Node]> {
        self.pools[class as usize].block_mut(block)
    }

    /// Move a full block of `class` into a fresh block of `class + 1` and
    /// release the old one. Returns the new block index.
    pub fn promote(&mut self, class: u8, block: BlockRef) -> FilterResult<BlockRef> {
        let target = class + 1;
        let promoted = self.allocate(target)?;

        let (lower, upper) = self.pools.split_at_mut(target as usize);
        let from = &lower[class as usize];
        let to = &mut upper[0];
        let src = from.range(block);
        let dst = to.range(promoted);
        let len = src.len();
        to.nodes[dst.start..dst.start + len].copy_from_slice(&from.nodes[src]);

        self.release(class, block);
        Ok(promoted)
    }

    /// Forget pools whose blocks have all been released, keeping their storage.
    pub fn reset_idle(&mut self) {
        for pool in self.pools.iter_mut() {
            if pool.free.len() == pool.tail {
                pool.free.clear();
                pool.tail = 0;
            }
        }
    }

    pub fn stats(&self) -> [PoolStats; SIZE_CLASSES] {
        std::array::from_fn(|class| {
            let pool = &self.pools[class];
            PoolStats {
                class: pool.class,
                tail: pool.tail,
                capacity: pool.capacity(),
            }
        })
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        let held: usize = self.pools.iter().map(Pool::bytes).sum();
        MEMORY_USAGE.fetch_sub(held, Ordering::Relaxed);
    }
}
