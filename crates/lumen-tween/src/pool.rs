//! Fixed-capacity object pool for tween nodes.
//!
//! A [`TweenId`] is a 64-bit handle that packs a *generation* counter in the
//! high 32 bits and a slot *index* in the low 32 bits. The generation is
//! bumped every time a slot is released, so handles to finished tweens go
//! stale immediately instead of aliasing whatever reuses the slot.
//!
//! Slot 0 is the root sentinel: the parent of every running top-level tween.
//! It is never handed out or released.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tween::{Action, TweenNode};

/// Slot index of the root sentinel.
pub(crate) const ROOT: u32 = 0;

// ---------------------------------------------------------------------------
// TweenId
// ---------------------------------------------------------------------------

/// A generational tween handle.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TweenId(u64);

impl TweenId {
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The slot index (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TweenId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// TweenPool
// ---------------------------------------------------------------------------

/// Pre-allocated tween storage with a FIFO free list.
///
/// All slots exist from construction; acquiring overwrites a free slot and
/// releasing returns it to the back of the queue. Recycling in FIFO order
/// spreads generation bumps across slots instead of hammering one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweenPool {
    /// Slot storage. Index 0 is the root sentinel.
    slots: Vec<TweenNode>,
    /// Current generation for each slot.
    generations: Vec<u32>,
    /// Whether the slot currently holds a live node.
    live: Vec<bool>,
    /// Recyclable slot indices (FIFO queue).
    free: VecDeque<u32>,
    live_count: usize,
}

impl TweenPool {
    /// Create a pool with `capacity` usable slots plus the root sentinel.
    pub fn with_capacity(capacity: usize) -> Self {
        let total = capacity + 1;
        let mut slots = Vec::with_capacity(total);
        slots.resize_with(total, TweenNode::vacant);
        slots[ROOT as usize].action = Action::Group;

        let mut live = vec![false; total];
        live[ROOT as usize] = true;

        Self {
            slots,
            generations: vec![0; total],
            live,
            free: (1..total as u32).collect(),
            live_count: 0,
        }
    }

    /// Take a free slot and store `node` in it. Returns `None` when the pool
    /// is exhausted.
    pub fn acquire(&mut self, node: TweenNode) -> Option<TweenId> {
        let index = self.free.pop_front()?;
        let i = index as usize;
        self.slots[i] = node;
        self.live[i] = true;
        self.live_count += 1;
        Some(TweenId::new(index, self.generations[i]))
    }

    /// Release a live slot, bumping its generation.
    ///
    /// Returns `false` for stale handles, already-free slots, and the root.
    pub fn release(&mut self, id: TweenId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        self.release_index(id.index())
    }

    pub(crate) fn release_index(&mut self, index: u32) -> bool {
        let i = index as usize;
        if index == ROOT || i >= self.slots.len() || !self.live[i] {
            return false;
        }
        self.live[i] = false;
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.slots[i] = TweenNode::vacant();
        self.free.push_back(index);
        self.live_count -= 1;
        true
    }

    /// `true` if `id` names a live node with a current generation.
    pub fn is_live(&self, id: TweenId) -> bool {
        let i = id.index() as usize;
        id.index() != ROOT
            && i < self.slots.len()
            && self.live[i]
            && self.generations[i] == id.generation()
    }

    pub fn get(&self, id: TweenId) -> Option<&TweenNode> {
        if self.is_live(id) {
            Some(&self.slots[id.index() as usize])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: TweenId) -> Option<&mut TweenNode> {
        if self.is_live(id) {
            Some(&mut self.slots[id.index() as usize])
        } else {
            None
        }
    }

    /// Number of live nodes (the root is not counted).
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Usable slots (the root is not counted).
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    // -- index-level access for the scheduler -------------------------------

    #[inline]
    pub(crate) fn node(&self, index: u32) -> &TweenNode {
        &self.slots[index as usize]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, index: u32) -> &mut TweenNode {
        &mut self.slots[index as usize]
    }

    /// Current handle for a live slot index.
    #[inline]
    pub(crate) fn id_of(&self, index: u32) -> TweenId {
        TweenId::new(index, self.generations[index as usize])
    }

    /// Indices of every live slot except the root, in slot order.
    pub(crate) fn live_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.live
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(_, &alive)| alive)
            .map(|(i, _)| i as u32)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
