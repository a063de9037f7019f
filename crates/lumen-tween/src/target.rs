//! The seam between the scheduler and whatever it animates.
//!
//! The scheduler never owns nodes or sounds. It reads start values from a
//! [`Stage`] when a tween begins and writes interpolated values back every
//! step. A `None`/`false` answer means the target is gone.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{Color, Vec2};

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Generational handle naming an animatable node.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

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

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// SoundId
// ---------------------------------------------------------------------------

/// Name of a sound cue triggered by a `Play` tween.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundId(pub String);

impl SoundId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Properties a tween can read and write.
pub trait Stage {
    fn position(&self, node: NodeId) -> Option<Vec2>;
    fn set_position(&mut self, node: NodeId, value: Vec2) -> bool;

    fn scale(&self, node: NodeId) -> Option<Vec2>;
    fn set_scale(&mut self, node: NodeId, value: Vec2) -> bool;

    /// Rotation in radians.
    fn rotation(&self, node: NodeId) -> Option<f32>;
    fn set_rotation(&mut self, node: NodeId, value: f32) -> bool;

    fn color(&self, node: NodeId) -> Option<Color>;
    fn set_color(&mut self, node: NodeId, value: Color) -> bool;

    /// Trigger a sound cue. Returns `false` if the cue is unknown.
    fn play_sound(&mut self, sound: &SoundId) -> bool;
}
