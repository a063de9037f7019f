//! Lumen Tween -- pooled, tree-structured tween scheduler.
//!
//! Tweens are described as plain [`TweenSpec`](tween::TweenSpec) trees
//! (leaves nested inside groups and sequences), allocated into a
//! fixed-capacity [`TweenPool`](pool::TweenPool), and advanced once per frame
//! by [`Animator::step`](animator::Animator::step). The scheduler reads and
//! writes node properties only through the [`Stage`](target::Stage) trait,
//! so it has no knowledge of scenes, renderers, or audio backends.
//!
//! # Quick Start
//!
//! ```
//! use lumen_tween::prelude::*;
//!
//! let node = NodeId::new(0, 0);
//! let spec = TweenSpec::sequence(vec![
//!     TweenSpec::move_to(node, Vec2::new(100.0, 0.0), 0.5).ease(Ease::QuadOut),
//!     TweenSpec::play("land"),
//!     TweenSpec::fade_to(node, 0.0, 0.25).delay(1.0),
//! ]);
//!
//! let mut animator = Animator::new(AnimatorConfig { capacity: 16, ..Default::default() });
//! let id = animator.spawn(&spec).unwrap();
//! assert!(animator.is_active(id));
//! assert_eq!(animator.live_nodes(), 4);
//! ```

#![deny(unsafe_code)]

pub mod animator;
pub mod easing;
pub mod math;
pub mod pool;
pub mod target;
pub mod tween;

pub use easing::Ease;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by tween building and control operations.
#[derive(Debug, thiserror::Error)]
pub enum TweenError {
    /// The handle's slot was released (stale generation) or never allocated.
    #[error("tween {id} is stale or was never allocated")]
    StaleHandle { id: pool::TweenId },

    /// The tree does not fit in the remaining pool slots.
    #[error("tween pool exhausted: need {needed} slots, {available} of {capacity} free")]
    PoolExhausted {
        needed: usize,
        available: usize,
        capacity: usize,
    },

    /// A duration or delay was negative, NaN, or infinite.
    #[error("invalid {field} {value}: must be finite and non-negative")]
    InvalidTiming { field: &'static str, value: f32 },

    #[error("repeat count must be at least 1")]
    InvalidRepeat,

    /// Only groups and sequences can hold children.
    #[error("{action} tweens cannot have children")]
    ChildrenOnLeaf { action: &'static str },

    #[error("tween {id} is not a group or sequence")]
    NotAContainer { id: pool::TweenId },

    /// The tween already has a parent (another container or the root).
    #[error("tween {id} is already attached")]
    AlreadyAttached { id: pool::TweenId },

    #[error("attaching tween {child} under {parent} would create a cycle")]
    Cycle {
        parent: pool::TweenId,
        child: pool::TweenId,
    },

    #[error("failed to parse tween spec: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::animator::{
        Animator, AnimatorConfig, CancelReason, StepReport, TweenEvent,
    };
    pub use crate::easing::Ease;
    pub use crate::math::{Color, Vec2};
    pub use crate::pool::{TweenId, TweenPool};
    pub use crate::target::{NodeId, SoundId, Stage};
    pub use crate::tween::{Action, Repeat, TweenNode, TweenSpec};
    pub use crate::TweenError;
}
