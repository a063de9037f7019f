//! Tween descriptions ([`TweenSpec`]) and the pooled runtime record
//! ([`TweenNode`]).
//!
//! A `TweenSpec` is plain data. It can be built in code with the
//! constructor/modifier methods or deserialized from JSON, and describes a
//! whole tree of leaves nested inside groups and sequences. The
//! [`Animator`](crate::animator::Animator) turns a spec into pooled
//! `TweenNode`s linked through intrusive parent/child/sibling indices.

use serde::{Deserialize, Serialize};

use crate::easing::Ease;
use crate::math::{Color, Vec2};
use crate::target::{NodeId, SoundId};
use crate::TweenError;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What a tween does while it runs.
///
/// The update behaviour is fixed when the node is built; the scheduler
/// dispatches on this enum every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Move to an absolute position.
    MoveTo { node: NodeId, to: Vec2 },
    /// Move by an offset relative to the position at start.
    MoveBy { node: NodeId, by: Vec2 },
    ScaleTo { node: NodeId, to: Vec2 },
    /// Rotate to an absolute angle in radians.
    RotateTo { node: NodeId, to: f32 },
    /// Change only the alpha channel of the node's colour.
    FadeTo { node: NodeId, alpha: f32 },
    TintTo { node: NodeId, color: Color },
    /// Jitter around the start position with linearly decaying magnitude,
    /// then snap back to the start position.
    Shake { node: NodeId, magnitude: f32 },
    /// Do nothing for `duration` seconds.
    Wait,
    /// Trigger a sound cue once per pass.
    Play { sound: SoundId },
    /// Run all children in parallel.
    Group,
    /// Run children one after another.
    Sequence,
}

impl Action {
    /// The node this action reads and writes, if any.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Action::MoveTo { node, .. }
            | Action::MoveBy { node, .. }
            | Action::ScaleTo { node, .. }
            | Action::RotateTo { node, .. }
            | Action::FadeTo { node, .. }
            | Action::TintTo { node, .. }
            | Action::Shake { node, .. } => Some(*node),
            Action::Wait | Action::Play { .. } | Action::Group | Action::Sequence => None,
        }
    }

    /// Whether this action holds children.
    pub fn is_container(&self) -> bool {
        matches!(self, Action::Group | Action::Sequence)
    }

    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Action::MoveTo { .. } => "move_to",
            Action::MoveBy { .. } => "move_by",
            Action::ScaleTo { .. } => "scale_to",
            Action::RotateTo { .. } => "rotate_to",
            Action::FadeTo { .. } => "fade_to",
            Action::TintTo { .. } => "tint_to",
            Action::Shake { .. } => "shake",
            Action::Wait => "wait",
            Action::Play { .. } => "play",
            Action::Group => "group",
            Action::Sequence => "sequence",
        }
    }
}

// ---------------------------------------------------------------------------
// Repeat
// ---------------------------------------------------------------------------

/// How many passes a tween plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    /// Play exactly `n` passes (`n >= 1`).
    Times(u32),
    /// Play until stopped.
    Forever,
}

impl Repeat {
    /// Whether another pass follows after `completed` passes.
    #[inline]
    pub fn has_more(self, completed: u32) -> bool {
        match self {
            Repeat::Times(n) => completed < n,
            Repeat::Forever => true,
        }
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Times(1)
    }
}

// ---------------------------------------------------------------------------
// TweenSpec
// ---------------------------------------------------------------------------

/// Serializable description of a tween tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenSpec {
    pub action: Action,
    /// Seconds per pass. Ignored by containers.
    #[serde(default)]
    pub duration: f32,
    /// Seconds to wait before the first pass.
    #[serde(default)]
    pub delay: f32,
    #[serde(default)]
    pub ease: Ease,
    #[serde(default)]
    pub repeat: Repeat,
    /// Alternate direction on every pass after the first.
    #[serde(default)]
    pub ping_pong: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TweenSpec>,
}

impl TweenSpec {
    pub fn new(action: Action, duration: f32) -> Self {
        Self {
            action,
            duration,
            delay: 0.0,
            ease: Ease::Linear,
            repeat: Repeat::Times(1),
            ping_pong: false,
            children: Vec::new(),
        }
    }

    pub fn move_to(node: NodeId, to: Vec2, duration: f32) -> Self {
        Self::new(Action::MoveTo { node, to }, duration)
    }

    pub fn move_by(node: NodeId, by: Vec2, duration: f32) -> Self {
        Self::new(Action::MoveBy { node, by }, duration)
    }

    pub fn scale_to(node: NodeId, to: Vec2, duration: f32) -> Self {
        Self::new(Action::ScaleTo { node, to }, duration)
    }

    pub fn rotate_to(node: NodeId, to: f32, duration: f32) -> Self {
        Self::new(Action::RotateTo { node, to }, duration)
    }

    pub fn fade_to(node: NodeId, alpha: f32, duration: f32) -> Self {
        Self::new(Action::FadeTo { node, alpha }, duration)
    }

    pub fn tint_to(node: NodeId, color: Color, duration: f32) -> Self {
        Self::new(Action::TintTo { node, color }, duration)
    }

    pub fn shake(node: NodeId, magnitude: f32, duration: f32) -> Self {
        Self::new(Action::Shake { node, magnitude }, duration)
    }

    pub fn wait(duration: f32) -> Self {
        Self::new(Action::Wait, duration)
    }

    pub fn play(sound: impl Into<String>) -> Self {
        Self::new(
            Action::Play {
                sound: SoundId::new(sound),
            },
            0.0,
        )
    }

    pub fn group(children: Vec<TweenSpec>) -> Self {
        Self {
            children,
            ..Self::new(Action::Group, 0.0)
        }
    }

    pub fn sequence(children: Vec<TweenSpec>) -> Self {
        Self {
            children,
            ..Self::new(Action::Sequence, 0.0)
        }
    }

    // -- modifiers ----------------------------------------------------------

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Shorthand for `repeat(Repeat::Times(n))`.
    pub fn times(self, n: u32) -> Self {
        self.repeat(Repeat::Times(n))
    }

    /// Shorthand for `repeat(Repeat::Forever)`.
    pub fn forever(self) -> Self {
        self.repeat(Repeat::Forever)
    }

    pub fn ping_pong(mut self) -> Self {
        self.ping_pong = true;
        self
    }

    /// Append a child. Only meaningful on groups and sequences.
    pub fn child(mut self, child: TweenSpec) -> Self {
        self.children.push(child);
        self
    }

    // -- inspection ---------------------------------------------------------

    /// Total number of pool slots this tree needs.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TweenSpec::node_count).sum::<usize>()
    }

    /// Check timing, repeat counts, and tree shape for the whole tree.
    pub fn validate(&self) -> Result<(), TweenError> {
        check_timing("duration", self.duration)?;
        check_timing("delay", self.delay)?;
        if self.repeat == Repeat::Times(0) {
            return Err(TweenError::InvalidRepeat);
        }
        if !self.action.is_container() && !self.children.is_empty() {
            return Err(TweenError::ChildrenOnLeaf {
                action: self.action.name(),
            });
        }
        self.children.iter().try_for_each(TweenSpec::validate)
    }

    /// Parse a spec from JSON.
    pub fn from_json(json: &str) -> Result<Self, TweenError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn check_timing(field: &'static str, value: f32) -> Result<(), TweenError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TweenError::InvalidTiming { field, value })
    }
}

// ---------------------------------------------------------------------------
// Runtime record
// ---------------------------------------------------------------------------

/// Intrusive tree links, expressed as pool slot indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Links {
    pub parent: Option<u32>,
    pub first_child: Option<u32>,
    pub last_child: Option<u32>,
    pub prev: Option<u32>,
    pub next: Option<u32>,
}

/// Mutable playback state, reset on every pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct RunState {
    pub delay_left: f32,
    pub elapsed: f32,
    /// Completed passes.
    pub iteration: u32,
    pub reversed: bool,
    /// Origin captured and `Started` emitted.
    pub started: bool,
    /// All passes finished (or cancelled) until a parent rewinds it.
    pub done: bool,
    pub paused: bool,
    pub cancelled: bool,
    /// Sound already triggered this pass.
    pub fired: bool,
    /// Active child of a sequence.
    pub cursor: Option<u32>,
}

/// Start value read from the stage when a leaf first begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub(crate) enum Origin {
    #[default]
    None,
    Point(Vec2),
    Scalar(f32),
    Color(Color),
}

/// A pooled tween node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweenNode {
    pub(crate) action: Action,
    pub(crate) duration: f32,
    pub(crate) delay: f32,
    pub(crate) ease: Ease,
    pub(crate) repeat: Repeat,
    pub(crate) ping_pong: bool,
    pub(crate) links: Links,
    pub(crate) run: RunState,
    pub(crate) origin: Origin,
}

impl TweenNode {
    /// Contents of a free slot.
    pub(crate) fn vacant() -> Self {
        Self {
            action: Action::Wait,
            duration: 0.0,
            delay: 0.0,
            ease: Ease::Linear,
            repeat: Repeat::Times(1),
            ping_pong: false,
            links: Links::default(),
            run: RunState::default(),
            origin: Origin::None,
        }
    }

    /// A fresh, unlinked node for `spec` (children are not copied).
    pub(crate) fn from_spec(spec: &TweenSpec) -> Self {
        Self {
            action: spec.action.clone(),
            duration: spec.duration,
            delay: spec.delay,
            ease: spec.ease,
            repeat: spec.repeat,
            ping_pong: spec.ping_pong,
            links: Links::default(),
            run: RunState {
                delay_left: spec.delay,
                ..RunState::default()
            },
            origin: Origin::None,
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn elapsed(&self) -> f32 {
        self.run.elapsed
    }

    /// Number of passes completed so far.
    pub fn iteration(&self) -> u32 {
        self.run.iteration
    }

    pub fn is_reversed(&self) -> bool {
        self.run.reversed
    }

    pub fn is_paused(&self) -> bool {
        self.run.paused
    }

    pub fn is_done(&self) -> bool {
        self.run.done
    }

    pub fn is_detached(&self) -> bool {
        self.links.parent.is_none()
    }
}
