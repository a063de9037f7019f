//! The per-frame tween scheduler.
//!
//! [`Animator`] owns a [`TweenPool`] whose slot 0 is a root sentinel. Every
//! running top-level tween is a child of that root. One call to
//! [`Animator::step`] walks the root's children in insertion order and
//! advances each subtree:
//!
//! - **Leaves** interpolate from the value captured on first start towards
//!   their target, through their [`Ease`](crate::easing::Ease) curve.
//! - **Groups** advance every unfinished child by the same `dt` and finish
//!   when all children have.
//! - **Sequences** advance one child at a time; time left over when a child
//!   finishes flows into the next child within the same step.
//!
//! Delay, repeat, and ping-pong apply to any node. A top-level tree that
//! finishes is unlinked and its whole subtree goes back to the pool before
//! `step` returns, so its [`TweenId`]s go stale.
//!
//! # Example
//!
//! ```
//! use lumen_tween::prelude::*;
//! # use lumen_tween::target::SoundId;
//! # #[derive(Default)]
//! # struct Dot { pos: Vec2 }
//! # impl Stage for Dot {
//! #     fn position(&self, _: NodeId) -> Option<Vec2> { Some(self.pos) }
//! #     fn set_position(&mut self, _: NodeId, v: Vec2) -> bool { self.pos = v; true }
//! #     fn scale(&self, _: NodeId) -> Option<Vec2> { None }
//! #     fn set_scale(&mut self, _: NodeId, _: Vec2) -> bool { false }
//! #     fn rotation(&self, _: NodeId) -> Option<f32> { None }
//! #     fn set_rotation(&mut self, _: NodeId, _: f32) -> bool { false }
//! #     fn color(&self, _: NodeId) -> Option<Color> { None }
//! #     fn set_color(&mut self, _: NodeId, _: Color) -> bool { false }
//! #     fn play_sound(&mut self, _: &SoundId) -> bool { true }
//! # }
//! let mut stage = Dot::default();
//! let node = NodeId::new(0, 0);
//! let mut animator = Animator::new(AnimatorConfig::default());
//!
//! let id = animator
//!     .spawn(&TweenSpec::move_to(node, Vec2::new(10.0, 0.0), 1.0))
//!     .unwrap();
//!
//! animator.step(0.5, &mut stage);
//! assert_eq!(stage.pos, Vec2::new(5.0, 0.0));
//!
//! animator.step(0.5, &mut stage);
//! assert_eq!(stage.pos, Vec2::new(10.0, 0.0));
//! assert!(!animator.is_alive(id));
//! ```

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::math::lerp;
use crate::pool::{TweenId, TweenPool, ROOT};
use crate::target::{NodeId, Stage};
use crate::tween::{Action, Origin, TweenNode, TweenSpec};
use crate::TweenError;

// ---------------------------------------------------------------------------
// AnimatorConfig
// ---------------------------------------------------------------------------

/// Construction parameters for an [`Animator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Number of tween nodes the pool can hold at once.
    pub capacity: usize,
    /// Seed for the shake jitter RNG.
    pub seed: u64,
    /// Multiplier applied to every `dt` passed to [`Animator::step`].
    pub time_scale: f32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            seed: 0x5EED,
            time_scale: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Events and reports
// ---------------------------------------------------------------------------

/// Why a tween ended without completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// Stopped through [`Animator::stop`] or [`Animator::stop_target`].
    Stopped,
    /// The target node or sound cue did not exist.
    TargetMissing,
}

/// Lifecycle notifications, collected until [`Animator::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenEvent {
    /// First pass began (after any delay).
    Started(TweenId),
    /// A pass finished and another one begins.
    Looped(TweenId),
    /// All passes finished.
    Completed(TweenId),
    Cancelled { id: TweenId, reason: CancelReason },
}

/// Summary of one [`Animator::step`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// `dt` after time scaling (0 when nothing advanced).
    pub scaled_dt: f32,
    /// Top-level trees visited.
    pub visited: usize,
    /// Top-level trees that finished and were returned to the pool.
    pub finished: usize,
}

/// Which update a node's pass runs.
#[derive(Debug, Clone, Copy)]
enum Pass {
    Leaf,
    Group,
    Sequence,
}

/// Outcome of advancing a single node.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Advance {
    Running,
    Done { leftover: f32 },
}

// ---------------------------------------------------------------------------
// Animator
// ---------------------------------------------------------------------------

/// Pooled, tree-structured tween scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animator {
    pool: TweenPool,
    rng: Pcg32,
    time_scale: f32,
    #[serde(skip)]
    events: Vec<TweenEvent>,
}

impl Animator {
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            pool: TweenPool::with_capacity(config.capacity),
            rng: Pcg32::seed_from_u64(config.seed),
            time_scale: sanitize_time_scale(config.time_scale),
            events: Vec::new(),
        }
    }

    // -- building -----------------------------------------------------------

    /// Allocate a detached tree for `spec`.
    ///
    /// The whole tree must fit in the free slots; otherwise nothing is
    /// allocated and [`TweenError::PoolExhausted`] is returned.
    pub fn build(&mut self, spec: &TweenSpec) -> Result<TweenId, TweenError> {
        spec.validate()?;
        let needed = spec.node_count();
        let available = self.pool.free_count();
        if needed > available {
            warn!(
                needed,
                available,
                capacity = self.pool.capacity(),
                "tween pool exhausted"
            );
            return Err(self.exhausted(needed));
        }
        let index = self.build_subtree(spec)?;
        Ok(self.pool.id_of(index))
    }

    fn build_subtree(&mut self, spec: &TweenSpec) -> Result<u32, TweenError> {
        let id = self
            .pool
            .acquire(TweenNode::from_spec(spec))
            .ok_or_else(|| self.exhausted(1))?;
        for child in &spec.children {
            let child_index = self.build_subtree(child)?;
            self.link_last(id.index(), child_index);
        }
        Ok(id.index())
    }

    fn exhausted(&self, needed: usize) -> TweenError {
        TweenError::PoolExhausted {
            needed,
            available: self.pool.free_count(),
            capacity: self.pool.capacity(),
        }
    }

    /// Schedule a detached tree as a top-level tween.
    pub fn start(&mut self, id: TweenId) -> Result<(), TweenError> {
        self.check_live(id)?;
        if !self.pool.node(id.index()).is_detached() {
            return Err(TweenError::AlreadyAttached { id });
        }
        self.link_last(ROOT, id.index());
        debug!(tween = %id, action = self.pool.node(id.index()).action.name(), "tween started");
        Ok(())
    }

    /// [`build`](Self::build) followed by [`start`](Self::start).
    pub fn spawn(&mut self, spec: &TweenSpec) -> Result<TweenId, TweenError> {
        let id = self.build(spec)?;
        self.start(id)?;
        Ok(id)
    }

    /// Append a detached tree to a group or sequence.
    pub fn append_child(&mut self, parent: TweenId, child: TweenId) -> Result<(), TweenError> {
        self.check_live(parent)?;
        self.check_live(child)?;
        if !self.pool.node(parent.index()).action.is_container() {
            return Err(TweenError::NotAContainer { id: parent });
        }
        if !self.pool.node(child.index()).is_detached() {
            return Err(TweenError::AlreadyAttached { id: child });
        }
        // A detached child can only form a cycle if the parent lives inside it.
        let mut cursor = Some(parent.index());
        while let Some(i) = cursor {
            if i == child.index() {
                return Err(TweenError::Cycle { parent, child });
            }
            cursor = self.pool.node(i).links.parent;
        }

        let reversed = self.pool.node(parent.index()).run.reversed;
        self.link_last(parent.index(), child.index());
        self.pool.node_mut(child.index()).run.reversed = reversed;
        Ok(())
    }

    // -- control ------------------------------------------------------------

    /// Unlink `id` and return its whole subtree to the pool.
    pub fn stop(&mut self, id: TweenId) -> Result<(), TweenError> {
        if self.check_live(id).is_err() {
            warn!(tween = %id, "stop on stale tween handle");
            return Err(TweenError::StaleHandle { id });
        }
        self.unlink(id.index());
        let released = self.release_subtree(id.index());
        self.events.push(TweenEvent::Cancelled {
            id,
            reason: CancelReason::Stopped,
        });
        debug!(tween = %id, released, "tween stopped");
        Ok(())
    }

    /// Stop every top-level tree that animates `node`. Returns how many
    /// trees were stopped.
    pub fn stop_target(&mut self, node: NodeId) -> usize {
        let doomed: Vec<TweenId> = self
            .children_of(ROOT)
            .into_iter()
            .filter(|&i| self.subtree_targets(i, node))
            .map(|i| self.pool.id_of(i))
            .collect();
        for &id in &doomed {
            // Handles were collected from live slots a moment ago.
            let _ = self.stop(id);
        }
        doomed.len()
    }

    /// Release every live node, running or detached. No events are emitted.
    pub fn clear(&mut self) {
        let live: Vec<u32> = self.pool.live_indices().collect();
        for i in live {
            self.pool.release_index(i);
        }
        let root = self.pool.node_mut(ROOT);
        root.links.first_child = None;
        root.links.last_child = None;
        debug!("animator cleared");
    }

    pub fn pause(&mut self, id: TweenId) -> Result<(), TweenError> {
        self.set_paused(id, true)
    }

    pub fn resume(&mut self, id: TweenId) -> Result<(), TweenError> {
        self.set_paused(id, false)
    }

    fn set_paused(&mut self, id: TweenId, paused: bool) -> Result<(), TweenError> {
        self.check_live(id)?;
        self.pool.node_mut(id.index()).run.paused = paused;
        Ok(())
    }

    pub fn is_paused(&self, id: TweenId) -> bool {
        self.pool.get(id).is_some_and(TweenNode::is_paused)
    }

    /// Multiplier applied to every `dt`. Negative or non-finite values are
    /// treated as 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = sanitize_time_scale(scale);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    // -- queries ------------------------------------------------------------

    pub fn is_alive(&self, id: TweenId) -> bool {
        self.pool.is_live(id)
    }

    /// `true` if `id` is live and reachable from the root.
    pub fn is_active(&self, id: TweenId) -> bool {
        if !self.pool.is_live(id) {
            return false;
        }
        let mut cursor = self.pool.node(id.index()).links.parent;
        while let Some(i) = cursor {
            if i == ROOT {
                return true;
            }
            cursor = self.pool.node(i).links.parent;
        }
        false
    }

    pub fn get(&self, id: TweenId) -> Option<&TweenNode> {
        self.pool.get(id)
    }

    /// Progress of the current pass in `[0, 1]`.
    ///
    /// Leaves report `elapsed / duration`; containers report the fraction of
    /// children that have finished.
    pub fn progress(&self, id: TweenId) -> Option<f32> {
        let node = self.pool.get(id)?;
        if node.action.is_container() {
            let children = self.children_of(id.index());
            if children.is_empty() {
                return Some(if node.run.done { 1.0 } else { 0.0 });
            }
            let done = children
                .iter()
                .filter(|&&c| self.pool.node(c).run.done)
                .count();
            Some(done as f32 / children.len() as f32)
        } else if node.duration <= 0.0 {
            Some(if node.run.done || node.run.started { 1.0 } else { 0.0 })
        } else {
            Some((node.run.elapsed / node.duration).clamp(0.0, 1.0))
        }
    }

    /// Handles of the running top-level tweens, in step order.
    pub fn active(&self) -> Vec<TweenId> {
        self.children_of(ROOT)
            .into_iter()
            .map(|i| self.pool.id_of(i))
            .collect()
    }

    /// Number of running top-level tweens.
    pub fn active_count(&self) -> usize {
        self.children_of(ROOT).len()
    }

    /// Live nodes across all trees, running or detached.
    pub fn live_nodes(&self) -> usize {
        self.pool.live_count()
    }

    pub fn free_slots(&self) -> usize {
        self.pool.free_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Take all events emitted since the last drain.
    ///
    /// Events accumulate until drained, so a host should call this once per
    /// step.
    pub fn drain_events(&mut self) -> Vec<TweenEvent> {
        std::mem::take(&mut self.events)
    }

    // -- stepping -----------------------------------------------------------

    /// Advance every running tween by `dt` seconds (before time scaling).
    pub fn step<S: Stage>(&mut self, dt: f32, stage: &mut S) -> StepReport {
        let scaled_dt = dt * self.time_scale;
        if !(scaled_dt.is_finite() && scaled_dt > 0.0) {
            trace!(dt, time_scale = self.time_scale, "step skipped");
            return StepReport::default();
        }

        let mut report = StepReport {
            scaled_dt,
            ..StepReport::default()
        };
        let mut cursor = self.pool.node(ROOT).links.first_child;
        while let Some(i) = cursor {
            cursor = self.pool.node(i).links.next;
            report.visited += 1;
            if let Advance::Done { .. } = self.advance(i, scaled_dt, stage) {
                let id = self.pool.id_of(i);
                self.unlink(i);
                let released = self.release_subtree(i);
                report.finished += 1;
                debug!(tween = %id, released, "tween finished; returned to pool");
            }
        }
        trace!(
            dt = scaled_dt,
            visited = report.visited,
            finished = report.finished,
            "animator step"
        );
        report
    }

    fn advance<S: Stage>(&mut self, i: u32, dt: f32, stage: &mut S) -> Advance {
        let mut dt = dt;
        {
            let run = &mut self.pool.node_mut(i).run;
            if run.done {
                return Advance::Done { leftover: dt };
            }
            if run.paused {
                return Advance::Running;
            }
            if run.delay_left > 0.0 {
                if dt < run.delay_left {
                    run.delay_left -= dt;
                    return Advance::Running;
                }
                dt -= run.delay_left;
                run.delay_left = 0.0;
            }
        }

        if !self.pool.node(i).run.started {
            self.pool.node_mut(i).run.started = true;
            if !self.begin(i, stage) {
                return self.cancel_missing(i, dt);
            }
            self.events.push(TweenEvent::Started(self.pool.id_of(i)));
        }

        loop {
            let pass_dt = dt;
            let outcome = match self.pool.node(i).action {
                Action::Group => Pass::Group,
                Action::Sequence => Pass::Sequence,
                _ => Pass::Leaf,
            };
            let outcome = match outcome {
                Pass::Group => self.advance_group(i, dt, stage),
                Pass::Sequence => self.advance_sequence(i, dt, stage),
                Pass::Leaf => self.advance_leaf(i, dt, stage),
            };
            let leftover = match outcome {
                Advance::Running => return Advance::Running,
                Advance::Done { leftover } => leftover,
            };

            let node = self.pool.node_mut(i);
            if node.run.cancelled {
                return Advance::Done { leftover };
            }
            node.run.iteration += 1;
            if !node.repeat.has_more(node.run.iteration) {
                node.run.done = true;
                self.events.push(TweenEvent::Completed(self.pool.id_of(i)));
                return Advance::Done { leftover };
            }

            if node.ping_pong {
                node.run.reversed = !node.run.reversed;
            }
            self.rewind(i, false);
            self.events.push(TweenEvent::Looped(self.pool.id_of(i)));

            // A pass that consumed no time would spin forever; resume next step.
            if leftover <= 0.0 || leftover >= pass_dt {
                return Advance::Running;
            }
            dt = leftover;
        }
    }

    fn advance_leaf<S: Stage>(&mut self, i: u32, dt: f32, stage: &mut S) -> Advance {
        let node = self.pool.node_mut(i);

        if let Action::Play { sound } = &node.action {
            if !node.run.fired {
                node.run.fired = true;
                if !stage.play_sound(sound) {
                    return self.cancel_missing(i, dt);
                }
            }
        }

        let (t, leftover) = if node.duration <= 0.0 {
            (1.0, Some(dt))
        } else {
            let elapsed = node.run.elapsed + dt;
            if elapsed >= node.duration {
                node.run.elapsed = node.duration;
                (1.0, Some(elapsed - node.duration))
            } else {
                node.run.elapsed = elapsed;
                (elapsed / node.duration, None)
            }
        };
        let directed = if node.run.reversed { 1.0 - t } else { t };
        let k = node.ease.apply(directed);

        if !apply_leaf(self.pool.node(i), k, t, &mut self.rng, stage) {
            return self.cancel_missing(i, dt);
        }
        match leftover {
            Some(leftover) => Advance::Done { leftover },
            None => Advance::Running,
        }
    }

    fn advance_group<S: Stage>(&mut self, i: u32, dt: f32, stage: &mut S) -> Advance {
        let mut all_done = true;
        let mut min_leftover = dt;
        let mut cursor = self.pool.node(i).links.first_child;
        while let Some(c) = cursor {
            cursor = self.pool.node(c).links.next;
            if self.pool.node(c).run.done {
                continue;
            }
            match self.advance(c, dt, stage) {
                Advance::Running => all_done = false,
                Advance::Done { leftover } => min_leftover = min_leftover.min(leftover),
            }
        }
        if all_done {
            Advance::Done {
                leftover: min_leftover,
            }
        } else {
            Advance::Running
        }
    }

    fn advance_sequence<S: Stage>(&mut self, i: u32, dt: f32, stage: &mut S) -> Advance {
        let mut dt = dt;
        while let Some(c) = self.pool.node(i).run.cursor {
            match self.advance(c, dt, stage) {
                Advance::Running => return Advance::Running,
                Advance::Done { leftover } => {
                    let links = self.pool.node(c).links;
                    let node = self.pool.node_mut(i);
                    node.run.cursor = if node.run.reversed {
                        links.prev
                    } else {
                        links.next
                    };
                    dt = leftover;
                }
            }
        }
        Advance::Done { leftover: dt }
    }

    /// First-start hook: capture the leaf origin or position the sequence
    /// cursor. Returns `false` if the target is missing.
    fn begin<S: Stage>(&mut self, i: u32, stage: &mut S) -> bool {
        if self.pool.node(i).action == Action::Sequence {
            self.reset_cursor(i);
            return true;
        }
        let origin = match &self.pool.node(i).action {
            Action::MoveTo { node, .. } | Action::MoveBy { node, .. } | Action::Shake { node, .. } => {
                stage.position(*node).map(Origin::Point)
            }
            Action::ScaleTo { node, .. } => stage.scale(*node).map(Origin::Point),
            Action::RotateTo { node, .. } => stage.rotation(*node).map(Origin::Scalar),
            Action::FadeTo { node, .. } | Action::TintTo { node, .. } => {
                stage.color(*node).map(Origin::Color)
            }
            Action::Wait | Action::Play { .. } | Action::Group | Action::Sequence => {
                Some(Origin::None)
            }
        };
        match origin {
            Some(origin) => {
                self.pool.node_mut(i).origin = origin;
                true
            }
            None => false,
        }
    }

    fn cancel_missing(&mut self, i: u32, dt: f32) -> Advance {
        let id = self.pool.id_of(i);
        let node = self.pool.node_mut(i);
        node.run.cancelled = true;
        node.run.done = true;
        match &node.action {
            Action::Play { sound } => {
                warn!(tween = %id, sound = %sound, "sound cue missing; tween cancelled")
            }
            action => warn!(
                tween = %id,
                action = action.name(),
                target = ?action.target(),
                "tween target missing; tween cancelled"
            ),
        }
        self.events.push(TweenEvent::Cancelled {
            id,
            reason: CancelReason::TargetMissing,
        });
        Advance::Done { leftover: dt }
    }

    /// Reset a node for another pass. Children take the node's direction and
    /// restart from scratch, including their delays; `rearm` does the same
    /// for the node itself.
    fn rewind(&mut self, i: u32, rearm: bool) {
        let node = self.pool.node_mut(i);
        node.run.elapsed = 0.0;
        node.run.fired = false;
        if !node.run.cancelled {
            node.run.done = false;
        }
        if rearm {
            node.run.delay_left = node.delay;
            node.run.iteration = 0;
        }
        let reversed = node.run.reversed;

        for c in self.children_of(i) {
            self.pool.node_mut(c).run.reversed = reversed;
            self.rewind(c, true);
        }
        if self.pool.node(i).action == Action::Sequence {
            self.reset_cursor(i);
        }
    }

    fn reset_cursor(&mut self, i: u32) {
        let node = self.pool.node_mut(i);
        node.run.cursor = if node.run.reversed {
            node.links.last_child
        } else {
            node.links.first_child
        };
    }

    // -- intrusive list plumbing --------------------------------------------

    fn link_last(&mut self, parent: u32, child: u32) {
        let old_last = self.pool.node(parent).links.last_child;
        {
            let links = &mut self.pool.node_mut(child).links;
            links.parent = Some(parent);
            links.prev = old_last;
            links.next = None;
        }
        match old_last {
            Some(last) => self.pool.node_mut(last).links.next = Some(child),
            None => self.pool.node_mut(parent).links.first_child = Some(child),
        }
        self.pool.node_mut(parent).links.last_child = Some(child);
    }

    fn unlink(&mut self, child: u32) {
        let links = self.pool.node(child).links;
        let Some(parent) = links.parent else {
            return;
        };
        match links.prev {
            Some(prev) => self.pool.node_mut(prev).links.next = links.next,
            None => self.pool.node_mut(parent).links.first_child = links.next,
        }
        match links.next {
            Some(next) => self.pool.node_mut(next).links.prev = links.prev,
            None => self.pool.node_mut(parent).links.last_child = links.prev,
        }
        let parent_node = self.pool.node_mut(parent);
        if parent_node.run.cursor == Some(child) {
            parent_node.run.cursor = if parent_node.run.reversed {
                links.prev
            } else {
                links.next
            };
        }
        let links = &mut self.pool.node_mut(child).links;
        links.parent = None;
        links.prev = None;
        links.next = None;
    }

    /// Release `i` and all its descendants. Returns the number released.
    fn release_subtree(&mut self, i: u32) -> usize {
        let mut stack = vec![i];
        let mut released = 0;
        while let Some(n) = stack.pop() {
            stack.extend(self.children_of(n));
            if self.pool.release_index(n) {
                released += 1;
            }
        }
        released
    }

    fn children_of(&self, i: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cursor = self.pool.node(i).links.first_child;
        while let Some(c) = cursor {
            out.push(c);
            cursor = self.pool.node(c).links.next;
        }
        out
    }

    fn subtree_targets(&self, i: u32, node: NodeId) -> bool {
        self.pool.node(i).action.target() == Some(node)
            || self
                .children_of(i)
                .into_iter()
                .any(|c| self.subtree_targets(c, node))
    }

    fn check_live(&self, id: TweenId) -> Result<(), TweenError> {
        if self.pool.is_live(id) {
            Ok(())
        } else {
            Err(TweenError::StaleHandle { id })
        }
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(AnimatorConfig::default())
    }
}

fn sanitize_time_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        0.0
    }
}

/// Write the eased, directed value `k` of a leaf to the stage. `t` is the
/// raw pass progress: shake decays over it in either direction, and `t == 1`
/// marks the last update of a pass. Returns `false` if the target is gone.
fn apply_leaf<S: Stage>(
    node: &TweenNode,
    k: f32,
    t: f32,
    rng: &mut Pcg32,
    stage: &mut S,
) -> bool {
    match (&node.action, node.origin) {
        (Action::MoveTo { node: target, to }, Origin::Point(from)) => {
            stage.set_position(*target, from.lerp(*to, k))
        }
        (Action::MoveBy { node: target, by }, Origin::Point(from)) => {
            stage.set_position(*target, from.lerp(from + *by, k))
        }
        (Action::ScaleTo { node: target, to }, Origin::Point(from)) => {
            stage.set_scale(*target, from.lerp(*to, k))
        }
        (Action::RotateTo { node: target, to }, Origin::Scalar(from)) => {
            stage.set_rotation(*target, lerp(from, *to, k))
        }
        (Action::FadeTo { node: target, alpha }, Origin::Color(from)) => {
            // Keep whatever RGB other tweens have written this frame.
            match stage.color(*target) {
                Some(current) => {
                    let a = lerp(from.a, *alpha, k).clamp(0.0, 1.0);
                    stage.set_color(*target, current.with_alpha(a))
                }
                None => false,
            }
        }
        (Action::TintTo { node: target, color }, Origin::Color(from)) => {
            stage.set_color(*target, from.lerp(*color, k))
        }
        (Action::Shake { node: target, magnitude }, Origin::Point(origin)) => {
            if t >= 1.0 {
                stage.set_position(*target, origin)
            } else {
                let strength = magnitude * (1.0 - t);
                let jitter = crate::math::Vec2::new(
                    rng.gen_range(-1.0f32..=1.0),
                    rng.gen_range(-1.0f32..=1.0),
                );
                stage.set_position(*target, origin + jitter * strength)
            }
        }
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Color, Vec2};
    use crate::target::SoundId;
    use crate::tween::Repeat;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Default)]
    struct Props {
        position: Vec2,
        scale: Vec2,
        rotation: f32,
        color: Color,
    }

    #[derive(Default)]
    struct TestStage {
        nodes: HashMap<NodeId, Props>,
        sounds: Vec<String>,
        known_sounds: Vec<String>,
    }

    impl TestStage {
        fn with_nodes(count: u32) -> Self {
            let mut stage = Self::default();
            for i in 0..count {
                stage.nodes.insert(
                    NodeId::new(i, 0),
                    Props {
                        scale: Vec2::ONE,
                        ..Props::default()
                    },
                );
            }
            stage.known_sounds = vec!["blip".to_owned()];
            stage
        }

        fn pos(&self, node: NodeId) -> Vec2 {
            self.nodes[&node].position
        }
    }

    impl Stage for TestStage {
        fn position(&self, node: NodeId) -> Option<Vec2> {
            self.nodes.get(&node).map(|p| p.position)
        }
        fn set_position(&mut self, node: NodeId, value: Vec2) -> bool {
            self.nodes
                .get_mut(&node)
                .map(|p| p.position = value)
                .is_some()
        }
        fn scale(&self, node: NodeId) -> Option<Vec2> {
            self.nodes.get(&node).map(|p| p.scale)
        }
        fn set_scale(&mut self, node: NodeId, value: Vec2) -> bool {
            self.nodes.get_mut(&node).map(|p| p.scale = value).is_some()
        }
        fn rotation(&self, node: NodeId) -> Option<f32> {
            self.nodes.get(&node).map(|p| p.rotation)
        }
        fn set_rotation(&mut self, node: NodeId, value: f32) -> bool {
            self.nodes
                .get_mut(&node)
                .map(|p| p.rotation = value)
                .is_some()
        }
        fn color(&self, node: NodeId) -> Option<Color> {
            self.nodes.get(&node).map(|p| p.color)
        }
        fn set_color(&mut self, node: NodeId, value: Color) -> bool {
            self.nodes.get_mut(&node).map(|p| p.color = value).is_some()
        }
        fn play_sound(&mut self, sound: &SoundId) -> bool {
            if self.known_sounds.iter().any(|s| s == sound.as_str()) {
                self.sounds.push(sound.0.clone());
                true
            } else {
                false
            }
        }
    }

    fn n(i: u32) -> NodeId {
        NodeId::new(i, 0)
    }

    fn animator(capacity: usize) -> Animator {
        Animator::new(AnimatorConfig {
            capacity,
            ..AnimatorConfig::default()
        })
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // -- leaves -------------------------------------------------------------

    #[test]
    fn move_to_interpolates_and_releases() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(8);
        let id = anim
            .spawn(&TweenSpec::move_to(n(0), Vec2::new(8.0, 4.0), 2.0))
            .unwrap();

        anim.step(0.5, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::new(2.0, 1.0));
        assert!(anim.is_active(id));

        let report = anim.step(1.5, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::new(8.0, 4.0));
        assert_eq!(report.finished, 1);
        assert!(!anim.is_alive(id));
        assert_eq!(anim.free_slots(), 8);
    }

    #[test]
    fn move_by_is_relative_to_start() {
        let mut stage = TestStage::with_nodes(1);
        stage.set_position(n(0), Vec2::new(5.0, 5.0));
        let mut anim = animator(4);
        anim.spawn(&TweenSpec::move_by(n(0), Vec2::new(1.0, -1.0), 1.0))
            .unwrap();
        anim.step(1.0, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::new(6.0, 4.0));
    }

    #[test]
    fn scale_rotate_tint_and_fade() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(8);
        anim.spawn(&TweenSpec::group(vec![
            TweenSpec::scale_to(n(0), Vec2::new(3.0, 3.0), 1.0),
            TweenSpec::rotate_to(n(0), 2.0, 1.0),
            TweenSpec::tint_to(n(0), Color::rgba(1.0, 0.0, 0.0, 1.0), 1.0),
        ]))
        .unwrap();
        anim.step(0.5, &mut stage);
        let p = &stage.nodes[&n(0)];
        assert_eq!(p.scale, Vec2::new(2.0, 2.0));
        assert!(approx(p.rotation, 1.0));
        assert!(approx(p.color.g, 0.5));

        anim.step(0.5, &mut stage);
        anim.spawn(&TweenSpec::fade_to(n(0), 0.0, 1.0)).unwrap();
        anim.step(0.25, &mut stage);
        let p = &stage.nodes[&n(0)];
        assert!(approx(p.color.a, 0.75));
        // Fade leaves RGB alone.
        assert_eq!((p.color.r, p.color.g, p.color.b), (1.0, 0.0, 0.0));
    }

    #[test]
    fn easing_is_applied() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        anim.spawn(&TweenSpec::move_to(n(0), Vec2::new(10.0, 0.0), 1.0).ease(crate::Ease::QuadIn))
            .unwrap();
        anim.step(0.5, &mut stage);
        assert!(approx(stage.pos(n(0)).x, 2.5));
    }

    #[test]
    fn shake_restores_origin() {
        let mut stage = TestStage::with_nodes(1);
        stage.set_position(n(0), Vec2::new(3.0, 3.0));
        let mut anim = animator(4);
        anim.spawn(&TweenSpec::shake(n(0), 2.0, 1.0)).unwrap();
        anim.step(0.1, &mut stage);
        let mid = stage.pos(n(0));
        assert!(mid.distance(Vec2::new(3.0, 3.0)) <= 2.0 * 2f32.sqrt() + 1e-4);
        anim.step(1.0, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::new(3.0, 3.0));
    }

    #[test]
    fn zero_duration_applies_immediately() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        anim.spawn(&TweenSpec::move_to(n(0), Vec2::new(1.0, 1.0), 0.0))
            .unwrap();
        let report = anim.step(0.016, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::new(1.0, 1.0));
        assert_eq!(report.finished, 1);
    }

    #[test]
    fn play_fires_once() {
        let mut stage = TestStage::with_nodes(0);
        let mut anim = animator(4);
        anim.spawn(&TweenSpec::play("blip")).unwrap();
        anim.step(0.1, &mut stage);
        anim.step(0.1, &mut stage);
        assert_eq!(stage.sounds, vec!["blip".to_owned()]);
    }

    // -- missing targets ----------------------------------------------------

    #[test]
    fn missing_target_is_cancelled_and_freed() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        let id = anim
            .spawn(&TweenSpec::move_to(n(7), Vec2::ONE, 1.0).forever())
            .unwrap();
        let report = anim.step(0.1, &mut stage);
        assert_eq!(report.finished, 1);
        assert!(!anim.is_alive(id));
        assert_eq!(
            anim.drain_events(),
            vec![TweenEvent::Cancelled {
                id,
                reason: CancelReason::TargetMissing
            }]
        );
    }

    #[test]
    fn missing_sound_is_cancelled() {
        let mut stage = TestStage::with_nodes(0);
        let mut anim = animator(4);
        let id = anim.spawn(&TweenSpec::play("nope")).unwrap();
        anim.step(0.1, &mut stage);
        assert!(!anim.is_alive(id));
        assert!(stage.sounds.is_empty());
    }

    #[test]
    fn target_removed_mid_flight_cancels() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        let id = anim
            .spawn(&TweenSpec::move_to(n(0), Vec2::ONE, 1.0))
            .unwrap();
        anim.step(0.2, &mut stage);
        stage.nodes.clear();
        anim.step(0.2, &mut stage);
        assert!(!anim.is_alive(id));
    }

    #[test]
    fn missing_child_does_not_stop_siblings() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(8);
        anim.spawn(&TweenSpec::sequence(vec![
            TweenSpec::move_to(n(9), Vec2::ONE, 1.0),
            TweenSpec::move_to(n(0), Vec2::new(4.0, 0.0), 1.0),
        ]))
        .unwrap();
        anim.step(0.5, &mut stage);
        // The missing leaf finishes instantly and its time flows onward.
        assert_eq!(stage.pos(n(0)), Vec2::new(2.0, 0.0));
    }

    // -- containers ---------------------------------------------------------

    #[test]
    fn sequence_carries_leftover_time() {
        let mut stage = TestStage::with_nodes(2);
        let mut anim = animator(8);
        anim.spawn(&TweenSpec::sequence(vec![
            TweenSpec::move_to(n(0), Vec2::new(1.0, 0.0), 1.0),
            TweenSpec::move_to(n(1), Vec2::new(0.0, 4.0), 1.0),
        ]))
        .unwrap();
        anim.step(1.5, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::new(1.0, 0.0));
        assert_eq!(stage.pos(n(1)), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn group_runs_children_in_parallel_until_longest_ends() {
        let mut stage = TestStage::with_nodes(2);
        let mut anim = animator(8);
        let id = anim
            .spawn(&TweenSpec::group(vec![
                TweenSpec::move_to(n(0), Vec2::new(1.0, 0.0), 1.0),
                TweenSpec::move_to(n(1), Vec2::new(2.0, 0.0), 2.0),
            ]))
            .unwrap();
        anim.step(1.0, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::new(1.0, 0.0));
        assert_eq!(stage.pos(n(1)), Vec2::new(1.0, 0.0));
        assert_eq!(anim.progress(id), Some(0.5));
        assert!(anim.is_alive(id));
        anim.step(1.0, &mut stage);
        assert!(!anim.is_alive(id));
    }

    #[test]
    fn empty_containers_finish_immediately() {
        let mut stage = TestStage::with_nodes(0);
        let mut anim = animator(4);
        anim.spawn(&TweenSpec::group(vec![])).unwrap();
        anim.spawn(&TweenSpec::sequence(vec![])).unwrap();
        let report = anim.step(0.1, &mut stage);
        assert_eq!(report.finished, 2);
        assert_eq!(anim.live_nodes(), 0);
    }

    // -- modifiers ----------------------------------------------------------

    #[test]
    fn delay_is_consumed_first() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        anim.spawn(&TweenSpec::move_to(n(0), Vec2::new(10.0, 0.0), 1.0).delay(0.5))
            .unwrap();
        anim.step(0.4, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::ZERO);
        anim.step(0.2, &mut stage);
        assert!(approx(stage.pos(n(0)).x, 1.0));
    }

    #[test]
    fn repeat_times_loops_and_completes() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        let id = anim
            .spawn(&TweenSpec::move_to(n(0), Vec2::new(10.0, 0.0), 1.0).times(3))
            .unwrap();
        anim.step(1.5, &mut stage);
        assert!(approx(stage.pos(n(0)).x, 5.0));
        assert_eq!(anim.get(id).unwrap().iteration(), 1);
        anim.step(1.5, &mut stage);
        assert!(!anim.is_alive(id));
        let events = anim.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, TweenEvent::Looped(_)))
                .count(),
            2
        );
        assert_eq!(events.last(), Some(&TweenEvent::Completed(id)));
    }

    #[test]
    fn ping_pong_reverses_direction() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        let id = anim
            .spawn(
                &TweenSpec::move_to(n(0), Vec2::new(10.0, 0.0), 1.0)
                    .times(2)
                    .ping_pong(),
            )
            .unwrap();
        anim.step(1.25, &mut stage);
        assert!(approx(stage.pos(n(0)).x, 7.5));
        assert!(anim.get(id).unwrap().is_reversed());
        anim.step(0.75, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::ZERO);
        assert!(!anim.is_alive(id));
    }

    #[test]
    fn ping_pong_sequence_plays_children_backwards() {
        let mut stage = TestStage::with_nodes(2);
        let mut anim = animator(8);
        anim.spawn(
            &TweenSpec::sequence(vec![
                TweenSpec::move_to(n(0), Vec2::new(1.0, 0.0), 1.0),
                TweenSpec::move_to(n(1), Vec2::new(1.0, 0.0), 1.0),
            ])
            .times(2)
            .ping_pong(),
        )
        .unwrap();
        anim.step(2.0, &mut stage);
        // Reverse pass starts with the last child.
        anim.step(0.5, &mut stage);
        assert!(approx(stage.pos(n(1)).x, 0.5));
        assert_eq!(stage.pos(n(0)), Vec2::new(1.0, 0.0));
        anim.step(1.0, &mut stage);
        assert_eq!(stage.pos(n(1)), Vec2::ZERO);
        assert!(approx(stage.pos(n(0)).x, 0.5));
    }

    #[test]
    fn forever_zero_duration_does_not_spin() {
        let mut stage = TestStage::with_nodes(0);
        let mut anim = animator(4);
        let id = anim.spawn(&TweenSpec::wait(0.0).forever()).unwrap();
        anim.step(1.0, &mut stage);
        anim.step(1.0, &mut stage);
        assert!(anim.is_active(id));
        assert_eq!(anim.get(id).unwrap().iteration(), 2);
    }

    #[test]
    fn looping_sequence_rearms_child_delays() {
        let mut stage = TestStage::with_nodes(0);
        let mut anim = animator(4);
        let id = anim
            .spawn(&TweenSpec::sequence(vec![TweenSpec::wait(0.5).delay(0.5)]).times(2))
            .unwrap();
        anim.step(1.0, &mut stage);
        assert_eq!(anim.get(id).unwrap().iteration(), 1);
        anim.step(0.75, &mut stage);
        assert!(anim.is_alive(id));
        anim.step(0.25, &mut stage);
        assert!(!anim.is_alive(id));
    }

    // -- control ------------------------------------------------------------

    #[test]
    fn pause_and_resume() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        let id = anim
            .spawn(&TweenSpec::move_to(n(0), Vec2::new(10.0, 0.0), 1.0))
            .unwrap();
        anim.pause(id).unwrap();
        assert!(anim.is_paused(id));
        anim.step(0.5, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::ZERO);
        anim.resume(id).unwrap();
        anim.step(0.5, &mut stage);
        assert!(approx(stage.pos(n(0)).x, 5.0));
    }

    #[test]
    fn stop_releases_subtree_and_stales_handles() {
        let mut anim = animator(8);
        let id = anim
            .spawn(&TweenSpec::sequence(vec![
                TweenSpec::wait(1.0),
                TweenSpec::wait(1.0),
            ]))
            .unwrap();
        assert_eq!(anim.live_nodes(), 3);
        anim.stop(id).unwrap();
        assert_eq!(anim.live_nodes(), 0);
        assert_eq!(anim.active_count(), 0);
        assert!(matches!(
            anim.stop(id),
            Err(TweenError::StaleHandle { .. })
        ));
    }

    #[test]
    fn stop_nested_child_advances_sequence_cursor() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(8);
        let seq = anim.build(&TweenSpec::sequence(vec![])).unwrap();
        let first = anim.build(&TweenSpec::wait(5.0)).unwrap();
        let second = anim
            .build(&TweenSpec::move_to(n(0), Vec2::new(2.0, 0.0), 1.0))
            .unwrap();
        anim.append_child(seq, first).unwrap();
        anim.append_child(seq, second).unwrap();
        anim.start(seq).unwrap();

        anim.step(0.5, &mut stage);
        anim.stop(first).unwrap();
        anim.step(0.5, &mut stage);
        assert!(approx(stage.pos(n(0)).x, 1.0));
    }

    #[test]
    fn stop_target_only_hits_matching_trees() {
        let mut anim = animator(8);
        anim.spawn(&TweenSpec::move_to(n(0), Vec2::ONE, 1.0)).unwrap();
        anim.spawn(&TweenSpec::group(vec![TweenSpec::fade_to(n(0), 0.0, 1.0)]))
            .unwrap();
        let keep = anim.spawn(&TweenSpec::move_to(n(1), Vec2::ONE, 1.0)).unwrap();
        assert_eq!(anim.stop_target(n(0)), 2);
        assert_eq!(anim.active(), vec![keep]);
    }

    #[test]
    fn build_is_atomic_when_pool_too_small() {
        let mut anim = animator(2);
        let err = anim
            .spawn(&TweenSpec::sequence(vec![
                TweenSpec::wait(1.0),
                TweenSpec::wait(1.0),
            ]))
            .unwrap_err();
        assert!(matches!(
            err,
            TweenError::PoolExhausted {
                needed: 3,
                available: 2,
                capacity: 2
            }
        ));
        assert_eq!(anim.free_slots(), 2);
    }

    #[test]
    fn append_child_validations() {
        let mut anim = animator(8);
        let leaf = anim.build(&TweenSpec::wait(1.0)).unwrap();
        let other = anim.build(&TweenSpec::wait(1.0)).unwrap();
        assert!(matches!(
            anim.append_child(leaf, other),
            Err(TweenError::NotAContainer { .. })
        ));

        let outer = anim.build(&TweenSpec::group(vec![])).unwrap();
        let inner = anim.build(&TweenSpec::group(vec![])).unwrap();
        anim.append_child(outer, inner).unwrap();
        assert!(matches!(
            anim.append_child(inner, outer),
            Err(TweenError::Cycle { .. })
        ));
        assert!(matches!(
            anim.start(inner),
            Err(TweenError::AlreadyAttached { .. })
        ));
    }

    #[test]
    fn detached_trees_do_not_run() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        let id = anim
            .build(&TweenSpec::move_to(n(0), Vec2::ONE, 1.0))
            .unwrap();
        anim.step(1.0, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::ZERO);
        assert!(anim.is_alive(id));
        assert!(!anim.is_active(id));
    }

    #[test]
    fn clear_releases_everything() {
        let mut anim = animator(4);
        anim.spawn(&TweenSpec::wait(1.0)).unwrap();
        anim.build(&TweenSpec::wait(1.0)).unwrap();
        anim.clear();
        assert_eq!(anim.live_nodes(), 0);
        assert_eq!(anim.free_slots(), 4);
        assert_eq!(anim.active_count(), 0);
    }

    #[test]
    fn time_scale_scales_dt() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        anim.set_time_scale(2.0);
        anim.spawn(&TweenSpec::move_to(n(0), Vec2::new(10.0, 0.0), 1.0))
            .unwrap();
        let report = anim.step(0.25, &mut stage);
        assert_eq!(report.scaled_dt, 0.5);
        assert!(approx(stage.pos(n(0)).x, 5.0));

        anim.set_time_scale(f32::NAN);
        assert_eq!(anim.time_scale(), 0.0);
        assert_eq!(anim.step(1.0, &mut stage), StepReport::default());
    }

    #[test]
    fn events_follow_lifecycle() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        let id = anim.spawn(&TweenSpec::wait(0.5)).unwrap();
        anim.step(0.25, &mut stage);
        anim.step(0.25, &mut stage);
        assert_eq!(
            anim.drain_events(),
            vec![TweenEvent::Started(id), TweenEvent::Completed(id)]
        );
        assert!(anim.drain_events().is_empty());
    }

    #[test]
    fn group_leftover_is_smallest_of_children_finishing_this_step() {
        let mut stage = TestStage::with_nodes(3);
        let mut anim = animator(8);
        anim.spawn(&TweenSpec::sequence(vec![
            TweenSpec::group(vec![
                TweenSpec::move_to(n(0), Vec2::new(1.0, 0.0), 1.0),
                TweenSpec::move_to(n(1), Vec2::new(1.0, 0.0), 0.5),
            ]),
            TweenSpec::move_to(n(2), Vec2::new(10.0, 0.0), 1.0),
        ]))
        .unwrap();

        // The short child finished a step earlier; its spare time must not
        // count toward the group's leftover.
        anim.step(0.6, &mut stage);
        assert_eq!(stage.pos(n(1)), Vec2::new(1.0, 0.0));
        assert_eq!(stage.pos(n(2)), Vec2::ZERO);
        anim.step(0.6, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::new(1.0, 0.0));
        assert!(approx(stage.pos(n(2)).x, 2.0), "got {:?}", stage.pos(n(2)));
    }

    #[test]
    fn group_leftover_flows_into_next_sibling_in_one_step() {
        let mut stage = TestStage::with_nodes(3);
        let mut anim = animator(8);
        anim.spawn(&TweenSpec::sequence(vec![
            TweenSpec::group(vec![
                TweenSpec::move_to(n(0), Vec2::new(1.0, 0.0), 1.0),
                TweenSpec::move_to(n(1), Vec2::new(1.0, 0.0), 0.5),
            ]),
            TweenSpec::move_to(n(2), Vec2::new(10.0, 0.0), 1.0),
        ]))
        .unwrap();
        anim.step(1.2, &mut stage);
        assert!(approx(stage.pos(n(2)).x, 2.0), "got {:?}", stage.pos(n(2)));
    }

    #[test]
    fn own_loops_do_not_repeat_delay() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        let id = anim
            .spawn(
                &TweenSpec::move_to(n(0), Vec2::new(10.0, 0.0), 1.0)
                    .delay(0.5)
                    .times(2)
                    .ping_pong(),
            )
            .unwrap();
        anim.step(1.5, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::new(10.0, 0.0));
        anim.step(0.5, &mut stage);
        assert!(approx(stage.pos(n(0)).x, 5.0), "got {:?}", stage.pos(n(0)));
        anim.step(0.5, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::ZERO);
        assert!(!anim.is_alive(id));
    }

    #[test]
    fn stop_emits_cancelled_stopped() {
        let mut anim = animator(4);
        let a = anim.spawn(&TweenSpec::wait(1.0)).unwrap();
        let b = anim.spawn(&TweenSpec::fade_to(n(0), 0.0, 1.0)).unwrap();
        anim.stop(a).unwrap();
        assert_eq!(anim.stop_target(n(0)), 1);
        assert_eq!(
            anim.drain_events(),
            vec![
                TweenEvent::Cancelled {
                    id: a,
                    reason: CancelReason::Stopped,
                },
                TweenEvent::Cancelled {
                    id: b,
                    reason: CancelReason::Stopped,
                },
            ]
        );
    }

    #[test]
    fn reversed_shake_still_decays() {
        let mut stage = TestStage::with_nodes(1);
        let mut anim = animator(4);
        anim.spawn(&TweenSpec::shake(n(0), 1.0, 1.0).times(2).ping_pong())
            .unwrap();
        anim.step(1.0, &mut stage);
        assert_eq!(stage.pos(n(0)), Vec2::ZERO);
        // Near the end of the backward pass the jitter must be almost gone.
        anim.step(0.95, &mut stage);
        let offset = stage.pos(n(0)).distance(Vec2::ZERO);
        assert!(offset <= 0.05 * 2f32.sqrt() + 1e-4, "offset {offset}");
    }

    #[test]
    fn repeat_default_is_single_pass() {
        assert_eq!(TweenSpec::wait(1.0).repeat, Repeat::Times(1));
    }
}
