//! Fixed-timestep tick loop driving the animator.
//!
//! The [`TickLoop`] owns the [`Scene`] and the [`Animator`]. Each tick:
//!
//! 1. All registered systems run in registration order. Each receives the
//!    scene and the animator mutably, so gameplay code can move nodes,
//!    spawn tweens, or stop them.
//! 2. The animator steps by `fixed_dt`, writing tweened values into the
//!    scene and returning finished trees to the pool.
//! 3. The tick counter advances.
//! 4. Tween events and played sound cues are moved out of the animator and
//!    the scene into [`TickDiagnostics`], so neither queue outlives a tick.
//!
//! There is no wall-clock input anywhere in a tick and shake jitter comes
//! from the animator's seeded RNG, so the same initial state and systems
//! always produce the same scene.
//!
//! # Example
//!
//! ```
//! use lumen_engine::prelude::*;
//!
//! let mut tick_loop = TickLoop::new(Scene::new(), TickConfig::default(), AnimatorConfig::default());
//! let hero = tick_loop.scene_mut().spawn("hero");
//! tick_loop
//!     .animator_mut()
//!     .spawn(&TweenSpec::move_to(hero, Vec2::new(60.0, 0.0), 1.0))
//!     .unwrap();
//!
//! tick_loop.run_ticks(60);
//! let pos = tick_loop.scene().get(hero).unwrap().transform.position;
//! assert!((pos.x - 60.0).abs() < 1e-3);
//! ```

use std::time::{Duration, Instant};

use lumen_tween::animator::{Animator, AnimatorConfig, StepReport, TweenEvent};
use lumen_tween::target::SoundId;
use serde::{Deserialize, Serialize};

use crate::scene::Scene;

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the fixed-timestep tick loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Fixed time step in seconds per tick. Must be positive and finite.
    pub fixed_dt: f64,
    /// Headless mode: nothing is presented, tick as fast as possible.
    pub headless: bool,
}

impl Default for TickConfig {
    /// Defaults to 60 Hz, headless off.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            headless: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing and animation results for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per system (in order of execution).
    pub system_times: Vec<(String, Duration)>,
    /// Time spent in [`Animator::step`].
    pub animation_time: Duration,
    /// Total time for the tick.
    pub total_time: Duration,
    /// What the animator did this tick.
    pub step: StepReport,
    /// Tween events emitted since the previous tick, including those from
    /// systems and from calls made between ticks.
    pub events: Vec<TweenEvent>,
    /// Sound cues played this tick, in order.
    pub sounds: Vec<SoundId>,
}

// ---------------------------------------------------------------------------
// SystemFn
// ---------------------------------------------------------------------------

/// A per-tick system. Runs before the animator steps.
pub type SystemFn = fn(&mut Scene, &mut Animator);

#[derive(Debug)]
struct RegisteredSystem {
    name: String,
    func: SystemFn,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// The deterministic fixed-timestep loop.
pub struct TickLoop {
    scene: Scene,
    animator: Animator,
    systems: Vec<RegisteredSystem>,
    tick_counter: u64,
    fixed_dt: f64,
    config: TickConfig,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// Create a tick loop around `scene` with a fresh animator.
    ///
    /// # Panics
    ///
    /// Panics if `config.fixed_dt` is not positive and finite.
    pub fn new(scene: Scene, config: TickConfig, animator: AnimatorConfig) -> Self {
        Self::with_animator(scene, config, Animator::new(animator))
    }

    /// Create a tick loop around an existing animator.
    pub fn with_animator(scene: Scene, config: TickConfig, animator: Animator) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        Self {
            scene,
            animator,
            systems: Vec::new(),
            tick_counter: 0,
            fixed_dt: config.fixed_dt,
            config,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// Register a system to be run each tick, after all earlier ones.
    ///
    /// # Panics
    ///
    /// Panics if a system with the same name is already registered.
    pub fn add_system(&mut self, name: &str, func: SystemFn) {
        self.add_system_after(name, &[], func);
    }

    /// Register a system that declares which systems must run before it.
    ///
    /// Dependencies must already be registered, so registration order is a
    /// valid execution order and the graph cannot contain a cycle.
    ///
    /// # Panics
    ///
    /// - If any system in `after` is not already registered.
    /// - If a system with this name already exists.
    pub fn add_system_after(&mut self, name: &str, after: &[&str], func: SystemFn) {
        for dep in after {
            assert!(
                self.systems.iter().any(|s| s.name == *dep),
                "system '{name}' declares dependency on '{dep}', but '{dep}' is not registered"
            );
        }
        assert!(
            !self.systems.iter().any(|s| s.name == name),
            "duplicate system name: {name:?}"
        );

        self.systems.push(RegisteredSystem {
            name: name.to_owned(),
            func,
        });
    }

    /// Execute one tick and return the animator's step report.
    pub fn tick(&mut self) -> StepReport {
        let tick_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());

        for system in &self.systems {
            let sys_start = Instant::now();
            (system.func)(&mut self.scene, &mut self.animator);
            system_times.push((system.name.clone(), sys_start.elapsed()));
        }

        let anim_start = Instant::now();
        let step = self.animator.step(self.fixed_dt as f32, &mut self.scene);
        let animation_time = anim_start.elapsed();

        self.tick_counter += 1;

        self.last_diagnostics = TickDiagnostics {
            system_times,
            animation_time,
            total_time: tick_start.elapsed(),
            step,
            events: self.animator.drain_events(),
            sounds: self.scene.drain_played(),
        };
        tracing::trace!(
            tick = self.tick_counter,
            finished = step.finished,
            active = self.animator.active_count(),
            "tick"
        );
        step
    }

    /// Run `count` ticks. Returns the number of top-level tweens that
    /// finished across all of them.
    pub fn run_ticks(&mut self, count: u64) -> u64 {
        let mut finished = 0u64;
        for _ in 0..count {
            finished += self.tick().finished as u64;
        }
        finished
    }

    /// Tick until no top-level tween is running or `max_ticks` is reached.
    /// Returns the number of ticks executed.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> u64 {
        let mut ticks = 0;
        while ticks < max_ticks && self.animator.active_count() > 0 {
            self.tick();
            ticks += 1;
        }
        if self.animator.active_count() > 0 {
            tracing::warn!(
                max_ticks,
                active = self.animator.active_count(),
                "tweens still running after tick limit"
            );
        }
        ticks
    }

    // -- accessors ----------------------------------------------------------

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time in seconds, computed as `tick_count * fixed_dt` to
    /// avoid drift from repeated addition.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// System names in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    pub fn is_headless(&self) -> bool {
        self.config.headless
    }

    // -- restore helpers ----------------------------------------------------

    pub(crate) fn set_tick_counter(&mut self, tick: u64) {
        self.tick_counter = tick;
    }

    pub(crate) fn set_fixed_dt(&mut self, dt: f64) {
        assert!(
            dt > 0.0 && dt.is_finite(),
            "fixed_dt must be positive and finite, got {dt}"
        );
        self.fixed_dt = dt;
        self.config.fixed_dt = dt;
    }

    pub(crate) fn replace_state(&mut self, scene: Scene, animator: Animator) {
        self.scene = scene;
        self.animator = animator;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
