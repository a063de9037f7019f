//! Engine-level snapshot and restore with BLAKE3 hashing.
//!
//! [`EngineSnapshot`] holds the scene, the animator (pool, tree links, run
//! state, and shake RNG), the tick counter, and the fixed dt, plus a BLAKE3
//! digest of all of it. Restoring a snapshot and ticking forward reproduces
//! the original run exactly.
//!
//! ```
//! use lumen_engine::prelude::*;
//!
//! let mut tick_loop = TickLoop::new(Scene::new(), TickConfig::default(), AnimatorConfig::default());
//! let hero = tick_loop.scene_mut().spawn("hero");
//! tick_loop
//!     .animator_mut()
//!     .spawn(&TweenSpec::shake(hero, 2.0, 1.0).forever())
//!     .unwrap();
//! tick_loop.run_ticks(10);
//!
//! let snapshot = tick_loop.capture_snapshot();
//! assert_eq!(snapshot.hash.len(), 64);
//!
//! tick_loop.run_ticks(20);
//! let later = tick_loop.state_hash();
//!
//! tick_loop.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(tick_loop.tick_count(), 10);
//! tick_loop.run_ticks(20);
//! assert_eq!(tick_loop.state_hash(), later);
//! ```
//!
//! # What Is NOT Serialized
//!
//! - **Systems** (fn pointers). Restoring on the same `TickLoop` keeps them.
//! - **Pending tween events**. `TickLoop::tick` moves them into
//!   [`TickDiagnostics`](crate::tick::TickDiagnostics) every tick.
//! - **Diagnostics**. Per-tick timing is transient.

use lumen_tween::animator::Animator;
use serde::{Deserialize, Serialize};

use crate::scene::Scene;
use crate::tick::TickLoop;

// ---------------------------------------------------------------------------
// EngineSnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of the full simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub scene: Scene,
    pub animator: Animator,
    /// Number of ticks executed at the time of capture.
    pub tick_counter: u64,
    pub fixed_dt: f64,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the fields above.
    pub hash: String,
}

impl EngineSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

/// BLAKE3 hex digest of the canonical JSON form of the simulation state.
fn compute_hash(scene: &Scene, animator: &Animator, tick_counter: u64, fixed_dt: f64) -> String {
    #[derive(Serialize)]
    struct HashableState<'a> {
        scene: &'a Scene,
        animator: &'a Animator,
        tick_counter: u64,
        fixed_dt: f64,
    }

    let hashable = HashableState {
        scene,
        animator,
        tick_counter,
        fixed_dt,
    };

    let json_bytes = serde_json::to_vec(&hashable)
        .expect("engine state should always be JSON-serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// TickLoop snapshot/restore methods
// ---------------------------------------------------------------------------

impl TickLoop {
    /// Capture the scene, animator, and tick metadata with a content hash.
    pub fn capture_snapshot(&self) -> EngineSnapshot {
        let scene = self.scene().clone();
        let animator = self.animator().clone();
        let tick_counter = self.tick_count();
        let fixed_dt = self.fixed_dt();
        let hash = compute_hash(&scene, &animator, tick_counter, fixed_dt);

        EngineSnapshot {
            scene,
            animator,
            tick_counter,
            fixed_dt,
            hash,
        }
    }

    /// Restore state from a snapshot. Registered systems are kept.
    ///
    /// # Errors
    ///
    /// Fails without touching the loop if `fixed_dt` is invalid or the
    /// recorded hash does not match the snapshot's contents.
    pub fn restore_from_snapshot(&mut self, snapshot: &EngineSnapshot) -> Result<(), anyhow::Error> {
        if !(snapshot.fixed_dt > 0.0 && snapshot.fixed_dt.is_finite()) {
            return Err(anyhow::anyhow!(
                "snapshot has invalid fixed_dt: {}. Must be positive and finite.",
                snapshot.fixed_dt
            ));
        }

        let expected_hash = compute_hash(
            &snapshot.scene,
            &snapshot.animator,
            snapshot.tick_counter,
            snapshot.fixed_dt,
        );
        if expected_hash != snapshot.hash {
            return Err(anyhow::anyhow!(
                "snapshot hash mismatch: recorded {} but recomputed {}. \
                 The snapshot may be corrupted or tampered with.",
                snapshot.hash,
                expected_hash
            ));
        }

        self.replace_state(snapshot.scene.clone(), snapshot.animator.clone());
        self.set_tick_counter(snapshot.tick_counter);
        self.set_fixed_dt(snapshot.fixed_dt);
        tracing::debug!(
            tick = snapshot.tick_counter,
            live_tweens = snapshot.animator.live_nodes(),
            "restored engine snapshot"
        );
        Ok(())
    }

    /// Hash of the current state, equal to `capture_snapshot().hash`.
    pub fn state_hash(&self) -> String {
        compute_hash(self.scene(), self.animator(), self.tick_count(), self.fixed_dt())
    }

    /// Same as [`capture_snapshot`](Self::capture_snapshot), named for
    /// branching workflows.
    pub fn fork_snapshot(&self) -> EngineSnapshot {
        self.capture_snapshot()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
