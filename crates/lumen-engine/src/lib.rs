//! Lumen Engine -- headless scene plus deterministic tick loop driving
//! [`lumen_tween`].
//!
//! The engine owns a flat [`Scene`](scene::Scene) of animatable nodes and a
//! tween [`Animator`](lumen_tween::animator::Animator). A fixed-timestep
//! [`TickLoop`](tick::TickLoop) runs gameplay systems and then steps the
//! animator, and the whole state can be captured and restored as a
//! BLAKE3-hashed [`EngineSnapshot`](snapshot::EngineSnapshot).
//!
//! # Quick Start
//!
//! ```
//! use lumen_engine::prelude::*;
//!
//! let config = EngineConfig::default();
//! let mut tick_loop = TickLoop::new(Scene::new(), config.tick, config.animator);
//! let coin = tick_loop.scene_mut().spawn("coin");
//! tick_loop.scene_mut().register_sound("pickup");
//!
//! tick_loop
//!     .animator_mut()
//!     .spawn(&TweenSpec::sequence(vec![
//!         TweenSpec::scale_to(coin, Vec2::new(1.5, 1.5), 0.25).ease(Ease::BackOut),
//!         TweenSpec::play("pickup"),
//!         TweenSpec::fade_to(coin, 0.0, 0.25),
//!     ]))
//!     .unwrap();
//!
//! let mut sounds = Vec::new();
//! while tick_loop.animator().active_count() > 0 {
//!     tick_loop.tick();
//!     sounds.extend(tick_loop.last_diagnostics().sounds.iter().cloned());
//! }
//! assert_eq!(tick_loop.scene().get(coin).unwrap().color.a, 0.0);
//! assert_eq!(sounds, vec![SoundId::new("pickup")]);
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod logging;
pub mod scene;
pub mod snapshot;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the tween crate for convenience.
pub use lumen_tween;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use lumen_tween::prelude::*;

    pub use crate::config::{ConfigError, EngineConfig, LogFilter};
    pub use crate::logging::init_tracing;
    pub use crate::scene::{Scene, SceneNode, Transform};
    pub use crate::snapshot::EngineSnapshot;
    pub use crate::tick::{SystemFn, TickConfig, TickDiagnostics, TickLoop};
}
