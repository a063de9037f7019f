//! Headless animation demo.
//!
//! Usage: `lumen-demo [config.json] [script.json]`
//!
//! Spawns three nodes (`hero` = node 0, `coin` = node 1, `banner` = node 2),
//! runs the script (or a built-in one) until every tween has finished, and
//! logs the final node states plus the state hash. Set `RUST_LOG=debug` to
//! see tween lifecycle logs.

use anyhow::Context;
use lumen_engine::prelude::*;
use tracing::info;

/// Upper bound on ticks so a script with `forever` loops still exits.
const MAX_TICKS: u64 = 60 * 60;

fn builtin_script(hero: NodeId, coin: NodeId, banner: NodeId) -> TweenSpec {
    TweenSpec::group(vec![
        TweenSpec::sequence(vec![
            TweenSpec::move_to(hero, Vec2::new(120.0, 0.0), 0.8).ease(Ease::CubicInOut),
            TweenSpec::play("land"),
            TweenSpec::shake(hero, 3.0, 0.3),
            TweenSpec::rotate_to(hero, std::f32::consts::PI, 0.5).ease(Ease::BackOut),
        ]),
        TweenSpec::sequence(vec![
            TweenSpec::move_by(coin, Vec2::new(0.0, -12.0), 0.25)
                .ease(Ease::SineInOut)
                .times(4)
                .ping_pong(),
            TweenSpec::play("pickup"),
            TweenSpec::group(vec![
                TweenSpec::scale_to(coin, Vec2::new(1.6, 1.6), 0.3),
                TweenSpec::fade_to(coin, 0.0, 0.3),
            ]),
        ]),
        TweenSpec::tint_to(banner, Color::rgba(1.0, 0.8, 0.2, 1.0), 0.6)
            .delay(0.5)
            .times(2)
            .ping_pong(),
    ])
}

fn main() -> Result<(), anyhow::Error> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => EngineConfig::default(),
    };
    init_tracing(config.log_filter.as_str());

    let mut scene = Scene::new();
    let hero = scene.spawn("hero");
    let coin = scene.spawn_at("coin", Vec2::new(40.0, 80.0));
    let banner = scene.spawn_at("banner", Vec2::new(0.0, -60.0));
    scene.register_sound("land");
    scene.register_sound("pickup");

    let spec = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading script {path}"))?;
            TweenSpec::from_json(&text).with_context(|| format!("parsing script {path}"))?
        }
        None => builtin_script(hero, coin, banner),
    };

    let mut tick_loop = TickLoop::new(scene, config.tick.clone(), config.animator.clone());
    let root = tick_loop
        .animator_mut()
        .spawn(&spec)
        .context("scheduling script")?;
    info!(tween = %root, nodes = spec.node_count(), "script scheduled");

    let mut ticks = 0;
    let mut sounds = Vec::new();
    while ticks < MAX_TICKS && tick_loop.animator().active_count() > 0 {
        tick_loop.tick();
        ticks += 1;
        let diag = tick_loop.last_diagnostics();
        for event in &diag.events {
            tracing::debug!(tick = ticks, ?event, "tween event");
        }
        sounds.extend(diag.sounds.iter().map(|s| s.as_str().to_owned()));
    }
    if tick_loop.animator().active_count() > 0 {
        tracing::warn!(ticks, "script still running at tick limit");
    }

    for (id, node) in tick_loop.scene().iter() {
        let t = &node.transform;
        info!(
            node = %id,
            name = %node.name,
            x = t.position.x,
            y = t.position.y,
            scale_x = t.scale.x,
            scale_y = t.scale.y,
            rotation = t.rotation,
            alpha = node.color.a,
            "final state"
        );
    }
    info!(
        ticks,
        sim_time = tick_loop.sim_time(),
        ?sounds,
        hash = %tick_loop.state_hash(),
        "demo finished"
    );
    println!("{}", tick_loop.state_hash());
    Ok(())
}
