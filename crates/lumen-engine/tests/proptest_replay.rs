//! Restoring a snapshot taken at any tick and replaying forward must land on
//! the same state hash as the uninterrupted run.

use lumen_engine::prelude::*;
use proptest::prelude::*;

fn scripted_loop(seed: u64, durations: &[f32]) -> TickLoop {
    let mut tick_loop = TickLoop::new(
        Scene::new(),
        TickConfig::default(),
        AnimatorConfig {
            seed,
            ..Default::default()
        },
    );
    let nodes: Vec<NodeId> = (0..3)
        .map(|i| tick_loop.scene_mut().spawn(format!("n{i}")))
        .collect();
    for (i, &d) in durations.iter().enumerate() {
        let node = nodes[i % nodes.len()];
        let spec = match i % 3 {
            0 => TweenSpec::shake(node, 2.0, d).times(2),
            1 => TweenSpec::move_by(node, Vec2::new(d, -d), d).ping_pong().times(3),
            _ => TweenSpec::sequence(vec![
                TweenSpec::tint_to(node, Color::BLACK, d),
                TweenSpec::fade_to(node, 0.5, d).ease(Ease::ExpoOut),
            ]),
        };
        tick_loop.animator_mut().spawn(&spec).unwrap();
    }
    tick_loop
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn restore_at_any_tick_replays_identically(
        seed in any::<u64>(),
        durations in prop::collection::vec(0.05f32..1.5, 1..8),
        split in 0u64..120,
        tail in 1u64..120,
    ) {
        let mut straight = scripted_loop(seed, &durations);
        straight.run_ticks(split);
        let snapshot = straight.capture_snapshot();
        straight.run_ticks(tail);

        let mut resumed = scripted_loop(seed, &durations);
        resumed.restore_from_snapshot(&snapshot).unwrap();
        resumed.run_ticks(tail);

        prop_assert_eq!(straight.state_hash(), resumed.state_hash());
        prop_assert_eq!(straight.tick_count(), split + tail);
    }
}
