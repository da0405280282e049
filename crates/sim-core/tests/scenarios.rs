use glam::{Vec2, Vec4};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sim_core::{Agent, AgentSet, SimEngine};
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;
use types::{Rgb, SimParams, WorldSize};

fn engine_with(world: WorldSize, agents: &[(f32, f32, f32)], seed: u64) -> SimEngine {
    let set = AgentSet::from_agents(
        agents
            .iter()
            .map(|&(x, y, h)| Agent::new(Vec2::new(x, y), h)),
        world,
    );
    SimEngine::with_agents(world, set, StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn population_is_conserved_and_stays_on_the_torus() {
    let world = WorldSize::new(50, 40);
    let params = SimParams {
        agent_count: 1000,
        speed: 3.7,
        turn_speed: 0.9,
        sensor_offset: -3.0,
        ..Default::default()
    };
    let mut engine = SimEngine::seeded(world, &params, 11).unwrap();

    for _ in 0..20 {
        engine.step(&params).unwrap();
        assert_eq!(engine.agent_count(), 1000);
        for (p, &h) in engine.positions().iter().zip(engine.headings()) {
            assert!(p.is_finite() && world.contains(*p), "escaped: {p:?}");
            assert!(h.is_finite() && (0.0..std::f32::consts::TAU).contains(&h));
        }
    }
    assert_eq!(engine.frame(), 20);
}

#[test]
fn no_fade_and_black_deposits_leave_field_untouched() {
    let world = WorldSize::new(24, 24);
    let params = SimParams {
        agent_count: 200,
        agent_color: Rgb::BLACK,
        fade_speed: 0.0,
        ..Default::default()
    };
    let mut engine = SimEngine::seeded(world, &params, 4).unwrap();
    engine.paint(3, 4, Vec4::new(0.2, 0.4, 0.6, 0.0));
    engine.paint(20, 1, Vec4::new(1.0, 0.0, 0.125, 0.0));
    let before = engine.trail().clone();

    for _ in 0..10 {
        engine.step(&params).unwrap();
    }
    assert_eq!(engine.trail().cells(), before.cells());
}

#[test]
fn cells_without_deposits_never_brighten() {
    let world = WorldSize::new(32, 32);
    let params = SimParams {
        agent_count: 300,
        fade_speed: 0.05,
        ..Default::default()
    };
    let mut engine = SimEngine::seeded(world, &params, 8).unwrap();
    for _ in 0..5 {
        engine.step(&params).unwrap();
    }

    for _ in 0..5 {
        let deposited: HashSet<(u32, u32)> =
            engine.positions().iter().map(|&p| world.cell_of(p)).collect();
        let before = engine.trail().clone();
        engine.step(&params).unwrap();
        let after = engine.trail();

        for y in 0..world.height {
            for x in 0..world.width {
                if deposited.contains(&(x, y)) {
                    continue;
                }
                let (old, new) = (before.get(x, y), after.get(x, y));
                assert!(new.cmple(old).all(), "cell ({x}, {y}) grew: {old:?} -> {new:?}");
                if old.y > 0.0 {
                    assert!(new.y < old.y);
                }
            }
        }
    }
}

#[test]
fn ties_in_a_uniform_field_split_evenly() {
    let world = WorldSize::new(64, 64);
    let params = SimParams {
        agent_count: 4000,
        agent_color: Rgb::BLACK,
        ..Default::default()
    };
    let mut engine = SimEngine::seeded(world, &params, 99).unwrap();

    let (mut left, mut right, mut ties) = (0, 0, 0);
    for _ in 0..5 {
        let report = engine.step(&params).unwrap();
        assert_eq!(report.turns.straight, 0);
        left += report.turns.left;
        right += report.turns.right;
        ties += report.turns.ties;
    }
    assert_eq!(ties, 20_000);
    assert_eq!(left + right, 20_000);
    assert!((9_000..=11_000).contains(&left), "left {left}, right {right}");
}

#[test]
fn same_seed_same_run() {
    let world = WorldSize::new(64, 48);
    let params = SimParams {
        agent_count: 500,
        diffuse_rate: 0.3,
        ..Default::default()
    };
    let mut a = SimEngine::seeded(world, &params, 1234).unwrap();
    let mut b = SimEngine::seeded(world, &params, 1234).unwrap();

    for _ in 0..15 {
        let ra = a.step(&params).unwrap();
        let rb = b.step(&params).unwrap();
        assert_eq!(ra, rb);
    }
    assert_eq!(a.agents(), b.agents());
    assert_eq!(a.trail().cells(), b.trail().cells());
}

#[test]
fn straight_line_march_lights_crossed_cells() {
    let world = WorldSize::new(10, 10);
    let mut engine = engine_with(world, &[(1.0, 5.0, 0.0), (1.0, 6.0, 0.0)], 0);
    let params = SimParams {
        agent_count: 2,
        speed: 1.0,
        turn_speed: 0.0,
        fade_speed: 0.0,
        ..Default::default()
    };

    for _ in 0..3 {
        engine.step(&params).unwrap();
    }

    assert_eq!(engine.positions(), &[Vec2::new(4.0, 5.0), Vec2::new(4.0, 6.0)]);

    let lit: HashSet<(u32, u32)> = (0..world.height)
        .flat_map(|y| (0..world.width).map(move |x| (x, y)))
        .filter(|&(x, y)| engine.trail().intensity_at(x, y) > 0.0)
        .collect();
    let expected: HashSet<(u32, u32)> = (1..=3).flat_map(|x| [(x, 5), (x, 6)]).collect();
    assert_eq!(lit, expected);
}

#[test]
fn stronger_left_reading_turns_left_by_turn_speed() {
    let world = WorldSize::new(32, 32);
    let mut engine = engine_with(world, &[(10.0, 10.0, 0.0)], 0);
    let params = SimParams {
        agent_count: 1,
        sensor_fov: FRAC_PI_2,
        sensor_distance: 5.0,
        sensor_size: 0,
        fade_speed: 0.0,
        turn_speed: 0.2,
        ..Default::default()
    };
    // Left probe lands at (13.54, 13.54).
    engine.paint(13, 13, Vec4::ONE);

    let report = engine.step(&params).unwrap();
    assert_eq!(report.turns.left, 1);
    assert_eq!(report.turns.ties, 0);
    assert_eq!(engine.headings()[0], 0.2);
}

#[test]
fn wrapping_agent_senses_across_the_seam() {
    let world = WorldSize::new(16, 16);
    let mut engine = engine_with(world, &[(15.5, 8.5, 0.0)], 0);
    let params = SimParams {
        agent_count: 1,
        sensor_fov: FRAC_PI_2,
        sensor_distance: 3.0,
        sensor_size: 0,
        speed: 1.0,
        ..Default::default()
    };
    // Right probe: heading -π/4 from (15.5, 8.5) lands near (17.6, 6.4), i.e. (1, 6).
    engine.paint(1, 6, Vec4::ONE);

    let report = engine.step(&params).unwrap();
    assert_eq!(report.turns.right, 1);
    let p = engine.positions()[0];
    assert!(world.contains(p));
    assert!(p.x < 1.0, "expected wrap to the west edge, got {p:?}");
}
