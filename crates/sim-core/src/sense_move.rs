use glam::Vec2;
use rayon::prelude::*;
use types::{tie_break, wrap_heading, SimParams};

use crate::agents::AgentSet;
use crate::trail::TrailField;

/// Steering outcome for one agent in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Straight,
    Left,
    Right,
    /// Left and right read the same; the coin picked left.
    CoinLeft,
    CoinRight,
}

impl Turn {
    /// Signed heading change. Left is counter-clockwise (positive).
    pub fn delta(self, turn_speed: f32) -> f32 {
        match self {
            Turn::Straight => 0.0,
            Turn::Left | Turn::CoinLeft => turn_speed,
            Turn::Right | Turn::CoinRight => -turn_speed,
        }
    }
}

/// Best reading on each side of the agent plus the straight-ahead probe.
/// A side without probes reads `-inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    pub left: f32,
    pub center: f32,
    pub right: f32,
}

impl SensorReadings {
    /// Straight when the centre is strictly greatest, otherwise toward the
    /// stronger side; a tie between the sides goes to the coin.
    pub fn decide(&self, coin_left: bool) -> Turn {
        if self.center > self.left && self.center > self.right {
            Turn::Straight
        } else if self.left > self.right {
            Turn::Left
        } else if self.right > self.left {
            Turn::Right
        } else if coin_left {
            Turn::CoinLeft
        } else {
            Turn::CoinRight
        }
    }
}

/// Where probe `i` samples for an agent at `position` facing `heading`.
pub fn probe_point(position: Vec2, heading: f32, i: u32, params: &SimParams) -> Vec2 {
    let dir = Vec2::from_angle(heading + params.probe_angle(i));
    position + dir * params.sensor_distance + dir.perp() * params.sensor_offset
}

pub fn sense(position: Vec2, heading: f32, field: &TrailField, params: &SimParams) -> SensorReadings {
    let center_index = params.sensor_count / 2;
    let mut readings = SensorReadings {
        left: f32::NEG_INFINITY,
        center: 0.0,
        right: f32::NEG_INFINITY,
    };
    for i in 0..params.sensor_count {
        let probe = probe_point(position, heading, i, params);
        let value = field.sample_footprint(probe, params.sensor_size);
        if i < center_index {
            readings.right = readings.right.max(value);
        } else if i > center_index {
            readings.left = readings.left.max(value);
        } else {
            readings.center = value;
        }
    }
    readings
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnCounts {
    pub straight: u32,
    /// All left turns, coin flips included.
    pub left: u32,
    pub right: u32,
    pub ties: u32,
}

impl TurnCounts {
    fn of(turn: Turn) -> Self {
        let mut c = Self::default();
        match turn {
            Turn::Straight => c.straight = 1,
            Turn::Left => c.left = 1,
            Turn::Right => c.right = 1,
            Turn::CoinLeft => {
                c.left = 1;
                c.ties = 1;
            }
            Turn::CoinRight => {
                c.right = 1;
                c.ties = 1;
            }
        }
        c
    }

    fn merge(self, other: Self) -> Self {
        Self {
            straight: self.straight + other.straight,
            left: self.left + other.left,
            right: self.right + other.right,
            ties: self.ties + other.ties,
        }
    }

    pub fn total(&self) -> u32 {
        self.straight + self.left + self.right
    }
}

/// Sense-and-move pass. Reads the current agents and the freshly evolved
/// field, writes every agent's new state into `next`.
pub fn sense_and_move(
    current: &AgentSet,
    next: &mut AgentSet,
    field: &TrailField,
    params: &SimParams,
    frame_seed: u32,
) -> TurnCounts {
    debug_assert_eq!(current.len(), next.len());
    let world = field.world();
    let stride = params.speed * params.dt;

    next.positions
        .par_iter_mut()
        .zip(next.headings.par_iter_mut())
        .enumerate()
        .map(|(i, (pos_out, heading_out))| {
            let position = current.positions[i];
            let heading = current.headings[i];

            let turn = sense(position, heading, field, params)
                .decide(tie_break(frame_seed, i as u32));
            let new_heading = wrap_heading(heading + turn.delta(params.turn_speed));

            *pos_out = world.wrap_position(position + Vec2::from_angle(new_heading) * stride);
            *heading_out = new_heading;
            TurnCounts::of(turn)
        })
        .reduce(TurnCounts::default, TurnCounts::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_2;
    use types::WorldSize;

    fn readings(left: f32, center: f32, right: f32) -> SensorReadings {
        SensorReadings { left, center, right }
    }

    #[test]
    fn centre_strictly_greatest_goes_straight() {
        assert_eq!(readings(1.0, 2.0, 1.0).decide(true), Turn::Straight);
    }

    #[test]
    fn stronger_side_wins() {
        assert_eq!(readings(3.0, 2.0, 1.0).decide(false), Turn::Left);
        assert_eq!(readings(1.0, 2.0, 3.0).decide(true), Turn::Right);
        // Centre ties the best side: not strictly greatest, so turn.
        assert_eq!(readings(2.0, 2.0, 1.0).decide(false), Turn::Left);
    }

    #[test]
    fn side_tie_uses_coin() {
        assert_eq!(readings(0.0, 0.0, 0.0).decide(true), Turn::CoinLeft);
        assert_eq!(readings(0.0, 0.0, 0.0).decide(false), Turn::CoinRight);
        assert_eq!(readings(5.0, 1.0, 5.0).decide(true), Turn::CoinLeft);
    }

    #[test]
    fn single_probe_always_straight() {
        let world = WorldSize::new(8, 8);
        let field = TrailField::new(world);
        let p = SimParams { sensor_count: 1, ..Default::default() };
        let r = sense(Vec2::new(4.0, 4.0), 0.0, &field, &p);
        assert_eq!(r.decide(false), Turn::Straight);
    }

    #[test]
    fn probe_points_follow_heading_and_offset() {
        let p = SimParams {
            sensor_fov: FRAC_PI_2,
            sensor_count: 3,
            sensor_distance: 4.0,
            sensor_offset: 0.0,
            ..Default::default()
        };
        let c = probe_point(Vec2::new(10.0, 10.0), 0.0, 1, &p);
        assert_eq!(c, Vec2::new(14.0, 10.0));

        let shifted = SimParams { sensor_offset: 2.0, ..p.clone() };
        let c = probe_point(Vec2::new(10.0, 10.0), 0.0, 1, &shifted);
        assert_eq!(c, Vec2::new(14.0, 12.0));

        let left = probe_point(Vec2::new(10.0, 10.0), 0.0, 2, &p);
        assert!(left.y > 10.0, "left probe should be counter-clockwise: {left:?}");
    }

    #[test]
    fn sensing_sees_across_the_edge() {
        let world = WorldSize::new(16, 16);
        let mut field = TrailField::new(world);
        // Straight ahead of an agent near the east edge, past the wrap.
        field.set(2, 8, Vec4::new(1.0, 0.0, 0.0, 0.0));
        let p = SimParams {
            sensor_fov: FRAC_PI_2,
            sensor_distance: 4.0,
            sensor_size: 0,
            ..Default::default()
        };
        let r = sense(Vec2::new(14.5, 8.5), 0.0, &field, &p);
        assert_eq!(r.center, 1.0);
        assert_eq!(r.decide(false), Turn::Straight);
    }

    #[test]
    fn every_agent_is_written() {
        let world = WorldSize::new(32, 32);
        let current = AgentSet::from_agents(
            (0..100).map(|i| Agent::new(Vec2::new(i as f32 * 0.3, 5.0), i as f32 * 0.1)),
            world,
        );
        let mut next = AgentSet {
            positions: vec![Vec2::splat(-1.0); 100],
            headings: vec![-1.0; 100],
        };
        let field = TrailField::new(world);
        let counts = sense_and_move(&current, &mut next, &field, &SimParams::default(), 42);

        assert_eq!(counts.total(), 100);
        assert!(next.iter().all(|a| world.contains(a.position) && a.heading >= 0.0));
    }
}
