use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;
use types::{wrap_heading, WorldSize};

use crate::double_buffer::DoubleBuffer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub position: Vec2,
    /// Radians in `[0, 2π)`, counter-clockwise from +x.
    pub heading: f32,
}

impl Agent {
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }
}

/// One full copy of the population, stored as parallel arrays so each can be
/// uploaded to the GPU as-is. Index `i` in both arrays is the same agent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentSet {
    pub positions: Vec<Vec2>,
    pub headings: Vec<f32>,
}

impl AgentSet {
    /// Uniform positions over the world and uniform headings over `[0, 2π)`.
    pub fn random<R: Rng + ?Sized>(count: usize, world: WorldSize, rng: &mut R) -> Self {
        let extent = world.extent();
        let mut positions = Vec::with_capacity(count);
        let mut headings = Vec::with_capacity(count);
        for _ in 0..count {
            let p = Vec2::new(rng.gen_range(0.0..extent.x), rng.gen_range(0.0..extent.y));
            positions.push(world.wrap_position(p));
            headings.push(rng.gen_range(0.0..TAU));
        }
        Self {
            positions,
            headings,
        }
    }

    /// Build a set from explicit agents, normalizing into the torus.
    pub fn from_agents(agents: impl IntoIterator<Item = Agent>, world: WorldSize) -> Self {
        let (positions, headings) = agents
            .into_iter()
            .map(|a| (world.wrap_position(a.position), wrap_heading(a.heading)))
            .unzip();
        Self {
            positions,
            headings,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Agent> {
        Some(Agent::new(*self.positions.get(i)?, *self.headings.get(i)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = Agent> + '_ {
        self.positions
            .iter()
            .zip(&self.headings)
            .map(|(&p, &h)| Agent::new(p, h))
    }
}

pub type AgentStore = DoubleBuffer<AgentSet>;

/// Both halves start as copies of the initial population.
pub fn new_store(initial: AgentSet) -> AgentStore {
    DoubleBuffer::new(initial.clone(), initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_set_is_in_bounds() {
        let world = WorldSize::new(64, 32);
        let mut rng = StdRng::seed_from_u64(1);
        let set = AgentSet::random(5_000, world, &mut rng);
        assert_eq!(set.positions.len(), 5_000);
        assert_eq!(set.headings.len(), 5_000);
        for a in set.iter() {
            assert!(world.contains(a.position), "{:?}", a.position);
            assert!((0.0..TAU).contains(&a.heading));
        }
    }

    #[test]
    fn random_set_is_seed_deterministic() {
        let world = WorldSize::new(64, 32);
        let a = AgentSet::random(100, world, &mut StdRng::seed_from_u64(9));
        let b = AgentSet::random(100, world, &mut StdRng::seed_from_u64(9));
        let c = AgentSet::random(100, world, &mut StdRng::seed_from_u64(10));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn from_agents_wraps_into_torus() {
        let world = WorldSize::new(10, 10);
        let set = AgentSet::from_agents(
            [Agent::new(Vec2::new(-1.0, 12.0), -TAU * 0.25)],
            world,
        );
        assert_eq!(set.positions[0], Vec2::new(9.0, 2.0));
        assert!((set.headings[0] - TAU * 0.75).abs() < 1e-6);
    }

    #[test]
    fn store_halves_start_equal() {
        let set = AgentSet::from_agents([Agent::new(Vec2::new(1.0, 1.0), 0.5)], WorldSize::new(4, 4));
        let store = new_store(set);
        assert_eq!(store.current(), store.next());
    }
}
