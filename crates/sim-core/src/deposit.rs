use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use types::WorldSize;

use crate::agents::AgentSet;

/// Per-cell hit counters filled by the deposition pass and drained by the
/// evolution pass in the same frame. Atomics let every agent write in
/// parallel; integer addition makes the result independent of order.
#[derive(Debug)]
pub struct DepositCounts {
    hits: Vec<AtomicU32>,
}

impl DepositCounts {
    pub fn new(cells: usize) -> Self {
        Self {
            hits: (0..cells).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn get(&self, cell: usize) -> u32 {
        self.hits[cell].load(Ordering::Relaxed)
    }

    /// Take the count of every cell, leaving zeros behind.
    pub(crate) fn drain_mut(&mut self) -> impl IndexedParallelIterator<Item = u32> + '_ {
        self.hits
            .par_iter_mut()
            .map(|h| std::mem::take(h.get_mut()))
    }

    pub fn clear(&mut self) {
        for h in &mut self.hits {
            *h.get_mut() = 0;
        }
    }
}

/// Deposition pass: one hit at the rasterized cell of every agent.
pub fn deposit(agents: &AgentSet, world: WorldSize, counts: &DepositCounts) {
    agents.positions.par_iter().for_each(|&p| {
        let (x, y) = world.cell_of(p);
        counts.hits[world.cell_index(x, y)].fetch_add(1, Ordering::Relaxed);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use glam::Vec2;

    #[test]
    fn overlapping_agents_accumulate() {
        let world = WorldSize::new(4, 4);
        let agents = AgentSet::from_agents(
            [
                Agent::new(Vec2::new(1.2, 1.7), 0.0),
                Agent::new(Vec2::new(1.9, 1.1), 2.0),
                Agent::new(Vec2::new(3.5, 0.5), 1.0),
            ],
            world,
        );
        let counts = DepositCounts::new(world.cell_count());
        deposit(&agents, world, &counts);

        assert_eq!(counts.get(world.cell_index(1, 1)), 2);
        assert_eq!(counts.get(world.cell_index(3, 0)), 1);
        let total: u32 = (0..counts.len()).map(|i| counts.get(i)).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn drain_leaves_zeros() {
        let world = WorldSize::new(2, 2);
        let agents = AgentSet::from_agents([Agent::new(Vec2::new(0.5, 0.5), 0.0)], world);
        let mut counts = DepositCounts::new(world.cell_count());
        deposit(&agents, world, &counts);

        let drained: Vec<u32> = counts.drain_mut().collect();
        assert_eq!(drained, vec![1, 0, 0, 0]);
        assert!((0..4).all(|i| counts.get(i) == 0));
    }
}
