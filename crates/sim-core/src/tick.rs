use rand::Rng;
use tracing::{trace, trace_span, warn};
use types::SimParams;

use crate::deposit::deposit;
use crate::evolve::evolve;
use crate::sense_move::{sense_and_move, TurnCounts};
use crate::{SimEngine, SimError};

/// What one call to [`SimEngine::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Index of the frame just completed, starting at 0.
    pub frame: u64,
    pub frame_seed: u32,
    pub turns: TurnCounts,
}

impl<R: Rng> SimEngine<R> {
    /// Run one frame: deposit, evolve, sense-and-move, then swap both
    /// double buffers.
    ///
    /// `params` is borrowed for the whole frame so no pass can see a
    /// different value than another. Invalid params, or an agent count that
    /// differs from the store, abort the frame before anything is touched.
    pub fn step(&mut self, params: &SimParams) -> Result<FrameReport, SimError> {
        if let Err(e) = params.validate() {
            warn!(error = %e, "rejected frame parameters");
            return Err(e.into());
        }
        let allocated = self.agent_count();
        if params.agent_count as usize != allocated {
            return Err(SimError::AgentCountChanged {
                requested: params.agent_count,
                allocated: allocated as u32,
            });
        }

        let frame = self.frame;
        let _span = trace_span!("frame", frame).entered();
        let frame_seed: u32 = self.rng.gen();

        let (agents_cur, agents_next) = self.agents.split();
        let (trail_cur, trail_next) = self.trail.split();

        deposit(agents_cur, self.world, &self.counts);
        evolve(trail_cur, trail_next, &mut self.counts, params);
        let turns = sense_and_move(agents_cur, agents_next, trail_next, params, frame_seed);

        self.agents.swap();
        self.trail.swap();
        self.frame += 1;

        trace!(
            straight = turns.straight,
            left = turns.left,
            right = turns.right,
            ties = turns.ties,
            "frame done"
        );
        Ok(FrameReport {
            frame,
            frame_seed,
            turns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Agent, AgentSet};
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use types::WorldSize;

    #[test]
    fn step_rejects_changed_agent_count() {
        let world = WorldSize::new(16, 16);
        let params = SimParams { agent_count: 10, ..Default::default() };
        let mut engine = SimEngine::seeded(world, &params, 5).unwrap();

        let grown = SimParams { agent_count: 11, ..params.clone() };
        assert_eq!(
            engine.step(&grown),
            Err(SimError::AgentCountChanged { requested: 11, allocated: 10 })
        );
        assert_eq!(engine.frame(), 0);
        assert!(engine.step(&params).is_ok());
        assert_eq!(engine.frame(), 1);
    }

    #[test]
    fn step_rejects_invalid_params_without_mutating() {
        let world = WorldSize::new(16, 16);
        let params = SimParams { agent_count: 10, ..Default::default() };
        let mut engine = SimEngine::seeded(world, &params, 5).unwrap();
        let before = engine.agents().clone();

        let bad = SimParams { sensor_distance: f32::INFINITY, ..params };
        assert!(matches!(engine.step(&bad), Err(SimError::Config(_))));
        assert_eq!(engine.agents(), &before);
    }

    #[test]
    fn report_counts_every_agent() {
        let world = WorldSize::new(16, 16);
        let agents = AgentSet::from_agents(
            (0..25).map(|i| Agent::new(Vec2::new(i as f32 * 0.5, 3.0), 0.0)),
            world,
        );
        let mut engine = SimEngine::with_agents(world, agents, StdRng::seed_from_u64(2)).unwrap();
        let params = SimParams { agent_count: 25, ..Default::default() };
        let report = engine.step(&params).unwrap();
        assert_eq!(report.frame, 0);
        assert_eq!(report.turns.total(), 25);
    }
}
