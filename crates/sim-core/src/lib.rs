pub mod agents;
pub mod buffers;
pub mod deposit;
pub mod double_buffer;
pub mod error;
pub mod evolve;
pub mod gpu;
pub mod pipelines;
pub mod sense_move;
pub mod stats;
pub mod tick;
pub mod trail;
pub mod uniform;

pub use agents::{Agent, AgentSet, AgentStore};
pub use double_buffer::DoubleBuffer;
pub use error::{ResourceError, SimError};
pub use gpu::GpuSimEngine;
pub use sense_move::{Turn, TurnCounts};
pub use stats::SimStats;
pub use tick::FrameReport;
pub use trail::{TrailBuffers, TrailField};

use glam::{Vec2, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use types::{validate_world, ConfigError, SimParams, WorldSize, MAX_AGENTS};

use agents::new_store;
use deposit::DepositCounts;
use trail::new_trail_buffers;

/// CPU simulation engine: the four passes as `rayon` parallel loops over
/// double-buffered agent and field storage.
///
/// `R` supplies the initial agent state and one tie-break seed per frame;
/// seeding it makes a run reproducible.
pub struct SimEngine<R = StdRng> {
    world: WorldSize,
    agents: AgentStore,
    trail: TrailBuffers,
    counts: DepositCounts,
    rng: R,
    frame: u64,
}

impl SimEngine<StdRng> {
    pub fn seeded(world: WorldSize, params: &SimParams, seed: u64) -> Result<Self, SimError> {
        Self::new(world, params, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimEngine<R> {
    /// Randomly populated engine with an empty field.
    pub fn new(world: WorldSize, params: &SimParams, mut rng: R) -> Result<Self, SimError> {
        params.validate()?;
        validate_world(world)?;
        let initial = AgentSet::random(params.agent_count as usize, world, &mut rng);
        Self::with_agents(world, initial, rng)
    }

    /// Engine starting from an explicit population. Positions and headings
    /// are wrapped onto the torus.
    pub fn with_agents(world: WorldSize, agents: AgentSet, rng: R) -> Result<Self, SimError> {
        validate_world(world)?;
        let count = agents.len();
        if count == 0 || count > MAX_AGENTS as usize {
            return Err(ConfigError::AgentCount {
                count: count.min(u32::MAX as usize) as u32,
                max: MAX_AGENTS,
            }
            .into());
        }
        let agents = AgentSet::from_agents(agents.iter(), world);
        debug!(width = world.width, height = world.height, agents = count, "engine created");

        Ok(Self {
            world,
            agents: new_store(agents),
            trail: new_trail_buffers(world),
            counts: DepositCounts::new(world.cell_count()),
            rng,
            frame: 0,
        })
    }

    /// Reinitialize both double-buffered stores: fresh random agents (resized
    /// to `params.agent_count`) and a cleared field.
    pub fn reset(&mut self, params: &SimParams) -> Result<(), SimError> {
        params.validate()?;
        let initial = AgentSet::random(params.agent_count as usize, self.world, &mut self.rng);
        self.agents = new_store(initial);
        let (a, b) = self.trail.both_mut();
        a.clear();
        b.clear();
        self.trail.reset_roles();
        self.counts.clear();
        self.frame = 0;
        debug!(agents = params.agent_count, "engine reset");
        Ok(())
    }

    pub fn world(&self) -> WorldSize {
        self.world
    }

    /// Frames completed since construction or the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn agent_count(&self) -> usize {
        self.agents.current().len()
    }

    pub fn agents(&self) -> &AgentSet {
        self.agents.current()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.agents.current().positions
    }

    pub fn headings(&self) -> &[f32] {
        &self.agents.current().headings
    }

    /// The field as of the last completed frame (what should be displayed).
    pub fn trail(&self) -> &TrailField {
        self.trail.current()
    }

    /// Paint into the current field between frames. The next frame reads it
    /// as the previous state.
    pub fn paint(&mut self, x: u32, y: u32, value: Vec4) {
        let (x, y) = (x % self.world.width, y % self.world.height);
        self.trail.current_mut().set(x, y, value);
    }

    pub fn stats(&self) -> SimStats {
        SimStats::collect(self.frame, self.agents.current(), self.trail.current())
    }
}
