use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, warn};
use types::{validate_world, SimParams, WorldSize};

use crate::agents::AgentSet;
use crate::buffers::SwarmBuffers;
use crate::error::{ResourceError, SimError};
use crate::pipelines::{SimPipelines, AGENT_WORKGROUP, FIELD_WORKGROUP};
use crate::uniform::{ParamsUniform, SimUniform};

/// Bind groups for one parity. Even reads the A side and writes B; odd is
/// the mirror.
struct ParityBindGroups {
    deposit: wgpu::BindGroup,
    evolve: wgpu::BindGroup,
    sense_move: wgpu::BindGroup,
}

fn entry(binding: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}

fn parity_bind_groups(
    device: &wgpu::Device,
    pipelines: &SimPipelines,
    buffers: &SwarmBuffers,
    uniform: &ParamsUniform,
    read_a: bool,
) -> ParityBindGroups {
    let suffix = if read_a { "even" } else { "odd" };
    let write_a = !read_a;

    let deposit = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("deposit_bg_{suffix}")),
        layout: &pipelines.deposit_bgl,
        entries: &[
            entry(0, buffers.positions(read_a)),
            entry(1, buffers.hits()),
            entry(2, &uniform.buffer),
        ],
    });

    let evolve = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("evolve_bg_{suffix}")),
        layout: &pipelines.evolve_bgl,
        entries: &[
            entry(0, buffers.field(read_a)),
            entry(1, buffers.field(write_a)),
            entry(2, buffers.hits()),
            entry(3, &uniform.buffer),
        ],
    });

    // Agents sense the field evolve just wrote.
    let sense_move = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("sense_move_bg_{suffix}")),
        layout: &pipelines.sense_move_bgl,
        entries: &[
            entry(0, buffers.positions(read_a)),
            entry(1, buffers.headings(read_a)),
            entry(2, buffers.positions(write_a)),
            entry(3, buffers.headings(write_a)),
            entry(4, buffers.field(write_a)),
            entry(5, &uniform.buffer),
        ],
    });

    ParityBindGroups {
        deposit,
        evolve,
        sense_move,
    }
}

fn check_dispatch(
    device: &wgpu::Device,
    label: &'static str,
    groups: u32,
) -> Result<(), ResourceError> {
    let limit = device.limits().max_compute_workgroups_per_dimension;
    if groups > limit {
        return Err(ResourceError::DispatchTooLarge {
            label,
            groups,
            limit,
        });
    }
    Ok(())
}

/// Workgroup counts for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dispatch {
    agents: u32,
    field_x: u32,
    field_y: u32,
}

impl Dispatch {
    fn new(world: WorldSize, agent_count: u32) -> Self {
        Self {
            agents: agent_count.div_ceil(AGENT_WORKGROUP),
            field_x: world.width.div_ceil(FIELD_WORKGROUP),
            field_y: world.height.div_ceil(FIELD_WORKGROUP),
        }
    }

    fn check(&self, device: &wgpu::Device) -> Result<(), ResourceError> {
        check_dispatch(device, "agents", self.agents)?;
        check_dispatch(device, "field_x", self.field_x)?;
        check_dispatch(device, "field_y", self.field_y)
    }
}

/// The same four-pass frame as [`crate::SimEngine`], run as wgpu compute
/// passes over [`SwarmBuffers`].
pub struct GpuSimEngine<R = StdRng> {
    buffers: SwarmBuffers,
    pipelines: SimPipelines,
    params_uniform: ParamsUniform,
    even: ParityBindGroups,
    odd: ParityBindGroups,
    dispatch: Dispatch,
    rng: R,
    frame: u64,
}

impl<R: Rng> GpuSimEngine<R> {
    pub fn try_new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        world: WorldSize,
        params: &SimParams,
        mut rng: R,
    ) -> Result<Self, SimError> {
        params.validate()?;
        validate_world(world)?;

        let dispatch = Dispatch::new(world, params.agent_count);
        dispatch.check(device)?;
        let buffers = SwarmBuffers::try_new(device, world, params.agent_count)?;
        let pipelines = SimPipelines::new(device);
        let params_uniform = ParamsUniform::new(device);
        let even = parity_bind_groups(device, &pipelines, &buffers, &params_uniform, true);
        let odd = parity_bind_groups(device, &pipelines, &buffers, &params_uniform, false);

        let initial = AgentSet::random(params.agent_count as usize, world, &mut rng);
        buffers.upload_agents(queue, &initial);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("swarm_init"),
        });
        buffers.clear_fields(&mut encoder);
        queue.submit(std::iter::once(encoder.finish()));

        info!(
            width = world.width,
            height = world.height,
            agents = params.agent_count,
            "gpu engine created"
        );

        Ok(Self {
            buffers,
            pipelines,
            params_uniform,
            even,
            odd,
            dispatch,
            rng,
            frame: 0,
        })
    }

    /// Fresh random agents and an empty field. A new agent count reallocates
    /// the agent buffers and rebuilds every bind group.
    pub fn reset(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        params: &SimParams,
    ) -> Result<(), SimError> {
        params.validate()?;
        let world = self.buffers.world();

        if params.agent_count != self.buffers.agent_count() {
            let dispatch = Dispatch::new(world, params.agent_count);
            dispatch.check(device)?;
            let buffers = SwarmBuffers::try_new(device, world, params.agent_count)?;
            self.even = parity_bind_groups(device, &self.pipelines, &buffers, &self.params_uniform, true);
            self.odd = parity_bind_groups(device, &self.pipelines, &buffers, &self.params_uniform, false);
            self.buffers = buffers;
            self.dispatch = dispatch;
            debug!(agents = params.agent_count, "agent buffers reallocated");
        }

        self.buffers.reset_read_is_a();
        let initial = AgentSet::random(params.agent_count as usize, world, &mut self.rng);
        self.buffers.upload_agents(queue, &initial);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("swarm_reset"),
        });
        self.buffers.clear_fields(&mut encoder);
        queue.submit(std::iter::once(encoder.finish()));
        self.frame = 0;
        Ok(())
    }

    /// Record and submit one frame. Each frame gets its own submission so the
    /// uniform write carrying this frame's seed lands before its passes run.
    pub fn tick(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        params: &SimParams,
    ) -> Result<u32, SimError> {
        if let Err(e) = params.validate() {
            warn!(error = %e, "rejected frame parameters");
            return Err(e.into());
        }
        if params.agent_count != self.buffers.agent_count() {
            return Err(SimError::AgentCountChanged {
                requested: params.agent_count,
                allocated: self.buffers.agent_count(),
            });
        }

        let frame_seed: u32 = self.rng.gen();
        let uniform = SimUniform::new(params, self.buffers.world(), frame_seed);
        self.params_uniform.upload(queue, &uniform);

        let groups = if self.buffers.current_read_is_a() {
            &self.even
        } else {
            &self.odd
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("swarm_frame"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("deposit_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.deposit);
            pass.set_bind_group(0, &groups.deposit, &[]);
            pass.dispatch_workgroups(self.dispatch.agents, 1, 1);
        }
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("evolve_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.evolve);
            pass.set_bind_group(0, &groups.evolve, &[]);
            pass.dispatch_workgroups(self.dispatch.field_x, self.dispatch.field_y, 1);
        }
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("sense_move_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.sense_move);
            pass.set_bind_group(0, &groups.sense_move, &[]);
            pass.dispatch_workgroups(self.dispatch.agents, 1, 1);
        }
        queue.submit(std::iter::once(encoder.finish()));

        self.buffers.swap();
        self.frame += 1;
        Ok(frame_seed)
    }

    pub fn world(&self) -> WorldSize {
        self.buffers.world()
    }

    pub fn agent_count(&self) -> u32 {
        self.buffers.agent_count()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Field written by the last completed frame; bind this for display.
    pub fn current_field_buffer(&self) -> &wgpu::Buffer {
        self.buffers.current_field()
    }

    pub fn current_positions_buffer(&self) -> &wgpu::Buffer {
        self.buffers.current_positions()
    }

    pub fn current_headings_buffer(&self) -> &wgpu::Buffer {
        self.buffers.current_headings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_rounds_up() {
        let d = Dispatch::new(WorldSize::new(100, 9), 65);
        assert_eq!(d, Dispatch { agents: 2, field_x: 13, field_y: 2 });
        let d = Dispatch::new(WorldSize::new(8, 8), 64);
        assert_eq!(d, Dispatch { agents: 1, field_x: 1, field_y: 1 });
    }
}
