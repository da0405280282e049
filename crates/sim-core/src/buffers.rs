use types::WorldSize;

use crate::agents::AgentSet;
use crate::error::ResourceError;

const POSITION_STRIDE: u64 = 8; // vec2<f32>
const HEADING_STRIDE: u64 = 4;
const CELL_STRIDE: u64 = 16; // vec4<f32>
const HIT_STRIDE: u64 = 4; // atomic<u32>

/// Device storage for the swarm: double-buffered agents and field plus the
/// per-cell deposit counters. A/B roles flip together after every frame.
pub struct SwarmBuffers {
    positions_a: wgpu::Buffer,
    positions_b: wgpu::Buffer,
    headings_a: wgpu::Buffer,
    headings_b: wgpu::Buffer,
    field_a: wgpu::Buffer,
    field_b: wgpu::Buffer,
    hits: wgpu::Buffer,
    world: WorldSize,
    agent_count: u32,
    current_read_is_a: bool,
}

fn check_size(device: &wgpu::Device, label: &'static str, size: u64) -> Result<(), ResourceError> {
    let limits = device.limits();
    let limit = limits
        .max_buffer_size
        .min(limits.max_storage_buffer_binding_size as u64);
    if size > limit {
        return Err(ResourceError::BufferTooLarge { label, size, limit });
    }
    Ok(())
}

fn storage(device: &wgpu::Device, label: &'static str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    })
}

impl SwarmBuffers {
    pub fn try_new(
        device: &wgpu::Device,
        world: WorldSize,
        agent_count: u32,
    ) -> Result<Self, ResourceError> {
        let cells = world.cell_count() as u64;
        let agents = agent_count as u64;
        let positions_size = agents * POSITION_STRIDE;
        let headings_size = agents * HEADING_STRIDE;
        let field_size = cells * CELL_STRIDE;
        let hits_size = cells * HIT_STRIDE;

        check_size(device, "field", field_size)?;
        check_size(device, "positions", positions_size)?;
        check_size(device, "headings", headings_size)?;
        check_size(device, "hits", hits_size)?;

        Ok(Self {
            positions_a: storage(device, "positions_a", positions_size),
            positions_b: storage(device, "positions_b", positions_size),
            headings_a: storage(device, "headings_a", headings_size),
            headings_b: storage(device, "headings_b", headings_size),
            field_a: storage(device, "field_a", field_size),
            field_b: storage(device, "field_b", field_size),
            hits: storage(device, "hits", hits_size),
            world,
            agent_count,
            current_read_is_a: true,
        })
    }

    /// Write a population into the A side. Call with roles reset.
    pub fn upload_agents(&self, queue: &wgpu::Queue, agents: &AgentSet) {
        debug_assert_eq!(agents.len() as u32, self.agent_count);
        queue.write_buffer(&self.positions_a, 0, bytemuck::cast_slice(&agents.positions));
        queue.write_buffer(&self.headings_a, 0, bytemuck::cast_slice(&agents.headings));
    }

    /// Zero both fields and the counters.
    pub fn clear_fields(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(&self.field_a, 0, None);
        encoder.clear_buffer(&self.field_b, 0, None);
        encoder.clear_buffer(&self.hits, 0, None);
    }

    pub fn positions(&self, a: bool) -> &wgpu::Buffer {
        if a { &self.positions_a } else { &self.positions_b }
    }

    pub fn headings(&self, a: bool) -> &wgpu::Buffer {
        if a { &self.headings_a } else { &self.headings_b }
    }

    pub fn field(&self, a: bool) -> &wgpu::Buffer {
        if a { &self.field_a } else { &self.field_b }
    }

    pub fn hits(&self) -> &wgpu::Buffer {
        &self.hits
    }

    pub fn current_field(&self) -> &wgpu::Buffer {
        self.field(self.current_read_is_a)
    }

    pub fn current_positions(&self) -> &wgpu::Buffer {
        self.positions(self.current_read_is_a)
    }

    pub fn current_headings(&self) -> &wgpu::Buffer {
        self.headings(self.current_read_is_a)
    }

    pub fn swap(&mut self) {
        self.current_read_is_a = !self.current_read_is_a;
    }

    pub fn current_read_is_a(&self) -> bool {
        self.current_read_is_a
    }

    pub fn reset_read_is_a(&mut self) {
        self.current_read_is_a = true;
    }

    pub fn world(&self) -> WorldSize {
        self.world
    }

    pub fn agent_count(&self) -> u32 {
        self.agent_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    #[test]
    fn strides_match_host_element_types() {
        assert_eq!(POSITION_STRIDE as usize, std::mem::size_of::<Vec2>());
        assert_eq!(HEADING_STRIDE as usize, std::mem::size_of::<f32>());
        assert_eq!(CELL_STRIDE as usize, std::mem::size_of::<Vec4>());
        assert_eq!(HIT_STRIDE as usize, std::mem::size_of::<u32>());
    }
}
