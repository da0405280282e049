use bytemuck::{Pod, Zeroable};
use types::{SimParams, WorldSize};

/// Host mirror of `struct SimParams` in `shaders/common.wgsl`. 80 bytes,
/// 16-byte aligned; field order must match the WGSL declaration.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SimUniform {
    pub world: [u32; 2],
    pub agent_count: u32,
    pub frame_seed: u32,
    pub agent_color: [f32; 4],
    pub speed: f32,
    pub turn_speed: f32,
    pub sensor_fov: f32,
    pub sensor_distance: f32,
    pub sensor_offset: f32,
    pub sensor_size: u32,
    pub sensor_count: u32,
    pub decay: f32,
    pub diffuse_rate: f32,
    pub dt: f32,
    pub _pad: [u32; 2],
}

impl SimUniform {
    pub fn new(params: &SimParams, world: WorldSize, frame_seed: u32) -> Self {
        let [r, g, b] = params.agent_color.to_array();
        Self {
            world: [world.width, world.height],
            agent_count: params.agent_count,
            frame_seed,
            agent_color: [r, g, b, 0.0],
            speed: params.speed,
            turn_speed: params.turn_speed,
            sensor_fov: params.sensor_fov,
            sensor_distance: params.sensor_distance,
            sensor_offset: params.sensor_offset,
            sensor_size: params.sensor_size,
            sensor_count: params.sensor_count,
            decay: params.decay_factor(),
            diffuse_rate: params.diffuse_rate,
            dt: params.dt,
            _pad: [0; 2],
        }
    }
}

pub struct ParamsUniform {
    pub buffer: wgpu::Buffer,
}

impl ParamsUniform {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sim_params"),
            size: std::mem::size_of::<SimUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer }
    }

    pub fn upload(&self, queue: &wgpu::Queue, data: &SimUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_80_bytes_and_aligned() {
        assert_eq!(std::mem::size_of::<SimUniform>(), 80);
        assert_eq!(std::mem::size_of::<SimUniform>() % 16, 0);
    }

    #[test]
    fn colour_starts_at_16_byte_boundary() {
        let u = SimUniform::new(&SimParams::default(), WorldSize::new(640, 480), 0);
        let bytes = bytemuck::bytes_of(&u);
        let g = f32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        assert_eq!(g, SimParams::default().agent_color.g);
        let w = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(w, 640);
    }

    #[test]
    fn decay_is_precomputed() {
        let p = SimParams { fade_speed: 0.0, ..Default::default() };
        assert_eq!(SimUniform::new(&p, WorldSize::new(1, 1), 0).decay, 1.0);
    }
}
