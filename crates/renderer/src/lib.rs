pub mod composite;

pub use composite::{CompositePipeline, CompositeUniform};

use types::WorldSize;

pub struct Renderer {
    composite: CompositePipeline,
    composite_uniform_buffer: wgpu::Buffer,
}

impl Renderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let composite = CompositePipeline::new(device, surface_format);

        let composite_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("composite_uniform"),
            size: std::mem::size_of::<CompositeUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            composite,
            composite_uniform_buffer,
        }
    }

    /// Draw `field_buf` (the field of the last completed frame) to the surface.
    pub fn render_frame(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        field_buf: &wgpu::Buffer,
        world: WorldSize,
        surface_size: (u32, u32),
    ) {
        let uniform = CompositeUniform::new(world, surface_size);
        queue.write_buffer(&self.composite_uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let bg = self
            .composite
            .create_bind_group(device, field_buf, &self.composite_uniform_buffer);
        self.composite.encode(encoder, surface_view, &bg);
    }
}
