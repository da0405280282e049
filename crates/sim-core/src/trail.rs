use glam::{Vec2, Vec4};
use types::WorldSize;

use crate::double_buffer::DoubleBuffer;

/// Scalar strength of a cell as seen by the sensors.
#[inline]
pub fn intensity(cell: Vec4) -> f32 {
    cell.x + cell.y + cell.z
}

/// Dense `width x height` grid of deposited colour. `w` is unused and stays 0
/// so the layout matches `array<vec4<f32>>` on the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailField {
    world: WorldSize,
    cells: Vec<Vec4>,
}

impl TrailField {
    pub fn new(world: WorldSize) -> Self {
        Self {
            world,
            cells: vec![Vec4::ZERO; world.cell_count()],
        }
    }

    pub fn world(&self) -> WorldSize {
        self.world
    }

    pub fn cells(&self) -> &[Vec4] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Vec4] {
        &mut self.cells
    }

    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.cells[self.world.cell_index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: Vec4) {
        let i = self.world.cell_index(x, y);
        self.cells[i] = value;
    }

    pub fn intensity_at(&self, x: u32, y: u32) -> f32 {
        intensity(self.get(x, y))
    }

    /// Intensity at any integer cell, wrapped onto the torus.
    #[inline]
    pub fn wrapped_intensity(&self, x: i32, y: i32) -> f32 {
        intensity(self.cells[self.world.wrapped_index(x, y)])
    }

    /// Sum of intensities over the `(2 * size + 1)²` block around the cell
    /// containing `point`.
    pub fn sample_footprint(&self, point: Vec2, size: u32) -> f32 {
        let cx = point.x.floor() as i32;
        let cy = point.y.floor() as i32;
        let r = size as i32;
        let mut sum = 0.0;
        for dy in -r..=r {
            for dx in -r..=r {
                sum += self.wrapped_intensity(cx + dx, cy + dy);
            }
        }
        sum
    }

    /// Mean of the 3x3 neighbourhood of `(x, y)`, wrapped.
    pub fn box_mean(&self, x: u32, y: u32) -> Vec4 {
        let (x, y) = (x as i32, y as i32);
        let mut sum = Vec4::ZERO;
        for dy in -1..=1 {
            for dx in -1..=1 {
                sum += self.cells[self.world.wrapped_index(x + dx, y + dy)];
            }
        }
        sum / 9.0
    }

    pub fn clear(&mut self) {
        self.cells.fill(Vec4::ZERO);
    }

    pub fn total_intensity(&self) -> f64 {
        self.cells.iter().map(|&c| intensity(c) as f64).sum()
    }
}

pub type TrailBuffers = DoubleBuffer<TrailField>;

pub fn new_trail_buffers(world: WorldSize) -> TrailBuffers {
    DoubleBuffer::new(TrailField::new(world), TrailField::new(world))
}
