use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Dimensions of the simulated world in trail-field cells.
///
/// The world is a torus: anything leaving one edge re-enters at the opposite
/// edge, both for agent positions and for field sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: u32,
    pub height: u32,
}

impl WorldSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Linear buffer index of an in-bounds cell: `y * width + x`.
    #[inline]
    pub fn cell_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Inverse of [`cell_index`](Self::cell_index).
    #[inline]
    pub fn cell_coords(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Index of an arbitrary integer cell coordinate after toroidal wrap.
    #[inline]
    pub fn wrapped_index(&self, x: i32, y: i32) -> usize {
        self.cell_index(wrap_cell(x, self.width), wrap_cell(y, self.height))
    }

    /// Cell containing `pos`, wrapping first so the result is always addressable.
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (u32, u32) {
        (
            wrap_cell(pos.x.floor() as i32, self.width),
            wrap_cell(pos.y.floor() as i32, self.height),
        )
    }

    /// Wrap a position into `[0, width) x [0, height)`.
    #[inline]
    pub fn wrap_position(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            wrap_coord(pos.x, self.width as f32),
            wrap_coord(pos.y, self.height as f32),
        )
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x < self.width as f32 && pos.y < self.height as f32
    }
}

/// Euclidean remainder of `v` by `extent`, guaranteed to land in `[0, extent)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly `extent`; that
/// case is folded back to 0.
#[inline]
pub fn wrap_coord(v: f32, extent: f32) -> f32 {
    let r = v.rem_euclid(extent);
    if r >= extent {
        0.0
    } else {
        r
    }
}

#[inline]
pub fn wrap_cell(i: i32, extent: u32) -> u32 {
    i.rem_euclid(extent as i32) as u32
}

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn wrap_heading(angle: f32) -> f32 {
    wrap_coord(angle, std::f32::consts::TAU)
}
