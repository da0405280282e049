use glam::Vec4;
use rayon::prelude::*;
use types::SimParams;

use crate::deposit::DepositCounts;
use crate::trail::TrailField;

/// Field evolution pass, fused with the composite of this frame's deposits:
///
/// `next = clamp(mix(cur, mean3x3(cur), diffuse) * decay + hits * colour, 0, 1)`
///
/// With `diffuse_rate == 0` this is a pure fade and with `fade_speed == 0`
/// the decay factor is exactly 1. The hit counters are drained.
pub fn evolve(
    current: &TrailField,
    next: &mut TrailField,
    counts: &mut DepositCounts,
    params: &SimParams,
) {
    debug_assert_eq!(current.world(), next.world());
    let world = current.world();
    let decay = params.decay_factor();
    let diffuse = params.diffuse_rate;
    let [r, g, b] = params.agent_color.to_array();
    let color = Vec4::new(r, g, b, 0.0);
    let src = current.cells();

    next.cells_mut()
        .par_iter_mut()
        .zip(counts.drain_mut())
        .enumerate()
        .for_each(|(i, (cell, hits))| {
            let mut base = src[i];
            if diffuse > 0.0 {
                let (x, y) = world.cell_coords(i);
                base = base.lerp(current.box_mean(x, y), diffuse);
            }
            *cell = (base * decay + color * hits as f32).clamp(Vec4::ZERO, Vec4::ONE);
        });
}
