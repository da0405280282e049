use rayon::prelude::*;

use crate::agents::AgentSet;
use crate::trail::{intensity, TrailField};

/// Snapshot of the population and field, gathered on demand between frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimStats {
    pub frame: u64,
    pub agent_count: usize,
    pub total_intensity: f64,
    pub peak_intensity: f32,
    /// Cells with any deposit left in them.
    pub lit_cells: usize,
}

impl SimStats {
    pub fn collect(frame: u64, agents: &AgentSet, field: &TrailField) -> Self {
        let (total_intensity, peak_intensity, lit_cells) = field
            .cells()
            .par_iter()
            .map(|&c| {
                let v = intensity(c);
                (v as f64, v, usize::from(v > 0.0))
            })
            .reduce(
                || (0.0, 0.0, 0),
                |a, b| (a.0 + b.0, a.1.max(b.1), a.2 + b.2),
            );

        SimStats {
            frame,
            agent_count: agents.len(),
            total_intensity,
            peak_intensity,
            lit_cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use types::WorldSize;

    #[test]
    fn collects_field_totals() {
        let world = WorldSize::new(4, 4);
        let mut field = TrailField::new(world);
        field.set(0, 0, Vec4::new(0.5, 0.25, 0.0, 0.0));
        field.set(3, 3, Vec4::new(1.0, 1.0, 1.0, 0.0));
        let agents = AgentSet::default();

        let stats = SimStats::collect(7, &agents, &field);
        assert_eq!(stats.frame, 7);
        assert_eq!(stats.agent_count, 0);
        assert_eq!(stats.lit_cells, 2);
        assert_eq!(stats.peak_intensity, 3.0);
        assert!((stats.total_intensity - 3.75).abs() < 1e-9);
    }
}
