pub const MAX_STEPS_PER_FRAME: u32 = 16;

/// Decides how many simulation frames run per display refresh.
pub struct FrameTiming {
    pub steps_per_frame: u32,
    pub paused: bool,
    pub single_step: bool,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    pub fn new() -> Self {
        Self {
            steps_per_frame: 1,
            paused: false,
            single_step: false,
        }
    }

    /// Simulation steps to run this refresh. A pending single step runs even
    /// while paused and is consumed.
    pub fn ticks_due(&mut self) -> u32 {
        if self.single_step {
            self.single_step = false;
            return 1;
        }
        if self.paused {
            return 0;
        }
        self.steps_per_frame
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn request_single_step(&mut self) {
        self.single_step = true;
    }

    pub fn set_steps_per_frame(&mut self, steps: u32) {
        self.steps_per_frame = steps.clamp(1, MAX_STEPS_PER_FRAME);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_configured_steps() {
        let mut t = FrameTiming::new();
        assert_eq!(t.ticks_due(), 1);
        t.set_steps_per_frame(4);
        assert_eq!(t.ticks_due(), 4);
        t.set_steps_per_frame(0);
        assert_eq!(t.steps_per_frame, 1);
        t.set_steps_per_frame(1000);
        assert_eq!(t.steps_per_frame, MAX_STEPS_PER_FRAME);
    }

    #[test]
    fn state_is_only_pause_and_step_count() {
        let t = FrameTiming {
            steps_per_frame: 1,
            paused: false,
            single_step: false,
        };
        let d = FrameTiming::default();
        assert_eq!(
            (d.steps_per_frame, d.paused, d.single_step),
            (t.steps_per_frame, t.paused, t.single_step)
        );
    }

    #[test]
    fn single_step_while_paused() {
        let mut t = FrameTiming::new();
        t.set_steps_per_frame(3);
        t.set_paused(true);
        assert_eq!(t.ticks_due(), 0);
        t.request_single_step();
        assert_eq!(t.ticks_due(), 1);
        assert_eq!(t.ticks_due(), 0);
        t.toggle_pause();
        assert_eq!(t.ticks_due(), 3);
    }
}
