//! Reversal-based cycle counting over the stretch series.
//!
//! Every direction reversal is half a cycle. A dead-band keeps sensor jitter
//! from flipping the direction. The tracker starts from a zero-length
//! baseline moving `Down`, so a first sample far below zero registers a
//! half-cycle that never happened; real stretch readings are positive and
//! classify as `Down`, leaving the count at zero.

/// Direction of the actuator as inferred from the stretch series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sample shortening (stretch decreasing).
    Up,
    /// Sample lengthening (stretch increasing).
    Down,
}

#[derive(Debug, Clone)]
pub struct CycleTracker {
    previous_stretch: f64,
    current: Direction,
    previous: Direction,
    half_cycles: u64,
}

impl Default for CycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleTracker {
    pub fn new() -> Self {
        Self {
            previous_stretch: 0.0,
            current: Direction::Down,
            previous: Direction::Down,
            half_cycles: 0,
        }
    }

    /// Feed one stretch reading (cm). Returns true when it completed a reversal.
    pub fn observe(&mut self, stretch: f64, tolerance: f64) -> bool {
        let diff = stretch - self.previous_stretch;
        if diff < -tolerance {
            self.current = Direction::Up;
        } else if diff > tolerance {
            self.current = Direction::Down;
        }
        self.previous_stretch = stretch;

        if self.current != self.previous {
            self.half_cycles += 1;
            self.previous = self.current;
            return true;
        }
        false
    }

    /// Completed cycles, in half-cycle steps.
    pub fn cycles(&self) -> f64 {
        self.half_cycles as f64 / 2.0
    }

    pub fn half_cycles(&self) -> u64 {
        self.half_cycles
    }

    pub fn direction(&self) -> Direction {
        self.current
    }

    pub fn previous_stretch(&self) -> f64 {
        self.previous_stretch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 0.05;

    #[test]
    fn monotonic_lengthening_never_counts() {
        let mut t = CycleTracker::new();
        for i in 0..50 {
            assert!(!t.observe(13.5 + 0.1 * f64::from(i), TOL));
        }
        assert_eq!(t.cycles(), 0.0);
        assert_eq!(t.direction(), Direction::Down);
    }

    #[test]
    fn each_reversal_is_half_a_cycle() {
        let mut t = CycleTracker::new();
        let series = [14.0, 16.0, 14.0, 16.0, 14.0, 16.0, 14.0];
        let flips: Vec<bool> = series.iter().map(|&s| t.observe(s, TOL)).collect();
        assert_eq!(flips, vec![false, false, true, true, true, true, true]);
        assert_eq!(t.half_cycles(), 5);
        assert_eq!(t.cycles(), 2.5);
    }

    #[test]
    fn jitter_inside_dead_band_keeps_direction() {
        let mut t = CycleTracker::new();
        t.observe(15.0, TOL);
        t.observe(17.0, TOL);
        for s in [16.98, 17.02, 16.99, 17.0] {
            assert!(!t.observe(s, TOL));
        }
        assert_eq!(t.cycles(), 0.0);
        // reference always moves, even inside the band
        assert_eq!(t.previous_stretch(), 17.0);
    }

    #[test]
    fn slow_drift_below_tolerance_per_step_is_ignored() {
        let mut t = CycleTracker::new();
        t.observe(20.0, TOL);
        let mut s = 20.0;
        for _ in 0..100 {
            s -= 0.04;
            t.observe(s, TOL);
        }
        assert_eq!(t.cycles(), 0.0);
        assert_eq!(t.direction(), Direction::Down);
    }

    #[test]
    fn negative_first_sample_registers_spurious_half_cycle() {
        let mut t = CycleTracker::new();
        assert!(t.observe(-1.0, TOL));
        assert_eq!(t.cycles(), 0.5);
    }
}
