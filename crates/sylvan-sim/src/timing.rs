//! Simulation clock.
//!
//! Splits variable frame time into a bounded number of fixed physics steps
//! and keeps a rolling average of recent frame times.

use std::collections::VecDeque;

/// Most fixed steps run for a single frame.
const MAX_FIXED_STEPS: u32 = 10;

/// Frame clock with a fixed-step accumulator.
#[derive(Debug)]
pub struct SimClock {
    /// Accumulator for fixed timestep
    accumulator: f32,
    /// Fixed timestep delta (for physics)
    fixed_dt: f32,
    /// Maximum delta time to prevent spiral of death
    max_dt: f32,
    /// Simulated seconds so far
    elapsed: f32,
    /// Frames run so far
    frames: u64,
    /// Fixed steps run so far
    fixed_steps: u64,
    /// Recent frame times for averaging
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl SimClock {
    /// Creates a clock with the given physics step.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            accumulator: 0.0,
            fixed_dt: fixed_dt.max(0.001),
            max_dt: 0.25,
            elapsed: 0.0,
            frames: 0,
            fixed_steps: 0,
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Set the fixed timestep for physics updates.
    pub fn set_fixed_dt(&mut self, dt: f32) {
        self.fixed_dt = dt.max(0.001); // Minimum 1ms
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Clamps a frame's delta, records it, and advances simulated time.
    pub fn begin_frame(&mut self, dt: f32) -> f32 {
        let clamped = dt.clamp(0.0, self.max_dt);

        self.frame_times.push_back(clamped);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
        self.elapsed += clamped;
        self.frames += 1;
        clamped
    }

    /// Accumulate time for fixed timestep updates.
    /// Returns the number of fixed updates that should be performed.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_FIXED_STEPS {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        self.fixed_steps += u64::from(count);
        count
    }

    /// Simulated seconds so far.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Frames run so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Fixed steps run so far.
    #[must_use]
    pub fn fixed_steps(&self) -> u64 {
        self.fixed_steps
    }

    /// Get the average frame time in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        (self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32) * 1000.0
    }

    /// Reset timing.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.elapsed = 0.0;
        self.frames = 0;
        self.fixed_steps = 0;
        self.frame_times.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_creation() {
        let clock = SimClock::default();
        assert!((clock.fixed_dt() - 1.0 / 60.0).abs() < 0.001);
        assert_eq!(clock.frames(), 0);
    }

    #[test]
    fn test_fixed_timestep() {
        let mut clock = SimClock::new(1.0 / 60.0);

        // 32ms frame: one or two fixed updates
        let updates = clock.accumulate(0.032);
        assert!(updates == 1 || updates == 2);
    }

    #[test]
    fn test_accumulator_carries_remainder() {
        let mut clock = SimClock::new(0.1);
        assert_eq!(clock.accumulate(0.06), 0);
        assert_eq!(clock.accumulate(0.06), 1);
        assert_eq!(clock.fixed_steps(), 1);
    }

    #[test]
    fn test_accumulate_spiral_prevention() {
        let mut clock = SimClock::new(1.0 / 60.0);

        let updates = clock.accumulate(1.0);
        assert!(updates <= 10);
        assert_eq!(clock.accumulate(0.0), 0);
    }

    #[test]
    fn test_begin_frame_clamps_and_tracks() {
        let mut clock = SimClock::default();
        assert_eq!(clock.begin_frame(1.0), 0.25);
        assert_eq!(clock.begin_frame(-1.0), 0.0);
        clock.begin_frame(0.05);

        assert_eq!(clock.frames(), 3);
        assert!((clock.elapsed() - 0.3).abs() < 1e-6);
        assert!((clock.average_frame_time_ms() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_reset_clock() {
        let mut clock = SimClock::default();
        clock.begin_frame(0.1);
        clock.accumulate(0.1);

        clock.reset();

        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.fixed_steps(), 0);
        assert_eq!(clock.average_frame_time_ms(), 0.0);
    }
}
