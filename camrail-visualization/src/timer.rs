/// Self-contained timers driven by frame deltas

/// Fixed-interval accumulator: converts elapsed time into a number of ticks
#[derive(Debug, Clone, Copy)]
pub struct TickAccumulator {
    interval: f64,
    accumulator: f64,
    max_steps: usize,
}

impl TickAccumulator {
    /// Create accumulator firing every `interval` seconds, at most `max_steps` per update
    pub fn new(interval: f64, max_steps: usize) -> Self {
        Self {
            interval,
            accumulator: 0.0,
            max_steps,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Update with delta, returns the number of ticks due
    pub fn tick(&mut self, delta: f64) -> usize {
        self.accumulator += delta;

        // small tolerance so exact multiples of the interval are not lost to rounding
        let due = ((self.accumulator + 1.0e-9) / self.interval).floor() as usize;
        let steps = due.min(self.max_steps);
        self.accumulator = (self.accumulator - steps as f64 * self.interval).max(0.0);
        if due > steps {
            // drop the backlog instead of fast-forwarding
            self.accumulator = 0.0;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Countdown with progress, fires once after its duration
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    duration: f32,
    elapsed: f32,
}

impl Countdown {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    /// Tick with delta, returns true once completed
    pub fn tick(&mut self, delta: f32) -> bool {
        self.elapsed += delta;
        self.elapsed >= self.duration
    }

    /// Get progress [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }
}
