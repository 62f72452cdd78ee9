//! Frame clock with a sleep-based frame-rate cap

use std::time::{Duration, Instant};

/// Frames per second the simulation's per-frame rates are tuned for
pub const NOMINAL_FPS: f64 = 60.0;

/// Tracks elapsed time and paces frames to a target rate
pub struct GameClock {
    /// Total elapsed animation time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Target frames per second; 0 disables the cap
    pub target_fps: u32,
    /// Clock creation instant, origin of `ticks_since_start`
    start: Instant,
    /// Start of the current frame
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            target_fps: NOMINAL_FPS as u32,
            start: now,
            last_instant: now,
            first_tick: true,
        }
    }
}

impl GameClock {
    /// Create a new clock capped at 60 FPS
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock with a custom frame cap
    pub fn with_target_fps(fps: u32) -> Self {
        Self {
            target_fps: fps,
            ..Self::default()
        }
    }

    /// Advance the clock. Call once at the start of every frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

        // Clamp to avoid a huge catch-up step after a stall (max 250ms frame time)
        self.delta_time = elapsed.min(0.25);
        self.total_time += self.delta_time;
    }

    /// Milliseconds since the clock was created
    pub fn ticks_since_start(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Last frame's duration in nominal 60 Hz frames
    pub fn frame_steps(&self) -> f32 {
        (self.delta_time * NOMINAL_FPS) as f32
    }

    /// Time left in the current frame's budget at `now`
    pub fn frame_budget_remaining(&self, now: Instant) -> Duration {
        if self.target_fps == 0 {
            return Duration::ZERO;
        }
        let budget = Duration::from_secs_f64(1.0 / self.target_fps as f64);
        budget.saturating_sub(now.duration_since(self.last_instant))
    }

    /// Block until the current frame has used its share of a second
    pub fn cap_frame_rate(&self) {
        let remaining = self.frame_budget_remaining(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}
