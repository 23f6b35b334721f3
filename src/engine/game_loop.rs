/// Frame timing for driving the simulation
///
/// The physics and particle updates integrate whatever `dt` they are given.
/// `FrameClock` is the caller-side guard: it turns wall-clock frame times
/// into a clamped delta so a stalled frame cannot make bodies tunnel.
use std::time::{Duration, Instant};

/// Largest delta handed to the simulation by default (a 20 FPS frame)
pub const DEFAULT_MAX_DELTA: f32 = 1.0 / 20.0;

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Frame timing state
pub struct FrameClock {
    /// Time of last frame
    last_frame_time: Instant,

    /// Upper bound for a single frame's delta, in seconds
    max_delta: f32,

    /// Whether the simulation is paused
    paused: bool,

    /// Ring buffer of recent raw frame times
    frame_times: [Duration; FPS_WINDOW_SIZE],

    /// Current frame number
    frame_count: u64,

    /// Frames whose delta had to be clamped
    clamped_frames: u64,

    /// Simulated seconds handed out so far
    simulated_time: f64,
}

impl FrameClock {
    /// Create a clock with the default delta clamp
    pub fn new() -> Self {
        Self::with_max_delta(DEFAULT_MAX_DELTA)
    }

    /// Create a clock that never reports more than `max_delta` seconds
    pub fn with_max_delta(max_delta: f32) -> Self {
        Self {
            last_frame_time: Instant::now(),
            max_delta,
            paused: false,
            frame_times: [Duration::ZERO; FPS_WINDOW_SIZE],
            frame_count: 0,
            clamped_frames: 0,
            simulated_time: 0.0,
        }
    }

    /// Begin a new frame from the wall clock and return its delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Begin a new frame that took `frame_time` and return its delta in
    /// seconds. Returns 0 while paused.
    pub fn advance(&mut self, frame_time: Duration) -> f32 {
        self.frame_times[(self.frame_count as usize) % FPS_WINDOW_SIZE] = frame_time;
        self.frame_count += 1;

        if self.paused {
            return 0.0;
        }

        let mut dt = frame_time.as_secs_f32();
        if dt > self.max_delta {
            self.clamped_frames += 1;
            log::trace!("Clamping frame delta {:.4}s to {:.4}s", dt, self.max_delta);
            dt = self.max_delta;
        }

        self.simulated_time += dt as f64;
        dt
    }

    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Average FPS over the recent window
    pub fn fps(&self) -> f32 {
        let samples = (self.frame_count as usize).min(FPS_WINDOW_SIZE);
        if samples == 0 {
            return 0.0;
        }

        let total: Duration = self.frame_times[..samples].iter().sum();
        let avg_frame_time = total.as_secs_f32() / samples as f32;
        if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        }
    }

    /// Get total number of frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames whose delta was clamped
    pub fn clamped_frames(&self) -> u64 {
        self.clamped_frames
    }

    /// Total simulated seconds
    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    /// Check if the simulation is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Don't hand the paused interval to the next frame
            self.last_frame_time = Instant::now();
            log::info!("Simulation resumed");
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
