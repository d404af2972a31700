use web_time::{Duration, Instant};

/// Monotonic frame clock with smoothed FPS and optional frame limiting.
///
/// `web_time` delegates to `performance.now()` in the browser, so the
/// same clock drives the selection animation on every host.
pub struct FrameTiming {
    /// Target FPS (0 = unlimited)
    target_fps: u32,
    min_frame_duration: Duration,
    started: Instant,
    last_frame: Instant,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl FrameTiming {
    /// Create a new frame timer with the given FPS target (0 = unlimited).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let min_frame_duration = if target_fps > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        } else {
            Duration::ZERO
        };
        let now = Instant::now();
        Self {
            target_fps,
            min_frame_duration,
            started: now,
            last_frame: now,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Milliseconds since the timer was created.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Whether enough time has passed since the last frame to render.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.target_fps == 0
            || self.last_frame.elapsed() >= self.min_frame_duration
    }

    /// Call after rendering to update timing.
    pub fn end_frame(&mut self) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        if frame_time > 0.0 {
            self.smoothed_fps = self.smoothed_fps.mul_add(
                1.0 - self.smoothing,
                frame_time.recip() * self.smoothing,
            );
        }
    }

    /// Current FPS (smoothed).
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}
