use kurbo::{Point, Vec2};

use crate::foundation::core::TimeMs;
use crate::host::HostGeometry;

/// Minimum spacing between admitted pointer samples.
pub const THROTTLE_MS: f64 = 50.0;

/// Fallback sample spacing when the real delta is unusable.
const DEFAULT_DT_MS: f64 = 16.0;

/// Drops events that arrive faster than a fixed interval.
///
/// Rejected events are gone for good; nothing is queued or replayed later.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RateLimiter {
    interval_ms: f64,
    last_admit: Option<TimeMs>,
}

impl RateLimiter {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_admit: None,
        }
    }

    /// Admit the event at `now`, or reject it when the previous admission
    /// is too recent. A clock that runs backwards rejects until it catches
    /// up with the last admission.
    pub fn try_admit(&mut self, now: TimeMs) -> bool {
        match self.last_admit {
            Some(last) if now.since(last) < self.interval_ms => false,
            _ => {
                self.last_admit = Some(now);
                true
            }
        }
    }
}

/// Pointer sample shared with the renderer and the motion triggers.
///
/// All three coordinate framings of the same event are kept: raw window,
/// canvas-relative viewport, and scroll-compensated layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Last admitted position in window coordinates.
    pub window: Point,
    /// The same position relative to the canvas.
    pub viewport: Point,
    /// The same position in layout space.
    pub layout: Point,
    /// Estimated velocity in px/s, clamped to the configured maximum.
    pub velocity: Vec2,
    /// Magnitude of `velocity`.
    pub speed: f64,
    /// When the sample was admitted.
    pub at: TimeMs,
}

/// Throttled pointer sampler with velocity estimation.
#[derive(Clone, Copy, Debug)]
pub struct PointerTracker {
    limiter: RateLimiter,
    state: PointerState,
    last_sample: Option<(TimeMs, Point)>,
    max_speed: f64,
}

impl PointerTracker {
    pub fn new(max_speed: f64) -> Self {
        Self {
            limiter: RateLimiter::new(THROTTLE_MS),
            state: PointerState::default(),
            last_sample: None,
            max_speed,
        }
    }

    /// Most recently admitted sample.
    pub fn state(&self) -> PointerState {
        self.state
    }

    /// Feed a raw pointer event. Returns the updated state when the sample
    /// is admitted; throttled samples return `None` and change nothing.
    ///
    /// The first admitted sample has no predecessor and reports zero
    /// velocity.
    pub fn track(
        &mut self,
        now: TimeMs,
        window: Point,
        geometry: &HostGeometry,
    ) -> Option<PointerState> {
        if !self.limiter.try_admit(now) {
            return None;
        }

        let (velocity, speed) = match self.last_sample {
            Some((then, prev)) => velocity_between(prev, window, now.since(then), self.max_speed),
            None => (Vec2::ZERO, 0.0),
        };
        self.last_sample = Some((now, window));

        self.state = PointerState {
            window,
            viewport: geometry.window_to_viewport(window),
            layout: geometry.window_to_layout(window),
            velocity,
            speed,
            at: now,
        };
        Some(self.state)
    }
}

/// Velocity between two window samples in px/s, clamped to `max_speed` by
/// scaling both components so the direction is preserved. Non-positive
/// deltas fall back to the default sample spacing.
pub fn velocity_between(prev: Point, next: Point, dt_ms: f64, max_speed: f64) -> (Vec2, f64) {
    let dt = if dt_ms > 0.0 { dt_ms } else { DEFAULT_DT_MS };
    let mut velocity = (next - prev) * (1000.0 / dt);
    let mut speed = velocity.hypot();
    if max_speed > 0.0 && speed > max_speed {
        velocity = velocity * (max_speed / speed);
        speed = max_speed;
    }
    (velocity, speed)
}
