use crate::foundation::error::{DotfieldError, DotfieldResult};

pub use kurbo::{Affine, BezPath, Circle, Point, Rect, RoundedRect, Size, Vec2};

/// Timestamp in milliseconds on the host's monotonic clock.
///
/// Nothing in the crate reads a real clock; callers pass these in, which is
/// what makes interaction scripts replayable.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct TimeMs(pub f64);

impl TimeMs {
    /// Milliseconds elapsed since `earlier`. Negative when time ran backwards.
    pub fn since(self, earlier: TimeMs) -> f64 {
        self.0 - earlier.0
    }
}

/// Absolute 0-based frame index in playback time.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> DotfieldResult<Self> {
        if den == 0 {
            return Err(DotfieldError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(DotfieldError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Timestamp of a frame's presentation instant.
    pub fn frame_time(self, frame: FrameIndex) -> TimeMs {
        TimeMs(frame.0 as f64 * self.frame_duration_ms())
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}
