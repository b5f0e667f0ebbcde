use kurbo::{Point, Vec2};

use crate::config::GridConfig;
use crate::ease::Ease;

/// Scale from pointer velocity (px/s) to extra push distance (px).
pub const VELOCITY_PUSH_SCALE: f64 = 0.005;

/// Shortest glide a push animates over, in milliseconds.
const MIN_GLIDE_MS: f64 = 120.0;
/// Longest glide, reached for large pushes or tiny resistance.
const MAX_GLIDE_MS: f64 = 1500.0;

/// Physics constants shared by every dot of an instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    /// Glide resistance in px/s; push distance over resistance sets the
    /// glide time.
    pub resistance: f64,
    /// Elastic return time in milliseconds.
    pub return_ms: f64,
}

impl From<&GridConfig> for MotionParams {
    fn from(config: &GridConfig) -> Self {
        Self {
            resistance: config.resistance,
            return_ms: config.return_duration_s * 1000.0,
        }
    }
}

/// One timed glide between two offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    start: Vec2,
    target: Vec2,
    elapsed_ms: f64,
    duration_ms: f64,
    ease: Ease,
}

impl Segment {
    fn returning(from: Vec2, return_ms: f64) -> Self {
        Self {
            start: from,
            target: Vec2::ZERO,
            elapsed_ms: 0.0,
            duration_ms: return_ms,
            ease: Ease::OutElastic,
        }
    }

    fn progress(&self) -> f64 {
        if self.duration_ms > 0.0 {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    fn sample(&self) -> Vec2 {
        self.start.lerp(self.target, self.ease.apply(self.progress()))
    }
}

/// Per-dot displacement state machine.
///
/// A dot rests until an impulse targets it, glides toward the push target,
/// then snaps home elastically. Impulse eligibility ends the moment a dot
/// leaves `Resting` and comes back only when the return lands; callers
/// enforce that gate, while `begin_displace` itself always replaces
/// whatever was running (last writer wins, pushes never stack).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Motion {
    #[default]
    Resting,
    Displacing(Segment),
    Returning(Segment),
}

impl Motion {
    /// Whether the dot is mid-animation and therefore ineligible for new
    /// impulses.
    pub fn is_active(&self) -> bool {
        !matches!(self, Motion::Resting)
    }

    /// Start a glide from the dot's current offset toward `target`.
    pub fn begin_displace(&mut self, current: Vec2, target: Vec2, params: MotionParams) {
        let distance = (target - current).hypot();
        *self = Motion::Displacing(Segment {
            start: current,
            target,
            elapsed_ms: 0.0,
            duration_ms: glide_ms(distance, params.resistance),
            ease: Ease::OutCubic,
        });
    }

    /// Step the machine by `dt_ms` and return the dot's new offset.
    ///
    /// A finished glide parks exactly on its target for the rest of the
    /// step, then the return starts; a finished return lands exactly on
    /// `(0, 0)` and clears the state.
    pub fn advance(&mut self, dt_ms: f64, params: MotionParams) -> Vec2 {
        let dt = dt_ms.max(0.0);
        match *self {
            Motion::Resting => Vec2::ZERO,
            Motion::Displacing(mut seg) => {
                seg.elapsed_ms += dt;
                if seg.elapsed_ms >= seg.duration_ms {
                    let reached = seg.target;
                    *self = Motion::Returning(Segment::returning(reached, params.return_ms));
                    reached
                } else {
                    *self = Motion::Displacing(seg);
                    seg.sample()
                }
            }
            Motion::Returning(mut seg) => {
                seg.elapsed_ms += dt;
                if seg.elapsed_ms >= seg.duration_ms {
                    *self = Motion::Resting;
                    Vec2::ZERO
                } else {
                    *self = Motion::Returning(seg);
                    seg.sample()
                }
            }
        }
    }
}

/// Glide time for a push of `distance` px against `resistance`.
fn glide_ms(distance: f64, resistance: f64) -> f64 {
    if !(resistance.is_finite() && resistance > 0.0) {
        return MAX_GLIDE_MS;
    }
    (1000.0 * distance / resistance).clamp(MIN_GLIDE_MS, MAX_GLIDE_MS)
}

/// Push target for a velocity-triggered shove: radially away from the
/// pointer, skewed along the pointer's direction of travel.
pub fn inertia_push(dot_pos: Point, pointer: Point, velocity: Vec2) -> Vec2 {
    (dot_pos - pointer) + velocity * VELOCITY_PUSH_SCALE
}

/// Push target for a click shock, scaled by strength and falloff.
pub fn shock_push(dot_pos: Point, click: Point, strength: f64, falloff: f64) -> Vec2 {
    (dot_pos - click) * strength * falloff
}

/// Linear falloff of a shock at `distance` from its center: 1 at the
/// center, 0 at the radius and beyond.
pub fn shock_falloff(distance: f64, radius: f64) -> f64 {
    if radius > 0.0 {
        (1.0 - distance / radius).max(0.0)
    } else {
        0.0
    }
}
