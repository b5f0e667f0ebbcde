use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgb8;
use crate::foundation::error::{DotfieldError, DotfieldResult};

/// Tunable parameters of one dot-grid instance, fixed for its lifetime.
///
/// The defaults are the stock look: 16px violet dots on a 32px gap with a
/// 150px pointer highlight. Hosting pages override a handful of fields and
/// leave the rest alone, which is why every field is serde-defaulted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Dot diameter in layout pixels.
    pub dot_size: f64,
    /// Edge-to-edge spacing between neighboring dots.
    pub gap: f64,
    /// Fill color outside the pointer highlight.
    pub base_color: Rgb8,
    /// Fill color directly under the pointer.
    pub active_color: Rgb8,
    /// Radius of the pointer color highlight, in layout pixels.
    pub proximity: f64,
    /// Pointer speed (px/s) above which movement shoves nearby dots.
    pub speed_trigger: f64,
    /// Radius of the click shockwave.
    pub shock_radius: f64,
    /// Scale applied to the shockwave push vector.
    pub shock_strength: f64,
    /// Upper bound on the estimated pointer speed (px/s).
    pub max_speed: f64,
    /// Glide resistance; higher values settle displaced dots faster.
    pub resistance: f64,
    /// Length of the elastic return to rest, in seconds.
    pub return_duration_s: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            dot_size: 16.0,
            gap: 32.0,
            base_color: Rgb8::from_hex_lossy("#5227FF"),
            active_color: Rgb8::from_hex_lossy("#5227FF"),
            proximity: 150.0,
            speed_trigger: 100.0,
            shock_radius: 250.0,
            shock_strength: 5.0,
            max_speed: 5000.0,
            resistance: 750.0,
            return_duration_s: 1.5,
        }
    }
}

impl GridConfig {
    /// Reject configurations the physics cannot run on.
    ///
    /// Degenerate geometry (`dot_size`, `gap` making an empty or undrawable
    /// grid) is allowed and degrades structurally; this only screens out
    /// values that would poison the math everywhere.
    pub fn validate(&self) -> DotfieldResult<()> {
        let finite = [
            ("dot_size", self.dot_size),
            ("gap", self.gap),
            ("proximity", self.proximity),
            ("speed_trigger", self.speed_trigger),
            ("shock_radius", self.shock_radius),
            ("shock_strength", self.shock_strength),
            ("max_speed", self.max_speed),
            ("resistance", self.resistance),
            ("return_duration_s", self.return_duration_s),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(DotfieldError::validation(format!("{name} must be finite")));
            }
        }
        if self.proximity < 0.0 {
            return Err(DotfieldError::validation("proximity must be >= 0"));
        }
        if self.shock_radius < 0.0 {
            return Err(DotfieldError::validation("shock_radius must be >= 0"));
        }
        if self.max_speed <= 0.0 {
            return Err(DotfieldError::validation("max_speed must be > 0"));
        }
        if self.resistance <= 0.0 {
            return Err(DotfieldError::validation("resistance must be > 0"));
        }
        if self.return_duration_s <= 0.0 {
            return Err(DotfieldError::validation("return_duration_s must be > 0"));
        }
        Ok(())
    }
}
