use serde::{Deserialize, Serialize};

/// 8-bit RGB fill color. The effect never blends alpha in color space;
/// opacity comes from rasterization coverage and the corner mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` string (leading `#` optional, case-insensitive).
    ///
    /// Anything else, including 3- and 8-digit forms, comes back as black.
    /// Malformed colors degrade instead of failing the whole instance.
    pub fn from_hex_lossy(s: &str) -> Self {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Self::BLACK;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        Self::new(channel(0), channel(2), channel(4))
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel linear blend toward `other`, rounding to the nearest
    /// integer channel value. `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb8, t: f64) -> Rgb8 {
        let t = t.clamp(0.0, 1.0);
        Rgb8::new(
            lerp_channel(self.r, other.r, t),
            lerp_channel(self.g, other.g, t),
            lerp_channel(self.b, other.b, t),
        )
    }
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
    v.round().clamp(0.0, 255.0) as u8
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Rgb8::from_hex_lossy(&s))
    }
}
