//! Color utilities for views

use serde::Serialize;

use hv_core::AttributeKey;

/// An sRGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Linear blend towards `other`; `t` is clamped to `[0, 1]`
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

/// Fill of a region holding the maximum of the active attribute
pub const MAXIMUM_FILL: Rgb = Rgb(0xf4, 0xcf, 0x49);
/// Fill of a region holding the minimum
pub const MINIMUM_FILL: Rgb = Rgb(0xf8, 0xe6, 0xa5);
/// Fill of a user-selected region
pub const SELECTED_FILL: Rgb = Rgb(0xe4, 0x57, 0x56);
/// Fill of a region without a value
pub const NO_DATA_FILL: Rgb = Rgb(0xdd, 0xdd, 0xdd);

/// Two-stop sequential color scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorRamp {
    pub low: Rgb,
    pub high: Rgb,
}

impl ColorRamp {
    /// Blue for happiness itself, green for the explanatory indicators
    pub fn for_attribute(attribute: AttributeKey) -> Self {
        match attribute {
            AttributeKey::LifeLadder => Self {
                low: Rgb(0xcf, 0xe2, 0xf2),
                high: Rgb(0x0d, 0x30, 0x6b),
            },
            _ => Self {
                low: Rgb(0x90, 0xee, 0x90),
                high: Rgb(0x00, 0x80, 0x00),
            },
        }
    }

    pub fn at(&self, t: f64) -> Rgb {
        self.low.lerp(self.high, t)
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::for_attribute(AttributeKey::LifeLadder)
    }
}
