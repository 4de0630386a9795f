//! # Color Scales
//!
//! Piecewise-linear magnitude-to-color maps over `t ∈ [0, 1]`.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// RGB color, channels in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn to_u8(&self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Packed 8-bit RGBA pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub fn from_rgb(color: Rgb, a: u8) -> Self {
        let [r, g, b] = color.to_u8();
        Self { r, g, b, a }
    }
}

/// One anchor of a color scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub t: f32,
    pub color: Rgb,
}

const fn stop(t: f32, r: f32, g: f32, b: f32) -> ColorStop {
    ColorStop { t, color: Rgb::new(r, g, b) }
}

/// Gain: blue through cyan, green, yellow to red
pub const GAIN_STOPS: [ColorStop; 5] = [
    stop(0.0, 0.0, 0.2, 1.0),
    stop(0.25, 0.0, 0.8, 1.0),
    stop(0.5, 0.1, 0.9, 0.2),
    stop(0.75, 1.0, 0.9, 0.0),
    stop(1.0, 1.0, 0.1, 0.0),
];

/// Current: navy through blue, cyan, green, yellow to red
pub const CURRENT_STOPS: [ColorStop; 6] = [
    stop(0.0, 0.05, 0.05, 0.4),
    stop(0.2, 0.0, 0.3, 1.0),
    stop(0.4, 0.0, 0.9, 0.9),
    stop(0.6, 0.3, 1.0, 0.2),
    stop(0.8, 1.0, 0.85, 0.0),
    stop(1.0, 1.0, 0.15, 0.0),
];

const FIELD_LOW: Rgb = Rgb::new(0.0, 0.0, 1.0);
const FIELD_MID: Rgb = Rgb::new(1.0, 1.0, 0.0);
const FIELD_HIGH: Rgb = Rgb::new(1.0, 0.0, 0.0);

/// Ordered color stops, first at t=0 and last at t=1
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<ColorStop>,
}

impl ColorScale {
    /// Checks stop count, anchors and strict monotonicity
    pub fn new(stops: Vec<ColorStop>) -> Result<Self, InputError> {
        if stops.len() < 2 {
            return Err(InputError::TooFewStops(stops.len()));
        }
        let first = stops[0].t;
        let last = stops[stops.len() - 1].t;
        if first != 0.0 || last != 1.0 {
            return Err(InputError::BadStopAnchors);
        }
        for (index, pair) in stops.windows(2).enumerate() {
            if !(pair[1].t > pair[0].t) {
                return Err(InputError::NonMonotonicStops { index: index + 1, t: pair[1].t });
            }
        }
        Ok(Self { stops })
    }

    pub fn gain() -> Self {
        Self { stops: GAIN_STOPS.to_vec() }
    }

    pub fn current() -> Self {
        Self { stops: CURRENT_STOPS.to_vec() }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at `t`, clamped to [0, 1]
    pub fn sample(&self, t: f64) -> Rgb {
        sample(&self.stops, t)
    }
}

/// Interpolates between the stops bracketing `t`
pub fn sample(stops: &[ColorStop], t: f64) -> Rgb {
    let Some(last) = stops.last() else {
        return Rgb::default();
    };
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) as f32 };
    if t >= last.t {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t == b.t {
            return b.color;
        }
        if a.t <= t && t < b.t {
            let span = b.t - a.t;
            let local = if span > 0.0 { (t - a.t) / span } else { 0.0 };
            return a.color.lerp(&b.color, local);
        }
    }

    last.color
}

/// Field scale: blue to yellow to red, two fixed segments
pub fn field_color(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) as f32 };
    if t < 0.5 {
        FIELD_LOW.lerp(&FIELD_MID, t / 0.5)
    } else {
        FIELD_MID.lerp(&FIELD_HIGH, (t - 0.5) / 0.5)
    }
}
