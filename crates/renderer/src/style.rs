//! Colours, colour ramps and map styling.

use crate::{RenderError, RenderResult};
use serde::{Deserialize, Serialize};

/// ColorBrewer sequential blues.
pub const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

/// Perceptually uniform viridis.
pub const VIRIDIS: &[&str] = &[
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde725",
];

/// ColorBrewer sequential yellow-orange-red.
pub const YLORRD: &[&str] = &[
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026",
    "#800026",
];

/// Names accepted by [`ColorRamp::named`].
pub const PALETTE_NAMES: &[&str] = &["blues", "viridis", "ylorrd"];

/// An RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let (r, g, b) = hex_to_rgb(&digits[..digits.len().min(6)])?;
        match digits.len() {
            6 => Some(Self::rgb(r, g, b)),
            8 => {
                let a = u8::from_str_radix(digits.get(6..8)?, 16).ok()?;
                Some(Self::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Linear blend toward `other`, `t` in `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Color stop for a ramp, position in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColorStop {
    pub value: f32,
    pub color: String,
}

/// Piecewise-linear colour ramp over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<(f32, Color)>,
}

impl ColorRamp {
    /// Build a ramp from stops; they are sorted by value.
    pub fn from_stops(stops: &[ColorStop]) -> RenderResult<Self> {
        if stops.is_empty() {
            return Err(RenderError::InvalidStyle("colour ramp has no stops".into()));
        }

        let mut parsed = stops
            .iter()
            .map(|stop| {
                Color::from_hex(&stop.color)
                    .map(|color| (stop.value, color))
                    .ok_or_else(|| RenderError::InvalidStyle(format!("bad colour '{}'", stop.color)))
            })
            .collect::<RenderResult<Vec<_>>>()?;
        parsed.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Self { stops: parsed })
    }

    /// Evenly spaced ramp through hex colours.
    pub fn from_hex_colors(colors: &[&str]) -> RenderResult<Self> {
        let last = colors.len().saturating_sub(1).max(1) as f32;
        let stops: Vec<ColorStop> = colors
            .iter()
            .enumerate()
            .map(|(i, c)| ColorStop {
                value: i as f32 / last,
                color: c.to_string(),
            })
            .collect();
        Self::from_stops(&stops)
    }

    /// One of the built-in palettes (`blues`, `viridis`, `ylorrd`).
    pub fn named(name: &str) -> RenderResult<Self> {
        let colors = match name.to_lowercase().as_str() {
            "blues" => BLUES,
            "viridis" => VIRIDIS,
            "ylorrd" => YLORRD,
            other => {
                return Err(RenderError::InvalidStyle(format!(
                    "unknown palette '{}', expected one of {}",
                    other,
                    PALETTE_NAMES.join(", ")
                )))
            }
        };
        Self::from_hex_colors(colors)
    }

    /// Colour at position `t`, clamped to the first and last stops.
    pub fn color_at(&self, t: f32) -> Color {
        let (first, last) = (self.stops[0], self.stops[self.stops.len() - 1]);
        if t.is_nan() || t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.0 {
                let span = hi.0 - lo.0;
                let local = if span > 0.0 { (t - lo.0) / span } else { 0.0 };
                return lo.1.lerp(hi.1, local);
            }
        }

        last.1
    }
}

/// Appearance of a choropleth map.
#[derive(Debug, Clone)]
pub struct MapStyle {
    /// Image width in pixels; the height follows the map extent.
    pub width: u32,
    /// Padding around the region extent, in map units.
    pub margin: f64,
    pub ramp: ColorRamp,
    pub background: Color,
    /// Fill for regions whose value is not a number.
    pub no_data: Color,
    pub border: Color,
    pub outline: Color,
    /// Height of the legend band below the map.
    pub legend_height: u32,
    /// Suffix of the legend's end labels, e.g. `" km2"` or `"%"`.
    pub legend_unit: String,
}

impl MapStyle {
    /// Default styling with the given ramp.
    pub fn with_ramp(ramp: ColorRamp) -> Self {
        Self {
            width: 800,
            margin: 1.0,
            ramp,
            background: Color::rgb(0xf4, 0xf6, 0xf8),
            no_data: Color::rgb(0xbd, 0xbd, 0xbd),
            border: Color::rgb(0x40, 0x40, 0x40),
            outline: Color::rgb(0x20, 0x20, 0x20),
            legend_height: 40,
            legend_unit: String::new(),
        }
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.width < 16 {
            return Err(RenderError::InvalidStyle(format!(
                "map width {} is too small",
                self.width
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(RenderError::InvalidStyle(format!(
                "margin must be a non-negative number, got {}",
                self.margin
            )));
        }
        Ok(())
    }
}
