//! Text labels for map legends.

use crate::style::Color;
use image::RgbaImage;
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

/// Embedded font data - DejaVu Sans Mono (a clean, readable monospace font)
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Horizontal anchor of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Right,
}

pub fn load_font() -> Option<Font<'static>> {
    let font = Font::try_from_bytes(FONT_DATA);
    if font.is_none() {
        tracing::warn!("Failed to load font for legend labels");
    }
    font
}

/// Format a legend value: whole numbers from 100 up, otherwise up to two
/// decimals with trailing zeros removed.
pub fn format_value(value: f64, unit: &str) -> String {
    let text = if value.abs() >= 100.0 {
        format!("{:.0}", value)
    } else if value.abs() >= 1.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    };

    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    // "-0" from values that round to zero
    let text = if text == "-0" { "0".to_string() } else { text };

    format!("{}{}", text, unit)
}

/// Draw `text` with its top edge at `at.1`. A left-anchored label starts at
/// `at.0`, a right-anchored one ends there.
pub fn draw_label(
    img: &mut RgbaImage,
    font: &Font,
    text: &str,
    at: (i32, i32),
    size: f32,
    anchor: Anchor,
    color: Color,
) {
    let (x, y) = at;
    let scale = Scale::uniform(size);
    let x = match anchor {
        Anchor::Left => x,
        Anchor::Right => x - text_size(scale, font, text).0,
    };
    draw_text_mut(img, color.to_rgba(), x.max(0), y, scale, font, text);
}
