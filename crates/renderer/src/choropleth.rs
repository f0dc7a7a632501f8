//! Choropleth maps of per-region values.
//!
//! Each region polygon is filled with a colour from the style's ramp, scaled
//! over the layer's value range. Region borders and an optional basemap
//! outline (coastline) are drawn on top, and a legend ramp strip labelled with
//! the value range runs along the bottom of the image.

use crate::labels::{self, Anchor};
use crate::style::{Color, MapStyle};
use crate::{RenderError, RenderResult};
use geo::{LineString, MultiPolygon};
use grid_common::{BoundingBox, Region};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::collections::BTreeMap;
use tracing::debug;

/// Maps coordinates in the region CRS onto the map area of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFrame {
    pub extent: BoundingBox,
    pub width: u32,
    pub height: u32,
}

impl MapFrame {
    /// Frame of the given width whose height follows the extent's aspect ratio.
    pub fn fit(extent: BoundingBox, width: u32) -> RenderResult<Self> {
        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(RenderError::InvalidStyle(format!(
                "map extent {:?} has no area",
                extent
            )));
        }

        let height = (width as f64 * extent.height() / extent.width()).round().max(1.0) as u32;
        Ok(Self {
            extent,
            width,
            height,
        })
    }

    /// Frame covering every region, padded by `margin` map units.
    pub fn for_regions(regions: &[Region], margin: f64, width: u32) -> RenderResult<Self> {
        let extent = regions
            .iter()
            .filter_map(Region::bbox)
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| RenderError::InvalidStyle("no region geometry to frame".into()))?;

        Self::fit(extent.expand(margin), width)
    }

    /// Pixel position of a map coordinate. Rows grow southward.
    pub fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let px = (x - self.extent.min_x) / self.extent.width() * self.width as f64;
        let py = (self.extent.max_y - y) / self.extent.height() * self.height as f64;
        (px as f32, py as f32)
    }

    fn ring_to_pixels(&self, ring: &LineString<f64>) -> Vec<(f32, f32)> {
        ring.coords().map(|c| self.to_pixel(c.x, c.y)).collect()
    }
}

/// One map's worth of data: a value per region key.
#[derive(Debug, Clone, Copy)]
pub struct ChoroplethLayer<'a> {
    pub regions: &'a [Region],
    pub values: &'a BTreeMap<String, f64>,
    /// Basemap lines drawn over the fills, e.g. a coastline.
    pub outline: &'a [LineString<f64>],
}

impl<'a> ChoroplethLayer<'a> {
    pub fn new(regions: &'a [Region], values: &'a BTreeMap<String, f64>) -> Self {
        Self {
            regions,
            values,
            outline: &[],
        }
    }

    pub fn with_outline(mut self, outline: &'a [LineString<f64>]) -> Self {
        self.outline = outline;
        self
    }

    /// Every value must belong to a region and every region needs a value.
    fn check_join(&self) -> RenderResult<()> {
        for region in self.regions {
            if !self.values.contains_key(&region.key) {
                return Err(RenderError::Join(format!(
                    "region '{}' has no value",
                    region.key
                )));
            }
        }

        for key in self.values.keys() {
            if !self.regions.iter().any(|r| &r.key == key) {
                return Err(RenderError::Join(format!(
                    "value for '{}' has no region geometry",
                    key
                )));
            }
        }

        Ok(())
    }

    /// Smallest and largest finite value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .values()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Render a layer to an image of `style.width` pixels across.
///
/// The image is the map frame plus `style.legend_height` rows of legend.
pub fn render_choropleth(layer: &ChoroplethLayer, style: &MapStyle) -> RenderResult<RgbaImage> {
    style.validate()?;
    layer.check_join()?;

    let frame = MapFrame::for_regions(layer.regions, style.margin, style.width)?;
    let mut img = RgbaImage::from_pixel(
        frame.width,
        frame.height + style.legend_height,
        style.background.to_rgba(),
    );

    let range = layer.value_range();
    debug!(
        regions = layer.regions.len(),
        width = frame.width,
        height = frame.height,
        range = ?range,
        "Rendering choropleth"
    );

    for region in layer.regions {
        let value = layer.values.get(&region.key).copied().unwrap_or(f64::NAN);
        let color = match (value.is_finite(), range) {
            (true, Some((lo, hi))) => style.ramp.color_at(scale(value, lo, hi)),
            _ => style.no_data,
        };
        fill_multi_polygon(&mut img, &frame, &region.geometry, color);
    }

    for region in layer.regions {
        for polygon in region.geometry.0.iter() {
            draw_path(&mut img, &frame, polygon.exterior(), style.border);
            for interior in polygon.interiors() {
                draw_path(&mut img, &frame, interior, style.border);
            }
        }
    }

    for line in layer.outline {
        draw_path(&mut img, &frame, line, style.outline);
    }

    draw_legend(&mut img, frame.height, style, range);

    Ok(img)
}

/// Position of `value` within `[lo, hi]`; a single-valued range sits mid-ramp.
fn scale(value: f64, lo: f64, hi: f64) -> f32 {
    if hi - lo <= f64::EPSILON * hi.abs().max(1.0) {
        0.5
    } else {
        ((value - lo) / (hi - lo)) as f32
    }
}

/// Even-odd scanline fill over all rings of a multipolygon, so holes stay
/// unfilled. A pixel is filled when its centre lies inside.
fn fill_multi_polygon(
    img: &mut RgbaImage,
    frame: &MapFrame,
    geometry: &MultiPolygon<f64>,
    color: Color,
) {
    let pixel = color.to_rgba();

    for polygon in geometry.0.iter() {
        let rings: Vec<Vec<(f32, f32)>> = std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|ring| frame.ring_to_pixels(ring))
            .collect();
        fill_rings(img, &rings, frame.height, pixel);
    }
}

fn fill_rings(img: &mut RgbaImage, rings: &[Vec<(f32, f32)>], max_row: u32, pixel: Rgba<u8>) {
    let (min_y, max_y) = rings
        .iter()
        .flatten()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    if !(min_y < max_y) {
        return;
    }

    let first_row = min_y.floor().max(0.0) as u32;
    let last_row = (max_y.ceil().max(0.0) as u32).min(max_row);
    let mut crossings: Vec<f32> = Vec::new();

    for row in first_row..last_row {
        let sy = row as f32 + 0.5;
        crossings.clear();

        for ring in rings {
            // Pairing each vertex with its successor, wrapping at the end,
            // also closes rings that omit the repeated first point.
            for (a, b) in ring.iter().zip(ring.iter().cycle().skip(1)) {
                if (a.1 <= sy) != (b.1 <= sy) {
                    let t = (sy - a.1) / (b.1 - a.1);
                    crossings.push(a.0 + t * (b.0 - a.0));
                }
            }
        }

        crossings.sort_by(f32::total_cmp);
        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil().max(0.0) as u32;
            let end = ((span[1] - 0.5).ceil().max(0.0) as u32).min(img.width());
            for col in start..end {
                img.put_pixel(col, row, pixel);
            }
        }
    }
}

fn draw_path(img: &mut RgbaImage, frame: &MapFrame, line: &LineString<f64>, color: Color) {
    let points = frame.ring_to_pixels(line);
    let pixel = color.to_rgba();
    for segment in points.windows(2) {
        draw_line_segment_mut(img, segment[0], segment[1], pixel);
    }
}

/// Horizontal ramp strip, low values on the left, with the value range
/// labelled under its ends.
fn draw_legend(
    img: &mut RgbaImage,
    map_height: u32,
    style: &MapStyle,
    range: Option<(f64, f64)>,
) {
    if style.legend_height < 4 {
        return;
    }

    let left = img.width() / 10;
    let right = img.width() - left;
    let top = map_height + style.legend_height / 10;
    let bottom = map_height + style.legend_height / 2;
    if right <= left + 1 || bottom <= top + 1 {
        return;
    }

    let span = (right - left - 1).max(1) as f32;
    for col in left..right {
        let pixel = style.ramp.color_at((col - left) as f32 / span).to_rgba();
        for row in top..bottom {
            img.put_pixel(col, row, pixel);
        }
    }

    draw_hollow_rect_mut(
        img,
        Rect::at(left as i32, top as i32).of_size(right - left, bottom - top),
        style.border.to_rgba(),
    );

    let Some((lo, hi)) = range else {
        return;
    };
    let size = style.legend_height as f32 * 0.35;
    if size < 6.0 {
        return;
    }
    let Some(font) = labels::load_font() else {
        return;
    };

    let y = bottom as i32 + 2;
    let low = labels::format_value(lo, &style.legend_unit);
    let high = labels::format_value(hi, &style.legend_unit);
    labels::draw_label(img, &font, &low, (left as i32, y), size, Anchor::Left, style.border);
    labels::draw_label(img, &font, &high, (right as i32, y), size, Anchor::Right, style.border);
}
