//! Choropleth rendering: join rules, frame sizing and output colours.

use geo::{polygon, LineString, MultiPolygon};
use grid_common::{BoundingBox, Region};
use image::Rgba;
use renderer::{
    encode_png, render_choropleth, ChoroplethLayer, Color, ColorRamp, MapFrame, MapStyle,
    RenderError,
};
use std::collections::BTreeMap;

fn rect(key: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Region {
    let poly = polygon![
        (x: min_x, y: min_y),
        (x: max_x, y: min_y),
        (x: max_x, y: max_y),
        (x: min_x, y: max_y),
        (x: min_x, y: min_y),
    ];
    let area = (max_x - min_x) * (max_y - min_y);
    Region::new(key, format!("Region {}", key), area, MultiPolygon::new(vec![poly]))
}

fn west_coast() -> Vec<Region> {
    vec![
        rect("N", -126.0, 40.0, -122.0, 42.0),
        rect("S", -126.0, 38.0, -122.0, 40.0),
    ]
}

fn values(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn test_style() -> MapStyle {
    let mut style = MapStyle::with_ramp(ColorRamp::named("blues").unwrap());
    style.width = 300;
    style.margin = 0.5;
    style
}

#[test]
fn test_image_size_follows_extent() {
    let regions = west_coast();
    let vals = values(&[("N", 10.0), ("S", 20.0)]);
    let style = test_style();

    let img = render_choropleth(&ChoroplethLayer::new(&regions, &vals), &style).unwrap();

    // Extent 5 x 5 degrees with the margin
    assert_eq!(img.width(), 300);
    assert_eq!(img.height(), 300 + style.legend_height);
}

#[test]
fn test_regions_take_ramp_ends() {
    let regions = west_coast();
    let vals = values(&[("N", 0.0), ("S", 50.0)]);
    let style = test_style();

    let img = render_choropleth(&ChoroplethLayer::new(&regions, &vals), &style).unwrap();
    let frame = MapFrame::for_regions(&regions, style.margin, style.width).unwrap();

    let (nx, ny) = frame.to_pixel(-124.0, 41.0);
    let (sx, sy) = frame.to_pixel(-124.0, 39.0);
    let (bx, by) = frame.to_pixel(-126.25, 42.25);

    assert_eq!(*img.get_pixel(nx as u32, ny as u32), style.ramp.color_at(0.0).to_rgba());
    assert_eq!(*img.get_pixel(sx as u32, sy as u32), style.ramp.color_at(1.0).to_rgba());
    assert_eq!(*img.get_pixel(bx as u32, by as u32), style.background.to_rgba());
}

#[test]
fn test_equal_values_use_mid_ramp() {
    let regions = west_coast();
    let vals = values(&[("N", 0.0), ("S", 0.0)]);
    let style = test_style();

    let img = render_choropleth(&ChoroplethLayer::new(&regions, &vals), &style).unwrap();
    let frame = MapFrame::for_regions(&regions, style.margin, style.width).unwrap();
    let (x, y) = frame.to_pixel(-124.0, 41.0);

    assert_eq!(*img.get_pixel(x as u32, y as u32), style.ramp.color_at(0.5).to_rgba());
}

#[test]
fn test_nan_value_uses_no_data_colour() {
    let regions = west_coast();
    let vals = values(&[("N", f64::NAN), ("S", 3.0)]);
    let style = test_style();

    let img = render_choropleth(&ChoroplethLayer::new(&regions, &vals), &style).unwrap();
    let frame = MapFrame::for_regions(&regions, style.margin, style.width).unwrap();
    let (x, y) = frame.to_pixel(-124.0, 41.0);

    assert_eq!(*img.get_pixel(x as u32, y as u32), style.no_data.to_rgba());
}

#[test]
fn test_value_without_region_is_join_error() {
    let regions = west_coast();
    let vals = values(&[("N", 1.0), ("S", 2.0), ("X", 3.0)]);

    let result = render_choropleth(&ChoroplethLayer::new(&regions, &vals), &test_style());
    assert!(matches!(result, Err(RenderError::Join(_))));
}

#[test]
fn test_region_without_value_is_join_error() {
    let regions = west_coast();
    let vals = values(&[("N", 1.0)]);

    let result = render_choropleth(&ChoroplethLayer::new(&regions, &vals), &test_style());
    assert!(matches!(result, Err(RenderError::Join(ref msg)) if msg.contains("'S'")));
}

#[test]
fn test_outline_is_drawn() {
    let regions = west_coast();
    let vals = values(&[("N", 1.0), ("S", 2.0)]);
    let coast = vec![LineString::from(vec![(-121.8, 37.6), (-121.8, 42.4)])];
    let mut style = test_style();
    style.outline = Color::rgb(255, 0, 0);

    let layer = ChoroplethLayer::new(&regions, &vals).with_outline(&coast);
    let img = render_choropleth(&layer, &style).unwrap();
    let frame = MapFrame::for_regions(&regions, style.margin, style.width).unwrap();
    let (x, y) = frame.to_pixel(-121.8, 40.5);

    let red = Rgba([255, 0, 0, 255]);
    let col = x.round() as u32;
    assert!(
        (col - 1..=col + 1).any(|c| *img.get_pixel(c, y as u32) == red),
        "coastline not drawn near column {}",
        col
    );
}

#[test]
fn test_rendered_map_encodes_as_png() {
    let regions = west_coast();
    let vals = values(&[("N", 4069.0), ("S", 1250.0)]);

    let img = render_choropleth(&ChoroplethLayer::new(&regions, &vals), &test_style()).unwrap();
    let png = encode_png(&img).unwrap();

    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded, img);
}

/// Pixels in the legend band below the ramp strip that differ from the
/// background.
fn label_ink(img: &image::RgbaImage, style: &MapStyle) -> usize {
    let map_height = img.height() - style.legend_height;
    let first_row = map_height + style.legend_height / 2 + 1;
    let background = style.background.to_rgba();
    (first_row..img.height())
        .flat_map(|y| (0..img.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| *img.get_pixel(x, y) != background)
        .count()
}

#[test]
fn test_legend_labels_value_range() {
    let regions = west_coast();
    let vals = values(&[("N", 4069.0), ("S", 1250.0)]);
    let mut style = test_style();
    style.legend_unit = " km2".to_string();

    let img = render_choropleth(&ChoroplethLayer::new(&regions, &vals), &style).unwrap();
    assert!(label_ink(&img, &style) > 0);

    // Both labels sit under the strip ends, leaving the middle clear
    let map_height = img.height() - style.legend_height;
    let background = style.background.to_rgba();
    let mid = img.width() / 2;
    for y in map_height + style.legend_height / 2 + 1..img.height() {
        assert_eq!(*img.get_pixel(mid, y), background);
    }
}

#[test]
fn test_legend_unlabelled_without_values() {
    let regions = west_coast();
    let vals = values(&[("N", f64::NAN), ("S", f64::NAN)]);
    let style = test_style();

    let img = render_choropleth(&ChoroplethLayer::new(&regions, &vals), &style).unwrap();
    assert_eq!(label_ink(&img, &style), 0);
}

#[test]
fn test_frame_rejects_empty_region_list() {
    let result = MapFrame::for_regions(&[], 1.0, 200);
    assert!(matches!(result, Err(RenderError::InvalidStyle(_))));

    let frame = MapFrame::fit(BoundingBox::new(-126.0, 38.0, -122.0, 42.0), 200).unwrap();
    assert_eq!(frame.height, 200);
}
