//! Loading region polygons and outline layers from GeoJSON files.

use crate::types::{Feature, FeatureCollection};
use crate::{GeoJsonError, GeoJsonResult};
use geo::{GeodesicArea, LineString};
use grid_common::Region;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Property names holding a region's key, display name and area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionFields {
    pub key: String,
    pub name: String,
    /// Area in km². Regions without it get their geodesic polygon area.
    pub area_km2: String,
}

impl Default for RegionFields {
    fn default() -> Self {
        Self {
            key: "rgn_key".to_string(),
            name: "rgn".to_string(),
            area_km2: "area_km2".to_string(),
        }
    }
}

/// Parse a FeatureCollection from a file.
pub fn read_feature_collection<P: AsRef<Path>>(path: P) -> GeoJsonResult<FeatureCollection> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_feature_collection(&text)
}

/// Parse a FeatureCollection from a string.
pub fn parse_feature_collection(text: &str) -> GeoJsonResult<FeatureCollection> {
    Ok(serde_json::from_str(text)?)
}

/// Load polygon regions, in file order.
pub fn load_regions<P: AsRef<Path>>(path: P, fields: &RegionFields) -> GeoJsonResult<Vec<Region>> {
    let path = path.as_ref();
    let collection = read_feature_collection(path)?;
    let regions = regions_from_collection(&collection, fields)?;

    info!(
        path = %path.display(),
        regions = regions.len(),
        "Loaded regions"
    );

    Ok(regions)
}

/// Build regions from an already parsed collection.
pub fn regions_from_collection(
    collection: &FeatureCollection,
    fields: &RegionFields,
) -> GeoJsonResult<Vec<Region>> {
    let mut seen = HashSet::new();
    let mut regions = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.iter().enumerate() {
        let key = text_property(feature, index, &fields.key)?;
        let name = text_property(feature, index, &fields.name)?;

        let geometry = feature
            .geometry
            .as_ref()
            .ok_or_else(|| GeoJsonError::InvalidGeometry {
                feature: index,
                message: "geometry is null".to_string(),
            })?;
        let polygons = geometry
            .to_multi_polygon()
            .map_err(|message| GeoJsonError::InvalidGeometry {
                feature: index,
                message,
            })?
            .ok_or_else(|| GeoJsonError::UnsupportedGeometry {
                feature: index,
                kind: geometry.kind().to_string(),
            })?;

        let total_area_km2 = match area_property(feature, index, &fields.area_km2)? {
            Some(area) => area,
            None => {
                let area = polygons.geodesic_area_unsigned() / 1_000_000.0;
                debug!(key = %key, area_km2 = area, "Derived region area from geometry");
                area
            }
        };

        if !seen.insert(key.clone()) {
            return Err(GeoJsonError::DuplicateKey(key));
        }

        regions.push(Region::new(key, name, total_area_km2, polygons));
    }

    Ok(regions)
}

/// Load every line and polygon ring of a file, for drawing basemap outlines.
pub fn load_outline<P: AsRef<Path>>(path: P) -> GeoJsonResult<Vec<LineString<f64>>> {
    let path = path.as_ref();
    let collection = read_feature_collection(path)?;

    let mut lines = Vec::new();
    for (index, feature) in collection.features.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let feature_lines = geometry
            .to_lines()
            .map_err(|message| GeoJsonError::InvalidGeometry {
                feature: index,
                message,
            })?;
        lines.extend(feature_lines);
    }

    debug!(path = %path.display(), lines = lines.len(), "Loaded outline");
    Ok(lines)
}

/// String property; numbers are accepted and formatted.
fn text_property(feature: &Feature, index: usize, name: &str) -> GeoJsonResult<String> {
    match feature.property(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(GeoJsonError::InvalidProperty {
            feature: index,
            property: name.to_string(),
            value: other.to_string(),
        }),
        None => Err(GeoJsonError::MissingProperty {
            feature: index,
            property: name.to_string(),
        }),
    }
}

/// Numeric property; numeric strings are accepted. `None` when absent.
fn area_property(feature: &Feature, index: usize, name: &str) -> GeoJsonResult<Option<f64>> {
    let invalid = |value: &Value| GeoJsonError::InvalidProperty {
        feature: index,
        property: name.to_string(),
        value: value.to_string(),
    };

    let area = match feature.property(name) {
        None => return Ok(None),
        Some(value @ Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(value))?,
        Some(value @ Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid(value))?,
        Some(value) => return Err(invalid(value)),
    };

    if !area.is_finite() || area < 0.0 {
        return Err(invalid(&Value::from(area.to_string())));
    }
    Ok(Some(area))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(features: &str) -> FeatureCollection {
        parse_feature_collection(&format!(
            r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
            features
        ))
        .unwrap()
    }

    fn square_feature(properties: &str) -> String {
        format!(
            r#"{{"type": "Feature", "properties": {}, "geometry": {{"type": "Polygon",
                "coordinates": [[[-125, 40], [-124, 40], [-124, 41], [-125, 41], [-125, 40]]]}}}}"#,
            properties
        )
    }

    #[test]
    fn test_string_area_accepted() {
        let c = collection(&square_feature(
            r#"{"rgn_key": "CA-N", "rgn": "Northern California", "area_km2": "164379.4"}"#,
        ));
        let regions = regions_from_collection(&c, &RegionFields::default()).unwrap();

        assert_eq!(regions[0].key, "CA-N");
        assert_eq!(regions[0].name, "Northern California");
        assert!((regions[0].total_area_km2 - 164379.4).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_key_accepted() {
        let c = collection(&square_feature(r#"{"rgn_key": 7, "rgn": "Seven", "area_km2": 1}"#));
        let regions = regions_from_collection(&c, &RegionFields::default()).unwrap();
        assert_eq!(regions[0].key, "7");
    }

    #[test]
    fn test_missing_name() {
        let c = collection(&square_feature(r#"{"rgn_key": "OR"}"#));
        let err = regions_from_collection(&c, &RegionFields::default()).unwrap_err();
        assert!(matches!(
            err,
            GeoJsonError::MissingProperty { feature: 0, ref property } if property == "rgn"
        ));
    }

    #[test]
    fn test_bad_area_string() {
        let c = collection(&square_feature(
            r#"{"rgn_key": "OR", "rgn": "Oregon", "area_km2": "lots"}"#,
        ));
        let err = regions_from_collection(&c, &RegionFields::default()).unwrap_err();
        assert!(matches!(err, GeoJsonError::InvalidProperty { .. }));
    }

    #[test]
    fn test_negative_area_rejected() {
        let c = collection(&square_feature(
            r#"{"rgn_key": "OR", "rgn": "Oregon", "area_km2": -5}"#,
        ));
        assert!(regions_from_collection(&c, &RegionFields::default()).is_err());
    }

    #[test]
    fn test_custom_field_names() {
        let c = collection(&square_feature(r#"{"id": "WA", "label": "Washington"}"#));
        let fields = RegionFields {
            key: "id".to_string(),
            name: "label".to_string(),
            area_km2: "km2".to_string(),
        };
        let regions = regions_from_collection(&c, &fields).unwrap();
        assert_eq!(regions[0].key, "WA");
        // 1x1 degree around 40.5N is roughly 9,400 km2
        assert!(regions[0].total_area_km2 > 9000.0 && regions[0].total_area_km2 < 9800.0);
    }
}
