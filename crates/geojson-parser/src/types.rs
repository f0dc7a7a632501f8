//! Serde types for GeoJSON FeatureCollections.
//!
//! Only the pieces needed for region and outline layers are modelled.
//! Positions keep any extra ordinates (altitude) but only x/y are used.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single GeoJSON position, `[x, y]` or `[x, y, z]`.
pub type Position = Vec<f64>;

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<Feature>,
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// `null` geometries are allowed by GeoJSON.
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    /// Look up a property, treating JSON `null` as absent.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .as_ref()
            .and_then(|props| props.get(name))
            .filter(|value| !value.is_null())
    }
}

/// GeoJSON geometry types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    /// First ring is the exterior, the rest are holes.
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    /// GeoJSON type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Convert polygonal geometry. `Ok(None)` for non-polygonal types.
    pub fn to_multi_polygon(&self) -> Result<Option<MultiPolygon<f64>>, String> {
        match self {
            Geometry::Polygon { coordinates } => {
                Ok(Some(MultiPolygon::new(vec![to_polygon(coordinates)?])))
            }
            Geometry::MultiPolygon { coordinates } => {
                let polygons = coordinates
                    .iter()
                    .map(|rings| to_polygon(rings))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(MultiPolygon::new(polygons)))
            }
            _ => Ok(None),
        }
    }

    /// Every line or ring in the geometry. Points yield nothing.
    pub fn to_lines(&self) -> Result<Vec<LineString<f64>>, String> {
        let lines = match self {
            Geometry::Point { .. } | Geometry::MultiPoint { .. } => Vec::new(),
            Geometry::LineString { coordinates } => vec![to_line(coordinates)?],
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates
                    .iter()
                    .map(|line| to_line(line))
                    .collect::<Result<_, _>>()?
            }
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flatten()
                .map(|ring| to_line(ring))
                .collect::<Result<_, _>>()?,
        };
        Ok(lines)
    }
}

fn to_coord(position: &Position) -> Result<Coord<f64>, String> {
    match position.as_slice() {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        [_, _, ..] => Err("non-finite coordinate".to_string()),
        _ => Err(format!(
            "position needs at least 2 values, got {}",
            position.len()
        )),
    }
}

fn to_line(positions: &[Position]) -> Result<LineString<f64>, String> {
    let coords = positions
        .iter()
        .map(to_coord)
        .collect::<Result<Vec<_>, _>>()?;
    if coords.len() < 2 {
        return Err("line needs at least 2 positions".to_string());
    }
    Ok(LineString::new(coords))
}

fn to_ring(positions: &[Position]) -> Result<LineString<f64>, String> {
    let ring = to_line(positions)?;
    // Closing position may be repeated; need 3 distinct corners
    let mut distinct = ring.0.clone();
    distinct.dedup();
    if distinct.first() == distinct.last() {
        distinct.pop();
    }
    if distinct.len() < 3 {
        return Err("polygon ring needs at least 3 distinct positions".to_string());
    }
    Ok(ring)
}

fn to_polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>, String> {
    let (exterior, holes) = rings
        .split_first()
        .ok_or_else(|| "polygon has no rings".to_string())?;
    let interiors = holes
        .iter()
        .map(|ring| to_ring(ring))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(to_ring(exterior)?, interiors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn test_deserialize_polygon_feature() {
        let json = r#"{
            "type": "Feature",
            "properties": {"rgn_key": "OR", "rgn": "Oregon"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [2, 0], [2, 1], [0, 1], [0, 0]]]
            }
        }"#;
        let feature: Feature = serde_json::from_str(json).unwrap();

        assert_eq!(feature.property("rgn_key"), Some(&Value::from("OR")));
        let geometry = feature.geometry.unwrap();
        assert_eq!(geometry.kind(), "Polygon");

        let multi = geometry.to_multi_polygon().unwrap().unwrap();
        assert_eq!(multi.0.len(), 1);
        assert!((multi.unsigned_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_null_geometry_and_properties() {
        let json = r#"{"type": "Feature", "geometry": null, "properties": null}"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert!(feature.geometry.is_none());
        assert!(feature.property("rgn").is_none());
    }

    #[test]
    fn test_polygon_with_hole() {
        let geometry = Geometry::Polygon {
            coordinates: vec![
                vec![
                    vec![0.0, 0.0],
                    vec![4.0, 0.0],
                    vec![4.0, 4.0],
                    vec![0.0, 4.0],
                    vec![0.0, 0.0],
                ],
                vec![
                    vec![1.0, 1.0],
                    vec![2.0, 1.0],
                    vec![2.0, 2.0],
                    vec![1.0, 2.0],
                    vec![1.0, 1.0],
                ],
            ],
        };
        let multi = geometry.to_multi_polygon().unwrap().unwrap();
        assert!((multi.unsigned_area() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_ring_rejected() {
        let geometry = Geometry::Polygon {
            coordinates: vec![vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]]],
        };
        assert!(geometry.to_multi_polygon().is_err());
    }

    #[test]
    fn test_short_position_rejected() {
        let geometry = Geometry::LineString {
            coordinates: vec![vec![0.0], vec![1.0, 1.0]],
        };
        assert!(geometry.to_lines().is_err());
    }

    #[test]
    fn test_lines_from_multipolygon() {
        let square = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ];
        let geometry = Geometry::MultiPolygon {
            coordinates: vec![vec![square.clone()], vec![square]],
        };
        assert_eq!(geometry.to_lines().unwrap().len(), 2);
        assert!(geometry.to_multi_polygon().unwrap().is_some());
    }

    #[test]
    fn test_lines_are_not_polygons() {
        let geometry = Geometry::LineString {
            coordinates: vec![vec![0.0, 0.0], vec![1.0, 1.0]],
        };
        assert_eq!(geometry.to_multi_polygon().unwrap(), None);
    }
}
