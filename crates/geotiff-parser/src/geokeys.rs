//! GeoKey directory (tag 34735) encoding and decoding.
//!
//! The directory is a flat list of SHORTs: a 4-value header
//! `[version, revision, minor, key_count]` followed by `key_count` entries of
//! `[key_id, tag_location, count, value]`. Only inline SHORT values
//! (`tag_location == 0`) are needed for the keys read here.

use grid_common::CrsCode;

/// GTModelTypeGeoKey
pub const MODEL_TYPE_KEY: u16 = 1024;
/// GTRasterTypeGeoKey
pub const RASTER_TYPE_KEY: u16 = 1025;
/// GeographicTypeGeoKey
pub const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
/// ProjectedCSTypeGeoKey
pub const PROJECTED_TYPE_KEY: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
const RASTER_PIXEL_IS_POINT: u16 = 2;

/// "user-defined" marker in GeoKey values
const USER_DEFINED: u16 = 32767;

/// The subset of GeoKeys the pipeline cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeoKeys {
    pub model_type: Option<u16>,
    pub raster_type: Option<u16>,
    pub geographic_type: Option<u16>,
    pub projected_type: Option<u16>,
}

impl GeoKeys {
    /// Parse a GeoKey directory. Unknown keys and keys stored in other tags
    /// are skipped.
    pub fn parse(directory: &[u32]) -> Self {
        let mut keys = GeoKeys::default();
        if directory.len() < 4 {
            return keys;
        }

        let count = directory[3] as usize;
        for entry in directory[4..].chunks_exact(4).take(count) {
            let (key_id, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 {
                continue;
            }
            let value = value as u16;
            match key_id as u16 {
                MODEL_TYPE_KEY => keys.model_type = Some(value),
                RASTER_TYPE_KEY => keys.raster_type = Some(value),
                GEOGRAPHIC_TYPE_KEY => keys.geographic_type = Some(value),
                PROJECTED_TYPE_KEY => keys.projected_type = Some(value),
                _ => {}
            }
        }

        keys
    }

    /// CRS described by the keys, if it is a registered EPSG code.
    pub fn crs(&self) -> Option<CrsCode> {
        let registered = |code: Option<u16>| code.filter(|&c| c != 0 && c != USER_DEFINED);

        match self.model_type {
            Some(MODEL_TYPE_GEOGRAPHIC) => {
                registered(self.geographic_type).map(|code| CrsCode::geographic(code as u32))
            }
            Some(MODEL_TYPE_PROJECTED) => {
                registered(self.projected_type).map(|code| CrsCode::from_epsg(code as u32))
            }
            _ => registered(self.projected_type)
                .map(|code| CrsCode::from_epsg(code as u32))
                .or_else(|| {
                    registered(self.geographic_type).map(|code| CrsCode::geographic(code as u32))
                }),
        }
    }

    /// True when cell coordinates refer to cell centres rather than corners.
    pub fn is_pixel_is_point(&self) -> bool {
        self.raster_type == Some(RASTER_PIXEL_IS_POINT)
    }

    /// Keys describing `crs` with PixelIsArea semantics. Codes that do not
    /// fit a SHORT are left out.
    pub fn for_crs(crs: CrsCode) -> Self {
        let code = u16::try_from(crs.epsg()).ok();
        if crs.is_geographic() {
            GeoKeys {
                model_type: Some(MODEL_TYPE_GEOGRAPHIC),
                raster_type: Some(RASTER_PIXEL_IS_AREA),
                geographic_type: code,
                projected_type: None,
            }
        } else {
            GeoKeys {
                model_type: Some(MODEL_TYPE_PROJECTED),
                raster_type: Some(RASTER_PIXEL_IS_AREA),
                geographic_type: None,
                projected_type: code,
            }
        }
    }

    /// Encode as a directory, keys sorted by id.
    pub fn encode(&self) -> Vec<u16> {
        let entries: Vec<(u16, u16)> = [
            (MODEL_TYPE_KEY, self.model_type),
            (RASTER_TYPE_KEY, self.raster_type),
            (GEOGRAPHIC_TYPE_KEY, self.geographic_type),
            (PROJECTED_TYPE_KEY, self.projected_type),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

        let mut directory = vec![1, 1, 0, entries.len() as u16];
        for (key, value) in entries {
            directory.extend_from_slice(&[key, 0, 1, value]);
        }
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widen(directory: &[u16]) -> Vec<u32> {
        directory.iter().map(|&v| v as u32).collect()
    }

    #[test]
    fn test_geographic_round_trip() {
        let keys = GeoKeys::for_crs(CrsCode::Epsg4326);
        let parsed = GeoKeys::parse(&widen(&keys.encode()));

        assert_eq!(parsed, keys);
        assert_eq!(parsed.crs(), Some(CrsCode::Epsg4326));
        assert!(!parsed.is_pixel_is_point());
    }

    #[test]
    fn test_projected_round_trip() {
        let keys = GeoKeys::for_crs(CrsCode::Epsg5070);
        let parsed = GeoKeys::parse(&widen(&keys.encode()));
        assert_eq!(parsed.crs(), Some(CrsCode::Epsg5070));
    }

    #[test]
    fn test_geographic_model_type_marks_crs_geographic() {
        // GTModelType geographic, GeographicType 4258 (ETRS89)
        let directory = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4258];
        let crs = GeoKeys::parse(&directory).crs().unwrap();
        assert_eq!(crs, CrsCode::OtherGeographic(4258));
        assert!(crs.is_geographic());

        let keys = GeoKeys::for_crs(crs);
        assert_eq!(keys.geographic_type, Some(4258));
        assert_eq!(GeoKeys::parse(&widen(&keys.encode())).crs(), Some(crs));
    }

    #[test]
    fn test_user_defined_is_not_a_crs() {
        let directory = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 32767];
        assert_eq!(GeoKeys::parse(&directory).crs(), None);
    }

    #[test]
    fn test_pixel_is_point() {
        let directory = [1, 1, 0, 1, 1025, 0, 1, 2];
        assert!(GeoKeys::parse(&directory).is_pixel_is_point());
    }

    #[test]
    fn test_truncated_directory() {
        assert_eq!(GeoKeys::parse(&[1, 1]), GeoKeys::default());
        // key count larger than the entries present
        let directory = [1, 1, 0, 3, 1024, 0, 1, 2];
        assert_eq!(GeoKeys::parse(&directory).model_type, Some(2));
    }
}
