//! GeoTIFF decoding into [`Grid`]s.

use crate::geokeys::GeoKeys;
use crate::{GeoTiffError, GeoTiffResult};
use grid_common::{CrsCode, GeoTransform, Grid, GridSpec};
use std::io::{Read, Seek};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::{debug, warn};

/// Decoder buffer ceiling; regional SST and bathymetry rasters stay well
/// below this.
const MAX_BUFFER_BYTES: usize = 1024 * 1024 * 1024;

/// Read the first image of a GeoTIFF as a single-band `f32` grid.
///
/// Cells equal to the `GDAL_NODATA` value become `NaN`.
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> GeoTiffResult<Grid> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let grid = decode(std::io::BufReader::new(file))?;

    debug!(
        path = %path.display(),
        width = grid.spec.width,
        height = grid.spec.height,
        crs = %grid.spec.crs,
        "Read GeoTIFF"
    );

    Ok(grid)
}

/// Decode a GeoTIFF from any seekable reader.
pub fn decode<R: Read + Seek>(reader: R) -> GeoTiffResult<Grid> {
    let mut limits = Limits::default();
    limits.decoding_buffer_size = MAX_BUFFER_BYTES;
    limits.intermediate_buffer_size = MAX_BUFFER_BYTES;
    limits.ifd_value_size = MAX_BUFFER_BYTES;

    let mut decoder = Decoder::new(reader)?.with_limits(limits);

    match decoder.colortype()? {
        ColorType::Gray(_) => {}
        other => {
            return Err(GeoTiffError::UnsupportedLayout(format!(
                "expected a single band, found {:?}",
                other
            )))
        }
    }

    let (width, height) = decoder.dimensions()?;
    let keys = read_geokeys(&mut decoder);
    let transform = read_transform(&mut decoder, &keys)?;

    let crs = keys.crs().unwrap_or_else(|| {
        warn!("GeoTIFF has no registered CRS code, assuming EPSG:4326");
        CrsCode::Epsg4326
    });

    let nodata = read_nodata_value(&mut decoder);
    let mut data = decode_samples(&mut decoder)?;

    let expected = width as usize * height as usize;
    if data.len() != expected {
        return Err(GeoTiffError::UnsupportedLayout(format!(
            "expected {} samples, decoded {}",
            expected,
            data.len()
        )));
    }

    if let Some(nodata) = nodata {
        mask_nodata(&mut data, nodata);
    }

    let spec = GridSpec::new(width as usize, height as usize, transform, crs);
    Ok(Grid { spec, data })
}

fn read_geokeys<R: Read + Seek>(decoder: &mut Decoder<R>) -> GeoKeys {
    decoder
        .get_tag_u32_vec(Tag::GeoKeyDirectoryTag)
        .map(|directory| GeoKeys::parse(&directory))
        .unwrap_or_default()
}

/// Read the affine transform from ModelTransformation, or from
/// ModelTiepoint + ModelPixelScale.
fn read_transform<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    keys: &GeoKeys,
) -> GeoTiffResult<GeoTransform> {
    let mut transform =
        if let Ok(matrix) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
            if matrix.len() < 16 {
                return Err(GeoTiffError::InvalidGeoTiff(format!(
                    "ModelTransformation has {} values, expected 16",
                    matrix.len()
                )));
            }
            GeoTransform {
                origin_x: matrix[3],
                origin_y: matrix[7],
                pixel_width: matrix[0],
                pixel_height: matrix[5],
                row_rotation: matrix[1],
                col_rotation: matrix[4],
            }
        } else {
            let tiepoint = decoder
                .get_tag_f64_vec(Tag::ModelTiepointTag)
                .map_err(|_| GeoTiffError::InvalidGeoTiff("missing ModelTiepoint tag".into()))?;
            let scale = decoder
                .get_tag_f64_vec(Tag::ModelPixelScaleTag)
                .map_err(|_| GeoTiffError::InvalidGeoTiff("missing ModelPixelScale tag".into()))?;

            if tiepoint.len() < 6 || scale.len() < 2 {
                return Err(GeoTiffError::InvalidGeoTiff(
                    "ModelTiepoint/ModelPixelScale too short".into(),
                ));
            }

            // Tiepoint format: [i, j, k, x, y, z] maps raster (i, j) to model (x, y)
            let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
            let (scale_x, scale_y) = (scale[0], scale[1]);

            GeoTransform {
                origin_x: x - i * scale_x,
                origin_y: y + j * scale_y,
                pixel_width: scale_x,
                pixel_height: -scale_y,
                row_rotation: 0.0,
                col_rotation: 0.0,
            }
        };

    if transform.pixel_width == 0.0 || transform.pixel_height == 0.0 {
        return Err(GeoTiffError::InvalidGeoTiff("zero pixel size".into()));
    }

    // PixelIsPoint: model coordinates refer to cell centres; move to the corner
    if keys.is_pixel_is_point() {
        transform.origin_x -= transform.pixel_width / 2.0;
        transform.origin_y -= transform.pixel_height / 2.0;
    }

    Ok(transform)
}

/// GDAL_NODATA is stored as an ASCII string.
fn read_nodata_value<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f32> {
    let text = decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()?;
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    text.parse::<f64>().ok().map(|v| v as f32)
}

fn mask_nodata(data: &mut [f32], nodata: f32) {
    if nodata.is_nan() {
        return;
    }
    let tolerance = f32::EPSILON * nodata.abs().max(1.0);
    for value in data.iter_mut() {
        if (*value - nodata).abs() <= tolerance {
            *value = f32::NAN;
        }
    }
}

fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> GeoTiffResult<Vec<f32>> {
    let result = decoder.read_image()?;

    let data = match result {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
    };

    Ok(data)
}
