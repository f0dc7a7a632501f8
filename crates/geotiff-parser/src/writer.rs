//! GeoTIFF encoding of single-band `f32` grids.

use crate::geokeys::GeoKeys;
use crate::{GeoTiffError, GeoTiffResult};
use grid_common::Grid;
use std::io::{Seek, Write};
use std::path::Path;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tracing::debug;

/// Write a grid as a single-band `f32` GeoTIFF. `NaN` cells are declared
/// as no-data.
pub fn write_geotiff<P: AsRef<Path>>(path: P, grid: &Grid) -> GeoTiffResult<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    encode(&mut writer, grid)?;
    writer.flush()?;

    debug!(
        path = %path.display(),
        width = grid.spec.width,
        height = grid.spec.height,
        "Wrote GeoTIFF"
    );

    Ok(())
}

/// Encode a grid to any seekable writer.
pub fn encode<W: Write + Seek>(writer: W, grid: &Grid) -> GeoTiffResult<()> {
    let spec = &grid.spec;
    if spec.is_empty() {
        return Err(GeoTiffError::UnsupportedLayout(
            "cannot write an empty grid".into(),
        ));
    }

    let width = u32::try_from(spec.width)
        .map_err(|_| GeoTiffError::UnsupportedLayout("grid too wide".into()))?;
    let height = u32::try_from(spec.height)
        .map_err(|_| GeoTiffError::UnsupportedLayout("grid too tall".into()))?;

    let mut encoder = TiffEncoder::new(writer)?;
    let mut image = encoder.new_image::<colortype::Gray32Float>(width, height)?;

    let t = &spec.transform;
    if t.row_rotation == 0.0 && t.col_rotation == 0.0 {
        let tiepoint = [0.0, 0.0, 0.0, t.origin_x, t.origin_y, 0.0];
        let scale = [t.pixel_width, -t.pixel_height, 0.0];
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &scale[..])?;
    } else {
        #[rustfmt::skip]
        let matrix = [
            t.pixel_width, t.row_rotation, 0.0, t.origin_x,
            t.col_rotation, t.pixel_height, 0.0, t.origin_y,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        image
            .encoder()
            .write_tag(Tag::ModelTransformationTag, &matrix[..])?;
    }

    let keys = GeoKeys::for_crs(spec.crs).encode();
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &keys[..])?;
    image
        .encoder()
        .write_tag(Tag::GdalNodata, "nan")?;

    image.write_data(&grid.data)?;
    Ok(())
}
