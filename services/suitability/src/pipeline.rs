//! The suitability pipeline.
//!
//! [`compute_suitability`] is the single reusable operation: given loaded
//! inputs and one species' temperature and depth tolerances it produces the
//! per-region report, both choropleth maps and the suitability mask.

use crate::config::{InputsConfig, MapConfig, OutputConfig};
use crate::report::SuitabilityReport;
use geo::LineString;
use grid_common::{AreaUnit, Grid, Region, SuitabilityError, SuitabilityResult};
use grid_processor::{
    aggregate, align, cell_area, classify, combine, mask_by_region, rasterize,
    suitable_cell_count, total_suitable_area, AlignConfig, SuitabilityRange,
};
use renderer::{
    encode_png, render_choropleth, ChoroplethLayer, ColorRamp, MapStyle, RenderError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, instrument, warn};

/// Temperature and depth tolerances of one species.
///
/// Depth is in positive metres below sea level; the bathymetry raster stores
/// elevation, so it is compared against [`SpeciesParams::elevation_range`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    pub name: String,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub depth_min_m: f64,
    pub depth_max_m: f64,
}

impl SpeciesParams {
    pub fn new(
        name: impl Into<String>,
        temp_min_c: f64,
        temp_max_c: f64,
        depth_min_m: f64,
        depth_max_m: f64,
    ) -> Self {
        Self {
            name: name.into(),
            temp_min_c,
            temp_max_c,
            depth_min_m,
            depth_max_m,
        }
    }

    /// Oysters: 11-30 °C, 0-70 m deep.
    pub fn oyster() -> Self {
        Self::new("Oyster", 11.0, 30.0, 0.0, 70.0)
    }

    pub fn temperature_range(&self) -> SuitabilityResult<SuitabilityRange> {
        SuitabilityRange::new(self.temp_min_c, self.temp_max_c)
    }

    /// Suitable elevation, `[-depth_max, -depth_min]`.
    pub fn elevation_range(&self) -> SuitabilityResult<SuitabilityRange> {
        if self.depth_min_m < 0.0 {
            return Err(SuitabilityError::configuration(format!(
                "depth_min_m must be zero or a positive depth, got {}",
                self.depth_min_m
            )));
        }
        SuitabilityRange::new(-self.depth_max_m, -self.depth_min_m)
    }

    pub fn validate(&self) -> SuitabilityResult<()> {
        if self.name.trim().is_empty() {
            return Err(SuitabilityError::configuration("species name is empty"));
        }
        self.temperature_range()?;
        self.elevation_range()?;
        Ok(())
    }

    /// File name prefix, e.g. `"Blue Mussel"` -> `"blue_mussel"`.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Lowercase ASCII alphanumerics with runs of anything else collapsed to `_`.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "species".to_string()
    } else {
        slug.to_string()
    }
}

/// Settings of [`compute_suitability`] that do not depend on the species.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub align: AlignConfig,
    pub maps: MapConfig,
}

/// Everything read from disk, loaded once and shared by every species run.
#[derive(Debug, Clone)]
pub struct Inputs {
    /// One grid per year.
    pub temperature: Vec<Grid>,
    /// Elevation in metres, negative below sea level.
    pub depth: Grid,
    pub regions: Vec<Region>,
    pub coastline: Vec<LineString<f64>>,
}

impl Inputs {
    #[instrument(skip_all, fields(sst_years = config.sst.len()))]
    pub fn load(config: &InputsConfig) -> SuitabilityResult<Self> {
        let temperature = config
            .sst
            .iter()
            .map(|path| read_raster(path))
            .collect::<SuitabilityResult<Vec<_>>>()?;

        let depth = read_raster(&config.bathymetry)?;

        let regions = geojson_parser::load_regions(&config.regions, &config.region_fields)
            .map_err(|e| load_error(&config.regions, e))?;
        if regions.is_empty() {
            return Err(SuitabilityError::input_load(
                config.regions.display().to_string(),
                "no region features",
            ));
        }

        let coastline = match &config.coastline {
            Some(path) => geojson_parser::load_outline(path).map_err(|e| load_error(path, e))?,
            None => Vec::new(),
        };

        info!(
            sst_years = temperature.len(),
            regions = regions.len(),
            coastline_lines = coastline.len(),
            "Loaded inputs"
        );

        Ok(Self {
            temperature,
            depth,
            regions,
            coastline,
        })
    }
}

/// Result of one species run.
#[derive(Debug, Clone)]
pub struct SuitabilityOutcome {
    pub report: SuitabilityReport,
    /// Choropleth of suitable km² per region.
    pub area_map_png: Vec<u8>,
    /// Choropleth of percent suitable per region.
    pub percent_map_png: Vec<u8>,
    /// `1.0` where both temperature and depth are suitable, `NaN` elsewhere.
    pub mask: Grid,
}

/// Classify the inputs for one species and aggregate suitable area per region.
#[instrument(skip_all, fields(species = %species.name))]
pub fn compute_suitability(
    inputs: &Inputs,
    species: &SpeciesParams,
    config: &PipelineConfig,
) -> SuitabilityResult<SuitabilityOutcome> {
    species.validate()?;
    let temp_range = species.temperature_range()?;
    let elevation_range = species.elevation_range()?;

    let aligned = info_span!("align")
        .in_scope(|| align(&inputs.temperature, &inputs.depth, &config.align))?;

    let mask = info_span!("classify").in_scope(|| {
        let temp_mask = classify(&aligned.mean_temperature, &temp_range);
        let depth_mask = classify(&aligned.depth, &elevation_range);
        debug!(
            temperature_cells = suitable_cell_count(&temp_mask),
            depth_cells = suitable_cell_count(&depth_mask),
            "Classified grids"
        );
        combine(&[&temp_mask, &depth_mask])
    })?;

    let spec = mask.spec.clone();
    let regions = info_span!("aggregate").in_scope(|| {
        let raster = rasterize(&inputs.regions, &spec)?;
        let areas = cell_area(&spec, AreaUnit::SquareKilometers);

        let in_regions = mask_by_region(&mask, &raster)?;
        let union_total = total_suitable_area(&in_regions, &areas)?;
        let outside = total_suitable_area(&mask, &areas)? - union_total;
        if outside > 0.0 {
            debug!(outside_km2 = outside, "Suitable area outside every region");
        }

        aggregate(&mask, &raster, &areas, &inputs.regions)
    })?;

    let report = SuitabilityReport::new(species, temp_range, elevation_range, regions);
    if report.total_suitable_km2() == 0.0 {
        warn!(species = %species.name, "No suitable area in any region");
    }

    let (area_map_png, percent_map_png) = info_span!("render").in_scope(|| {
        let area = render_map(
            inputs,
            &report.area_values(),
            &config.maps,
            &config.maps.area_palette,
            " km2",
        )?;
        let percent = render_map(
            inputs,
            &report.percent_values(),
            &config.maps,
            &config.maps.percent_palette,
            "%",
        )?;
        Ok::<_, SuitabilityError>((area, percent))
    })?;

    info!(
        species = %species.name,
        suitable_cells = suitable_cell_count(&mask),
        suitable_km2 = report.total_suitable_km2(),
        "Suitability computed"
    );

    Ok(SuitabilityOutcome {
        report,
        area_map_png,
        percent_map_png,
        mask,
    })
}

impl SuitabilityOutcome {
    /// Write maps and optional extras into `output.dir`, returning the paths.
    pub fn write(&self, output: &OutputConfig) -> SuitabilityResult<Vec<PathBuf>> {
        fs::create_dir_all(&output.dir)?;
        let slug = self.report.slug();
        let mut written = Vec::new();

        let mut write_file = |name: String, bytes: &[u8]| -> SuitabilityResult<()> {
            let path = output.dir.join(name);
            fs::write(&path, bytes)?;
            debug!(path = %path.display(), bytes = bytes.len(), "Wrote output");
            written.push(path);
            Ok(())
        };

        write_file(format!("{}_suitable_area.png", slug), &self.area_map_png)?;
        write_file(format!("{}_percent_suitable.png", slug), &self.percent_map_png)?;

        if output.json_report {
            let json = self
                .report
                .to_json()
                .map_err(|e| SuitabilityError::configuration(format!("report JSON: {}", e)))?;
            write_file(format!("{}_report.json", slug), json.as_bytes())?;
        }

        if output.mask_geotiff {
            let mut tiff = Cursor::new(Vec::new());
            geotiff_parser::encode(&mut tiff, &self.mask)
                .map_err(|e| SuitabilityError::Render(format!("mask GeoTIFF: {}", e)))?;
            write_file(format!("{}_suitability_mask.tif", slug), tiff.get_ref())?;
        }

        info!(dir = %output.dir.display(), files = written.len(), "Wrote outputs");
        Ok(written)
    }
}

fn render_map(
    inputs: &Inputs,
    values: &BTreeMap<String, f64>,
    maps: &MapConfig,
    palette: &str,
    unit: &str,
) -> SuitabilityResult<Vec<u8>> {
    let ramp = ColorRamp::named(palette).map_err(render_error)?;
    let mut style = MapStyle::with_ramp(ramp);
    style.width = maps.width;
    style.margin = maps.margin;
    style.legend_unit = unit.to_string();

    let layer = ChoroplethLayer::new(&inputs.regions, values).with_outline(&inputs.coastline);
    let image = render_choropleth(&layer, &style).map_err(render_error)?;
    encode_png(&image).map_err(render_error)
}

fn read_raster(path: &Path) -> SuitabilityResult<Grid> {
    let grid = geotiff_parser::read_geotiff(path).map_err(|e| load_error(path, e))?;
    debug!(
        path = %path.display(),
        width = grid.spec.width,
        height = grid.spec.height,
        crs = %grid.spec.crs,
        "Read raster"
    );
    Ok(grid)
}

fn load_error(path: &Path, err: impl std::fmt::Display) -> SuitabilityError {
    SuitabilityError::input_load(path.display().to_string(), err.to_string())
}

fn render_error(err: RenderError) -> SuitabilityError {
    match err {
        RenderError::Join(msg) => SuitabilityError::Join(msg),
        other => SuitabilityError::Render(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oyster_elevation_range() {
        let range = SpeciesParams::oyster().elevation_range().unwrap();
        assert_eq!(range.low, -70.0);
        assert_eq!(range.high, 0.0);
        assert!(range.contains(-70.0));
        assert!(range.contains(0.0));
        assert!(!range.contains(1.0));
    }

    #[test]
    fn test_invalid_species() {
        assert!(SpeciesParams::new("Warm", 30.0, 11.0, 0.0, 70.0).validate().is_err());
        assert!(SpeciesParams::new("Shallow", 11.0, 30.0, 70.0, 0.0).validate().is_err());
        assert!(SpeciesParams::new("Above", 11.0, 30.0, -5.0, 10.0).validate().is_err());
        assert!(SpeciesParams::new(" ", 11.0, 30.0, 0.0, 10.0).validate().is_err());
        assert!(SpeciesParams::new("Flat", 12.0, 12.0, 10.0, 10.0).validate().is_ok());
    }

    #[test]
    fn test_slug() {
        assert_eq!(SpeciesParams::oyster().slug(), "oyster");
        assert_eq!(
            SpeciesParams::new("Blue  Mussel (M. edulis)", 0.0, 1.0, 0.0, 1.0).slug(),
            "blue_mussel_m_edulis"
        );
        assert_eq!(SpeciesParams::new("??", 0.0, 1.0, 0.0, 1.0).slug(), "species");
    }

    #[test]
    fn test_render_join_maps_to_join() {
        let err = render_error(RenderError::Join("value for 'X' has no region".into()));
        assert!(matches!(err, SuitabilityError::Join(_)));
        let err = render_error(RenderError::Encode("boom".into()));
        assert!(matches!(err, SuitabilityError::Render(_)));
    }
}
