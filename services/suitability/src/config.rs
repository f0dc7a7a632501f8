//! Configuration for suitability runs.
//!
//! Loads a YAML file describing:
//! - Input rasters and vector layers (`inputs`)
//! - Grid alignment settings (`align`)
//! - Species presets (`species`)
//! - Map styling (`maps`) and output files (`output`)
//!
//! Supports environment variable substitution using `${VAR}` and
//! `${VAR:-default}` syntax. Relative paths resolve against the directory of
//! the configuration file.

use crate::pipeline::{PipelineConfig, SpeciesParams};
use geojson_parser::RegionFields;
use grid_common::{SuitabilityError, SuitabilityResult};
use grid_processor::AlignConfig;
use renderer::ColorRamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// Configuration file
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuitabilityConfig {
    pub inputs: InputsConfig,
    #[serde(default)]
    pub align: AlignConfig,
    /// Presets selectable with `--species`, keyed by preset id.
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesParams>,
    #[serde(default)]
    pub maps: MapConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    /// One annual sea surface temperature GeoTIFF per year.
    pub sst: Vec<PathBuf>,
    pub bathymetry: PathBuf,
    /// EEZ polygons.
    pub regions: PathBuf,
    /// Basemap lines, display only.
    #[serde(default)]
    pub coastline: Option<PathBuf>,
    #[serde(default)]
    pub region_fields: RegionFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Padding around the regions in map units.
    pub margin: f64,
    pub area_palette: String,
    pub percent_palette: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 800,
            margin: 1.0,
            area_palette: "blues".to_string(),
            percent_palette: "ylorrd".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Write `<species>_report.json` next to the maps.
    pub json_report: bool,
    /// Write the suitability mask as `<species>_suitability_mask.tif`.
    pub mask_geotiff: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            json_report: true,
            mask_geotiff: false,
        }
    }
}

impl SuitabilityConfig {
    /// Load, expand, resolve and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> SuitabilityResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| SuitabilityError::input_load(path.display().to_string(), e.to_string()))?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_yaml_str(&content, base_dir)?;

        debug!(
            path = %path.display(),
            sst_years = config.inputs.sst.len(),
            presets = ?config.species.keys().collect::<Vec<_>>(),
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Parse configuration text, resolving relative paths against `base_dir`.
    pub fn from_yaml_str(content: &str, base_dir: &Path) -> SuitabilityResult<Self> {
        let expanded = expand_env_vars(content)?;
        let mut config: SuitabilityConfig = serde_yaml::from_str(&expanded)
            .map_err(|e| SuitabilityError::configuration(format!("invalid YAML: {}", e)))?;

        config.resolve_paths(base_dir);
        config.align = config.align.with_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base_dir.join(&*p);
            }
        };

        self.inputs.sst.iter_mut().for_each(resolve);
        resolve(&mut self.inputs.bathymetry);
        resolve(&mut self.inputs.regions);
        if let Some(coastline) = self.inputs.coastline.as_mut() {
            resolve(coastline);
        }
        resolve(&mut self.output.dir);
    }

    pub fn validate(&self) -> SuitabilityResult<()> {
        if self.inputs.sst.is_empty() {
            return Err(SuitabilityError::configuration(
                "inputs.sst must list at least one temperature raster",
            ));
        }

        for (id, species) in &self.species {
            species.validate().map_err(|e| {
                SuitabilityError::configuration(format!("species preset '{}': {}", id, e))
            })?;
        }

        if self.maps.width < 16 {
            return Err(SuitabilityError::configuration(format!(
                "maps.width must be at least 16, got {}",
                self.maps.width
            )));
        }
        if !self.maps.margin.is_finite() || self.maps.margin < 0.0 {
            return Err(SuitabilityError::configuration(format!(
                "maps.margin must be a non-negative number, got {}",
                self.maps.margin
            )));
        }
        for palette in [&self.maps.area_palette, &self.maps.percent_palette] {
            ColorRamp::named(palette)
                .map_err(|e| SuitabilityError::configuration(e.to_string()))?;
        }

        Ok(())
    }

    /// Look up a species preset by id (case-insensitive).
    pub fn preset(&self, id: &str) -> SuitabilityResult<&SpeciesParams> {
        self.species
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(id))
            .map(|(_, species)| species)
            .ok_or_else(|| {
                SuitabilityError::configuration(format!(
                    "unknown species preset '{}', expected one of: {}",
                    id,
                    self.species.keys().cloned().collect::<Vec<_>>().join(", ")
                ))
            })
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            align: self.align,
            maps: self.maps.clone(),
        }
    }
}

// ============================================================================
// Environment substitution
// ============================================================================

/// Replace `${VAR}` and `${VAR:-default}` with environment values.
fn expand_env_vars(content: &str) -> SuitabilityResult<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => {
                        return Err(SuitabilityError::configuration(format!(
                            "unclosed variable substitution: ${{{}",
                            var_expr
                        )))
                    }
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> SuitabilityResult<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).map_err(|_| {
            SuitabilityError::configuration(format!("environment variable {} not set", expr))
        })
    }
}
