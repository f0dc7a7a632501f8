//! Marine aquaculture suitability.
//!
//! Combines mean sea surface temperature and bathymetry into a suitability
//! mask for one species, sums suitable area per Exclusive Economic Zone and
//! renders the results as a text/JSON report and two choropleth maps.
//!
//! ```ignore
//! let config = SuitabilityConfig::load("config/suitability.yaml")?;
//! let inputs = Inputs::load(&config.inputs)?;
//! let outcome = compute_suitability(&inputs, config.preset("oyster")?, &config.pipeline())?;
//! outcome.write(&config.output)?;
//! print!("{}", outcome.report);
//! ```

pub mod config;
pub mod pipeline;
pub mod report;

pub use config::{InputsConfig, MapConfig, OutputConfig, SuitabilityConfig};
pub use pipeline::{
    compute_suitability, Inputs, PipelineConfig, SpeciesParams, SuitabilityOutcome,
};
pub use report::SuitabilityReport;
