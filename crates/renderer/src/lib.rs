//! Map rendering for suitability results.
//!
//! - [`choropleth`]: region polygons filled by value, with borders, a
//!   basemap outline and a labelled legend ramp
//! - [`labels`]: legend value labels drawn with an embedded font
//! - [`style`]: colours, named palettes and map styling
//! - [`png`]: indexed/RGBA PNG encoding

pub mod choropleth;
pub mod error;
pub mod labels;
pub mod png;
pub mod style;

pub use choropleth::{render_choropleth, ChoroplethLayer, MapFrame};
pub use error::{RenderError, RenderResult};
pub use png::{create_png, create_png_auto, encode_png};
pub use style::{Color, ColorRamp, ColorStop, MapStyle, PALETTE_NAMES};
