//! A circular gauge ("speed meter") widget.
//!
//! [`SpeedMeter`] keeps a [`GaugeConfig`], the geometry derived from it and
//! one retained [`Scene`] per draw layer. Property writes rebuild only the
//! layers that depend on the property; value writes just turn the needle.
//! Pointer positions map back to values through [`SpeedMeter::get_value`].
//!
//! ```no_run
//! use speedmeter::{GaugeConfig, SpeedMeter};
//!
//! let config = GaugeConfig::builder().min(0.0).max(220.0).tick(20.0).build();
//! let mut meter = SpeedMeter::new(config)?;
//! meter.set_value(88.0);
//! let primitives = meter.frame().count();
//! # Ok::<(), speedmeter::GaugeError>(())
//! ```

// ============================================================================
// MODULES
// ============================================================================

pub mod color;
pub mod config;
pub mod error;
pub mod gauge;
pub mod geometry;
pub mod layers;
pub mod raster;
pub mod resources;
pub mod router;
pub mod scene;
pub mod text;
pub mod viewer;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use color::Color;
pub use config::{validate_sectors, GaugeConfig, Paint, Sector, SectorToken};
pub use error::GaugeError;
pub use gauge::{parse_sectors, GaugeCommand, SpeedMeter};
pub use geometry::{Geometry, Point, Rect, Size};
pub use raster::{Canvas, Rasterizer};
pub use resources::{ImageDirectory, ImageSource, MemoryImages, ResourceResolver};
pub use router::{Layer, Property, RedrawStats};
pub use scene::{DrawCommand, Scene};
pub use text::{ApproxMetrics, FontMetrics, IntegerTicks, TextMeasure, TickFormatter};
pub use viewer::ViewerConfig;
