//! View implementations

pub mod glyph;
pub mod map;
pub mod radar;
pub mod scatter;
pub mod utils;

pub use glyph::{GlyphFrame, GlyphRow, GlyphView};
pub use map::{Legend, MapFrame, MapView, Region, RegionFill};
pub use radar::{RadarAxis, RadarFrame, RadarSeries, RadarView};
pub use scatter::{AxisDomain, ScatterFrame, ScatterPoint, ScatterView};
