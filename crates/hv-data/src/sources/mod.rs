//! Dataset readers

pub mod boundary_source;
pub mod coordinates;
pub mod happiness_csv;

pub use boundary_source::GeoJsonBoundarySource;
pub use coordinates::CoordinateTable;
pub use happiness_csv::HappinessCsvSource;
