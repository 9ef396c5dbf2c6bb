pub mod csv_source;
pub mod grid;

pub use csv_source::load_sheet;
pub use grid::{ColumnRef, Sheet};
