pub mod error;
pub mod geometry;
pub mod grid;
pub mod vectorset;

pub use error::GridError;
pub use geometry::{Point, UPoint, URect, USize};
pub use grid::Grid;
pub use vectorset::UPointVectorSet;
