pub mod grid;
pub mod hash;
pub mod params;

pub use grid::*;
pub use hash::*;
pub use params::*;
