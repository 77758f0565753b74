pub mod constants;
pub mod coordinates;
pub mod geohash;
pub mod progress;

pub use constants::*;
pub use coordinates::validate_coordinates;
pub use progress::ProgressReporter;
