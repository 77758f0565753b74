pub mod device;
pub mod measurement;
pub mod station;

pub use device::{DeviceBlock, Reading, TimeSeriesBlock};
pub use measurement::{FieldAccumulator, FieldValue, MeasurementPoint};
pub use station::{Location, Place, StationRecord};
