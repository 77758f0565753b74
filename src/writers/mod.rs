pub mod influx_writer;
pub mod line_protocol;
pub mod sink;

pub use influx_writer::{InfluxConnection, InfluxWriter};
pub use sink::{write_points, PointSink, SinkAdapter, SinkConfig};
