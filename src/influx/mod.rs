//! # InfluxDB Output
//!
//! Line protocol encoding and the HTTP sink that ships it.

pub mod client;
pub mod line_protocol;

pub use client::{InfluxClient, InfluxConfig, MeasurementSink};
pub use line_protocol::{encode, encode_batch, EncodedLine};
