//! The p1 module contains the components responsible for receiving DSMR P1
//! telegrams: framing the line stream and the serial byte source.

pub mod framer;
pub mod serial;
pub mod serial_mock;

pub use framer::*;
pub use serial::*;
