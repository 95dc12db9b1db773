//! Component Storage
//!
//! Holds the device's component records and persists them to the device
//! document in the data directory.

mod component;
pub mod document;
mod sensors;

pub use component::*;
pub use sensors::*;
