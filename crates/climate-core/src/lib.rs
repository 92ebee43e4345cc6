//! # climate-core
//!
//! Core model of the climate node.
//!
//! This crate provides:
//! - The `Reading` value produced for every data request
//! - Sensor capability traits and the Sensor Reader
//! - Wireless bring-up as a bounded retry state machine
//! - Node configuration
//!
//! This crate is intentionally runtime-agnostic and contains no async code,
//! making it usable on both Linux (tokio) and ESP32 (esp-idf) targets.

pub mod config;
pub mod network;
pub mod reading;
pub mod sensor;

pub use config::{ConfigError, NodeConfig};
pub use network::{
    Associator, Delay, LinkStatus, NetworkCredentials, NetworkError, NodeState, RetryPolicy,
    ThreadDelay, WirelessLink,
};
pub use reading::{Reading, SensorError};
pub use sensor::{ClimateSensor, ReadingSource, SensorReader};
