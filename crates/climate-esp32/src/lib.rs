//! ESP32-specific components for the climate node.
//!
//! This crate provides the hardware side of the node:
//! - WiFi link driven by the shared association state machine
//! - DHT11/DHT22 driver exposing the `ClimateSensor` capability
//! - HTTP handler registration on `EspHttpServer`
//! - Compile-time configuration
//!
//! # Example
//!
//! ```ignore
//! use climate_core::{Associator, ThreadDelay};
//! use climate_esp32::{config::node_config, wifi::EspWifiLink};
//!
//! let config = node_config();
//! let link = EspWifiLink::new(peripherals.modem, sysloop, Some(nvs))?;
//! let mut associator = Associator::new(link, ThreadDelay, config.association.clone());
//! let ip = associator.connect(&config.network)?;
//! ```

pub mod config;
pub mod dht;
pub mod http;
pub mod wifi;
