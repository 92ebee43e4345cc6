//! Compile-time configuration for the firmware.
//!
//! Credentials are baked in at build time:
//!
//! ```text
//! WIFI_SSID=greenhouse WIFI_PASSWORD=secret cargo build --release
//! ```
//!
//! A missing `WIFI_SSID` builds fine but fails `NodeConfig::validate` at boot.

use climate_core::{NetworkCredentials, NodeConfig, RetryPolicy};

use crate::dht::DhtModel;

const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};

const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

const NODE_NAME: &str = match option_env!("CLIMATE_NODE_NAME") {
    Some(name) => name,
    None => "climate-node-esp32",
};

/// GPIO the DHT data line is wired to.
pub const DHT_GPIO: u8 = 4;

/// Sensor on the data line.
pub const DHT_MODEL: DhtModel = DhtModel::Dht22;

/// HTTP server port.
pub const HTTP_PORT: u16 = 80;

/// Build the node configuration from the compile-time values.
pub fn node_config() -> NodeConfig {
    NodeConfig {
        node_name: NODE_NAME.to_string(),
        network: NetworkCredentials::new(WIFI_SSID, WIFI_PASSWORD),
        http_port: HTTP_PORT,
        association: RetryPolicy::default(),
    }
}
