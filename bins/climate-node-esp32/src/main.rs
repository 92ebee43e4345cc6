//! Climate node firmware for ESP32.
//!
//! This binary requires the ESP32 Rust toolchain.
//! It will not compile with the standard Rust toolchain.
//!
//! Boot sequence:
//! 1. Validate the compile-time configuration
//! 2. Join WiFi (bounded retries, fatal on exhaustion)
//! 3. Start the HTTP server with `GET /` and `GET /data`

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use climate_core::{Associator, SensorReader, ThreadDelay};
use climate_esp32::{
    config::{node_config, DHT_GPIO, DHT_MODEL},
    dht::DhtDriver,
    http::start_http_server,
    wifi::EspWifiLink,
};
use climate_protocol::ClimateService;
use esp_idf_svc::{
    eventloop::EspSystemEventLoop, hal::prelude::Peripherals, log::EspLogger,
    nvs::EspDefaultNvsPartition,
};
use log::{error, info};

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    let config = node_config();
    config.validate()?;
    info!("{} starting", config.node_name);

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let link = EspWifiLink::new(peripherals.modem, sysloop, Some(nvs))?;
    let mut associator = Associator::new(link, ThreadDelay, config.association.clone());
    let ip = match associator.connect(&config.network) {
        Ok(ip) => ip,
        Err(err) => {
            error!("WiFi bring-up failed, not serving: {}", err);
            return Err(err.into());
        }
    };
    // Keep the link alive for the lifetime of the program
    let _wifi = associator.into_link();

    info!("DHT sensor {:?} on GPIO{}", DHT_MODEL, DHT_GPIO);
    let sensor = DhtDriver::new(peripherals.pins.gpio4.into(), DHT_MODEL)?;
    let service = ClimateService::new(&config.node_name, SensorReader::new(sensor));

    let _server = start_http_server(Arc::new(Mutex::new(service)), config.http_port)?;
    info!("Serving on http://{}:{}/data", ip, config.http_port);

    loop {
        thread::sleep(Duration::from_secs(1));
    }
}
