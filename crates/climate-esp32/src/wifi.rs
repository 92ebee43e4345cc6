//! WiFi station link for ESP32.
//!
//! `EspWifiLink` implements `WirelessLink`, so the bounded association loop
//! in `climate_core::Associator` drives the ESP-IDF WiFi driver.

use std::net::Ipv4Addr;

use anyhow::{anyhow, Result};
use climate_core::{LinkStatus, NetworkCredentials, WirelessLink};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{modem::Modem, peripheral},
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::{debug, info};

/// ESP32 WiFi in station mode.
///
/// Must be kept alive for the connection to remain active.
pub struct EspWifiLink {
    wifi: BlockingWifi<EspWifi<'static>>,
}

impl EspWifiLink {
    /// Take the modem and prepare the driver. Nothing is started yet.
    pub fn new(
        modem: impl peripheral::Peripheral<P = Modem> + 'static,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        Ok(Self { wifi })
    }

    /// Scan for the network and return its channel, if visible.
    fn find_channel(&mut self, ssid: &str) -> Result<Option<u8>> {
        info!("Scanning for WiFi networks...");
        let channel = self
            .wifi
            .scan()?
            .into_iter()
            .find(|ap| ap.ssid == ssid)
            .map(|ap| {
                info!("Found '{}' on channel {}", ssid, ap.channel);
                ap.channel
            });

        if channel.is_none() {
            info!("Network '{}' not found in scan, will try anyway", ssid);
        }
        Ok(channel)
    }
}

impl WirelessLink for EspWifiLink {
    type Error = anyhow::Error;

    fn begin(&mut self, credentials: &NetworkCredentials) -> Result<()> {
        let auth_method = if credentials.is_open() {
            info!("WiFi password is empty, using open network");
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        if !self.wifi.is_started()? {
            // scanning needs a started driver with some client configuration
            self.wifi
                .set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
            self.wifi.start()?;
        }
        let channel = self.find_channel(&credentials.ssid)?;

        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: credentials
                    .ssid
                    .as_str()
                    .try_into()
                    .map_err(|_| anyhow!("SSID too long (max 32 chars)"))?,
                password: credentials
                    .password
                    .as_str()
                    .try_into()
                    .map_err(|_| anyhow!("Password too long (max 64 chars)"))?,
                channel,
                auth_method,
                ..Default::default()
            }))?;

        // returns once the request is queued; `status` reports progress
        info!("Connecting to '{}'...", credentials.ssid);
        self.wifi.wifi_mut().connect()?;
        Ok(())
    }

    /// `Connecting` while associated but still waiting for a DHCP lease.
    fn status(&mut self) -> LinkStatus {
        match (self.wifi.is_connected(), self.wifi.is_up()) {
            (Ok(true), Ok(true)) => LinkStatus::Connected,
            (Ok(true), _) => LinkStatus::Connecting,
            _ => LinkStatus::Disconnected,
        }
    }

    fn local_ip(&mut self) -> Result<Ipv4Addr> {
        let ip_info = self.wifi.wifi().sta_netif().get_ip_info()?;
        debug!("Gateway: {}", ip_info.subnet.gateway);
        debug!("Netmask: {}", ip_info.subnet.mask);
        Ok(ip_info.ip)
    }

    fn reset(&mut self) -> Result<()> {
        if self.wifi.is_connected()? {
            self.wifi.disconnect()?;
        }
        Ok(())
    }
}
