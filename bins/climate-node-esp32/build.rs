//! Build script for the climate node firmware.
//!
//! Exports the ESP-IDF environment for esp-idf-sys and re-runs the build when
//! the baked-in WiFi credentials change.

fn main() {
    embuild::espidf::sysenv::output();

    for var in ["WIFI_SSID", "WIFI_PASSWORD", "CLIMATE_NODE_NAME"] {
        println!("cargo:rerun-if-env-changed={var}");
    }
}
