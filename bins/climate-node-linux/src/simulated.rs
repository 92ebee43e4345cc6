//! Simulated DHT sensor for hosts without hardware.

use std::time::Instant;

use climate_core::ClimateSensor;

/// Produces slowly drifting values around indoor conditions.
///
/// Every `fail_every`-th transaction returns NaN to exercise the sentinel
/// path (0 disables failures).
pub struct SimulatedSensor {
    started: Instant,
    fail_every: u32,
    transactions: u32,
    failing: bool,
}

impl SimulatedSensor {
    pub fn new(fail_every: u32) -> Self {
        Self {
            started: Instant::now(),
            fail_every,
            transactions: 0,
            failing: false,
        }
    }

    fn elapsed_secs(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }
}

impl ClimateSensor for SimulatedSensor {
    // humidity is read first, so it starts a new transaction
    fn read_humidity(&mut self) -> f32 {
        self.transactions = self.transactions.wrapping_add(1);
        self.failing = self.fail_every > 0 && self.transactions % self.fail_every == 0;
        if self.failing {
            return f32::NAN;
        }
        let t = self.elapsed_secs();
        round_tenth(55.0 + 8.0 * (t / 300.0).cos())
    }

    fn read_temperature(&mut self) -> f32 {
        if self.failing {
            return f32::NAN;
        }
        let t = self.elapsed_secs();
        round_tenth(22.0 + 2.5 * (t / 600.0).sin())
    }
}

/// DHT22 resolution is 0.1.
fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
