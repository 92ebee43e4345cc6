//! DHT11/DHT22 driver.
//!
//! One bus transaction yields both humidity and temperature. The result is
//! kept for the sensor's minimum sampling interval, so reading humidity and
//! then temperature for a single request costs one transaction.

use std::time::{Duration, Instant};

use anyhow::Result;
use climate_core::ClimateSensor;
use dht_sensor::{dht11, dht22};
use esp_idf_hal::{
    delay::Ets,
    gpio::{AnyIOPin, InputOutput, PinDriver, Pull},
};
use log::{debug, warn};

/// DHT sensors answer at most once per two seconds.
pub const MIN_SAMPLING_INTERVAL: Duration = Duration::from_secs(2);

/// Supported sensor models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtModel {
    Dht11,
    Dht22,
}

/// `(temperature, humidity)` or `None` when the transaction failed.
type Sample = Option<(f32, f32)>;

pub struct DhtDriver {
    pin: PinDriver<'static, AnyIOPin, InputOutput>,
    delay: Ets,
    model: DhtModel,
    last: Option<(Instant, Sample)>,
}

impl DhtDriver {
    /// Configure `pin` as open-drain with pull-up and idle it high.
    pub fn new(pin: AnyIOPin, model: DhtModel) -> Result<Self> {
        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_pull(Pull::Up)?;
        pin.set_high()?;

        Ok(Self {
            pin,
            delay: Ets,
            model,
            last: None,
        })
    }

    fn sample(&mut self) -> Sample {
        if let Some((at, sample)) = self.last {
            if at.elapsed() < MIN_SAMPLING_INTERVAL {
                return sample;
            }
        }

        let sample = self.transact();
        self.last = Some((Instant::now(), sample));
        sample
    }

    fn transact(&mut self) -> Sample {
        if let Err(err) = self.pin.set_high() {
            warn!("failed to set DHT line high before read: {err:?}");
            return None;
        }

        let sample = match self.model {
            DhtModel::Dht11 => match dht11::blocking::read(&mut self.delay, &mut self.pin) {
                Ok(reading) => Some((
                    f32::from(reading.temperature),
                    f32::from(reading.relative_humidity),
                )),
                Err(err) => {
                    warn!("DHT11 read failed: {err:?}");
                    None
                }
            },
            DhtModel::Dht22 => match dht22::blocking::read(&mut self.delay, &mut self.pin) {
                Ok(reading) => Some((reading.temperature, reading.relative_humidity)),
                Err(err) => {
                    warn!("DHT22 read failed: {err:?}");
                    None
                }
            },
        };

        if let Some((temperature, humidity)) = sample {
            debug!("[{:?}] {:.1}°C {:.1}%", self.model, temperature, humidity);
        }
        sample
    }
}

impl ClimateSensor for DhtDriver {
    fn read_humidity(&mut self) -> f32 {
        self.sample().map_or(f32::NAN, |(_, humidity)| humidity)
    }

    fn read_temperature(&mut self) -> f32 {
        self.sample().map_or(f32::NAN, |(temperature, _)| temperature)
    }
}
