//! Measurement value produced for every data request.
//!
//! A `Reading` is transient: it is built when `/data` is requested, handed to
//! the formatter and dropped. Nothing is cached between requests.

use thiserror::Error;

/// Errors reported by the sensor path.
///
/// The data path knows exactly one failure: the driver returned a
/// non-number for either measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    /// Humidity or temperature could not be read.
    #[error("Failed to read from DHT sensor!")]
    ReadFailure,
}

/// One humidity/temperature measurement.
///
/// When `valid` is false both numeric fields are 0.0. They are a sentinel,
/// not a measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius
    pub temperature: f32,

    /// Relative humidity in percent
    pub humidity: f32,

    /// Whether the sensor produced both values
    pub valid: bool,
}

impl Reading {
    /// Create a valid reading from measured values.
    pub const fn measured(temperature: f32, humidity: f32) -> Self {
        Self {
            temperature,
            humidity,
            valid: true,
        }
    }

    /// The sentinel reading used when the sensor fails.
    pub const fn failed() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            valid: false,
        }
    }

    /// Build a reading from raw driver samples.
    ///
    /// Drivers signal failure with NaN. Infinite values are rejected as well
    /// since they cannot be represented in the JSON body.
    pub fn from_samples(temperature: f32, humidity: f32) -> Self {
        if temperature.is_finite() && humidity.is_finite() {
            Self::measured(temperature, humidity)
        } else {
            Self::failed()
        }
    }

    /// Returns `(temperature, humidity)` or the read failure.
    pub fn check(&self) -> Result<(f32, f32), SensorError> {
        if self.valid {
            Ok((self.temperature, self.humidity))
        } else {
            Err(SensorError::ReadFailure)
        }
    }
}
