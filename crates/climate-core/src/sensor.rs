//! Sensor abstractions.
//!
//! Two seams are defined here:
//! - `ClimateSensor` is the driver capability (one humidity value, one
//!   temperature value, NaN on failure). Hardware drivers implement it.
//! - `ReadingSource` produces a complete `Reading`. The HTTP responder depends
//!   on this trait only, so tests can stub it directly.

use tracing::{debug, warn};

use crate::reading::Reading;

/// Capability of a digital humidity/temperature sensor driver.
///
/// Both methods drive the sensor's signal line and block until the hardware
/// answers. Failure is reported as `f32::NAN`.
pub trait ClimateSensor {
    /// Relative humidity in percent.
    fn read_humidity(&mut self) -> f32;

    /// Temperature in degrees Celsius.
    fn read_temperature(&mut self) -> f32;
}

impl<S: ClimateSensor + ?Sized> ClimateSensor for Box<S> {
    fn read_humidity(&mut self) -> f32 {
        (**self).read_humidity()
    }

    fn read_temperature(&mut self) -> f32 {
        (**self).read_temperature()
    }
}

/// Anything that can produce a fresh `Reading` on demand.
pub trait ReadingSource {
    fn read(&mut self) -> Reading;
}

impl<R: ReadingSource + ?Sized> ReadingSource for Box<R> {
    fn read(&mut self) -> Reading {
        (**self).read()
    }
}

/// Sensor Reader: turns raw driver samples into a `Reading`.
///
/// No retries and no rate limiting. Callers must not read more often than
/// the sensor's minimum sampling interval; drivers that care cache their last
/// transaction.
#[derive(Debug)]
pub struct SensorReader<S> {
    sensor: S,
}

impl<S: ClimateSensor> SensorReader<S> {
    /// Take exclusive ownership of a sensor driver.
    pub fn new(sensor: S) -> Self {
        Self { sensor }
    }

    /// Access the underlying driver.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Release the driver.
    pub fn into_inner(self) -> S {
        self.sensor
    }
}

impl<S: ClimateSensor> ReadingSource for SensorReader<S> {
    fn read(&mut self) -> Reading {
        let humidity = self.sensor.read_humidity();
        let temperature = self.sensor.read_temperature();

        let reading = Reading::from_samples(temperature, humidity);
        if reading.valid {
            debug!(temperature, humidity, "sensor read");
        } else {
            warn!(
                temperature_nan = temperature.is_nan(),
                humidity_nan = humidity.is_nan(),
                "sensor read failed"
            );
        }
        reading
    }
}
