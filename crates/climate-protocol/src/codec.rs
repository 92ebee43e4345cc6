//! JSON body of the `/data` endpoint.
//!
//! The body is a flat object with a fixed key set:
//!
//! ```json
//! {"temperature":23.5,"humidity":60.1}
//! {"error":"Failed to read from DHT sensor!","temperature":0.0,"humidity":0.0}
//! ```
//!
//! Sensor failure is reported in the body only. The HTTP status stays 200.

use climate_core::{Reading, SensorError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error string placed in the body when the sensor read fails.
pub const SENSOR_FAILURE_MESSAGE: &str = "Failed to read from DHT sensor!";

/// Errors that can occur while encoding a body.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization failed.
    #[error("Failed to serialize reading: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Serialized shape of a reading. Field order is the key order on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingBody {
    /// Present only when the sensor read failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub temperature: f32,

    pub humidity: f32,
}

impl From<&Reading> for ReadingBody {
    fn from(reading: &Reading) -> Self {
        match reading.check() {
            Ok((temperature, humidity)) if temperature.is_finite() && humidity.is_finite() => {
                Self {
                    error: None,
                    temperature,
                    humidity,
                }
            }
            // numeric fields of an invalid reading are never trusted, and
            // non-finite values have no JSON representation
            Ok(_) | Err(SensorError::ReadFailure) => Self {
                error: Some(SENSOR_FAILURE_MESSAGE.to_string()),
                temperature: 0.0,
                humidity: 0.0,
            },
        }
    }
}

/// Encode a reading as the compact JSON body of `/data`.
pub fn encode_reading(reading: &Reading) -> Result<String, CodecError> {
    serde_json::to_string(&ReadingBody::from(reading)).map_err(CodecError::from)
}
