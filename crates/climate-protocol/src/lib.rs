//! # climate-protocol
//!
//! What the node says on the wire, independent of the HTTP framework.
//!
//! - [`codec`] serializes a `Reading` into the fixed JSON body of `/data`.
//! - [`service`] maps routes to replies. The axum router (Linux) and the
//!   esp-idf handlers (ESP32) are thin wrappers around [`ClimateService`].

pub mod codec;
pub mod service;

pub use codec::{encode_reading, CodecError, ReadingBody, SENSOR_FAILURE_MESSAGE};
pub use service::{ClimateService, HttpReply, Route};
