//! Wireless network bring-up.
//!
//! The node joins its network once at startup. Instead of spinning until the
//! association succeeds, `Associator` retries a bounded number of times with
//! exponential backoff and ends in an explicit `Failed` state that the caller
//! reports.
//!
//! ```text
//! Disconnected -> Associating(1) -> ... -> Associating(n) -> Failed(n)
//!                       |                        |
//!                       +--------> Serving(ip) <-+
//! ```

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

/// Credentials of the network to join.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkCredentials {
    /// Network name.
    pub ssid: String,

    /// Passphrase (empty for open networks).
    pub password: String,
}

impl NetworkCredentials {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
        }
    }

    /// True when no passphrase is configured.
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// Keeps the passphrase out of logs.
impl fmt::Debug for NetworkCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkCredentials")
            .field("ssid", &self.ssid)
            .field("password", &if self.is_open() { "" } else { "***" })
            .finish()
    }
}

/// Link status as reported by the wireless stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Not associated.
    Disconnected,
    /// Association or DHCP in progress.
    Connecting,
    /// Associated with an address.
    Connected,
}

/// Wireless association stack.
pub trait WirelessLink {
    type Error: fmt::Display;

    /// Start associating with the given network.
    fn begin(&mut self, credentials: &NetworkCredentials) -> Result<(), Self::Error>;

    /// Current link status.
    fn status(&mut self) -> LinkStatus;

    /// Address assigned to the station interface.
    fn local_ip(&mut self) -> Result<Ipv4Addr, Self::Error>;

    /// Drop a half-open association before the next attempt.
    fn reset(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Blocking wait, injected so the retry loop can be tested without sleeping.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// `Delay` backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Retry policy for the association loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Association attempts before giving up.
    pub max_attempts: u32,

    /// Interval between status polls within one attempt.
    pub poll_interval_ms: u64,

    /// Status polls per attempt before the attempt counts as failed.
    pub polls_per_attempt: u32,

    /// Wait after the first failed attempt.
    pub initial_backoff_ms: u64,

    /// Upper bound for the doubling backoff.
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            poll_interval_ms: 500,
            polls_per_attempt: 20,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Backoff after failed attempt `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63);
        let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

/// Node lifecycle as seen by the association loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Nothing attempted yet.
    Disconnected,
    /// Attempt `attempt` in progress.
    Associating { attempt: u32 },
    /// Joined; the HTTP responder may run.
    Serving { ip: Ipv4Addr },
    /// All attempts used up. Terminal.
    Failed { attempts: u32 },
}

/// Errors that can occur during network bring-up.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Every attempt failed.
    #[error("failed to join '{ssid}' after {attempts} attempts: {last_error}")]
    AssociationFailed {
        ssid: String,
        attempts: u32,
        last_error: String,
    },

    /// `connect` was called after the associator already finished.
    #[error("association already finished in state {0:?}")]
    AlreadyFinished(NodeState),
}

/// Drives a `WirelessLink` from `Disconnected` to `Serving` or `Failed`.
pub struct Associator<L, D> {
    link: L,
    delay: D,
    policy: RetryPolicy,
    state: NodeState,
}

impl<L: WirelessLink, D: Delay> Associator<L, D> {
    pub fn new(link: L, delay: D, policy: RetryPolicy) -> Self {
        Self {
            link,
            delay,
            policy,
            state: NodeState::Disconnected,
        }
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Give back the link. It must be kept alive for the connection to stay up.
    pub fn into_link(self) -> L {
        self.link
    }

    /// Join the network, blocking until success or until all attempts fail.
    pub fn connect(&mut self, credentials: &NetworkCredentials) -> Result<Ipv4Addr, NetworkError> {
        match self.state {
            NodeState::Disconnected => {}
            other => return Err(NetworkError::AlreadyFinished(other)),
        }

        info!("Connecting to {}", credentials.ssid);
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=self.policy.max_attempts {
            self.state = NodeState::Associating { attempt };
            debug!(
                "association attempt {}/{}",
                attempt, self.policy.max_attempts
            );

            match self.try_associate(credentials) {
                Ok(ip) => {
                    self.state = NodeState::Serving { ip };
                    info!("WiFi connected, IP address: {}", ip);
                    return Ok(ip);
                }
                Err(err) => {
                    warn!("association attempt {} failed: {}", attempt, err);
                    last_error = err;
                }
            }

            if attempt < self.policy.max_attempts {
                if let Err(err) = self.link.reset() {
                    debug!("link reset failed: {}", err);
                }
                let backoff = self.policy.backoff_for(attempt);
                debug!("retrying in {:?}", backoff);
                self.delay.delay(backoff);
            }
        }

        let attempts = self.policy.max_attempts;
        self.state = NodeState::Failed { attempts };
        error!(
            "giving up on '{}' after {} attempts: {}",
            credentials.ssid, attempts, last_error
        );
        Err(NetworkError::AssociationFailed {
            ssid: credentials.ssid.clone(),
            attempts,
            last_error,
        })
    }

    fn try_associate(&mut self, credentials: &NetworkCredentials) -> Result<Ipv4Addr, String> {
        self.link.begin(credentials).map_err(|e| e.to_string())?;

        if !self.wait_for_link() {
            return Err(format!(
                "link not up after {} polls",
                self.policy.polls_per_attempt
            ));
        }

        self.link.local_ip().map_err(|e| e.to_string())
    }

    fn wait_for_link(&mut self) -> bool {
        let interval = self.policy.poll_interval();
        for poll in 0..self.policy.polls_per_attempt {
            if self.link.status() == LinkStatus::Connected {
                return true;
            }
            trace!(poll, ".");
            self.delay.delay(interval);
        }
        self.link.status() == LinkStatus::Connected
    }
}
