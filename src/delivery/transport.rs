//! Transports to the collection endpoint.
//!
//! # Transports
//! - `HttpTransport`: request/response POST, success means a 2xx answer
//! - `BeaconTransport`: fire-and-forget POST for unload scenarios; it only
//!   reports whether the request could be queued

use std::fmt;
use std::mem;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::task::JoinHandle;
use url::Url;

use crate::delivery::error::{DeliveryError, DeliveryResult};

/// Largest payload the beacon transport accepts.
pub const BEACON_MAX_PAYLOAD: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Fetch,
    Beacon,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Fetch => "fetch",
            TransportKind::Beacon => "beacon",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A way of getting a serialized record to the endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// Send one JSON payload.
    async fn send(&self, payload: &[u8]) -> DeliveryResult<()>;

    /// Wait for requests that `send` left running in the background.
    async fn drain(&self) {}
}

fn build_client(timeout: Duration) -> DeliveryResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DeliveryError::TransportFailure(format!("client setup failed: {}", e)))
}

/// Standard request/response transport.
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> DeliveryResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Fetch
    }

    async fn send(&self, payload: &[u8]) -> DeliveryResult<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| DeliveryError::TransportFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::EndpointRejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Fire-and-forget transport; never waits for the response.
pub struct BeaconTransport {
    client: Client,
    endpoint: Url,
    max_payload: usize,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl BeaconTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> DeliveryResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint,
            max_payload: BEACON_MAX_PAYLOAD,
            in_flight: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Transport for BeaconTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Beacon
    }

    async fn send(&self, payload: &[u8]) -> DeliveryResult<()> {
        if payload.len() > self.max_payload {
            return Err(DeliveryError::PayloadTooLarge {
                size: payload.len(),
                limit: self.max_payload,
            });
        }

        let request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec());
        let endpoint = self.endpoint.clone();

        let task = tokio::spawn(async move {
            match request.send().await {
                Ok(response) => {
                    tracing::debug!(endpoint = %endpoint, status = %response.status(), "Beacon answered");
                }
                Err(e) => {
                    tracing::debug!(endpoint = %endpoint, error = %e, "Beacon lost");
                }
            }
        });
        // Dropping a handle detaches the request; it is not cancelled.
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|t| !t.is_finished());
        in_flight.push(task);
        Ok(())
    }

    async fn drain(&self) {
        let pending = mem::take(&mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner));
        if pending.is_empty() {
            return;
        }
        tracing::debug!(pending = pending.len(), "Waiting for beacons");
        for task in pending {
            let _ = task.await;
        }
    }
}
