//! Event publisher contract and NATS implementation
//!
//! Publication is at-most-once: one attempt per event, bounded by a timeout.
//! There is no retry loop and no outbox; the authoritative state write has
//! already committed by the time an event is published, so callers log and
//! discard failures.

use crate::{
    envelope::Envelope,
    metrics::{EVENT_PUBLISH_DURATION, EVENT_PUBLISH_TOTAL},
    Error, Result,
};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outbound event sink
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Attempt to deliver one envelope to `subject`, exactly once
    async fn publish(&self, subject: &str, envelope: &Envelope) -> Result<()>;
}

/// Publisher configuration
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// NATS server URL
    pub url: String,

    /// Per-attempt publish timeout
    pub publish_timeout: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            url: "nats://127.0.0.1:4222".to_string(),
            publish_timeout: Duration::from_secs(2),
        }
    }
}

/// NATS-backed publisher
pub struct NatsPublisher {
    client: async_nats::Client,
    config: PublisherConfig,
}

impl NatsPublisher {
    /// Connect to the NATS server named in `config`
    pub async fn connect(config: PublisherConfig) -> Result<Self> {
        let client = async_nats::connect(&config.url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        debug!("Connected to NATS at {}", config.url);

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Publisher for NatsPublisher {
    async fn publish(&self, subject: &str, envelope: &Envelope) -> Result<()> {
        let start = Instant::now();
        let payload = envelope.to_bytes()?;

        let attempt = async {
            self.client
                .publish(subject.to_string(), bytes::Bytes::from(payload))
                .await
                .map_err(|e| Error::Publish(e.to_string()))?;

            // Flush to ensure sent
            self.client
                .flush()
                .await
                .map_err(|e| Error::Publish(format!("Flush failed: {}", e)))
        };

        let result = match tokio::time::timeout(self.config.publish_timeout, attempt).await {
            Ok(inner) => inner,
            Err(_) => Err(Error::Timeout(
                self.config.publish_timeout.as_millis() as u64
            )),
        };

        let duration = start.elapsed().as_secs_f64();
        EVENT_PUBLISH_DURATION
            .with_label_values(&[envelope.event.as_str()])
            .observe(duration);

        let status = if result.is_ok() { "success" } else { "error" };
        EVENT_PUBLISH_TOTAL
            .with_label_values(&[envelope.event.as_str(), status])
            .inc();

        result
    }
}

/// Publisher used when the event stream is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl Publisher for NoopPublisher {
    async fn publish(&self, _subject: &str, _envelope: &Envelope) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publisher_config_default() {
        let config = PublisherConfig::default();
        assert_eq!(config.url, "nats://127.0.0.1:4222");
        assert_eq!(config.publish_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_noop_publisher_accepts_everything() {
        let publisher = NoopPublisher;
        let envelope = Envelope::new("account_created", json!({}));

        publisher
            .publish("corebank.accounts.events.acct-1", &envelope)
            .await
            .unwrap();
    }
}
