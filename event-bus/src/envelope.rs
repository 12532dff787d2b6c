//! Event envelope for outbound notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping one domain event for publication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Envelope ID (UUIDv7 for ordering)
    pub id: Uuid,

    /// Event kind (e.g. `money_deposited`)
    pub event: String,

    /// Payload (JSON-serialized domain event)
    pub payload: serde_json::Value,

    /// Publication timestamp
    pub timestamp: DateTime<Utc>,

    /// Headers (metadata)
    pub headers: std::collections::HashMap<String, String>,
}

impl Envelope {
    /// Create new envelope
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            event: event.into(),
            payload,
            timestamp: Utc::now(),
            headers: std::collections::HashMap::new(),
        }
    }

    /// Add header
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
