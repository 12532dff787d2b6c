//! In-memory publisher for tests
//!
//! Records every envelope it is handed, or fails every attempt when built
//! with [`MemoryPublisher::failing`] so callers can exercise the
//! publish-failure-is-swallowed contract.

use crate::{envelope::Envelope, publisher::Publisher, Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Publisher that records envelopes in memory
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    published: Mutex<Vec<(String, Envelope)>>,
    fail: AtomicBool,
}

impl MemoryPublisher {
    /// Create a publisher that accepts and records every envelope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a publisher whose every attempt fails
    pub fn failing() -> Self {
        let publisher = Self::default();
        publisher.fail.store(true, Ordering::SeqCst);
        publisher
    }

    /// Snapshot of everything published so far, in publication order
    pub fn published(&self) -> Vec<(String, Envelope)> {
        self.published.lock().expect("publisher lock poisoned").clone()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, subject: &str, envelope: &Envelope) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Publish("memory publisher set to fail".to_string()));
        }

        self.published
            .lock()
            .expect("publisher lock poisoned")
            .push((subject.to_string(), envelope.clone()));
        Ok(())
    }
}
