//! Account event bus with NATS support
//!
//! Carries outbound account notifications with:
//! - A `Publisher` contract that callers treat as best-effort
//! - At-most-once delivery: one attempt per event, bounded by a timeout
//! - Subject construction partitioned by account identifier
//! - Observability via Prometheus metrics
//!
//! Delivery failures are reported to the caller as errors, but the contract
//! explicitly allows callers to log and discard them: the event stream is
//! non-authoritative and must never affect committed state.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod envelope;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod publisher;
pub mod subject;

pub use envelope::Envelope;
pub use error::{Error, Result};
pub use memory::MemoryPublisher;
pub use publisher::{NatsPublisher, NoopPublisher, Publisher, PublisherConfig};
