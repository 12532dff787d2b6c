//! Corebank account core
//!
//! Per-account ledger actors over a durable RocksDB state store.
//!
//! # Architecture
//!
//! - **One actor per account**: every account identifier maps to a lazily
//!   spawned task that processes one operation at a time (a turn), so a
//!   single account observes a strictly linear history while distinct
//!   accounts run fully in parallel
//! - **Durable truth in storage**: actors cache nothing between turns; each
//!   turn is a read-modify-write of the persisted snapshot, so idle actors
//!   can be evicted at any time
//! - **Commit, then notify**: a notification event is published only after
//!   the snapshot write has landed, and a publish failure never fails the
//!   committed operation
//!
//! # Invariants
//!
//! - Balance equals the fold of the entry list at all times
//! - A withdrawal never drives the balance negative
//! - At most one in-flight operation per account identifier
//! - Validation failures produce no write; persistence failures produce no
//!   event

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod bank;
pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod types;

// Re-exports
pub use bank::Bank;
pub use config::Config;
pub use error::{Error, Result};
pub use types::{AccountEvent, AccountId, AccountSnapshot, EntryKind, LedgerEntry};
