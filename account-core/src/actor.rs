//! Per-account actors and the turn-serialization registry
//!
//! Every account identifier maps to at most one live actor task. The task
//! owns the receiving end of a bounded mailbox and processes one message at
//! a time (a turn), so operations against one account never overlap, while
//! distinct accounts proceed fully in parallel.
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │                AccountRegistry                    │
//! │        DashMap<AccountId, AccountHandle>          │
//! └──────────┬──────────────────────┬─────────────────┘
//!            │ mpsc (bounded)       │ mpsc (bounded)
//!            ▼                      ▼
//! ┌────────────────────┐ ┌────────────────────┐
//! │ actor "acct-1"     │ │ actor "acct-2"     │   one task per
//! │ read → apply →     │ │ read → apply →     │   active account,
//! │ write → respond →  │ │ write → respond →  │   spawned lazily,
//! │ publish            │ │ publish            │   evicted when idle
//! └─────────┬──────────┘ └─────────┬──────────┘
//!           ▼                      ▼
//!      Storage (RocksDB)      Storage (RocksDB)
//! ```
//!
//! Actors cache nothing between turns: each turn is a read-modify-write of
//! the persisted snapshot, so an idle actor can exit at any time without
//! losing state. Eviction unregisters the actor first, then closes the
//! mailbox and re-routes anything that slipped in, so the replacement actor
//! is the sole processor from its first turn; turns never overlap even
//! across an eviction.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::types::{AccountEvent, AccountId, AccountSnapshot, EntryKind, LedgerEntry};
use chrono::Utc;
use dashmap::DashMap;
use event_bus::{Envelope, Publisher};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Attempts to place a message before giving up; more than one is only
/// needed when a send races an actor's idle eviction.
const MAX_DELIVER_ATTEMPTS: usize = 3;

/// Message processed during one turn of an account actor
pub enum AccountMessage {
    /// Create the account
    Create {
        /// Display name for the new account
        account_name: String,
        /// Operation outcome
        respond: oneshot::Sender<Result<()>>,
    },

    /// Deposit into the account
    Deposit {
        /// Magnitude (must be positive)
        amount: Decimal,
        /// Free-text entry description
        description: String,
        /// New balance on success
        respond: oneshot::Sender<Result<Decimal>>,
    },

    /// Withdraw from the account
    Withdraw {
        /// Magnitude (must be positive and covered)
        amount: Decimal,
        /// Free-text entry description
        description: String,
        /// New balance on success
        respond: oneshot::Sender<Result<Decimal>>,
    },

    /// Read the current balance
    Balance {
        /// Current balance
        respond: oneshot::Sender<Result<Decimal>>,
    },

    /// Read the full snapshot (audit trail included)
    Snapshot {
        /// Current snapshot
        respond: oneshot::Sender<Result<AccountSnapshot>>,
    },
}

/// Sending side of one account's mailbox
#[derive(Clone)]
pub struct AccountHandle {
    sender: mpsc::Sender<AccountMessage>,
}

/// Actor that owns one account's turns
struct AccountActor {
    account_id: AccountId,
    storage: Arc<Storage>,
    publisher: Arc<dyn Publisher>,
    registry: Arc<RegistryInner>,
    mailbox: mpsc::Receiver<AccountMessage>,
    // Own handle, kept for identity-checked deregistration. Holding it also
    // keeps the mailbox open, so the only exit path is the idle timeout.
    handle: AccountHandle,
}

impl AccountActor {
    /// Run the actor event loop
    async fn run(mut self) {
        let idle_timeout = Duration::from_millis(self.registry.idle_timeout_ms);

        loop {
            match tokio::time::timeout(idle_timeout, self.mailbox.recv()).await {
                Ok(Some(msg)) => self.handle_message(msg).await,

                // All senders gone
                Ok(None) => break,

                // Idle: deregister, stop accepting, re-route anything that
                // arrived between the timeout firing and the close
                Err(_) => {
                    self.registry.handles.remove_if(&self.account_id, |_, h| {
                        h.sender.same_channel(&self.handle.sender)
                    });
                    self.mailbox.close();
                    while let Some(msg) = self.mailbox.recv().await {
                        if RegistryInner::deliver(&self.registry, &self.account_id, msg)
                            .await
                            .is_err()
                        {
                            tracing::warn!(
                                account_id = %self.account_id,
                                "Dropped message during actor eviction"
                            );
                        }
                    }
                    tracing::debug!(account_id = %self.account_id, "Account actor evicted");
                    break;
                }
            }
        }
    }

    /// Handle a single message: commit, respond, then notify
    ///
    /// The caller may have abandoned the response channel; the turn still
    /// runs to completion so a cancellation never leaves a partial mutation.
    async fn handle_message(&mut self, msg: AccountMessage) {
        match msg {
            AccountMessage::Create {
                account_name,
                respond,
            } => {
                let (result, event) = match self.create(account_name) {
                    Ok(event) => (Ok(()), Some(event)),
                    Err(e) => (Err(e), None),
                };
                let _ = respond.send(result);
                if let Some(event) = event {
                    self.publish(event).await;
                }
            }

            AccountMessage::Deposit {
                amount,
                description,
                respond,
            } => {
                let (result, event) = match self.mutate(EntryKind::Deposit, amount, description) {
                    Ok((balance, event)) => (Ok(balance), Some(event)),
                    Err(e) => (Err(e), None),
                };
                let _ = respond.send(result);
                if let Some(event) = event {
                    self.publish(event).await;
                }
            }

            AccountMessage::Withdraw {
                amount,
                description,
                respond,
            } => {
                let (result, event) = match self.mutate(EntryKind::Withdrawal, amount, description)
                {
                    Ok((balance, event)) => (Ok(balance), Some(event)),
                    Err(e) => (Err(e), None),
                };
                let _ = respond.send(result);
                if let Some(event) = event {
                    self.publish(event).await;
                }
            }

            AccountMessage::Balance { respond } => {
                let _ = respond.send(self.load().map(|snapshot| snapshot.balance));
            }

            AccountMessage::Snapshot { respond } => {
                let _ = respond.send(self.load());
            }
        }
    }

    /// Create the account; fails if a snapshot already exists
    fn create(&self, account_name: String) -> Result<AccountEvent> {
        if account_name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "account name must not be empty".to_string(),
            ));
        }

        if self.storage.get_snapshot(&self.account_id)?.is_some() {
            return Err(Error::AlreadyExists(self.account_id.to_string()));
        }

        let snapshot = AccountSnapshot::new(self.account_id.clone(), account_name, Utc::now());
        self.storage.put_snapshot_versioned(&snapshot, 0)?;

        tracing::info!(
            account_id = %self.account_id,
            account_name = %snapshot.account_name,
            "Account created"
        );

        Ok(AccountEvent::AccountCreated {
            account_id: snapshot.account_id,
            account_name: snapshot.account_name,
            created_at: snapshot.created_at,
        })
    }

    /// Apply one deposit or withdrawal: validate, append entry, persist
    ///
    /// All validation happens before any write; a rejected operation leaves
    /// no entry, no balance change and emits no event.
    fn mutate(
        &self,
        kind: EntryKind,
        amount: Decimal,
        description: String,
    ) -> Result<(Decimal, AccountEvent)> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidArgument(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        let mut snapshot = self.load()?;

        if kind == EntryKind::Withdrawal && snapshot.balance < amount {
            return Err(Error::InsufficientFunds {
                balance: snapshot.balance,
                requested: amount,
            });
        }

        let now = Utc::now();
        let entry = LedgerEntry {
            entry_id: Uuid::new_v4(),
            account_id: self.account_id.clone(),
            kind,
            amount,
            timestamp: now,
            description,
        };

        let expected_version = snapshot.version;
        snapshot.apply(entry);
        snapshot.version = expected_version + 1;
        self.storage
            .put_snapshot_versioned(&snapshot, expected_version)?;

        tracing::info!(
            account_id = %self.account_id,
            amount = %amount,
            new_balance = %snapshot.balance,
            kind = ?kind,
            "Operation committed"
        );

        let event = match kind {
            EntryKind::Deposit => AccountEvent::MoneyDeposited {
                account_id: self.account_id.clone(),
                amount,
                new_balance: snapshot.balance,
                timestamp: now,
            },
            EntryKind::Withdrawal => AccountEvent::MoneyWithdrawn {
                account_id: self.account_id.clone(),
                amount,
                new_balance: snapshot.balance,
                timestamp: now,
            },
        };

        Ok((snapshot.balance, event))
    }

    fn load(&self) -> Result<AccountSnapshot> {
        self.storage
            .get_snapshot(&self.account_id)?
            .ok_or_else(|| Error::AccountNotFound(self.account_id.to_string()))
    }

    /// Best-effort notification, strictly after commit
    ///
    /// Failures are logged and swallowed: the state mutation has already
    /// committed and the operation already reported success.
    async fn publish(&self, event: AccountEvent) {
        let subject =
            event_bus::subject::for_account(&self.registry.subject_prefix, self.account_id.as_str());

        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    account_id = %self.account_id,
                    event = event.kind(),
                    error = %e,
                    "Failed to serialize event, notification skipped"
                );
                return;
            }
        };

        let envelope = Envelope::new(event.kind(), payload);
        match self.publisher.publish(&subject, &envelope).await {
            Ok(()) => {
                tracing::debug!(
                    account_id = %self.account_id,
                    event = event.kind(),
                    "Event published"
                );
            }
            Err(e) => {
                tracing::warn!(
                    account_id = %self.account_id,
                    event = event.kind(),
                    error = %e,
                    "Event publish failed, operation already committed"
                );
            }
        }
    }
}

struct RegistryInner {
    storage: Arc<Storage>,
    publisher: Arc<dyn Publisher>,
    handles: DashMap<AccountId, AccountHandle>,
    mailbox_capacity: usize,
    idle_timeout_ms: u64,
    subject_prefix: String,
}

impl RegistryInner {
    fn spawn(inner: &Arc<Self>, account_id: &AccountId) -> AccountHandle {
        let (sender, mailbox) = mpsc::channel(inner.mailbox_capacity);
        let handle = AccountHandle { sender };

        let actor = AccountActor {
            account_id: account_id.clone(),
            storage: Arc::clone(&inner.storage),
            publisher: Arc::clone(&inner.publisher),
            registry: Arc::clone(inner),
            mailbox,
            handle: handle.clone(),
        };
        tokio::spawn(actor.run());

        tracing::debug!(account_id = %account_id, "Account actor spawned");
        handle
    }

    /// Deliver a message into the account's mailbox, spawning or respawning
    /// the actor as needed
    ///
    /// A failed send returns the message, so a race with idle eviction only
    /// costs a retry against a fresh actor, never a lost operation.
    async fn deliver(
        inner: &Arc<Self>,
        account_id: &AccountId,
        mut msg: AccountMessage,
    ) -> Result<()> {
        for _ in 0..MAX_DELIVER_ATTEMPTS {
            let handle = inner
                .handles
                .entry(account_id.clone())
                .or_insert_with(|| Self::spawn(inner, account_id))
                .clone();

            match handle.sender.send(msg).await {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(returned)) => {
                    msg = returned;
                    // Evict only the stale handle; a replacement another
                    // caller just spawned must stay
                    inner
                        .handles
                        .remove_if(account_id, |_, h| h.sender.same_channel(&handle.sender));
                }
            }
        }

        Err(Error::Mailbox(format!(
            "Mailbox unavailable for account {}",
            account_id
        )))
    }
}

/// Turn-serialization wrapper: routes each operation to its account's actor
#[derive(Clone)]
pub struct AccountRegistry {
    inner: Arc<RegistryInner>,
}

impl AccountRegistry {
    /// Create a registry over the given storage and publisher
    pub fn new(storage: Arc<Storage>, publisher: Arc<dyn Publisher>, config: &Config) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                storage,
                publisher,
                handles: DashMap::new(),
                mailbox_capacity: config.actor.mailbox_capacity,
                idle_timeout_ms: config.actor.idle_timeout_ms,
                subject_prefix: config.events.subject_prefix.clone(),
            }),
        }
    }

    /// Create an account
    pub async fn create(&self, account_id: &AccountId, account_name: String) -> Result<()> {
        let (respond, rx) = oneshot::channel();
        RegistryInner::deliver(
            &self.inner,
            account_id,
            AccountMessage::Create {
                account_name,
                respond,
            },
        )
        .await?;
        rx.await
            .map_err(|_| Error::Mailbox("Response channel closed".to_string()))?
    }

    /// Deposit into an account, returning the new balance
    pub async fn deposit(
        &self,
        account_id: &AccountId,
        amount: Decimal,
        description: String,
    ) -> Result<Decimal> {
        let (respond, rx) = oneshot::channel();
        RegistryInner::deliver(
            &self.inner,
            account_id,
            AccountMessage::Deposit {
                amount,
                description,
                respond,
            },
        )
        .await?;
        rx.await
            .map_err(|_| Error::Mailbox("Response channel closed".to_string()))?
    }

    /// Withdraw from an account, returning the new balance
    pub async fn withdraw(
        &self,
        account_id: &AccountId,
        amount: Decimal,
        description: String,
    ) -> Result<Decimal> {
        let (respond, rx) = oneshot::channel();
        RegistryInner::deliver(
            &self.inner,
            account_id,
            AccountMessage::Withdraw {
                amount,
                description,
                respond,
            },
        )
        .await?;
        rx.await
            .map_err(|_| Error::Mailbox("Response channel closed".to_string()))?
    }

    /// Read an account's current balance
    pub async fn balance(&self, account_id: &AccountId) -> Result<Decimal> {
        let (respond, rx) = oneshot::channel();
        RegistryInner::deliver(&self.inner, account_id, AccountMessage::Balance { respond }).await?;
        rx.await
            .map_err(|_| Error::Mailbox("Response channel closed".to_string()))?
    }

    /// Read an account's full snapshot
    pub async fn snapshot(&self, account_id: &AccountId) -> Result<AccountSnapshot> {
        let (respond, rx) = oneshot::channel();
        RegistryInner::deliver(&self.inner, account_id, AccountMessage::Snapshot { respond })
            .await?;
        rx.await
            .map_err(|_| Error::Mailbox("Response channel closed".to_string()))?
    }

    /// Number of currently live account actors
    pub fn active_accounts(&self) -> usize {
        self.inner.handles.len()
    }
}
