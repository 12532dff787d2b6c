//! Core types for the account ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode for storage, JSON for events)
//! - Exact arithmetic (Decimal for money)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account identifier (external key, immutable once assigned)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a ledger entry's effect on the balance
///
/// The sign is carried here, never in the amount: entry amounts are always
/// strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Increases the balance
    Deposit,
    /// Decreases the balance
    Withdrawal,
}

/// Immutable record of one balance-affecting operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry ID
    pub entry_id: Uuid,

    /// Account this entry belongs to
    pub account_id: AccountId,

    /// Direction of the balance effect
    pub kind: EntryKind,

    /// Magnitude (exact decimal, strictly positive)
    pub amount: Decimal,

    /// Acceptance timestamp
    pub timestamp: DateTime<Utc>,

    /// Free-text description
    pub description: String,
}

impl LedgerEntry {
    /// Signed effect of this entry on the balance
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            EntryKind::Deposit => self.amount,
            EntryKind::Withdrawal => -self.amount,
        }
    }
}

/// Materialized state of one account
///
/// Carries both the cached balance (the fast path) and the ordered entry
/// list (the audit trail). Folding the entries must always reproduce the
/// cached balance; [`AccountSnapshot::replayed_balance`] exists so callers
/// and tests can verify that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account identifier (set at creation, never changes)
    pub account_id: AccountId,

    /// Display name
    pub account_name: String,

    /// Cached balance (equals the fold of `entries` at all times)
    pub balance: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last accepted mutation
    pub last_updated: DateTime<Utc>,

    /// Ordered audit trail of accepted operations
    pub entries: Vec<LedgerEntry>,

    /// Monotonic write counter for conditional persistence
    pub version: u64,
}

impl AccountSnapshot {
    /// Create the initial snapshot for a freshly created account
    pub fn new(account_id: AccountId, account_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            account_id,
            account_name: account_name.into(),
            balance: Decimal::ZERO,
            created_at: now,
            last_updated: now,
            entries: Vec::new(),
            version: 1,
        }
    }

    /// Append an accepted entry, updating balance and last-updated
    ///
    /// Assumes the caller already validated the entry (positive amount,
    /// sufficient funds for a withdrawal).
    pub fn apply(&mut self, entry: LedgerEntry) {
        self.balance += entry.signed_amount();
        self.last_updated = entry.timestamp;
        self.entries.push(entry);
    }

    /// Fold the audit trail in append order
    pub fn replayed_balance(&self) -> Decimal {
        self.entries.iter().map(LedgerEntry::signed_amount).sum()
    }
}

/// Outbound notification emitted after each committed mutation
///
/// Value-equality semantics: two events with identical field values are
/// equal regardless of identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccountEvent {
    /// A new account was created
    AccountCreated {
        /// Account identifier
        account_id: AccountId,
        /// Display name
        account_name: String,
        /// Creation timestamp
        created_at: DateTime<Utc>,
    },

    /// A deposit was committed
    MoneyDeposited {
        /// Account identifier
        account_id: AccountId,
        /// Deposited magnitude
        amount: Decimal,
        /// Balance after the deposit
        new_balance: Decimal,
        /// Commit timestamp
        timestamp: DateTime<Utc>,
    },

    /// A withdrawal was committed
    MoneyWithdrawn {
        /// Account identifier
        account_id: AccountId,
        /// Withdrawn magnitude
        amount: Decimal,
        /// Balance after the withdrawal
        new_balance: Decimal,
        /// Commit timestamp
        timestamp: DateTime<Utc>,
    },
}

impl AccountEvent {
    /// Account this event concerns
    pub fn account_id(&self) -> &AccountId {
        match self {
            AccountEvent::AccountCreated { account_id, .. }
            | AccountEvent::MoneyDeposited { account_id, .. }
            | AccountEvent::MoneyWithdrawn { account_id, .. } => account_id,
        }
    }

    /// Event kind label (used for envelope tagging and metrics)
    pub fn kind(&self) -> &'static str {
        match self {
            AccountEvent::AccountCreated { .. } => "account_created",
            AccountEvent::MoneyDeposited { .. } => "money_deposited",
            AccountEvent::MoneyWithdrawn { .. } => "money_withdrawn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, cents: i64) -> LedgerEntry {
        LedgerEntry {
            entry_id: Uuid::new_v4(),
            account_id: AccountId::new("acct-1"),
            kind,
            amount: Decimal::new(cents, 2),
            timestamp: Utc::now(),
            description: "test".to_string(),
        }
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(
            entry(EntryKind::Deposit, 10050).signed_amount(),
            Decimal::new(10050, 2)
        );
        assert_eq!(
            entry(EntryKind::Withdrawal, 2500).signed_amount(),
            Decimal::new(-2500, 2)
        );
    }

    #[test]
    fn test_new_snapshot_defaults() {
        let now = Utc::now();
        let snapshot = AccountSnapshot::new(AccountId::new("acct-1"), "Test", now);

        assert_eq!(snapshot.balance, Decimal::ZERO);
        assert_eq!(snapshot.created_at, now);
        assert_eq!(snapshot.last_updated, now);
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.version, 1);
    }

    #[test]
    fn test_apply_keeps_balance_equal_to_fold() {
        let mut snapshot = AccountSnapshot::new(AccountId::new("acct-1"), "Test", Utc::now());

        snapshot.apply(entry(EntryKind::Deposit, 10000));
        snapshot.apply(entry(EntryKind::Deposit, 5000));
        snapshot.apply(entry(EntryKind::Withdrawal, 2500));
        snapshot.apply(entry(EntryKind::Deposit, 7500));

        assert_eq!(snapshot.balance, Decimal::new(20000, 2));
        assert_eq!(snapshot.replayed_balance(), snapshot.balance);
        assert_eq!(snapshot.entries.len(), 4);
    }

    #[test]
    fn test_apply_updates_last_updated() {
        let mut snapshot = AccountSnapshot::new(AccountId::new("acct-1"), "Test", Utc::now());
        let e = entry(EntryKind::Deposit, 100);
        let stamp = e.timestamp;

        snapshot.apply(e);

        assert_eq!(snapshot.last_updated, stamp);
    }

    #[test]
    fn test_event_value_equality() {
        let now = Utc::now();
        let a = AccountEvent::MoneyDeposited {
            account_id: AccountId::new("acct-1"),
            amount: Decimal::new(5025, 2),
            new_balance: Decimal::new(15075, 2),
            timestamp: now,
        };
        let b = AccountEvent::MoneyDeposited {
            account_id: AccountId::new("acct-1"),
            amount: Decimal::new(5025, 2),
            new_balance: Decimal::new(15075, 2),
            timestamp: now,
        };

        assert_eq!(a, b);
        assert_eq!(a.kind(), "money_deposited");
        assert_eq!(a.account_id().as_str(), "acct-1");
    }
}
