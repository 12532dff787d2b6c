//! Main orchestration layer
//!
//! Ties storage, the account registry and the event publisher together into
//! the high-level API the routing layer calls.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use account_core::{AccountId, Bank, Config};
//! use event_bus::NoopPublisher;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> account_core::Result<()> {
//!     let bank = Bank::open(Config::default(), Arc::new(NoopPublisher))?;
//!
//!     let account = AccountId::new("acct-1");
//!     bank.create_account(&account, "Example").await?;
//!     bank.deposit(&account, Decimal::new(10000, 2), None).await?;
//!
//!     Ok(())
//! }
//! ```

use crate::{
    actor::AccountRegistry,
    config::Config,
    error::{Error, Result},
    metrics::Metrics,
    storage::Storage,
    types::{AccountId, AccountSnapshot, LedgerEntry},
};
use event_bus::Publisher;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;

/// Main account service interface
pub struct Bank {
    /// Turn-serialization wrapper over per-account actors
    registry: AccountRegistry,

    /// Direct storage access (health reporting only; all account reads and
    /// writes go through the registry)
    storage: Arc<Storage>,

    /// Operation metrics
    metrics: Metrics,
}

impl Bank {
    /// Open the bank over the configured data directory
    pub fn open(config: Config, publisher: Arc<dyn Publisher>) -> Result<Self> {
        let storage = Arc::new(Storage::open(&config)?);
        let registry = AccountRegistry::new(Arc::clone(&storage), publisher, &config);
        let metrics =
            Metrics::new().map_err(|e| Error::Config(format!("Failed to create metrics: {}", e)))?;

        Ok(Self {
            registry,
            storage,
            metrics,
        })
    }

    /// Create an account
    pub async fn create_account(
        &self,
        account_id: &AccountId,
        account_name: impl Into<String>,
    ) -> Result<()> {
        self.validate_id(account_id)?;

        let start = Instant::now();
        let result = self.registry.create(account_id, account_name.into()).await;
        self.metrics
            .record_operation("create", result.is_ok(), start.elapsed());
        result
    }

    /// Deposit into an account, returning the new balance
    pub async fn deposit(
        &self,
        account_id: &AccountId,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Decimal> {
        self.validate_id(account_id)?;

        let description = description.unwrap_or_else(|| "deposit".to_string());
        let start = Instant::now();
        let result = self.registry.deposit(account_id, amount, description).await;
        self.metrics
            .record_operation("deposit", result.is_ok(), start.elapsed());
        result
    }

    /// Withdraw from an account, returning the new balance
    pub async fn withdraw(
        &self,
        account_id: &AccountId,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Decimal> {
        self.validate_id(account_id)?;

        let description = description.unwrap_or_else(|| "withdrawal".to_string());
        let start = Instant::now();
        let result = self.registry.withdraw(account_id, amount, description).await;
        self.metrics
            .record_operation("withdraw", result.is_ok(), start.elapsed());
        result
    }

    /// Read an account's current balance
    pub async fn balance(&self, account_id: &AccountId) -> Result<Decimal> {
        self.validate_id(account_id)?;

        let start = Instant::now();
        let result = self.registry.balance(account_id).await;
        self.metrics
            .record_operation("balance", result.is_ok(), start.elapsed());
        result
    }

    /// Read an account's full snapshot
    pub async fn snapshot(&self, account_id: &AccountId) -> Result<AccountSnapshot> {
        self.validate_id(account_id)?;
        self.registry.snapshot(account_id).await
    }

    /// Read an account's audit trail, in acceptance order
    pub async fn entries(&self, account_id: &AccountId) -> Result<Vec<LedgerEntry>> {
        Ok(self.snapshot(account_id).await?.entries)
    }

    /// Recompute the balance by folding the audit trail (for verification)
    pub async fn replayed_balance(&self, account_id: &AccountId) -> Result<Decimal> {
        Ok(self.snapshot(account_id).await?.replayed_balance())
    }

    /// Approximate number of accounts on record
    pub fn approximate_accounts(&self) -> Result<u64> {
        self.storage.approximate_accounts()
    }

    /// Number of currently live account actors
    pub fn active_accounts(&self) -> usize {
        self.registry.active_accounts()
    }

    /// Operation metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn validate_id(&self, account_id: &AccountId) -> Result<()> {
        if account_id.as_str().trim().is_empty() {
            return Err(Error::InvalidArgument(
                "account identifier must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::MemoryPublisher;
    use tempfile::TempDir;

    fn open_test_bank() -> (Bank, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        let bank = Bank::open(config, Arc::new(MemoryPublisher::new())).unwrap();
        (bank, temp_dir)
    }

    #[tokio::test]
    async fn test_bank_round_trip() {
        let (bank, _temp) = open_test_bank();
        let account = AccountId::new("acct-1");

        bank.create_account(&account, "Test").await.unwrap();
        bank.deposit(&account, Decimal::new(10000, 2), None)
            .await
            .unwrap();
        let balance = bank
            .withdraw(&account, Decimal::new(2500, 2), Some("rent".to_string()))
            .await
            .unwrap();

        assert_eq!(balance, Decimal::new(7500, 2));
        assert_eq!(bank.balance(&account).await.unwrap(), Decimal::new(7500, 2));

        let entries = bank.entries(&account).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].description, "rent");
        assert_eq!(
            bank.replayed_balance(&account).await.unwrap(),
            Decimal::new(7500, 2)
        );
    }

    #[tokio::test]
    async fn test_empty_identifier_rejected() {
        let (bank, _temp) = open_test_bank();
        let empty = AccountId::new("  ");

        let result = bank.create_account(&empty, "Test").await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_operations_are_counted() {
        let (bank, _temp) = open_test_bank();
        let account = AccountId::new("acct-1");

        bank.create_account(&account, "Test").await.unwrap();
        bank.deposit(&account, Decimal::new(100, 2), None)
            .await
            .unwrap();
        let _ = bank.withdraw(&account, Decimal::new(99900, 2), None).await;

        let metrics = bank.metrics();
        assert_eq!(
            metrics
                .operations_total
                .with_label_values(&["create", "success"])
                .get(),
            1
        );
        assert_eq!(
            metrics
                .operations_total
                .with_label_values(&["withdraw", "error"])
                .get(),
            1
        );
    }
}
