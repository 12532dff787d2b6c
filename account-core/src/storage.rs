//! Storage layer using RocksDB
//!
//! One column family, `accounts`, holds the snapshot of record for every
//! account: key = account identifier bytes, value = bincode-serialized
//! [`AccountSnapshot`]. "Not found" is a first-class outcome (`Ok(None)`),
//! never an error.
//!
//! Writes go through [`Storage::put_snapshot_versioned`], a conditional
//! write keyed on the snapshot's monotonic version counter. The account
//! registry guarantees a single writer per key, so the version check only
//! detects out-of-band writers hitting the store directly; on a mismatch
//! the operation fails with a retryable `Conflict`.

use crate::{
    config::Config,
    error::{Error, Result},
    types::{AccountId, AccountSnapshot},
};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, DB};

/// Column family names
const CF_ACCOUNTS: &str = "accounts";

/// Storage wrapper for RocksDB
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_ACCOUNTS,
            Self::cf_options_accounts(),
        )];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!("Opened RocksDB at {:?}", path);

        Ok(Self { db })
    }

    fn cf_options_accounts() -> Options {
        let mut opts = Options::default();
        // Snapshots are read on every turn, favor decompression speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_handle(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_ACCOUNTS)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", CF_ACCOUNTS)))
    }

    /// Get the snapshot of record for an account, `None` if never created
    pub fn get_snapshot(&self, account_id: &AccountId) -> Result<Option<AccountSnapshot>> {
        let cf = self.cf_handle()?;

        let value = self.db.get_cf(cf, account_id.as_str().as_bytes())?;
        match value {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Conditional write of an account snapshot
    ///
    /// Succeeds only if the stored version matches `expected_version`
    /// (`0` meaning "must not exist yet"). The snapshot being written
    /// carries the next version.
    pub fn put_snapshot_versioned(
        &self,
        snapshot: &AccountSnapshot,
        expected_version: u64,
    ) -> Result<()> {
        let cf = self.cf_handle()?;

        let stored_version = self
            .get_snapshot(&snapshot.account_id)?
            .map(|current| current.version)
            .unwrap_or(0);
        if stored_version != expected_version {
            return Err(Error::Conflict(format!(
                "account {} at version {}, expected {}",
                snapshot.account_id, stored_version, expected_version
            )));
        }

        let value = bincode::serialize(snapshot)?;
        self.db
            .put_cf(cf, snapshot.account_id.as_str().as_bytes(), value)?;

        tracing::debug!(
            account_id = %snapshot.account_id,
            version = snapshot.version,
            balance = %snapshot.balance,
            "Snapshot written"
        );

        Ok(())
    }

    /// Approximate number of accounts (fast, for health reporting)
    pub fn approximate_accounts(&self) -> Result<u64> {
        let cf = self.cf_handle()?;
        let count = self
            .db
            .property_int_value_cf(cf, "rocksdb.estimate-num-keys")?
            .unwrap_or(0);
        Ok(count)
    }
}
