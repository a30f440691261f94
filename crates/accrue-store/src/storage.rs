//! RocksDB-backed accumulator state storage.
//!
//! Implements [`RewardStore`] using three column families: pool reward-rate
//! sums and pool decimals keyed by pool name, and participant checkpoints
//! keyed by `len(pool) || pool || address`. The length prefix keeps pools
//! whose names share a prefix from overlapping.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{ColumnFamilyDescriptor, Direction, IteratorMode, Options, DB};

use accrue_core::error::StoreError;
use accrue_core::store::RewardStore;
use accrue_core::types::{Address, ParticipantState, Rscore};

use crate::ledger::RocksLedger;

// --- Column family names ---

pub(crate) const CF_REWARD_RATES: &str = "reward_rates";
pub(crate) const CF_POOL_DECIMALS: &str = "pool_decimals";
pub(crate) const CF_PARTICIPANTS: &str = "participants";
pub(crate) const CF_TOKEN_BALANCES: &str = "token_balances";
pub(crate) const CF_NATIVE_BALANCES: &str = "native_balances";
pub(crate) const CF_LEDGER_META: &str = "ledger_meta";

/// All column family names.
const ALL_CFS: &[&str] = &[
    CF_REWARD_RATES,
    CF_POOL_DECIMALS,
    CF_PARTICIPANTS,
    CF_TOKEN_BALANCES,
    CF_NATIVE_BALANCES,
    CF_LEDGER_META,
];

/// Stored form of a [`ParticipantState`]: both values as 32 little-endian bytes.
#[derive(bincode::Encode, bincode::Decode)]
struct StoredParticipant {
    entry_rate: [u8; 32],
    accrued: [u8; 32],
}

impl From<&ParticipantState> for StoredParticipant {
    fn from(state: &ParticipantState) -> Self {
        Self {
            entry_rate: state.entry_rate.to_le_bytes::<32>(),
            accrued: state.accrued.to_le_bytes::<32>(),
        }
    }
}

impl From<StoredParticipant> for ParticipantState {
    fn from(stored: StoredParticipant) -> Self {
        Self {
            entry_rate: Rscore::from_le_bytes(stored.entry_rate),
            accrued: Rscore::from_le_bytes(stored.accrued),
        }
    }
}

/// RocksDB-backed reward store.
///
/// Cheap to clone: clones share the same database handle, so one database
/// can back several accumulators and the payout ledger at once.
#[derive(Clone, Debug)]
pub struct RocksRewardStore {
    db: Arc<DB>,
}

impl RocksRewardStore {
    /// Open or create a RocksDB database at the given path.
    ///
    /// Creates all column families if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), "opened reward store");
        Ok(Self { db: Arc::new(db) })
    }

    /// Payout ledger sharing this database.
    pub fn ledger(&self) -> RocksLedger {
        RocksLedger::new(Arc::clone(&self.db))
    }

    /// Every pool that has a stored reward-rate sum, ordered by name.
    pub fn pools(&self) -> Result<Vec<(String, Rscore)>, StoreError> {
        let cf = cf_handle(&self.db, CF_REWARD_RATES)?;
        let mut pools = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, value) = item.map_err(|e| StoreError::Backend(e.to_string()))?;
            let name = String::from_utf8(key.to_vec())
                .map_err(|_| StoreError::Corrupt("pool name is not utf-8".into()))?;
            pools.push((name, decode_rscore(&value)?));
        }
        Ok(pools)
    }

    /// Every participant checkpoint stored for `pool`, ordered by address.
    pub fn participants(&self, pool: &str) -> Result<Vec<(Address, ParticipantState)>, StoreError> {
        let cf = cf_handle(&self.db, CF_PARTICIPANTS)?;
        let prefix = pool_prefix(pool)?;
        let mut out = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Backend(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let addr: [u8; 32] = key[prefix.len()..]
                .try_into()
                .map_err(|_| StoreError::Corrupt("invalid participant key length".into()))?;
            out.push((Address(addr), decode_participant(&value)?));
        }
        Ok(out)
    }

    /// Flush all in-memory buffers to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl RewardStore for RocksRewardStore {
    fn reward_rate_sum(&self, pool: &str) -> Result<Rscore, StoreError> {
        let cf = cf_handle(&self.db, CF_REWARD_RATES)?;
        match self
            .db
            .get_cf(&cf, pool.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) => decode_rscore(&bytes),
            None => Ok(Rscore::ZERO),
        }
    }

    fn set_reward_rate_sum(&mut self, pool: &str, value: Rscore) -> Result<(), StoreError> {
        let cf = cf_handle(&self.db, CF_REWARD_RATES)?;
        self.db
            .put_cf(&cf, pool.as_bytes(), value.to_le_bytes::<32>())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn pool_decimals(&self, pool: &str) -> Result<Option<u8>, StoreError> {
        let cf = cf_handle(&self.db, CF_POOL_DECIMALS)?;
        match self
            .db
            .get_cf(&cf, pool.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) => match bytes.as_slice() {
                [decimals] => Ok(Some(*decimals)),
                _ => Err(StoreError::Corrupt("invalid pool decimals length".into())),
            },
            None => Ok(None),
        }
    }

    fn set_pool_decimals(&mut self, pool: &str, decimals: u8) -> Result<(), StoreError> {
        let cf = cf_handle(&self.db, CF_POOL_DECIMALS)?;
        self.db
            .put_cf(&cf, pool.as_bytes(), [decimals])
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn participant(&self, pool: &str, address: &Address) -> Result<ParticipantState, StoreError> {
        let cf = cf_handle(&self.db, CF_PARTICIPANTS)?;
        match self
            .db
            .get_cf(&cf, participant_key(pool, address)?)
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) => decode_participant(&bytes),
            None => Ok(ParticipantState::default()),
        }
    }

    fn set_participant(
        &mut self,
        pool: &str,
        address: &Address,
        state: &ParticipantState,
    ) -> Result<(), StoreError> {
        let cf = cf_handle(&self.db, CF_PARTICIPANTS)?;
        let value = bincode::encode_to_vec(StoredParticipant::from(state), bincode::config::standard())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        self.db
            .put_cf(&cf, participant_key(pool, address)?, value)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

// --- Internal helpers ---

/// Get a column family handle.
pub(crate) fn cf_handle<'a>(db: &'a DB, name: &str) -> Result<&'a rocksdb::ColumnFamily, StoreError> {
    db.cf_handle(name)
        .ok_or_else(|| StoreError::Backend(format!("missing column family: {name}")))
}

/// `len(pool) || pool`.
fn pool_prefix(pool: &str) -> Result<Vec<u8>, StoreError> {
    let len = u8::try_from(pool.len())
        .map_err(|_| StoreError::Backend(format!("pool name too long: {} bytes", pool.len())))?;
    let mut prefix = Vec::with_capacity(1 + pool.len() + 32);
    prefix.push(len);
    prefix.extend_from_slice(pool.as_bytes());
    Ok(prefix)
}

/// `len(pool) || pool || address`.
fn participant_key(pool: &str, address: &Address) -> Result<Vec<u8>, StoreError> {
    let mut key = pool_prefix(pool)?;
    key.extend_from_slice(address.as_bytes());
    Ok(key)
}

fn decode_rscore(bytes: &[u8]) -> Result<Rscore, StoreError> {
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupt("invalid reward rate length".into()))?;
    Ok(Rscore::from_le_bytes(array))
}

fn decode_participant(bytes: &[u8]) -> Result<ParticipantState, StoreError> {
    let (stored, _): (StoredParticipant, _) =
        bincode::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    Ok(stored.into())
}
