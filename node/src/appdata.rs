//! App-private metadata persistence (A5). A `sled` key-value store at
//! `<dataDir>/appdata`, used only for validator-set history. This history
//! is observability-only: its writes are best-effort and never fatal, and
//! nothing on the consensus-critical path reads it back.

use std::path::Path;

use crate::validators::ValidatorInfo;

pub struct AppDataStore {
    db: sled::Db,
}

impl AppDataStore {
    pub fn open(path: impl AsRef<Path>) -> sled::Result<Self> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// Records the active validator set at `height`. Failures are logged,
    /// not propagated: this store backs an observability aid, not a
    /// consensus-critical path.
    pub fn record_validator_set(&self, height: u64, validators: &[ValidatorInfo]) {
        let encoded = match serde_json::to_vec(validators) {
            Ok(encoded) => encoded,
            Err(err) => {
                log::warn!("failed to encode validator history at height {height}: {err}");
                return;
            }
        };
        if let Err(err) = self.db.insert(height.to_be_bytes(), encoded) {
            log::warn!("failed to persist validator history at height {height}: {err}");
        }
    }

    pub fn validator_set_at(&self, height: u64) -> Option<Vec<ValidatorInfo>> {
        let bytes = self.db.get(height.to_be_bytes()).ok().flatten()?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    #[test]
    fn round_trips_validator_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppDataStore::open(dir.path().join("appdata")).unwrap();

        let validators = vec![ValidatorInfo {
            address: Address::repeat_byte(9),
            voting_power: 10,
            public_key: vec![1, 2, 3],
        }];
        store.record_validator_set(1, &validators);

        assert_eq!(store.validator_set_at(1), Some(validators));
        assert_eq!(store.validator_set_at(2), None);
    }
}
