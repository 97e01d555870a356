use std::convert::TryFrom;
use std::path::Path;

/// Table names. Each is a sled tree inside the member's database.
pub(super) const ACCOUNTS: &str = "accounts";
pub(super) const MESSAGES: &str = "messages";
pub(super) const DRAFTS: &str = "drafts";
pub(super) const COUNTERS: &str = "counters";
pub(super) const REGISTRY: &str = "registry";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage engine failure: {0}")]
    Engine(#[from] sled::Error),
    #[error("Corrupted row in table '{table}': {source}")]
    CorruptedRow {
        table: &'static str,
        source: prost::DecodeError,
    },
    #[error("Corrupted key in table '{table}'")]
    CorruptedKey { table: &'static str },
    #[error("Failed to encode row for table '{table}': {source}")]
    Encode {
        table: &'static str,
        source: prost::EncodeError,
    },
}

/// Database is the single handle a member holds onto its local persistent state. sled handles are
/// reference counted, so clones share the same underlying database.
#[derive(Clone)]
pub(crate) struct Database {
    db: sled::Db,
}

impl Database {
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Database { db })
    }

    /// Backed by a directory that is deleted when the last handle drops.
    #[cfg(test)]
    pub(crate) fn open_temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Database { db })
    }

    pub(super) fn tree(&self, name: &'static str) -> Result<sled::Tree, StorageError> {
        Ok(self.db.open_tree(name)?)
    }

    pub(crate) fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

pub(super) fn id_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

pub(super) fn key_id(table: &'static str, key: &[u8]) -> Result<u64, StorageError> {
    let bytes = <[u8; 8]>::try_from(key).map_err(|_| StorageError::CorruptedKey { table })?;
    Ok(u64::from_be_bytes(bytes))
}

pub(super) fn encode_row<M: prost::Message>(table: &'static str, row: &M) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::with_capacity(row.encoded_len());
    row.encode(&mut buf)
        .map_err(|source| StorageError::Encode { table, source })?;
    Ok(buf)
}

pub(super) fn decode_row<M: prost::Message + Default>(table: &'static str, bytes: &[u8]) -> Result<M, StorageError> {
    M::decode(bytes).map_err(|source| StorageError::CorruptedRow { table, source })
}

/// Decodes every row of a tree in key order.
pub(super) fn scan<M: prost::Message + Default>(table: &'static str, tree: &sled::Tree) -> Result<Vec<M>, StorageError> {
    let mut rows = Vec::new();
    for entry in tree.iter() {
        let (_, value) = entry?;
        rows.push(decode_row(table, &value)?);
    }

    Ok(rows)
}
