use crate::cluster::{Member, MemberId, Timestamp};
use crate::storage::database::{self, Database, StorageError, REGISTRY};
use crate::storage::rows::MemberRow;
use std::cmp;
use std::sync::Mutex;
use tokio::time::Duration;

/// Registry is the persisted set of members this process knows about, keyed by member id.
///
/// Single-key writes are atomic in sled. Anything that reads before it writes, or touches more
/// than one row, holds `lock` so it can't interleave with another such sequence.
pub(crate) struct Registry {
    tree: sled::Tree,
    lock: Mutex<()>,
}

impl Registry {
    pub(crate) fn open(database: &Database) -> Result<Self, StorageError> {
        Ok(Registry {
            tree: database.tree(REGISTRY)?,
            lock: Mutex::new(()),
        })
    }

    /// All members, ordered by id.
    pub(crate) fn get(&self) -> Result<Vec<Member>, StorageError> {
        let mut members = Vec::new();
        for entry in self.tree.iter() {
            let (key, value) = entry?;
            members.push(Self::decode(&key, &value)?);
        }

        Ok(members)
    }

    pub(crate) fn member(&self, id: MemberId) -> Result<Option<Member>, StorageError> {
        match self.tree.get(database::id_key(id.as_u64()))? {
            Some(value) => Ok(Some(Self::decode(&database::id_key(id.as_u64()), &value)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn upsert(&self, member: &Member) -> Result<(), StorageError> {
        let _guard = self.lock.lock().expect("Registry mutex guard poison");
        self.upsert_locked(member)
    }

    /// Stamps a known member with `now` from the local clock. Members that were removed in the
    /// meantime are not resurrected; they have to rejoin. Returns whether the member was present.
    pub(crate) fn refresh(&self, id: MemberId, now: Timestamp) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().expect("Registry mutex guard poison");
        match self.member(id)? {
            Some(mut member) => {
                // Unconditional, so a row stamped ahead of our clock heals on the next ping.
                member.last_heartbeat = now;
                self.upsert_locked(&member)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes the member only if its heartbeat is older than `timeout` at `now`. The age check and
    /// the delete happen under one lock, so a concurrent refresh can't be lost in between.
    pub(crate) fn remove_if_stale(
        &self,
        id: MemberId,
        now: Timestamp,
        timeout: Duration,
    ) -> Result<Option<Member>, StorageError> {
        let _guard = self.lock.lock().expect("Registry mutex guard poison");
        match self.member(id)? {
            Some(member) if member.age_at(now) > timeout => self.remove_locked(id),
            _ => Ok(None),
        }
    }

    /// Clears the registry and reseeds it with `members` as one atomic batch.
    pub(crate) fn replace_all(&self, members: &[Member]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().expect("Registry mutex guard poison");

        let mut batch = sled::Batch::default();
        for entry in self.tree.iter() {
            let (key, _) = entry?;
            batch.remove(key);
        }
        for member in members {
            batch.insert(&database::id_key(member.id.as_u64())[..], Self::encode(member)?);
        }

        self.tree.apply_batch(batch)?;
        Ok(())
    }

    /// Folds a registry snapshot received from the leader into ours. Rows with a newer heartbeat
    /// win. Incoming heartbeats are capped at `now`, so a row from a clock running ahead of ours
    /// still ages out. Our own row is never taken from the snapshot. Returns the number of rows
    /// written.
    pub(crate) fn merge(&self, members: &[Member], me: MemberId, now: Timestamp) -> Result<usize, StorageError> {
        let _guard = self.lock.lock().expect("Registry mutex guard poison");

        let mut written = 0;
        for incoming in members.iter().filter(|m| m.id != me) {
            let mut incoming = incoming.clone();
            incoming.last_heartbeat = cmp::min(incoming.last_heartbeat, now);
            let newer = match self.member(incoming.id)? {
                Some(existing) => existing.last_heartbeat < incoming.last_heartbeat,
                None => true,
            };
            if newer {
                self.upsert_locked(&incoming)?;
                written += 1;
            }
        }

        Ok(written)
    }

    fn upsert_locked(&self, member: &Member) -> Result<(), StorageError> {
        let value = Self::encode(member)?;
        self.tree.insert(database::id_key(member.id.as_u64()), value)?;
        Ok(())
    }

    fn remove_locked(&self, id: MemberId) -> Result<Option<Member>, StorageError> {
        let key = database::id_key(id.as_u64());
        match self.tree.remove(key)? {
            Some(value) => Ok(Some(Self::decode(&key, &value)?)),
            None => Ok(None),
        }
    }

    fn encode(member: &Member) -> Result<Vec<u8>, StorageError> {
        database::encode_row(
            REGISTRY,
            &MemberRow {
                address: member.address.clone(),
                timestamp_millis: member.last_heartbeat.as_millis(),
            },
        )
    }

    fn decode(key: &[u8], value: &[u8]) -> Result<Member, StorageError> {
        let id = database::key_id(REGISTRY, key)?;
        let row: MemberRow = database::decode_row(REGISTRY, value)?;
        Ok(Member::new(
            MemberId::new(id),
            row.address,
            Timestamp::from_millis(row.timestamp_millis),
        ))
    }
}
