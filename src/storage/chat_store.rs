use crate::storage::database::{self, Database, StorageError, ACCOUNTS, COUNTERS, DRAFTS, MESSAGES};
use crate::storage::rows::{AccountRow, DatabaseSnapshot, DraftRow, MessageRow};
use std::sync::Mutex;

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum CreateAccountOutcome {
    Created,
    UsernameTaken,
}

#[derive(Debug)]
pub(crate) struct LoginData {
    /// Already downloaded messages, newest first.
    pub(crate) old_messages: Vec<MessageRow>,
    /// Messages still in the inbox, newest first.
    pub(crate) inbox_messages: Vec<MessageRow>,
    /// Oldest first.
    pub(crate) drafts: Vec<DraftRow>,
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) struct StoredMessage {
    pub(crate) msg_id: u64,
    pub(crate) inbox_count: u64,
}

/// ChatStore holds the account, message and draft tables of one member.
///
/// Every write runs under `write_lock` and is flushed before returning, so ids are handed out in
/// the same order the writes are applied, and an acknowledged write survives a crash.
pub(crate) struct ChatStore {
    database: Database,
    accounts: sled::Tree,
    messages: sled::Tree,
    drafts: sled::Tree,
    counters: sled::Tree,
    write_lock: Mutex<()>,
}

impl ChatStore {
    pub(crate) fn open(database: &Database) -> Result<Self, StorageError> {
        Ok(ChatStore {
            database: database.clone(),
            accounts: database.tree(ACCOUNTS)?,
            messages: database.tree(MESSAGES)?,
            drafts: database.tree(DRAFTS)?,
            counters: database.tree(COUNTERS)?,
            write_lock: Mutex::new(()),
        })
    }

    pub(crate) fn create_account(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<CreateAccountOutcome, StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        if self.accounts.contains_key(username)? {
            return Ok(CreateAccountOutcome::UsernameTaken);
        }

        let row = AccountRow {
            id: self.next_id(ACCOUNTS)?,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            logged_in: true,
        };
        self.accounts.insert(username, database::encode_row(ACCOUNTS, &row)?)?;
        self.database.flush()?;

        Ok(CreateAccountOutcome::Created)
    }

    /// `None` when the credentials don't match an account.
    pub(crate) fn login(&self, username: &str, password_hash: &str) -> Result<Option<LoginData>, StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        let mut account = match self.account(username)? {
            Some(account) if account.password_hash == password_hash => account,
            _ => return Ok(None),
        };

        account.logged_in = true;
        self.accounts.insert(username, database::encode_row(ACCOUNTS, &account)?)?;
        self.database.flush()?;

        let (mut inbox_messages, mut old_messages): (Vec<_>, Vec<_>) =
            self.messages_for(username)?.into_iter().partition(|m| m.inbox);
        inbox_messages.reverse();
        old_messages.reverse();

        let drafts = self.drafts_for(username)?;

        Ok(Some(LoginData {
            old_messages,
            inbox_messages,
            drafts,
        }))
    }

    pub(crate) fn password_hash(&self, username: &str) -> Result<Option<String>, StorageError> {
        Ok(self.account(username)?.map(|account| account.password_hash))
    }

    /// Usernames in account creation order.
    pub(crate) fn list_usernames(&self) -> Result<Vec<String>, StorageError> {
        let mut accounts: Vec<AccountRow> = database::scan(ACCOUNTS, &self.accounts)?;
        accounts.sort_by_key(|account| account.id);
        Ok(accounts.into_iter().map(|account| account.username).collect())
    }

    /// Stores a message for `recipient` and drops the draft it was sent from. `None` when the
    /// recipient has no account.
    pub(crate) fn send_message(
        &self,
        draft_id: u64,
        recipient: &str,
        sender: &str,
        content: &str,
    ) -> Result<Option<StoredMessage>, StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        if !self.accounts.contains_key(recipient)? {
            return Ok(None);
        }

        self.drafts.remove(database::id_key(draft_id))?;

        let row = MessageRow {
            id: self.next_id(MESSAGES)?,
            username: recipient.to_string(),
            sender: sender.to_string(),
            msg: content.to_string(),
            checked: false,
            inbox: true,
        };
        self.messages
            .insert(database::id_key(row.id), database::encode_row(MESSAGES, &row)?)?;
        self.database.flush()?;

        let inbox_count = self.messages_for(recipient)?.iter().filter(|m| m.inbox).count() as u64;

        Ok(Some(StoredMessage {
            msg_id: row.id,
            inbox_count,
        }))
    }

    pub(crate) fn add_draft(
        &self,
        username: &str,
        recipient: &str,
        msg: &str,
        checked: bool,
    ) -> Result<u64, StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        let row = DraftRow {
            id: self.next_id(DRAFTS)?,
            username: username.to_string(),
            recipient: recipient.to_string(),
            msg: msg.to_string(),
            checked,
        };
        self.drafts
            .insert(database::id_key(row.id), database::encode_row(DRAFTS, &row)?)?;
        self.database.flush()?;

        Ok(row.id)
    }

    /// Replaces all of `username`'s drafts with `drafts`, given as `(recipient, msg)` pairs.
    /// Empty fields are stored as ".".
    pub(crate) fn save_drafts(&self, username: &str, drafts: &[(String, String)]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        for existing in self.drafts_for(username)? {
            self.drafts.remove(database::id_key(existing.id))?;
        }

        for (recipient, msg) in drafts {
            let row = DraftRow {
                id: self.next_id(DRAFTS)?,
                username: username.to_string(),
                recipient: placeholder_if_empty(recipient),
                msg: placeholder_if_empty(msg),
                checked: false,
            };
            self.drafts
                .insert(database::id_key(row.id), database::encode_row(DRAFTS, &row)?)?;
        }
        self.database.flush()?;

        Ok(())
    }

    pub(crate) fn mark_checked(&self, username: &str, msg_id: u64) -> Result<(), StorageError> {
        self.update_message(username, msg_id, |row| row.checked = true)
    }

    pub(crate) fn mark_downloaded(&self, username: &str, msg_id: u64) -> Result<(), StorageError> {
        self.update_message(username, msg_id, |row| row.inbox = false)
    }

    pub(crate) fn delete_message(&self, msg_id: u64) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        self.messages.remove(database::id_key(msg_id))?;
        self.database.flush()?;
        Ok(())
    }

    /// Removes the account together with the messages addressed to it and its drafts.
    pub(crate) fn delete_account(&self, username: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        for message in self.messages_for(username)? {
            self.messages.remove(database::id_key(message.id))?;
        }
        for draft in self.drafts_for(username)? {
            self.drafts.remove(database::id_key(draft.id))?;
        }
        self.accounts.remove(username)?;
        self.database.flush()?;

        Ok(())
    }

    pub(crate) fn logout(&self, username: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        if let Some(mut account) = self.account(username)? {
            account.logged_in = false;
            self.accounts.insert(username, database::encode_row(ACCOUNTS, &account)?)?;
            self.database.flush()?;
        }

        Ok(())
    }

    pub(crate) fn snapshot(&self) -> Result<DatabaseSnapshot, StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        Ok(DatabaseSnapshot {
            accounts: database::scan(ACCOUNTS, &self.accounts)?,
            messages: database::scan(MESSAGES, &self.messages)?,
            drafts: database::scan(DRAFTS, &self.drafts)?,
            last_account_id: self.last_id(ACCOUNTS)?,
            last_message_id: self.last_id(MESSAGES)?,
            last_draft_id: self.last_id(DRAFTS)?,
        })
    }

    /// Discards every local row and replaces the tables with `snapshot`.
    pub(crate) fn restore(&self, snapshot: &DatabaseSnapshot) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        self.accounts.clear()?;
        self.messages.clear()?;
        self.drafts.clear()?;
        self.counters.clear()?;

        for account in &snapshot.accounts {
            self.accounts
                .insert(account.username.as_str(), database::encode_row(ACCOUNTS, account)?)?;
        }
        for message in &snapshot.messages {
            self.messages
                .insert(database::id_key(message.id), database::encode_row(MESSAGES, message)?)?;
        }
        for draft in &snapshot.drafts {
            self.drafts
                .insert(database::id_key(draft.id), database::encode_row(DRAFTS, draft)?)?;
        }
        self.set_last_id(ACCOUNTS, snapshot.last_account_id)?;
        self.set_last_id(MESSAGES, snapshot.last_message_id)?;
        self.set_last_id(DRAFTS, snapshot.last_draft_id)?;
        self.database.flush()?;

        Ok(())
    }

    fn update_message<F>(&self, username: &str, msg_id: u64, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut MessageRow),
    {
        let _guard = self.write_lock.lock().expect("ChatStore mutex guard poison");
        let key = database::id_key(msg_id);
        let mut row: MessageRow = match self.messages.get(key)? {
            Some(bytes) => database::decode_row(MESSAGES, &bytes)?,
            None => return Ok(()),
        };
        if row.username != username {
            return Ok(());
        }

        mutate(&mut row);
        self.messages.insert(key, database::encode_row(MESSAGES, &row)?)?;
        self.database.flush()?;

        Ok(())
    }

    fn account(&self, username: &str) -> Result<Option<AccountRow>, StorageError> {
        match self.accounts.get(username)? {
            Some(bytes) => Ok(Some(database::decode_row(ACCOUNTS, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Messages addressed to `username`, ordered by id.
    fn messages_for(&self, username: &str) -> Result<Vec<MessageRow>, StorageError> {
        let rows: Vec<MessageRow> = database::scan(MESSAGES, &self.messages)?;
        Ok(rows.into_iter().filter(|m| m.username == username).collect())
    }

    /// Drafts authored by `username`, ordered by id.
    fn drafts_for(&self, username: &str) -> Result<Vec<DraftRow>, StorageError> {
        let rows: Vec<DraftRow> = database::scan(DRAFTS, &self.drafts)?;
        Ok(rows.into_iter().filter(|d| d.username == username).collect())
    }

    // Callers hold `write_lock`.
    fn next_id(&self, table: &'static str) -> Result<u64, StorageError> {
        let next = self.last_id(table)? + 1;
        self.set_last_id(table, next)?;
        Ok(next)
    }

    fn last_id(&self, table: &'static str) -> Result<u64, StorageError> {
        match self.counters.get(table)? {
            Some(bytes) => database::key_id(COUNTERS, &bytes),
            None => Ok(0),
        }
    }

    fn set_last_id(&self, table: &'static str, id: u64) -> Result<(), StorageError> {
        self.counters.insert(table, &database::id_key(id)[..])?;
        Ok(())
    }
}

fn placeholder_if_empty(value: &str) -> String {
    if value.is_empty() {
        ".".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ChatStore {
        let database = Database::open_temporary().unwrap();
        ChatStore::open(&database).unwrap()
    }

    #[test]
    fn duplicate_accounts_are_rejected() {
        let store = store();
        assert_eq!(store.create_account("alice", "h1").unwrap(), CreateAccountOutcome::Created);
        assert_eq!(
            store.create_account("alice", "h2").unwrap(),
            CreateAccountOutcome::UsernameTaken
        );
        assert_eq!(store.password_hash("alice").unwrap(), Some("h1".to_string()));
        assert_eq!(store.password_hash("bob").unwrap(), None);
    }

    #[test]
    fn accounts_are_listed_in_creation_order() {
        let store = store();
        store.create_account("zed", "h").unwrap();
        store.create_account("alice", "h").unwrap();
        store.create_account("mike", "h").unwrap();

        assert_eq!(store.list_usernames().unwrap(), vec!["zed", "alice", "mike"]);
    }

    #[test]
    fn send_message_requires_recipient_and_consumes_draft() {
        let store = store();
        store.create_account("alice", "h").unwrap();
        store.create_account("bob", "h").unwrap();

        let draft_id = store.add_draft("alice", "bob", "hi bob", false).unwrap();
        assert_eq!(draft_id, 1);

        assert_eq!(store.send_message(draft_id, "carol", "alice", "hi carol").unwrap(), None);

        let first = store.send_message(draft_id, "bob", "alice", "hi bob").unwrap().unwrap();
        assert_eq!(first, StoredMessage { msg_id: 1, inbox_count: 1 });
        let second = store.send_message(0, "bob", "alice", "again").unwrap().unwrap();
        assert_eq!(second, StoredMessage { msg_id: 2, inbox_count: 2 });

        let alice = store.login("alice", "h").unwrap().unwrap();
        assert!(alice.drafts.is_empty());
    }

    #[test]
    fn login_splits_inbox_from_downloaded_messages() {
        let store = store();
        store.create_account("alice", "h").unwrap();
        store.create_account("bob", "pw").unwrap();
        for content in &["one", "two", "three"] {
            store.send_message(0, "bob", "alice", content).unwrap();
        }
        store.add_draft("bob", "alice", "draft a", false).unwrap();
        store.add_draft("bob", "alice", "draft b", true).unwrap();

        store.mark_downloaded("bob", 1).unwrap();
        store.mark_checked("bob", 2).unwrap();
        // Only the recipient can change a message.
        store.mark_downloaded("alice", 3).unwrap();

        assert!(store.login("bob", "wrong").unwrap().is_none());
        let bob = store.login("bob", "pw").unwrap().unwrap();

        let inbox_ids: Vec<u64> = bob.inbox_messages.iter().map(|m| m.id).collect();
        assert_eq!(inbox_ids, vec![3, 2]);
        assert!(bob.inbox_messages[1].checked);
        let old_ids: Vec<u64> = bob.old_messages.iter().map(|m| m.id).collect();
        assert_eq!(old_ids, vec![1]);
        let drafts: Vec<&str> = bob.drafts.iter().map(|d| d.msg.as_str()).collect();
        assert_eq!(drafts, vec!["draft a", "draft b"]);
    }

    #[test]
    fn save_drafts_replaces_previous_drafts() {
        let store = store();
        store.create_account("alice", "h").unwrap();
        store.add_draft("alice", "bob", "old", false).unwrap();
        store.add_draft("carol", "bob", "not mine", false).unwrap();

        store
            .save_drafts("alice", &[("bob".to_string(), "new".to_string()), (String::new(), String::new())])
            .unwrap();

        let alice = store.login("alice", "h").unwrap().unwrap();
        let drafts: Vec<(u64, &str, &str)> = alice
            .drafts
            .iter()
            .map(|d| (d.id, d.recipient.as_str(), d.msg.as_str()))
            .collect();
        assert_eq!(drafts, vec![(3, "bob", "new"), (4, ".", ".")]);
    }

    #[test]
    fn delete_account_removes_owned_rows() {
        let store = store();
        store.create_account("alice", "h").unwrap();
        store.create_account("bob", "h").unwrap();
        store.send_message(0, "bob", "alice", "to bob").unwrap();
        store.send_message(0, "alice", "bob", "to alice").unwrap();
        store.add_draft("bob", "alice", "draft", false).unwrap();

        store.delete_account("bob").unwrap();

        assert_eq!(store.list_usernames().unwrap(), vec!["alice"]);
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].username, "alice");
        assert!(snapshot.drafts.is_empty());
    }

    #[test]
    fn restore_replaces_tables_and_counters() {
        let leader = store();
        leader.create_account("alice", "h").unwrap();
        leader.create_account("bob", "h").unwrap();
        leader.send_message(0, "bob", "alice", "hello").unwrap();
        let snapshot = leader.snapshot().unwrap();

        let joiner = store();
        joiner.create_account("stale", "h").unwrap();
        joiner.restore(&snapshot).unwrap();

        assert_eq!(joiner.list_usernames().unwrap(), vec!["alice", "bob"]);
        assert_eq!(joiner.snapshot().unwrap(), snapshot);

        // Both assign the same id to the next write.
        let on_leader = leader.send_message(0, "alice", "bob", "hey").unwrap().unwrap();
        let on_joiner = joiner.send_message(0, "alice", "bob", "hey").unwrap().unwrap();
        assert_eq!(on_leader, on_joiner);
    }
}
