//! Row types persisted in sled. They are prost messages so the same encoding is used on disk and
//! when a leader ships its tables to a joining member.

#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct AccountRow {
    #[prost(uint64, tag = "1")]
    pub(crate) id: u64,
    #[prost(string, tag = "2")]
    pub(crate) username: String,
    #[prost(string, tag = "3")]
    pub(crate) password_hash: String,
    #[prost(bool, tag = "4")]
    pub(crate) logged_in: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct MessageRow {
    #[prost(uint64, tag = "1")]
    pub(crate) id: u64,
    // Recipient.
    #[prost(string, tag = "2")]
    pub(crate) username: String,
    #[prost(string, tag = "3")]
    pub(crate) sender: String,
    #[prost(string, tag = "4")]
    pub(crate) msg: String,
    #[prost(bool, tag = "5")]
    pub(crate) checked: bool,
    #[prost(bool, tag = "6")]
    pub(crate) inbox: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct DraftRow {
    #[prost(uint64, tag = "1")]
    pub(crate) id: u64,
    // Author.
    #[prost(string, tag = "2")]
    pub(crate) username: String,
    #[prost(string, tag = "3")]
    pub(crate) recipient: String,
    #[prost(string, tag = "4")]
    pub(crate) msg: String,
    #[prost(bool, tag = "5")]
    pub(crate) checked: bool,
}

/// Value half of a registry row. The key is the big-endian member id.
#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct MemberRow {
    #[prost(string, tag = "1")]
    pub(crate) address: String,
    #[prost(int64, tag = "2")]
    pub(crate) timestamp_millis: i64,
}

/// Full copy of the chat tables, including the id counters, so that a member seeded from it keeps
/// assigning the same ids as the member it was copied from.
#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct DatabaseSnapshot {
    #[prost(message, repeated, tag = "1")]
    pub(crate) accounts: Vec<AccountRow>,
    #[prost(message, repeated, tag = "2")]
    pub(crate) messages: Vec<MessageRow>,
    #[prost(message, repeated, tag = "3")]
    pub(crate) drafts: Vec<DraftRow>,
    #[prost(uint64, tag = "4")]
    pub(crate) last_account_id: u64,
    #[prost(uint64, tag = "5")]
    pub(crate) last_message_id: u64,
    #[prost(uint64, tag = "6")]
    pub(crate) last_draft_id: u64,
}
