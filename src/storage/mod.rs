//! This mod owns everything a member persists locally: the member registry and the chat tables.
//! Both live in a single sled database per process.
mod chat_store;
mod database;
mod registry;
mod rows;

pub(crate) use chat_store::ChatStore;
pub(crate) use chat_store::CreateAccountOutcome;
pub(crate) use database::Database;
pub use database::StorageError;
pub(crate) use registry::Registry;
pub(crate) use rows::DatabaseSnapshot;
pub(crate) use rows::DraftRow;
pub(crate) use rows::MessageRow;
