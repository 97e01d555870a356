//! The chat service proper: the write handlers every member runs, the replicated form of those
//! writes, and the per-process live-delivery queues.
mod delivery;
mod handlers;
mod operation;

pub(crate) use delivery::DeliveryHub;
pub(crate) use delivery::Pull;
pub(crate) use handlers::ApplyError;
pub(crate) use handlers::ChatNode;
pub(crate) use handlers::Origin;
pub use operation::DecodeOperationError;
pub(crate) use operation::Operation;
