//! This mod is meant to hold most of the code for the library's member-facing API.
mod event_bus;
mod handle;
mod options;
mod wiring;

pub use event_bus::LeaderEvent;
pub use event_bus::LeaderListener;
pub use handle::MemberHandle;
pub use options::MemberOptions;
pub use wiring::start_member;
pub use wiring::MemberConfig;
pub use wiring::MemberStartError;
