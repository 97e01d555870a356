//! Client side of the cluster: finds the leader, fails over when it dies, and keeps live
//! delivery going across failovers.
mod client;
mod discovery;
mod live_stream;

pub use client::ChatClient;
pub use client::ClientConfig;
pub use client::ClientError;
pub use live_stream::LiveMessageStream;
