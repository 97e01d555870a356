mod server;
mod shutdown;

pub(crate) use server::RpcServer;
pub(crate) use shutdown::fatal_signal;
pub(crate) use shutdown::shutdown_signal;
pub(crate) use shutdown::FatalListener;
pub(crate) use shutdown::FatalNotifier;
pub(crate) use shutdown::ShutdownHandle;
pub(crate) use shutdown::ShutdownSignal;
