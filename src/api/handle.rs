use crate::api::event_bus::LeaderListener;
use crate::chat::ChatNode;
use crate::cluster::{health_of, Clock, LeaderCache, Member, MemberHealth, MemberId, RealClock};
use crate::server::{FatalListener, ShutdownHandle};
use crate::storage::{Database, Registry, StorageError};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// MemberHandle is the running member. Dropping it without calling `shutdown()` also stops the
/// background tasks, but skips the final flush.
pub struct MemberHandle {
    logger: slog::Logger,
    member_id: MemberId,
    address: String,
    database: Database,
    registry: Arc<Registry>,
    leader: Arc<LeaderCache>,
    node: Arc<ChatNode>,
    heartbeat_timeout: Duration,
    shutdown_handle: ShutdownHandle,
    fatal_listener: FatalListener,
    tasks: Vec<JoinHandle<()>>,
}

impl MemberHandle {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        logger: slog::Logger,
        member_id: MemberId,
        address: String,
        database: Database,
        registry: Arc<Registry>,
        leader: Arc<LeaderCache>,
        node: Arc<ChatNode>,
        heartbeat_timeout: Duration,
        shutdown_handle: ShutdownHandle,
        fatal_listener: FatalListener,
        tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        MemberHandle {
            logger,
            member_id,
            address,
            database,
            registry,
            leader,
            node,
            heartbeat_timeout,
            shutdown_handle,
            fatal_listener,
            tasks,
        }
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    /// `host:port` this member serves on.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Who this member currently believes leads.
    pub fn leader(&self) -> Option<MemberId> {
        self.leader.current()
    }

    pub fn is_leader(&self) -> bool {
        self.leader.is_me()
    }

    pub fn leader_listener(&self) -> LeaderListener {
        LeaderListener::new(self.member_id, self.leader.subscribe())
    }

    /// This member's registry, ordered by id.
    pub fn members(&self) -> Result<Vec<Member>, StorageError> {
        self.registry.get()
    }

    pub fn member_health(&self, id: MemberId) -> Result<MemberHealth, StorageError> {
        let member = self.registry.member(id)?;
        Ok(health_of(member.as_ref(), RealClock.now(), self.heartbeat_timeout))
    }

    /// Resolves once something hit an unrecoverable local failure. The member should then be
    /// shut down.
    pub async fn wait_for_fatal(&mut self) -> String {
        self.fatal_listener.wait().await
    }

    /// Stops heartbeating and serving, ends every live-delivery stream, and flushes the database.
    pub async fn shutdown(self) -> Result<(), StorageError> {
        slog::info!(self.logger, "Shutting down");
        self.shutdown_handle.shutdown();
        self.node.delivery().close_all();

        for task in self.tasks {
            if let Err(e) = task.await {
                slog::error!(self.logger, "Member task ended abnormally: {}", e);
            }
        }

        self.database.flush()?;
        slog::info!(self.logger, "Shutdown complete");
        Ok(())
    }
}
