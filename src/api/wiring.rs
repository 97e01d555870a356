use crate::api::handle::MemberHandle;
use crate::api::options::MemberOptionsValidated;
use crate::api::MemberOptions;
use crate::chat::ChatNode;
use crate::cluster::{
    candidate_addresses, join_cluster, member_port, resolve_leader, Clock, HeartbeatMonitor, JoinError, LeaderCache,
    Member, MemberId, PeerPool, RealClock, ReplicationCoordinator,
};
use crate::server::{self, RpcServer};
use crate::storage::{ChatStore, Database, Registry, StorageError};
use std::convert::TryFrom;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct MemberConfig {
    /// Operator assigned. Id 0 bootstraps the cluster, everyone else joins it.
    pub member_id: u64,
    /// Host this member listens on and advertises to peers.
    pub host: String,
    /// Every member listens on `base_port + member_id`.
    pub base_port: u16,
    /// Hosts probed for a leader when joining. This member's own host is always probed too.
    pub peer_hosts: Vec<String>,
    /// Each member keeps its database in its own sub-directory of this one.
    pub data_directory: PathBuf,
    pub logger: slog::Logger,
    pub options: MemberOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum MemberStartError {
    #[error("Illegal options for configuring member: {0}")]
    IllegalOptions(String),
    #[error("Member id {member_id} doesn't fit a port above base port {base_port}")]
    PortOutOfRange { member_id: u64, base_port: u16 },
    #[error("Failed to bind {address}: {source}")]
    Bind { address: String, source: io::Error },
    #[error("Local storage failure: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to join the cluster after {attempts} attempts: {source}")]
    Join { attempts: u32, source: JoinError },
}

/// Starts one member: opens its database, bootstraps or joins the cluster, then serves and
/// heartbeats until the returned handle is shut down.
pub async fn start_member(config: MemberConfig) -> Result<MemberHandle, MemberStartError> {
    let options = MemberOptionsValidated::try_from(config.options)
        .map_err(|e| MemberStartError::IllegalOptions(e.to_string()))?;

    let my_id = MemberId::new(config.member_id);
    let port = member_port(config.base_port, my_id).ok_or(MemberStartError::PortOutOfRange {
        member_id: config.member_id,
        base_port: config.base_port,
    })?;
    let my_address = format!("{}:{}", config.host, port);
    let logger = config.logger.new(slog::o!("MemberId" => config.member_id));

    let listener = TcpListener::bind(&my_address)
        .await
        .map_err(|source| MemberStartError::Bind {
            address: my_address.clone(),
            source,
        })?;

    let database = Database::open(config.data_directory.join(format!("member_{}", config.member_id)))?;
    let registry = Arc::new(Registry::open(&database)?);
    let store = ChatStore::open(&database)?;

    let mut clock = RealClock;
    let transport = Arc::new(PeerPool::new(
        logger.new(slog::o!("Component" => "PeerPool")),
        options.peer_rpc_timeout,
    ));
    let me = Member::new(my_id, my_address.clone(), clock.now());

    if my_id.is_bootstrap() {
        slog::info!(logger, "Bootstrapping a new cluster at {}", my_address);
        registry.replace_all(&[me.clone()])?;
    } else {
        let mut hosts = config.peer_hosts;
        if !hosts.contains(&config.host) {
            hosts.push(config.host.clone());
        }
        let candidates = candidate_addresses(&hosts, config.base_port, my_id);

        let mut attempt = 1;
        let outcome = loop {
            match join_cluster(&logger, transport.as_ref(), &candidates, &me).await {
                Ok(outcome) => break outcome,
                Err(e) if attempt < options.join_attempts => {
                    slog::warn!(logger, "Join attempt {} failed, retrying: {}", attempt, e);
                    attempt += 1;
                    clock.sleep(options.heartbeat_interval).await;
                }
                Err(source) => {
                    return Err(MemberStartError::Join {
                        attempts: attempt,
                        source,
                    })
                }
            }
        };

        slog::info!(
            logger,
            "Joined cluster led by {:?} at {}, {} members",
            outcome.leader_id,
            outcome.leader_address,
            outcome.members.len()
        );
        store.restore(&outcome.snapshot)?;
        let mut members = outcome.members;
        members.retain(|member| member.id != my_id);
        members.push(me.clone());
        registry.replace_all(&members)?;
    }

    let leader = Arc::new(LeaderCache::new(my_id, resolve_leader(&registry.get()?)));
    slog::info!(logger, "Starting with leader {:?}", leader.current());

    let replication = ReplicationCoordinator::new(
        logger.new(slog::o!("Component" => "Replication")),
        registry.clone(),
        leader.clone(),
        transport.clone(),
        clock,
        options.heartbeat_timeout,
    );
    let node = Arc::new(ChatNode::new(
        logger.new(slog::o!("Component" => "Chat")),
        store,
        registry.clone(),
        leader.clone(),
        replication,
        clock,
    ));

    let (shutdown_handle, shutdown_signal) = server::shutdown_signal();
    let (fatal_notifier, fatal_listener) = server::fatal_signal();

    let rpc_server = RpcServer::new(
        logger.new(slog::o!("Component" => "RpcServer")),
        node.clone(),
        fatal_notifier.clone(),
        shutdown_signal.clone(),
        options.delivery_poll_timeout,
    );
    let server_task = tokio::spawn(rpc_server.run(listener));

    let heartbeat_monitor = HeartbeatMonitor::new(
        logger.new(slog::o!("Component" => "Heartbeat")),
        me,
        registry.clone(),
        leader.clone(),
        transport,
        clock,
        options.heartbeat_interval,
        options.heartbeat_timeout,
    );
    let heartbeat_task = tokio::spawn(heartbeat_monitor.run(shutdown_signal, fatal_notifier));

    Ok(MemberHandle::new(
        logger,
        my_id,
        my_address,
        database,
        registry,
        leader,
        node,
        options.heartbeat_timeout,
        shutdown_handle,
        fatal_listener,
        vec![server_task, heartbeat_task],
    ))
}
