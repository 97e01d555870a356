use crate::cluster::member::member_address;
use crate::cluster::peer_client::{PeerCallError, PeerTransport};
use crate::cluster::{Member, MemberId, Timestamp};
use crate::grpc::{ProtoMemberEntry, ProtoUpdateRegistryReq};
use crate::storage::DatabaseSnapshot;
use prost::Message;

#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("None of the {probed} candidate addresses knows a leader")]
    NoLeaderFound { probed: usize },
    #[error("Registering with leader at {address} failed: {source}")]
    Register { address: String, source: PeerCallError },
    #[error("Leader at {address} rejected registration: {message}")]
    Rejected { address: String, message: String },
    #[error("Leader sent an unreadable database snapshot: {0}")]
    CorruptSnapshot(#[from] prost::DecodeError),
}

/// Everything a new member needs from the leader to start serving.
#[derive(Debug)]
pub(crate) struct JoinOutcome {
    pub(crate) leader_id: MemberId,
    pub(crate) leader_address: String,
    pub(crate) members: Vec<Member>,
    pub(crate) snapshot: DatabaseSnapshot,
}

/// Addresses a joining member probes for a leader: every known host at every id below its own.
/// Lower ids come first since the leader is the lowest live id.
pub(crate) fn candidate_addresses(hosts: &[String], base_port: u16, me: MemberId) -> Vec<String> {
    let mut candidates = Vec::new();
    for id in 0..me.as_u64() {
        for host in hosts {
            if let Some(address) = member_address(host, base_port, MemberId::new(id)) {
                candidates.push(address);
            }
        }
    }

    candidates
}

/// One join attempt: find whoever answers "who is the leader" first, then register with that
/// leader and take its registry and tables.
pub(crate) async fn join_cluster<T: PeerTransport>(
    logger: &slog::Logger,
    transport: &T,
    candidates: &[String],
    me: &Member,
) -> Result<JoinOutcome, JoinError> {
    let (leader_id, leader_address) = find_leader(logger, transport, candidates).await?;
    slog::info!(logger, "Registering with leader {:?} at {}", leader_id, leader_address);

    let rpc_request = ProtoUpdateRegistryReq {
        id: me.id.as_u64(),
        timestamp_millis: me.last_heartbeat.as_millis(),
        address: me.address.clone(),
    };
    let rpc_reply = transport
        .update_registry(&leader_address, rpc_request)
        .await
        .map_err(|source| JoinError::Register {
            address: leader_address.clone(),
            source,
        })?;

    if !rpc_reply.success {
        return Err(JoinError::Rejected {
            address: leader_address,
            message: rpc_reply.message,
        });
    }

    let members = rpc_reply.members.into_iter().map(member_from_proto).collect();
    let snapshot = DatabaseSnapshot::decode(rpc_reply.database_snapshot.as_slice())?;

    Ok(JoinOutcome {
        leader_id,
        leader_address,
        members,
        snapshot,
    })
}

async fn find_leader<T: PeerTransport>(
    logger: &slog::Logger,
    transport: &T,
    candidates: &[String],
) -> Result<(MemberId, String), JoinError> {
    for candidate in candidates {
        match transport.get_leader(candidate).await {
            Ok(reply) if reply.success && !reply.leader_address.is_empty() => {
                slog::info!(logger, "{} reports leader {} at {}", candidate, reply.leader_id, reply.leader_address);
                return Ok((MemberId::new(reply.leader_id), reply.leader_address));
            }
            Ok(_) => slog::debug!(logger, "{} doesn't know a leader", candidate),
            Err(e) => slog::debug!(logger, "No answer from {}: {}", candidate, e),
        }
    }

    Err(JoinError::NoLeaderFound {
        probed: candidates.len(),
    })
}

pub(crate) fn member_from_proto(entry: ProtoMemberEntry) -> Member {
    Member::new(
        MemberId::new(entry.id),
        entry.address,
        Timestamp::from_millis(entry.timestamp_millis),
    )
}

pub(crate) fn member_to_proto(member: &Member) -> ProtoMemberEntry {
    ProtoMemberEntry {
        id: member.id.as_u64(),
        address: member.address.clone(),
        timestamp_millis: member.last_heartbeat.as_millis(),
    }
}
