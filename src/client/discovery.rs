use crate::client::ClientError;
use crate::cluster::{member_address, MemberId};
use crate::grpc::grpc_chat_client::GrpcChatClient;
use crate::grpc::{ProtoGetLeaderReq, ProtoGetLeaderResult};
use rand::Rng;
use tokio::time::{Duration, Instant};
use tonic::transport::{Channel, Endpoint};
use tonic::Request;

/// A leader that confirmed its own leadership, with a connection to it.
pub(crate) struct Leader {
    pub(crate) id: MemberId,
    pub(crate) address: String,
    pub(crate) client: GrpcChatClient<Channel>,
}

/// Discovery finds the current leader by asking every `host:base_port+id` it can reach who leads.
#[derive(Clone)]
pub(crate) struct Discovery {
    logger: slog::Logger,
    hosts: Vec<String>,
    base_port: u16,
    max_member_id: u64,
    rpc_timeout: Duration,
    deadline: Duration,
    last_leader: Option<MemberId>,
}

impl Discovery {
    pub(crate) fn new(
        logger: slog::Logger,
        hosts: Vec<String>,
        base_port: u16,
        max_member_id: u64,
        rpc_timeout: Duration,
        deadline: Duration,
    ) -> Self {
        Discovery {
            logger,
            hosts,
            base_port,
            max_member_id,
            rpc_timeout,
            deadline,
            last_leader: None,
        }
    }

    pub(crate) fn rpc_timeout(&self) -> Duration {
        self.rpc_timeout
    }

    pub(crate) fn remember(&mut self, leader: MemberId) {
        self.last_leader = Some(leader);
    }

    /// Leader id a client configured with `address` would be talking to, if that address is one
    /// of ours.
    pub(crate) fn member_at(&self, address: &str) -> Option<MemberId> {
        let port: u16 = address.rsplit(':').next()?.parse().ok()?;
        port.checked_sub(self.base_port).map(|id| MemberId::new(u64::from(id)))
    }

    /// Probes in rounds until a leader confirms itself or the deadline passes. The first round
    /// starts at the last known leader's id, since a new leader always has a higher id than the
    /// one it replaced; later rounds scan from 0.
    pub(crate) async fn find_leader(&mut self) -> Result<Leader, ClientError> {
        let give_up_at = Instant::now() + self.deadline;
        let mut start = self.last_leader.map(MemberId::as_u64).unwrap_or(0);
        let mut probed = 0;
        let mut round: u32 = 0;

        loop {
            if let Some(leader) = self.probe_round(start, give_up_at, &mut probed).await {
                slog::info!(self.logger, "Leader is {:?} at {}", leader.id, leader.address);
                self.last_leader = Some(leader.id);
                return Ok(leader);
            }

            round += 1;
            let backoff = jittered_backoff(round);
            if Instant::now() + backoff >= give_up_at {
                slog::warn!(self.logger, "No leader found after {} rounds, {} probes", round, probed);
                return Err(ClientError::LeaderNotFound { probed });
            }
            slog::debug!(self.logger, "No leader in round {}, retrying in {:?}", round, backoff);
            tokio::time::sleep(backoff).await;
            start = 0;
        }
    }

    async fn probe_round(&self, start: u64, give_up_at: Instant, probed: &mut usize) -> Option<Leader> {
        for id in start..=self.max_member_id {
            for host in &self.hosts {
                if Instant::now() >= give_up_at {
                    return None;
                }
                let address = member_address(host, self.base_port, MemberId::new(id))?;
                *probed += 1;

                let reported = match self.ask(&address).await {
                    Ok((_, reply)) if reply.success && !reply.leader_address.is_empty() => reply,
                    Ok(_) => continue,
                    Err(e) => {
                        slog::trace!(self.logger, "No answer from {}: {}", address, e);
                        continue;
                    }
                };

                if let Some(leader) = self.confirm(&address, reported).await {
                    return Some(leader);
                }
            }
        }

        None
    }

    /// Asks the reported leader itself. Someone with a stale registry may point at a member that
    /// is already gone, or one that doesn't consider itself the leader yet.
    async fn confirm(&self, asked: &str, reported: ProtoGetLeaderResult) -> Option<Leader> {
        let reported_id = MemberId::new(reported.leader_id);
        match self.ask(&reported.leader_address).await {
            Ok((client, reply)) if reply.success && reply.leader_id == reported.leader_id => Some(Leader {
                id: reported_id,
                address: reported.leader_address,
                client,
            }),
            Ok((_, reply)) => {
                slog::debug!(
                    self.logger,
                    "{} named {:?} as leader, but it names {}",
                    asked,
                    reported_id,
                    reply.leader_id
                );
                None
            }
            Err(e) => {
                slog::debug!(self.logger, "{} named {:?} as leader, but it's unreachable: {}", asked, reported_id, e);
                None
            }
        }
    }

    async fn ask(&self, address: &str) -> Result<(GrpcChatClient<Channel>, ProtoGetLeaderResult), ClientError> {
        let asked = tokio::time::timeout(self.rpc_timeout, async {
            let mut client = connect(address).await?;
            let reply = client.get_leader(Request::new(ProtoGetLeaderReq {})).await?;
            Ok::<_, ClientError>((client, reply.into_inner()))
        })
        .await;

        match asked {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout),
        }
    }
}

pub(crate) async fn connect(address: &str) -> Result<GrpcChatClient<Channel>, ClientError> {
    let endpoint = Endpoint::from_shared(format!("http://{}", address))?;
    let channel = endpoint.connect().await?;
    Ok(GrpcChatClient::new(channel))
}

fn jittered_backoff(round: u32) -> Duration {
    let base_millis = 100u64.saturating_mul(1 << round.min(4));
    let jitter_millis = rand::thread_rng().gen_range(0..=base_millis / 2);
    Duration::from_millis(base_millis + jitter_millis)
}
