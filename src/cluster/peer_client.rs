use crate::cluster::MemberId;
use crate::grpc::grpc_chat_client::GrpcChatClient;
use crate::grpc::{
    ProtoGenericResult, ProtoGetLeaderReq, ProtoGetLeaderResult, ProtoHeartbeatReq, ProtoReplicateReq,
    ProtoUpdateRegistryReq, ProtoUpdateRegistryResult,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use tokio::time::Duration;
use tonic::codegen::http::uri;
use tonic::transport::{Channel, Endpoint};
use tonic::{Response, Status};

#[derive(Debug, thiserror::Error)]
pub enum PeerCallError {
    #[error("Invalid peer address: {0}")]
    InvalidAddress(#[from] uri::InvalidUri),
    #[error("Failed to connect to peer: {0}")]
    Connect(#[from] tonic::transport::Error),
    #[error("Peer call timed out")]
    Timeout,
    #[error("Peer call failed: {0}")]
    Status(#[from] Status),
}

/// Member-to-member calls. Every call is bounded by a timeout, so an unreachable peer surfaces as an
/// error rather than a hang.
#[async_trait::async_trait]
pub(crate) trait PeerTransport: Send + Sync + 'static {
    async fn heartbeat(&self, address: &str, from: MemberId) -> Result<bool, PeerCallError>;

    async fn replicate(&self, address: &str, request: ProtoReplicateReq) -> Result<ProtoGenericResult, PeerCallError>;

    async fn get_leader(&self, address: &str) -> Result<ProtoGetLeaderResult, PeerCallError>;

    async fn update_registry(
        &self,
        address: &str,
        request: ProtoUpdateRegistryReq,
    ) -> Result<ProtoUpdateRegistryResult, PeerCallError>;
}

/// PeerPool is the gRPC implementation of `PeerTransport`. It keeps one channel per peer address
/// and drops it after any failed call, so the next call reconnects from scratch.
pub(crate) struct PeerPool {
    logger: slog::Logger,
    rpc_timeout: Duration,
    clients: Mutex<HashMap<String, GrpcChatClient<Channel>>>,
}

impl PeerPool {
    pub(crate) fn new(logger: slog::Logger, rpc_timeout: Duration) -> Self {
        PeerPool {
            logger,
            rpc_timeout,
            clients: Mutex::new(HashMap::new()),
        }
    }

    async fn call<Req, Rep, F, Fut>(&self, address: &str, rpc_request: Req, rpc: F) -> Result<Rep, PeerCallError>
    where
        Req: std::fmt::Debug,
        Rep: std::fmt::Debug,
        F: FnOnce(GrpcChatClient<Channel>, Req) -> Fut,
        Fut: Future<Output = Result<Response<Rep>, Status>>,
    {
        let logger = self.logger.new(slog::o!("Peer" => address.to_string()));
        slog::debug!(logger, "ClientWire - {:?}", rpc_request);

        // One deadline covers connecting and the call itself.
        let rpc_reply = tokio::time::timeout(self.rpc_timeout, async {
            let client = self.client(address).await?;
            let reply = rpc(client, rpc_request).await?;
            Ok::<_, PeerCallError>(reply.into_inner())
        })
        .await;
        slog::debug!(logger, "ClientWire - {:?}", rpc_reply);

        match rpc_reply {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => {
                self.evict(address);
                Err(e)
            }
            Err(_) => {
                self.evict(address);
                Err(PeerCallError::Timeout)
            }
        }
    }

    async fn client(&self, address: &str) -> Result<GrpcChatClient<Channel>, PeerCallError> {
        if let Some(client) = self.cached(address) {
            return Ok(client);
        }

        let endpoint = Endpoint::from_shared(format!("http://{}", address))?;
        let connection = endpoint.connect().await?;
        let client = GrpcChatClient::new(connection);

        self.clients
            .lock()
            .expect("PeerPool mutex guard poison")
            .insert(address.to_string(), client.clone());

        Ok(client)
    }

    fn cached(&self, address: &str) -> Option<GrpcChatClient<Channel>> {
        self.clients
            .lock()
            .expect("PeerPool mutex guard poison")
            .get(address)
            .cloned()
    }

    fn evict(&self, address: &str) {
        self.clients.lock().expect("PeerPool mutex guard poison").remove(address);
    }
}

#[async_trait::async_trait]
impl PeerTransport for PeerPool {
    async fn heartbeat(&self, address: &str, from: MemberId) -> Result<bool, PeerCallError> {
        let rpc_request = ProtoHeartbeatReq { from_id: from.as_u64() };
        let reply = self
            .call(address, rpc_request, |mut client, req| async move { client.heartbeat(req).await })
            .await?;
        Ok(reply.alive)
    }

    async fn replicate(&self, address: &str, request: ProtoReplicateReq) -> Result<ProtoGenericResult, PeerCallError> {
        self.call(address, request, |mut client, req| async move { client.replicate(req).await })
            .await
    }

    async fn get_leader(&self, address: &str) -> Result<ProtoGetLeaderResult, PeerCallError> {
        let rpc_request = ProtoGetLeaderReq {};
        self.call(address, rpc_request, |mut client, req| async move { client.get_leader(req).await })
            .await
    }

    async fn update_registry(
        &self,
        address: &str,
        request: ProtoUpdateRegistryReq,
    ) -> Result<ProtoUpdateRegistryResult, PeerCallError> {
        self.call(address, request, |mut client, req| async move {
            client.update_registry(req).await
        })
        .await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashSet;

    /// In-memory stand-in for the network. Every address answers unless it was marked down.
    #[derive(Default)]
    pub(crate) struct MockTransport {
        state: Mutex<MockState>,
    }

    #[derive(Default)]
    struct MockState {
        down: HashSet<String>,
        heartbeats: Vec<String>,
        replicated: Vec<(String, ProtoReplicateReq)>,
        leaders: HashMap<String, ProtoGetLeaderResult>,
        registrations: HashMap<String, ProtoUpdateRegistryResult>,
    }

    impl MockTransport {
        pub(crate) fn set_down(&self, address: &str, down: bool) {
            let mut state = self.state.lock().unwrap();
            if down {
                state.down.insert(address.to_string());
            } else {
                state.down.remove(address);
            }
        }

        pub(crate) fn answer_get_leader(&self, address: &str, reply: ProtoGetLeaderResult) {
            self.state.lock().unwrap().leaders.insert(address.to_string(), reply);
        }

        pub(crate) fn answer_update_registry(&self, address: &str, reply: ProtoUpdateRegistryResult) {
            self.state
                .lock()
                .unwrap()
                .registrations
                .insert(address.to_string(), reply);
        }

        pub(crate) fn heartbeats(&self) -> Vec<String> {
            self.state.lock().unwrap().heartbeats.clone()
        }

        pub(crate) fn replicated(&self) -> Vec<(String, ProtoReplicateReq)> {
            self.state.lock().unwrap().replicated.clone()
        }

        fn check_up(&self, address: &str) -> Result<(), PeerCallError> {
            if self.state.lock().unwrap().down.contains(address) {
                Err(PeerCallError::Timeout)
            } else {
                Ok(())
            }
        }
    }

    #[async_trait::async_trait]
    impl PeerTransport for MockTransport {
        async fn heartbeat(&self, address: &str, _from: MemberId) -> Result<bool, PeerCallError> {
            self.check_up(address)?;
            self.state.lock().unwrap().heartbeats.push(address.to_string());
            Ok(true)
        }

        async fn replicate(
            &self,
            address: &str,
            request: ProtoReplicateReq,
        ) -> Result<ProtoGenericResult, PeerCallError> {
            self.check_up(address)?;
            self.state
                .lock()
                .unwrap()
                .replicated
                .push((address.to_string(), request));
            Ok(ProtoGenericResult {
                success: true,
                message: "Replication applied".to_string(),
            })
        }

        async fn get_leader(&self, address: &str) -> Result<ProtoGetLeaderResult, PeerCallError> {
            self.check_up(address)?;
            self.state
                .lock()
                .unwrap()
                .leaders
                .get(address)
                .cloned()
                .ok_or_else(|| PeerCallError::Status(Status::unavailable("nobody listening")))
        }

        async fn update_registry(
            &self,
            address: &str,
            _request: ProtoUpdateRegistryReq,
        ) -> Result<ProtoUpdateRegistryResult, PeerCallError> {
            self.check_up(address)?;
            self.state
                .lock()
                .unwrap()
                .registrations
                .get(address)
                .cloned()
                .ok_or_else(|| PeerCallError::Status(Status::unavailable("nobody listening")))
        }
    }
}
