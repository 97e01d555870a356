use crate::chat::{ApplyError, ChatNode, Origin, Pull};
use crate::grpc::grpc_chat_server::{GrpcChat, GrpcChatServer};
use crate::grpc::{
    ProtoAddDraftReq, ProtoAddDraftResult, ProtoCreateAccountReq, ProtoGenericResult, ProtoGetLeaderReq,
    ProtoGetLeaderResult, ProtoGetPasswordReq, ProtoGetPasswordResult, ProtoHeartbeatReq, ProtoHeartbeatResult,
    ProtoListAccountsReq, ProtoListAccountsResult, ProtoLiveMessage, ProtoLoginReq, ProtoLoginResult,
    ProtoMessageRefReq, ProtoReceiveMessageReq, ProtoReplicateReq, ProtoSaveDraftsReq, ProtoSendMessageReq,
    ProtoSendMessageResult, ProtoUpdateRegistryReq, ProtoUpdateRegistryResult, ProtoUsernameReq,
};
use crate::server::{FatalNotifier, ShutdownSignal};
use crate::storage::StorageError;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tokio_stream::wrappers::{ReceiverStream, TcpListenerStream};
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// RpcServer is the type that implements the chat gRPC interface, for clients and peers alike.
pub(crate) struct RpcServer {
    logger: slog::Logger,
    node: Arc<ChatNode>,
    fatal: FatalNotifier,
    shutdown: ShutdownSignal,
    delivery_poll_timeout: Duration,
}

impl RpcServer {
    pub(crate) fn new(
        logger: slog::Logger,
        node: Arc<ChatNode>,
        fatal: FatalNotifier,
        shutdown: ShutdownSignal,
        delivery_poll_timeout: Duration,
    ) -> Self {
        RpcServer {
            logger,
            node,
            fatal,
            shutdown,
            delivery_poll_timeout,
        }
    }

    /// Serves on an already bound listener until shutdown. Binding happens in the caller, so a
    /// port that is already taken fails member startup instead of this task.
    pub(crate) async fn run(self, listener: TcpListener) {
        let logger = self.logger.clone();
        let mut shutdown = self.shutdown.clone();
        slog::info!(logger, "Listening on '{:?}'", listener.local_addr());

        let result = Server::builder()
            .add_service(GrpcChatServer::new(self))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move { shutdown.wait().await })
            .await;

        slog::info!(logger, "Server run() has exited: {:?}", result);
    }

    fn storage_failure(&self, e: StorageError) -> Status {
        slog::crit!(self.logger, "Persistence failure while serving a request: {}", e);
        self.fatal.notify(format!("Persistence failure: {}", e));
        Status::internal("Local storage failure")
    }

    fn apply_failure(&self, e: ApplyError) -> Status {
        match e {
            ApplyError::Decode(e) => {
                slog::error!(self.logger, "Rejecting replicated operation: {}", e);
                Status::invalid_argument(e.to_string())
            }
            ApplyError::Storage(e) => self.storage_failure(e),
        }
    }

    /// Feeds one user's pending queue into a client stream, until the client goes away, the
    /// session ends, or the member shuts down.
    async fn pump_live_messages(
        logger: slog::Logger,
        node: Arc<ChatNode>,
        username: String,
        mut shutdown: ShutdownSignal,
        poll_timeout: Duration,
        tx: mpsc::Sender<Result<ProtoLiveMessage, Status>>,
    ) {
        let (stream, queue) = node.delivery().attach_stream(&username);
        slog::info!(logger, "Live delivery stream opened for '{}'", username);

        loop {
            let pulled = tokio::select! {
                _ = tx.closed() => break,
                _ = shutdown.wait() => break,
                pulled = queue.pull(stream, poll_timeout) => pulled,
            };

            match pulled {
                Pull::Message(live_message) => {
                    slog::debug!(logger, "ServerWire - {:?}", live_message);
                    if tx.send(Ok(live_message)).await.is_err() {
                        break;
                    }
                }
                Pull::TimedOut => {}
                Pull::Closed => break,
            }
        }

        if shutdown.is_shutdown() {
            // A clean end of stream means the session ended; this tells the client to fail over.
            let _ = tx.try_send(Err(Status::unavailable("Member is shutting down")));
        }

        if node.delivery().detach_stream(&username, stream) {
            slog::info!(logger, "Live delivery stream closed for '{}', session ended", username);
        } else {
            slog::debug!(logger, "Live delivery stream for '{}' was superseded", username);
        }
    }
}

#[async_trait::async_trait]
impl GrpcChat for RpcServer {
    async fn create_account(
        &self,
        rpc_request_wrapped: Request<ProtoCreateAccountReq>,
    ) -> Result<Response<ProtoGenericResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .create_account(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn login(&self, rpc_request_wrapped: Request<ProtoLoginReq>) -> Result<Response<ProtoLoginResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .login(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn get_password(
        &self,
        rpc_request_wrapped: Request<ProtoGetPasswordReq>,
    ) -> Result<Response<ProtoGetPasswordResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.node.get_password(rpc_request).map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn list_accounts(
        &self,
        rpc_request_wrapped: Request<ProtoListAccountsReq>,
    ) -> Result<Response<ProtoListAccountsResult>, Status> {
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request_wrapped.get_ref());
        let rpc_result = self.node.list_accounts().map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn send_message(
        &self,
        rpc_request_wrapped: Request<ProtoSendMessageReq>,
    ) -> Result<Response<ProtoSendMessageResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .send_message(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn add_draft(
        &self,
        rpc_request_wrapped: Request<ProtoAddDraftReq>,
    ) -> Result<Response<ProtoAddDraftResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .add_draft(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn save_drafts(
        &self,
        rpc_request_wrapped: Request<ProtoSaveDraftsReq>,
    ) -> Result<Response<ProtoGenericResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .save_drafts(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn check_message(
        &self,
        rpc_request_wrapped: Request<ProtoMessageRefReq>,
    ) -> Result<Response<ProtoGenericResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .check_message(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn download_message(
        &self,
        rpc_request_wrapped: Request<ProtoMessageRefReq>,
    ) -> Result<Response<ProtoGenericResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .download_message(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn delete_message(
        &self,
        rpc_request_wrapped: Request<ProtoMessageRefReq>,
    ) -> Result<Response<ProtoGenericResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .delete_message(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn delete_account(
        &self,
        rpc_request_wrapped: Request<ProtoUsernameReq>,
    ) -> Result<Response<ProtoGenericResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .delete_account(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn logout(
        &self,
        rpc_request_wrapped: Request<ProtoUsernameReq>,
    ) -> Result<Response<ProtoGenericResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .logout(rpc_request, Origin::Client)
            .await
            .map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    type ReceiveMessageStreamStream = ReceiverStream<Result<ProtoLiveMessage, Status>>;

    async fn receive_message_stream(
        &self,
        rpc_request_wrapped: Request<ProtoReceiveMessageReq>,
    ) -> Result<Response<Self::ReceiveMessageStreamStream>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);

        if self.shutdown.is_shutdown() {
            return Err(Status::unavailable("Member is shutting down"));
        }

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(Self::pump_live_messages(
            self.logger.new(slog::o!("Username" => rpc_request.username.clone())),
            self.node.clone(),
            rpc_request.username,
            self.shutdown.clone(),
            self.delivery_poll_timeout,
            tx,
        ));

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn replicate(
        &self,
        rpc_request_wrapped: Request<ProtoReplicateReq>,
    ) -> Result<Response<ProtoGenericResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.node.apply(rpc_request).await.map_err(|e| self.apply_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn heartbeat(
        &self,
        _rpc_request_wrapped: Request<ProtoHeartbeatReq>,
    ) -> Result<Response<ProtoHeartbeatResult>, Status> {
        // Not logged at debug, it would drown everything else.
        Ok(Response::new(ProtoHeartbeatResult { alive: true }))
    }

    async fn get_leader(
        &self,
        rpc_request_wrapped: Request<ProtoGetLeaderReq>,
    ) -> Result<Response<ProtoGetLeaderResult>, Status> {
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request_wrapped.get_ref());
        let rpc_result = self.node.get_leader().map_err(|e| self.storage_failure(e));
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn update_registry(
        &self,
        rpc_request_wrapped: Request<ProtoUpdateRegistryReq>,
    ) -> Result<Response<ProtoUpdateRegistryResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self
            .node
            .update_registry(rpc_request)
            .await
            .map_err(|e| self.storage_failure(e));
        // The reply carries the whole database, so only its size is logged.
        if let Ok(rpc_reply) = &rpc_result {
            slog::debug!(
                self.logger,
                "ServerWire - UpdateRegistry success={} members={} snapshot_bytes={}",
                rpc_reply.success,
                rpc_reply.members.len(),
                rpc_reply.database_snapshot.len()
            );
        }

        rpc_result.map(Response::new)
    }
}
