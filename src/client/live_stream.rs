use crate::client::client::is_connectivity_status;
use crate::client::discovery::Discovery;
use crate::client::ClientError;
use crate::grpc::grpc_chat_client::GrpcChatClient;
use crate::grpc::{ProtoLiveMessage, ProtoReceiveMessageReq};
use tonic::transport::Channel;
use tonic::{Request, Streaming};

/// Messages pushed to one user as they arrive.
///
/// When the member serving the stream goes away, the stream is re-opened on the new leader.
/// Anything sent in between is not replayed; it is still in the user's inbox.
pub struct LiveMessageStream {
    logger: slog::Logger,
    discovery: Discovery,
    username: String,
    stream: Streaming<ProtoLiveMessage>,
}

impl LiveMessageStream {
    pub(crate) async fn open(
        logger: slog::Logger,
        discovery: Discovery,
        username: String,
        client: GrpcChatClient<Channel>,
    ) -> Result<Self, ClientError> {
        let stream = open_stream(&discovery, client, &username).await?;
        slog::info!(logger, "Live delivery stream open");

        Ok(LiveMessageStream {
            logger,
            discovery,
            username,
            stream,
        })
    }

    /// The next live message. `None` once the session ended, e.g. after a logout.
    pub async fn next(&mut self) -> Result<Option<ProtoLiveMessage>, ClientError> {
        loop {
            match self.stream.message().await {
                Ok(message) => return Ok(message),
                Err(status) if is_connectivity_status(&status) => {
                    slog::warn!(self.logger, "Live delivery stream broke, re-opening on the leader: {}", status);
                    self.reopen().await?;
                }
                Err(status) => return Err(ClientError::Status(status)),
            }
        }
    }

    async fn reopen(&mut self) -> Result<(), ClientError> {
        let leader = self.discovery.find_leader().await?;
        self.stream = open_stream(&self.discovery, leader.client, &self.username).await?;
        slog::info!(self.logger, "Live delivery stream re-opened on {:?} at {}", leader.id, leader.address);
        Ok(())
    }
}

async fn open_stream(
    discovery: &Discovery,
    mut client: GrpcChatClient<Channel>,
    username: &str,
) -> Result<Streaming<ProtoLiveMessage>, ClientError> {
    let rpc_request = ProtoReceiveMessageReq {
        username: username.to_string(),
    };
    match tokio::time::timeout(
        discovery.rpc_timeout(),
        client.receive_message_stream(Request::new(rpc_request)),
    )
    .await
    {
        Ok(Ok(response)) => Ok(response.into_inner()),
        Ok(Err(status)) => Err(ClientError::Status(status)),
        Err(_) => Err(ClientError::Timeout),
    }
}
