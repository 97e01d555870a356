use crate::client::discovery::{self, Discovery, Leader};
use crate::client::LiveMessageStream;
use crate::cluster::MemberId;
use crate::grpc::grpc_chat_client::GrpcChatClient;
use crate::grpc::{
    ProtoAddDraftReq, ProtoAddDraftResult, ProtoCreateAccountReq, ProtoDraft, ProtoGenericResult, ProtoGetLeaderReq,
    ProtoGetLeaderResult, ProtoGetPasswordReq, ProtoGetPasswordResult, ProtoListAccountsReq, ProtoListAccountsResult,
    ProtoLoginReq, ProtoLoginResult, ProtoMessageRefReq, ProtoSaveDraftsReq, ProtoSendMessageReq,
    ProtoSendMessageResult, ProtoUsernameReq,
};
use std::fmt::Debug;
use std::future::Future;
use tokio::time::Duration;
use tonic::codegen::http::uri;
use tonic::transport::Channel;
use tonic::{Code, Request, Response, Status};

pub struct ClientConfig {
    /// Hosts the cluster's members may run on.
    pub hosts: Vec<String>,
    pub base_port: u16,
    /// Highest member id probed during leader discovery.
    pub max_member_id: u64,
    /// Bounds each call, connecting included.
    pub rpc_timeout: Duration,
    /// How long leader discovery keeps probing before giving up.
    pub discovery_deadline: Duration,
    /// Connect here first instead of discovering the leader.
    pub initial_address: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            hosts: vec!["127.0.0.1".to_string()],
            base_port: 12300,
            max_member_id: 1000,
            rpc_timeout: Duration::from_secs(2),
            discovery_deadline: Duration::from_secs(30),
            initial_address: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No leader found before the discovery deadline, {probed} addresses probed")]
    LeaderNotFound { probed: usize },
    #[error("Invalid member address: {0}")]
    InvalidAddress(#[from] uri::InvalidUri),
    #[error("Failed to connect: {0}")]
    Connect(#[from] tonic::transport::Error),
    #[error("Call timed out")]
    Timeout,
    #[error("Call failed: {0}")]
    Status(#[from] Status),
}

impl ClientError {
    /// Whether the member we talked to may simply be gone, in which case a new leader is worth
    /// looking for.
    pub fn is_connectivity(&self) -> bool {
        match self {
            ClientError::Connect(_) | ClientError::Timeout => true,
            ClientError::Status(status) => is_connectivity_status(status),
            ClientError::LeaderNotFound { .. } | ClientError::InvalidAddress(_) => false,
        }
    }
}

pub(crate) fn is_connectivity_status(status: &Status) -> bool {
    matches!(
        status.code(),
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled | Code::Unknown
    )
}

struct Connection {
    leader_id: Option<MemberId>,
    address: String,
    client: GrpcChatClient<Channel>,
}

impl From<Leader> for Connection {
    fn from(leader: Leader) -> Self {
        Connection {
            leader_id: Some(leader.id),
            address: leader.address,
            client: leader.client,
        }
    }
}

/// ChatClient talks to the cluster's leader. A call that fails because the leader went away is
/// retried exactly once, against whichever member discovery finds leading next.
pub struct ChatClient {
    logger: slog::Logger,
    discovery: Discovery,
    connection: Option<Connection>,
}

impl ChatClient {
    /// Connects to `initial_address` when given, otherwise discovers the leader.
    pub async fn connect(logger: slog::Logger, config: ClientConfig) -> Result<Self, ClientError> {
        let discovery = Discovery::new(
            logger.new(slog::o!("Component" => "Discovery")),
            config.hosts,
            config.base_port,
            config.max_member_id,
            config.rpc_timeout,
            config.discovery_deadline,
        );
        let mut chat_client = ChatClient {
            logger,
            discovery,
            connection: None,
        };

        if let Some(address) = config.initial_address {
            match tokio::time::timeout(chat_client.discovery.rpc_timeout(), discovery::connect(&address)).await {
                Ok(Ok(client)) => {
                    let leader_id = chat_client.discovery.member_at(&address);
                    if let Some(id) = leader_id {
                        chat_client.discovery.remember(id);
                    }
                    chat_client.connection = Some(Connection {
                        leader_id,
                        address,
                        client,
                    });
                    return Ok(chat_client);
                }
                Ok(Err(e)) => slog::warn!(chat_client.logger, "Can't reach {}, discovering leader: {}", address, e),
                Err(_) => slog::warn!(chat_client.logger, "Timed out reaching {}, discovering leader", address),
            }
        }

        chat_client.reconnect().await?;
        Ok(chat_client)
    }

    /// Address of the member calls currently go to.
    pub fn connected_address(&self) -> Option<&str> {
        self.connection.as_ref().map(|connection| connection.address.as_str())
    }

    pub fn connected_leader(&self) -> Option<MemberId> {
        self.connection.as_ref().and_then(|connection| connection.leader_id)
    }

    pub async fn create_account(&mut self, username: &str, password_hash: &str) -> Result<ProtoGenericResult, ClientError> {
        let rpc_request = ProtoCreateAccountReq {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        self.call(rpc_request, |mut client, req| async move { client.create_account(Request::new(req)).await })
            .await
    }

    pub async fn login(&mut self, username: &str, password_hash: &str) -> Result<ProtoLoginResult, ClientError> {
        let rpc_request = ProtoLoginReq {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        self.call(rpc_request, |mut client, req| async move { client.login(Request::new(req)).await })
            .await
    }

    pub async fn get_password(&mut self, username: &str) -> Result<ProtoGetPasswordResult, ClientError> {
        let rpc_request = ProtoGetPasswordReq {
            username: username.to_string(),
        };
        self.call(rpc_request, |mut client, req| async move { client.get_password(Request::new(req)).await })
            .await
    }

    pub async fn list_accounts(&mut self) -> Result<ProtoListAccountsResult, ClientError> {
        self.call(ProtoListAccountsReq {}, |mut client, req| async move {
            client.list_accounts(Request::new(req)).await
        })
        .await
    }

    /// `draft_id` is the draft this message was written from, or 0.
    pub async fn send_message(
        &mut self,
        draft_id: u64,
        recipient: &str,
        sender: &str,
        content: &str,
    ) -> Result<ProtoSendMessageResult, ClientError> {
        let rpc_request = ProtoSendMessageReq {
            draft_id,
            recipient: recipient.to_string(),
            sender: sender.to_string(),
            content: content.to_string(),
        };
        self.call(rpc_request, |mut client, req| async move { client.send_message(Request::new(req)).await })
            .await
    }

    pub async fn add_draft(
        &mut self,
        username: &str,
        recipient: &str,
        message: &str,
        checked: bool,
    ) -> Result<ProtoAddDraftResult, ClientError> {
        let rpc_request = ProtoAddDraftReq {
            username: username.to_string(),
            recipient: recipient.to_string(),
            message: message.to_string(),
            checked,
        };
        self.call(rpc_request, |mut client, req| async move { client.add_draft(Request::new(req)).await })
            .await
    }

    /// Replaces every draft `username` has.
    pub async fn save_drafts(&mut self, username: &str, drafts: Vec<ProtoDraft>) -> Result<ProtoGenericResult, ClientError> {
        let rpc_request = ProtoSaveDraftsReq {
            username: username.to_string(),
            drafts,
        };
        self.call(rpc_request, |mut client, req| async move { client.save_drafts(Request::new(req)).await })
            .await
    }

    pub async fn check_message(&mut self, username: &str, msg_id: u64) -> Result<ProtoGenericResult, ClientError> {
        self.call(message_ref(username, msg_id), |mut client, req| async move {
            client.check_message(Request::new(req)).await
        })
        .await
    }

    pub async fn download_message(&mut self, username: &str, msg_id: u64) -> Result<ProtoGenericResult, ClientError> {
        self.call(message_ref(username, msg_id), |mut client, req| async move {
            client.download_message(Request::new(req)).await
        })
        .await
    }

    pub async fn delete_message(&mut self, username: &str, msg_id: u64) -> Result<ProtoGenericResult, ClientError> {
        self.call(message_ref(username, msg_id), |mut client, req| async move {
            client.delete_message(Request::new(req)).await
        })
        .await
    }

    pub async fn delete_account(&mut self, username: &str) -> Result<ProtoGenericResult, ClientError> {
        let rpc_request = ProtoUsernameReq {
            username: username.to_string(),
        };
        self.call(rpc_request, |mut client, req| async move { client.delete_account(Request::new(req)).await })
            .await
    }

    pub async fn logout(&mut self, username: &str) -> Result<ProtoGenericResult, ClientError> {
        let rpc_request = ProtoUsernameReq {
            username: username.to_string(),
        };
        self.call(rpc_request, |mut client, req| async move { client.logout(Request::new(req)).await })
            .await
    }

    /// Who the connected member believes leads.
    pub async fn get_leader(&mut self) -> Result<ProtoGetLeaderResult, ClientError> {
        self.call(ProtoGetLeaderReq {}, |mut client, req| async move {
            client.get_leader(Request::new(req)).await
        })
        .await
    }

    /// Opens the live-delivery stream for `username` on the current leader. The stream follows
    /// the leader on its own when it fails over.
    pub async fn subscribe(&mut self, username: &str) -> Result<LiveMessageStream, ClientError> {
        let client = match &self.connection {
            Some(connection) => connection.client.clone(),
            None => self.reconnect().await?,
        };

        LiveMessageStream::open(
            self.logger.new(slog::o!("Username" => username.to_string())),
            self.discovery.clone(),
            username.to_string(),
            client,
        )
        .await
    }

    async fn call<Req, Rep, F, Fut>(&mut self, rpc_request: Req, rpc: F) -> Result<Rep, ClientError>
    where
        Req: Clone + Debug,
        Rep: Debug,
        F: Fn(GrpcChatClient<Channel>, Req) -> Fut,
        Fut: Future<Output = Result<Response<Rep>, Status>>,
    {
        match self.call_once(rpc_request.clone(), &rpc).await {
            Err(e) if e.is_connectivity() => {
                slog::warn!(self.logger, "Lost the leader, rediscovering: {}", e);
                self.connection = None;
                self.reconnect().await?;
                self.call_once(rpc_request, &rpc).await
            }
            result => result,
        }
    }

    async fn call_once<Req, Rep, F, Fut>(&mut self, rpc_request: Req, rpc: &F) -> Result<Rep, ClientError>
    where
        Req: Debug,
        Rep: Debug,
        F: Fn(GrpcChatClient<Channel>, Req) -> Fut,
        Fut: Future<Output = Result<Response<Rep>, Status>>,
    {
        let client = match &self.connection {
            Some(connection) => connection.client.clone(),
            None => self.reconnect().await?,
        };

        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let rpc_reply = tokio::time::timeout(self.discovery.rpc_timeout(), rpc(client, rpc_request)).await;
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_reply);

        match rpc_reply {
            Ok(Ok(reply)) => Ok(reply.into_inner()),
            Ok(Err(status)) => Err(ClientError::Status(status)),
            Err(_) => Err(ClientError::Timeout),
        }
    }

    async fn reconnect(&mut self) -> Result<GrpcChatClient<Channel>, ClientError> {
        let leader = self.discovery.find_leader().await?;
        let client = leader.client.clone();
        self.connection = Some(Connection::from(leader));
        Ok(client)
    }
}

fn message_ref(username: &str, msg_id: u64) -> ProtoMessageRefReq {
    ProtoMessageRefReq {
        username: username.to_string(),
        msg_id,
    }
}
