#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGenericResult {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoCreateAccountReq {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub password_hash: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLoginReq {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub password_hash: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLoginResult {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
    #[prost(uint64, tag = "3")]
    pub inbox_count: u64,
    #[prost(message, repeated, tag = "4")]
    pub old_messages: ::prost::alloc::vec::Vec<ProtoMessage>,
    #[prost(message, repeated, tag = "5")]
    pub inbox_messages: ::prost::alloc::vec::Vec<ProtoMessage>,
    #[prost(message, repeated, tag = "6")]
    pub drafts: ::prost::alloc::vec::Vec<ProtoDraft>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetPasswordReq {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetPasswordResult {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub password_hash: ::prost::alloc::string::String,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoListAccountsReq {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoListAccountsResult {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "3")]
    pub usernames: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoSendMessageReq {
    #[prost(uint64, tag = "1")]
    pub draft_id: u64,
    #[prost(string, tag = "2")]
    pub recipient: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub sender: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub content: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoSendMessageResult {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
    #[prost(uint64, tag = "3")]
    pub msg_id: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoAddDraftReq {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub recipient: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub message: ::prost::alloc::string::String,
    #[prost(bool, tag = "4")]
    pub checked: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoAddDraftResult {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
    #[prost(uint64, tag = "3")]
    pub draft_id: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoSaveDraftsReq {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub drafts: ::prost::alloc::vec::Vec<ProtoDraft>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoMessageRefReq {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub msg_id: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoUsernameReq {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReceiveMessageReq {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLiveMessage {
    #[prost(uint64, tag = "1")]
    pub msg_id: u64,
    #[prost(string, tag = "2")]
    pub username: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub sender: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub msg: ::prost::alloc::string::String,
    #[prost(uint64, tag = "5")]
    pub inbox_count: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoMessage {
    #[prost(uint64, tag = "1")]
    pub msg_id: u64,
    #[prost(string, tag = "2")]
    pub username: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub sender: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub msg: ::prost::alloc::string::String,
    #[prost(bool, tag = "5")]
    pub checked: bool,
    #[prost(bool, tag = "6")]
    pub inbox: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDraft {
    #[prost(uint64, tag = "1")]
    pub draft_id: u64,
    #[prost(string, tag = "2")]
    pub username: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub recipient: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub msg: ::prost::alloc::string::String,
    #[prost(bool, tag = "5")]
    pub checked: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoReplicateReq {
    #[prost(string, tag = "1")]
    pub method_name: ::prost::alloc::string::String,
    /// Prost encoding of the request message named by `method_name`.
    #[prost(bytes = "vec", tag = "2")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatReq {
    #[prost(uint64, tag = "1")]
    pub from_id: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatResult {
    #[prost(bool, tag = "1")]
    pub alive: bool,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetLeaderReq {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetLeaderResult {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(uint64, tag = "2")]
    pub leader_id: u64,
    #[prost(string, tag = "3")]
    pub leader_address: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoMemberEntry {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(string, tag = "2")]
    pub address: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub timestamp_millis: i64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegistrySnapshot {
    #[prost(message, repeated, tag = "1")]
    pub members: ::prost::alloc::vec::Vec<ProtoMemberEntry>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoUpdateRegistryReq {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(int64, tag = "2")]
    pub timestamp_millis: i64,
    #[prost(string, tag = "3")]
    pub address: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoUpdateRegistryResult {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub members: ::prost::alloc::vec::Vec<ProtoMemberEntry>,
    /// Prost encoded chat tables of the leader at registration time.
    #[prost(bytes = "vec", tag = "4")]
    pub database_snapshot: ::prost::alloc::vec::Vec<u8>,
}
#[doc = r" Generated client implementations."]
pub mod grpc_chat_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = " Single gRPC service per member process."]
    #[doc = ""]
    #[doc = " Client facing (chat):"]
    #[doc = " - CreateAccount, Login, SendMessage, AddDraft, SaveDrafts, CheckMessage, DownloadMessage,"]
    #[doc = "   DeleteMessage, DeleteAccount, Logout are writes. The leader replicates them."]
    #[doc = " - GetPassword, ListAccounts are reads served by any member."]
    #[doc = " - ReceiveMessageStream is the long-lived live-delivery pull."]
    #[doc = ""]
    #[doc = " Cluster internal:"]
    #[doc = " - Replicate applies a write that the leader already committed."]
    #[doc = " - Heartbeat, GetLeader, UpdateRegistry drive failure detection, discovery and joins."]
    pub struct GrpcChatClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcChatClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcChatClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        pub async fn create_account(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoCreateAccountReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/CreateAccount");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn login(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoLoginReq>,
        ) -> Result<tonic::Response<super::ProtoLoginResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/Login");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn get_password(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoGetPasswordReq>,
        ) -> Result<tonic::Response<super::ProtoGetPasswordResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/GetPassword");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn list_accounts(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoListAccountsReq>,
        ) -> Result<tonic::Response<super::ProtoListAccountsResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/ListAccounts");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn send_message(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoSendMessageReq>,
        ) -> Result<tonic::Response<super::ProtoSendMessageResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/SendMessage");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn add_draft(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoAddDraftReq>,
        ) -> Result<tonic::Response<super::ProtoAddDraftResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/AddDraft");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn save_drafts(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoSaveDraftsReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/SaveDrafts");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn check_message(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoMessageRefReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/CheckMessage");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn download_message(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoMessageRefReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/DownloadMessage");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn delete_message(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoMessageRefReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/DeleteMessage");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn delete_account(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoUsernameReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/DeleteAccount");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn logout(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoUsernameReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/Logout");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn receive_message_stream(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoReceiveMessageReq>,
        ) -> Result<tonic::Response<tonic::codec::Streaming<super::ProtoLiveMessage>>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/ReceiveMessageStream");
            self.inner
                .server_streaming(request.into_request(), path, codec)
                .await
        }
        pub async fn replicate(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoReplicateReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/Replicate");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn heartbeat(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoHeartbeatReq>,
        ) -> Result<tonic::Response<super::ProtoHeartbeatResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/Heartbeat");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn get_leader(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoGetLeaderReq>,
        ) -> Result<tonic::Response<super::ProtoGetLeaderResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/GetLeader");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn update_registry(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoUpdateRegistryReq>,
        ) -> Result<tonic::Response<super::ProtoUpdateRegistryResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/chat.GrpcChat/UpdateRegistry");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcChatClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcChatClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcChatClient {{ ... }}")
        }
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_chat_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcChatServer."]
    #[async_trait]
    pub trait GrpcChat: Send + Sync + 'static {
        async fn create_account(
            &self,
            request: tonic::Request<super::ProtoCreateAccountReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status>;
        async fn login(
            &self,
            request: tonic::Request<super::ProtoLoginReq>,
        ) -> Result<tonic::Response<super::ProtoLoginResult>, tonic::Status>;
        async fn get_password(
            &self,
            request: tonic::Request<super::ProtoGetPasswordReq>,
        ) -> Result<tonic::Response<super::ProtoGetPasswordResult>, tonic::Status>;
        async fn list_accounts(
            &self,
            request: tonic::Request<super::ProtoListAccountsReq>,
        ) -> Result<tonic::Response<super::ProtoListAccountsResult>, tonic::Status>;
        async fn send_message(
            &self,
            request: tonic::Request<super::ProtoSendMessageReq>,
        ) -> Result<tonic::Response<super::ProtoSendMessageResult>, tonic::Status>;
        async fn add_draft(
            &self,
            request: tonic::Request<super::ProtoAddDraftReq>,
        ) -> Result<tonic::Response<super::ProtoAddDraftResult>, tonic::Status>;
        async fn save_drafts(
            &self,
            request: tonic::Request<super::ProtoSaveDraftsReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status>;
        async fn check_message(
            &self,
            request: tonic::Request<super::ProtoMessageRefReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status>;
        async fn download_message(
            &self,
            request: tonic::Request<super::ProtoMessageRefReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status>;
        async fn delete_message(
            &self,
            request: tonic::Request<super::ProtoMessageRefReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status>;
        async fn delete_account(
            &self,
            request: tonic::Request<super::ProtoUsernameReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status>;
        async fn logout(
            &self,
            request: tonic::Request<super::ProtoUsernameReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status>;
        #[doc = "Server streaming response type for the ReceiveMessageStream method."]
        type ReceiveMessageStreamStream: futures_core::Stream<Item = Result<super::ProtoLiveMessage, tonic::Status>>
            + Send
            + Sync
            + 'static;
        async fn receive_message_stream(
            &self,
            request: tonic::Request<super::ProtoReceiveMessageReq>,
        ) -> Result<tonic::Response<Self::ReceiveMessageStreamStream>, tonic::Status>;
        async fn replicate(
            &self,
            request: tonic::Request<super::ProtoReplicateReq>,
        ) -> Result<tonic::Response<super::ProtoGenericResult>, tonic::Status>;
        async fn heartbeat(
            &self,
            request: tonic::Request<super::ProtoHeartbeatReq>,
        ) -> Result<tonic::Response<super::ProtoHeartbeatResult>, tonic::Status>;
        async fn get_leader(
            &self,
            request: tonic::Request<super::ProtoGetLeaderReq>,
        ) -> Result<tonic::Response<super::ProtoGetLeaderResult>, tonic::Status>;
        async fn update_registry(
            &self,
            request: tonic::Request<super::ProtoUpdateRegistryReq>,
        ) -> Result<tonic::Response<super::ProtoUpdateRegistryResult>, tonic::Status>;
    }
    #[doc = " Single gRPC service per member process."]
    #[doc = ""]
    #[doc = " Client facing (chat):"]
    #[doc = " - CreateAccount, Login, SendMessage, AddDraft, SaveDrafts, CheckMessage, DownloadMessage,"]
    #[doc = "   DeleteMessage, DeleteAccount, Logout are writes. The leader replicates them."]
    #[doc = " - GetPassword, ListAccounts are reads served by any member."]
    #[doc = " - ReceiveMessageStream is the long-lived live-delivery pull."]
    #[doc = ""]
    #[doc = " Cluster internal:"]
    #[doc = " - Replicate applies a write that the leader already committed."]
    #[doc = " - Heartbeat, GetLeader, UpdateRegistry drive failure detection, discovery and joins."]
    #[derive(Debug)]
    pub struct GrpcChatServer<T: GrpcChat> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcChat> GrpcChatServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcChatServer<T>
    where
        T: GrpcChat,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/chat.GrpcChat/CreateAccount" => {
                    #[allow(non_camel_case_types)]
                    struct CreateAccountSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoCreateAccountReq>
                        for CreateAccountSvc<T>
                    {
                        type Response = super::ProtoGenericResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoCreateAccountReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).create_account(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = CreateAccountSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/Login" => {
                    #[allow(non_camel_case_types)]
                    struct LoginSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoLoginReq> for LoginSvc<T> {
                        type Response = super::ProtoLoginResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoLoginReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).login(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = LoginSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/GetPassword" => {
                    #[allow(non_camel_case_types)]
                    struct GetPasswordSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoGetPasswordReq> for GetPasswordSvc<T> {
                        type Response = super::ProtoGetPasswordResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoGetPasswordReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).get_password(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = GetPasswordSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/ListAccounts" => {
                    #[allow(non_camel_case_types)]
                    struct ListAccountsSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoListAccountsReq> for ListAccountsSvc<T> {
                        type Response = super::ProtoListAccountsResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoListAccountsReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).list_accounts(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ListAccountsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/SendMessage" => {
                    #[allow(non_camel_case_types)]
                    struct SendMessageSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoSendMessageReq> for SendMessageSvc<T> {
                        type Response = super::ProtoSendMessageResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoSendMessageReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).send_message(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = SendMessageSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/AddDraft" => {
                    #[allow(non_camel_case_types)]
                    struct AddDraftSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoAddDraftReq> for AddDraftSvc<T> {
                        type Response = super::ProtoAddDraftResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoAddDraftReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).add_draft(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = AddDraftSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/SaveDrafts" => {
                    #[allow(non_camel_case_types)]
                    struct SaveDraftsSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoSaveDraftsReq> for SaveDraftsSvc<T> {
                        type Response = super::ProtoGenericResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoSaveDraftsReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).save_drafts(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = SaveDraftsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/CheckMessage" => {
                    #[allow(non_camel_case_types)]
                    struct CheckMessageSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoMessageRefReq> for CheckMessageSvc<T> {
                        type Response = super::ProtoGenericResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoMessageRefReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).check_message(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = CheckMessageSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/DownloadMessage" => {
                    #[allow(non_camel_case_types)]
                    struct DownloadMessageSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoMessageRefReq> for DownloadMessageSvc<T> {
                        type Response = super::ProtoGenericResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoMessageRefReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).download_message(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = DownloadMessageSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/DeleteMessage" => {
                    #[allow(non_camel_case_types)]
                    struct DeleteMessageSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoMessageRefReq> for DeleteMessageSvc<T> {
                        type Response = super::ProtoGenericResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoMessageRefReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).delete_message(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = DeleteMessageSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/DeleteAccount" => {
                    #[allow(non_camel_case_types)]
                    struct DeleteAccountSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoUsernameReq> for DeleteAccountSvc<T> {
                        type Response = super::ProtoGenericResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoUsernameReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).delete_account(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = DeleteAccountSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/Logout" => {
                    #[allow(non_camel_case_types)]
                    struct LogoutSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoUsernameReq> for LogoutSvc<T> {
                        type Response = super::ProtoGenericResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoUsernameReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).logout(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = LogoutSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/ReceiveMessageStream" => {
                    #[allow(non_camel_case_types)]
                    struct ReceiveMessageStreamSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat>
                        tonic::server::ServerStreamingService<super::ProtoReceiveMessageReq>
                        for ReceiveMessageStreamSvc<T>
                    {
                        type Response = super::ProtoLiveMessage;
                        type ResponseStream = T::ReceiveMessageStreamStream;
                        type Future =
                            BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoReceiveMessageReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).receive_message_stream(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1;
                        let inner = inner.0;
                        let method = ReceiveMessageStreamSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.server_streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/Replicate" => {
                    #[allow(non_camel_case_types)]
                    struct ReplicateSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoReplicateReq> for ReplicateSvc<T> {
                        type Response = super::ProtoGenericResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoReplicateReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).replicate(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ReplicateSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/Heartbeat" => {
                    #[allow(non_camel_case_types)]
                    struct HeartbeatSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoHeartbeatReq> for HeartbeatSvc<T> {
                        type Response = super::ProtoHeartbeatResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoHeartbeatReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).heartbeat(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = HeartbeatSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/GetLeader" => {
                    #[allow(non_camel_case_types)]
                    struct GetLeaderSvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoGetLeaderReq> for GetLeaderSvc<T> {
                        type Response = super::ProtoGetLeaderResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoGetLeaderReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).get_leader(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = GetLeaderSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/chat.GrpcChat/UpdateRegistry" => {
                    #[allow(non_camel_case_types)]
                    struct UpdateRegistrySvc<T: GrpcChat>(pub Arc<T>);
                    impl<T: GrpcChat> tonic::server::UnaryService<super::ProtoUpdateRegistryReq>
                        for UpdateRegistrySvc<T>
                    {
                        type Response = super::ProtoUpdateRegistryResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoUpdateRegistryReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).update_registry(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = UpdateRegistrySvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcChat> Clone for GrpcChatServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcChat> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcChat> tonic::transport::NamedService for GrpcChatServer<T> {
        const NAME: &'static str = "chat.GrpcChat";
    }
}
