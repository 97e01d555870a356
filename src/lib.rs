mod api;
mod chat;
mod client;
mod cluster;
mod logging;
mod server;
mod storage;
mod grpc {
    include!("../generated/chat.rs");
}

pub use api::start_member;
pub use api::LeaderEvent;
pub use api::LeaderListener;
pub use api::MemberConfig;
pub use api::MemberHandle;
pub use api::MemberOptions;
pub use api::MemberStartError;
pub use chat::DecodeOperationError;
pub use client::ChatClient;
pub use client::ClientConfig;
pub use client::ClientError;
pub use client::LiveMessageStream;
pub use cluster::member_address;
pub use cluster::member_port;
pub use cluster::resolve_leader;
pub use cluster::JoinError;
pub use cluster::Member;
pub use cluster::MemberHealth;
pub use cluster::MemberId;
pub use cluster::PeerCallError;
pub use cluster::Timestamp;
pub use grpc::ProtoAddDraftResult;
pub use grpc::ProtoDraft;
pub use grpc::ProtoGenericResult;
pub use grpc::ProtoGetLeaderResult;
pub use grpc::ProtoGetPasswordResult;
pub use grpc::ProtoListAccountsResult;
pub use grpc::ProtoLiveMessage;
pub use grpc::ProtoLoginResult;
pub use grpc::ProtoMessage;
pub use grpc::ProtoSendMessageResult;
pub use logging::create_root_logger_for_file;
pub use logging::create_root_logger_for_stdout;
pub use storage::StorageError;

// `lib.rs` and every `mod.rs` only hold `mod` and `pub use` statements. No `mod` is `pub`; types
// are exported one `use` at a time, so each module can be organized internally however it likes.
