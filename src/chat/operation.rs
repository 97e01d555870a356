use crate::grpc::{
    ProtoAddDraftReq, ProtoCreateAccountReq, ProtoLoginReq, ProtoMessageRefReq, ProtoRegistrySnapshot,
    ProtoReplicateReq, ProtoSaveDraftsReq, ProtoSendMessageReq, ProtoUsernameReq,
};
use prost::Message;

/// One replicated write. On the wire it travels as a `ProtoReplicateReq` whose payload is the
/// prost encoding of the request the client originally sent.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Operation {
    CreateAccount(ProtoCreateAccountReq),
    Login(ProtoLoginReq),
    SendMessage(ProtoSendMessageReq),
    AddDraft(ProtoAddDraftReq),
    SaveDrafts(ProtoSaveDraftsReq),
    CheckMessage(ProtoMessageRefReq),
    DownloadMessage(ProtoMessageRefReq),
    DeleteMessage(ProtoMessageRefReq),
    DeleteAccount(ProtoUsernameReq),
    Logout(ProtoUsernameReq),
    /// Registry broadcast a leader sends after someone joins.
    SyncRegistry(ProtoRegistrySnapshot),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeOperationError {
    #[error("Unknown replicated method '{0}'")]
    UnknownMethod(String),
    #[error("Malformed payload for replicated method '{method}': {source}")]
    MalformedPayload {
        method: &'static str,
        source: prost::DecodeError,
    },
}

impl Operation {
    pub(crate) fn method_name(&self) -> &'static str {
        match self {
            Operation::CreateAccount(_) => "CreateAccount",
            Operation::Login(_) => "Login",
            Operation::SendMessage(_) => "SendMessage",
            Operation::AddDraft(_) => "AddDraft",
            Operation::SaveDrafts(_) => "SaveDrafts",
            Operation::CheckMessage(_) => "CheckMessage",
            Operation::DownloadMessage(_) => "DownloadMessage",
            Operation::DeleteMessage(_) => "DeleteMessage",
            Operation::DeleteAccount(_) => "DeleteAccount",
            Operation::Logout(_) => "Logout",
            Operation::SyncRegistry(_) => "SyncRegistry",
        }
    }

    pub(crate) fn encode(&self) -> ProtoReplicateReq {
        let payload = match self {
            Operation::CreateAccount(req) => encode_payload(req),
            Operation::Login(req) => encode_payload(req),
            Operation::SendMessage(req) => encode_payload(req),
            Operation::AddDraft(req) => encode_payload(req),
            Operation::SaveDrafts(req) => encode_payload(req),
            Operation::CheckMessage(req) => encode_payload(req),
            Operation::DownloadMessage(req) => encode_payload(req),
            Operation::DeleteMessage(req) => encode_payload(req),
            Operation::DeleteAccount(req) => encode_payload(req),
            Operation::Logout(req) => encode_payload(req),
            Operation::SyncRegistry(req) => encode_payload(req),
        };

        ProtoReplicateReq {
            method_name: self.method_name().to_string(),
            payload,
        }
    }

    pub(crate) fn decode(rpc_request: &ProtoReplicateReq) -> Result<Self, DecodeOperationError> {
        let payload = rpc_request.payload.as_slice();
        let operation = match rpc_request.method_name.as_str() {
            "CreateAccount" => Operation::CreateAccount(decode_payload("CreateAccount", payload)?),
            "Login" => Operation::Login(decode_payload("Login", payload)?),
            "SendMessage" => Operation::SendMessage(decode_payload("SendMessage", payload)?),
            "AddDraft" => Operation::AddDraft(decode_payload("AddDraft", payload)?),
            "SaveDrafts" => Operation::SaveDrafts(decode_payload("SaveDrafts", payload)?),
            "CheckMessage" => Operation::CheckMessage(decode_payload("CheckMessage", payload)?),
            "DownloadMessage" => Operation::DownloadMessage(decode_payload("DownloadMessage", payload)?),
            "DeleteMessage" => Operation::DeleteMessage(decode_payload("DeleteMessage", payload)?),
            "DeleteAccount" => Operation::DeleteAccount(decode_payload("DeleteAccount", payload)?),
            "Logout" => Operation::Logout(decode_payload("Logout", payload)?),
            "SyncRegistry" => Operation::SyncRegistry(decode_payload("SyncRegistry", payload)?),
            unknown => return Err(DecodeOperationError::UnknownMethod(unknown.to_string())),
        };

        Ok(operation)
    }
}

fn encode_payload<M: Message>(message: &M) -> Vec<u8> {
    let mut buf = Vec::with_capacity(message.encoded_len());
    // A Vec grows as needed, so encoding into it can't run out of capacity.
    let _ = message.encode(&mut buf);
    buf
}

fn decode_payload<M: Message + Default>(method: &'static str, payload: &[u8]) -> Result<M, DecodeOperationError> {
    M::decode(payload).map_err(|source| DecodeOperationError::MalformedPayload { method, source })
}
