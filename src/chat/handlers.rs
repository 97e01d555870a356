use crate::chat::delivery::DeliveryHub;
use crate::chat::operation::{DecodeOperationError, Operation};
use crate::cluster::{
    member_from_proto, member_to_proto, Clock, LeaderCache, Member, MemberId, PeerPool, PeerTransport, RealClock,
    ReplicationCoordinator,
};
use crate::grpc::{
    ProtoAddDraftReq, ProtoAddDraftResult, ProtoCreateAccountReq, ProtoDraft, ProtoGenericResult,
    ProtoGetLeaderResult, ProtoGetPasswordReq, ProtoGetPasswordResult, ProtoListAccountsResult, ProtoLiveMessage,
    ProtoLoginReq, ProtoLoginResult, ProtoMessage, ProtoMessageRefReq, ProtoRegistrySnapshot, ProtoReplicateReq,
    ProtoSaveDraftsReq, ProtoSendMessageReq, ProtoSendMessageResult, ProtoUpdateRegistryReq,
    ProtoUpdateRegistryResult, ProtoUsernameReq,
};
use crate::storage::{ChatStore, CreateAccountOutcome, DraftRow, MessageRow, Registry, StorageError};
use prost::Message;
use std::sync::Arc;

/// Where a write came from. Only client writes that land on the leader are replicated.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Origin {
    Client,
    Replication,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApplyError {
    #[error(transparent)]
    Decode(#[from] DecodeOperationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// ChatNode is one member's chat service: the write handlers, the replica side apply dispatch,
/// and the membership calls that need the chat tables.
///
/// Every handler runs the write locally first. A client write handled by the leader is then
/// fanned out before the handler returns.
pub(crate) struct ChatNode<T: PeerTransport = PeerPool, C: Clock = RealClock> {
    logger: slog::Logger,
    store: ChatStore,
    registry: Arc<Registry>,
    leader: Arc<LeaderCache>,
    replication: ReplicationCoordinator<T, C>,
    delivery: DeliveryHub,
    clock: C,
}

impl<T: PeerTransport, C: Clock> ChatNode<T, C> {
    pub(crate) fn new(
        logger: slog::Logger,
        store: ChatStore,
        registry: Arc<Registry>,
        leader: Arc<LeaderCache>,
        replication: ReplicationCoordinator<T, C>,
        clock: C,
    ) -> Self {
        ChatNode {
            logger,
            store,
            registry,
            leader,
            replication,
            delivery: DeliveryHub::new(),
            clock,
        }
    }

    pub(crate) fn delivery(&self) -> &DeliveryHub {
        &self.delivery
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &ChatStore {
        &self.store
    }

    pub(crate) async fn create_account(
        &self,
        request: ProtoCreateAccountReq,
        origin: Origin,
    ) -> Result<ProtoGenericResult, StorageError> {
        match self.store.create_account(&request.username, &request.password_hash)? {
            CreateAccountOutcome::UsernameTaken => return Ok(generic(false, "Username already exists")),
            CreateAccountOutcome::Created => {}
        }

        self.delivery.open_session(&request.username);
        self.replicate(origin, Operation::CreateAccount(request)).await?;
        Ok(generic(true, "Account created successfully"))
    }

    pub(crate) async fn login(&self, request: ProtoLoginReq, origin: Origin) -> Result<ProtoLoginResult, StorageError> {
        let data = match self.store.login(&request.username, &request.password_hash)? {
            Some(data) => data,
            None => {
                slog::info!(self.logger, "Login with invalid credentials for '{}'", request.username);
                return Ok(ProtoLoginResult {
                    success: false,
                    message: "Invalid credentials".to_string(),
                    ..ProtoLoginResult::default()
                });
            }
        };

        self.delivery.open_session(&request.username);
        self.replicate(origin, Operation::Login(request)).await?;

        Ok(ProtoLoginResult {
            success: true,
            message: "Login successful".to_string(),
            inbox_count: data.inbox_messages.len() as u64,
            old_messages: data.old_messages.into_iter().map(message_to_proto).collect(),
            inbox_messages: data.inbox_messages.into_iter().map(message_to_proto).collect(),
            drafts: data.drafts.into_iter().map(draft_to_proto).collect(),
        })
    }

    pub(crate) fn get_password(&self, request: ProtoGetPasswordReq) -> Result<ProtoGetPasswordResult, StorageError> {
        let rpc_reply = match self.store.password_hash(&request.username)? {
            Some(password_hash) => ProtoGetPasswordResult {
                success: true,
                message: "Password found".to_string(),
                password_hash,
            },
            None => ProtoGetPasswordResult {
                success: false,
                message: "User does not exist".to_string(),
                password_hash: String::new(),
            },
        };

        Ok(rpc_reply)
    }

    pub(crate) fn list_accounts(&self) -> Result<ProtoListAccountsResult, StorageError> {
        Ok(ProtoListAccountsResult {
            success: true,
            message: "Accounts fetched".to_string(),
            usernames: self.store.list_usernames()?,
        })
    }

    pub(crate) async fn send_message(
        &self,
        request: ProtoSendMessageReq,
        origin: Origin,
    ) -> Result<ProtoSendMessageResult, StorageError> {
        let stored = match self
            .store
            .send_message(request.draft_id, &request.recipient, &request.sender, &request.content)?
        {
            Some(stored) => stored,
            None => {
                return Ok(ProtoSendMessageResult {
                    success: false,
                    message: "Recipient does not exist".to_string(),
                    msg_id: 0,
                })
            }
        };

        let live_message = ProtoLiveMessage {
            msg_id: stored.msg_id,
            username: request.recipient.clone(),
            sender: request.sender.clone(),
            msg: request.content.clone(),
            inbox_count: stored.inbox_count,
        };
        if self.delivery.push(&request.recipient, live_message) {
            slog::debug!(self.logger, "Queued message {} for '{}'", stored.msg_id, request.recipient);
        }

        self.replicate(origin, Operation::SendMessage(request)).await?;
        Ok(ProtoSendMessageResult {
            success: true,
            message: "Message sent".to_string(),
            msg_id: stored.msg_id,
        })
    }

    pub(crate) async fn add_draft(
        &self,
        request: ProtoAddDraftReq,
        origin: Origin,
    ) -> Result<ProtoAddDraftResult, StorageError> {
        let draft_id = self
            .store
            .add_draft(&request.username, &request.recipient, &request.message, request.checked)?;

        self.replicate(origin, Operation::AddDraft(request)).await?;
        Ok(ProtoAddDraftResult {
            success: true,
            message: "Draft added".to_string(),
            draft_id,
        })
    }

    pub(crate) async fn save_drafts(
        &self,
        request: ProtoSaveDraftsReq,
        origin: Origin,
    ) -> Result<ProtoGenericResult, StorageError> {
        let drafts: Vec<(String, String)> = request
            .drafts
            .iter()
            .map(|draft| (draft.recipient.clone(), draft.msg.clone()))
            .collect();
        self.store.save_drafts(&request.username, &drafts)?;

        self.replicate(origin, Operation::SaveDrafts(request)).await?;
        Ok(generic(true, "Draft saved"))
    }

    pub(crate) async fn check_message(
        &self,
        request: ProtoMessageRefReq,
        origin: Origin,
    ) -> Result<ProtoGenericResult, StorageError> {
        self.store.mark_checked(&request.username, request.msg_id)?;
        self.replicate(origin, Operation::CheckMessage(request)).await?;
        Ok(generic(true, "Message checked as read"))
    }

    pub(crate) async fn download_message(
        &self,
        request: ProtoMessageRefReq,
        origin: Origin,
    ) -> Result<ProtoGenericResult, StorageError> {
        self.store.mark_downloaded(&request.username, request.msg_id)?;
        self.replicate(origin, Operation::DownloadMessage(request)).await?;
        Ok(generic(true, "Message downloaded from inbox"))
    }

    pub(crate) async fn delete_message(
        &self,
        request: ProtoMessageRefReq,
        origin: Origin,
    ) -> Result<ProtoGenericResult, StorageError> {
        self.store.delete_message(request.msg_id)?;
        self.replicate(origin, Operation::DeleteMessage(request)).await?;
        Ok(generic(true, "Message deleted"))
    }

    pub(crate) async fn delete_account(
        &self,
        request: ProtoUsernameReq,
        origin: Origin,
    ) -> Result<ProtoGenericResult, StorageError> {
        self.delivery.close_session(&request.username);
        self.store.delete_account(&request.username)?;
        self.replicate(origin, Operation::DeleteAccount(request)).await?;
        Ok(generic(true, "Account and all messages deleted"))
    }

    pub(crate) async fn logout(&self, request: ProtoUsernameReq, origin: Origin) -> Result<ProtoGenericResult, StorageError> {
        self.delivery.close_session(&request.username);
        self.store.logout(&request.username)?;
        self.replicate(origin, Operation::Logout(request)).await?;
        Ok(generic(true, "Logged out successfully"))
    }

    /// Replica side of replication: decodes the operation and runs the same handler a client call
    /// would, without replicating it any further.
    pub(crate) async fn apply(&self, rpc_request: ProtoReplicateReq) -> Result<ProtoGenericResult, ApplyError> {
        let operation = Operation::decode(&rpc_request)?;
        slog::debug!(self.logger, "Applying replicated {}", operation.method_name());

        let origin = Origin::Replication;
        let rpc_reply = match operation {
            Operation::CreateAccount(req) => self.create_account(req, origin).await?,
            Operation::Login(req) => {
                let reply = self.login(req, origin).await?;
                generic(reply.success, &reply.message)
            }
            Operation::SendMessage(req) => {
                let reply = self.send_message(req, origin).await?;
                generic(reply.success, &reply.message)
            }
            Operation::AddDraft(req) => {
                let reply = self.add_draft(req, origin).await?;
                generic(reply.success, &reply.message)
            }
            Operation::SaveDrafts(req) => self.save_drafts(req, origin).await?,
            Operation::CheckMessage(req) => self.check_message(req, origin).await?,
            Operation::DownloadMessage(req) => self.download_message(req, origin).await?,
            Operation::DeleteMessage(req) => self.delete_message(req, origin).await?,
            Operation::DeleteAccount(req) => self.delete_account(req, origin).await?,
            Operation::Logout(req) => self.logout(req, origin).await?,
            Operation::SyncRegistry(snapshot) => self.sync_registry(snapshot)?,
        };

        if !rpc_reply.success {
            // The leader only replicates writes that succeeded, so our tables have drifted.
            slog::warn!(self.logger, "Replicated write was refused locally: {}", rpc_reply.message);
        }
        Ok(generic(true, "Replication applied"))
    }

    fn sync_registry(&self, snapshot: ProtoRegistrySnapshot) -> Result<ProtoGenericResult, StorageError> {
        let members: Vec<Member> = snapshot.members.into_iter().map(member_from_proto).collect();
        let written = self.registry.merge(&members, self.leader.me(), self.clock.now())?;
        slog::info!(self.logger, "Merged registry broadcast, {} member rows updated", written);
        self.refresh_leader()?;
        Ok(generic(true, "Registry synchronized"))
    }

    /// Registers a joining member. The joiner gets the whole registry and a copy of the chat
    /// tables back; everyone else gets the new registry through the replication path.
    pub(crate) async fn update_registry(
        &self,
        request: ProtoUpdateRegistryReq,
    ) -> Result<ProtoUpdateRegistryResult, StorageError> {
        let joiner_id = MemberId::new(request.id);
        if joiner_id == self.leader.me() {
            return Ok(ProtoUpdateRegistryResult {
                success: false,
                message: format!("Member id {} is already taken by this member", joiner_id),
                ..ProtoUpdateRegistryResult::default()
            });
        }

        // Ages are only ever measured against our clock, so the joiner's own timestamp is ignored.
        let joiner = Member::new(joiner_id, request.address, self.clock.now());
        self.registry.upsert(&joiner)?;
        slog::info!(self.logger, "Member {:?} at {} joined", joiner.id, joiner.address);
        self.refresh_leader()?;

        let members = self.registry.get()?;
        let snapshot = self.store.snapshot()?;
        let mut database_snapshot = Vec::with_capacity(snapshot.encoded_len());
        // A Vec grows as needed, so encoding into it can't run out of capacity.
        let _ = snapshot.encode(&mut database_snapshot);

        let broadcast = Operation::SyncRegistry(ProtoRegistrySnapshot {
            members: members.iter().map(member_to_proto).collect(),
        });
        let report = self.replication.fan_out(&broadcast.encode(), &[joiner.id]).await?;
        slog::debug!(self.logger, "Registry broadcast: {:?}", report);

        Ok(ProtoUpdateRegistryResult {
            success: true,
            message: "Registered".to_string(),
            members: members.iter().map(member_to_proto).collect(),
            database_snapshot,
        })
    }

    /// Who this member believes leads. `success` is false while the leader's row is missing.
    pub(crate) fn get_leader(&self) -> Result<ProtoGetLeaderResult, StorageError> {
        let leader = match self.leader.current() {
            Some(leader) => leader,
            None => return Ok(ProtoGetLeaderResult::default()),
        };

        let rpc_reply = match self.registry.member(leader)? {
            Some(member) => ProtoGetLeaderResult {
                success: true,
                leader_id: member.id.as_u64(),
                leader_address: member.address,
            },
            None => ProtoGetLeaderResult::default(),
        };

        Ok(rpc_reply)
    }

    pub(crate) fn refresh_leader(&self) -> Result<(), StorageError> {
        if let Some(new_leader) = self.leader.resolve_from(&self.registry.get()?) {
            slog::info!(self.logger, "Member {:?} becoming the new leader", new_leader);
        }
        Ok(())
    }

    async fn replicate(&self, origin: Origin, operation: Operation) -> Result<(), StorageError> {
        if origin == Origin::Replication {
            return Ok(());
        }

        if let Some(report) = self.replication.replicate_if_leader(&operation.encode()).await? {
            slog::debug!(self.logger, "Replicated {}: {:?}", operation.method_name(), report);
        }
        Ok(())
    }
}

fn generic(success: bool, message: &str) -> ProtoGenericResult {
    ProtoGenericResult {
        success,
        message: message.to_string(),
    }
}

fn message_to_proto(row: MessageRow) -> ProtoMessage {
    ProtoMessage {
        msg_id: row.id,
        username: row.username,
        sender: row.sender,
        msg: row.msg,
        checked: row.checked,
        inbox: row.inbox,
    }
}

fn draft_to_proto(row: DraftRow) -> ProtoDraft {
    ProtoDraft {
        draft_id: row.id,
        username: row.username,
        recipient: row.recipient,
        msg: row.msg,
        checked: row.checked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Pull;
    use crate::cluster::{mocked_clock, MockClock, MockClockController, MockTransport, Timestamp};
    use crate::storage::Database;
    use tokio::time::Duration;

    fn address(id: u64) -> String {
        format!("localhost:{}", 50051 + id)
    }

    struct Fixture {
        node: ChatNode<MockTransport, MockClock>,
        registry: Arc<Registry>,
        transport: Arc<MockTransport>,
        controller: MockClockController,
    }

    fn node(me: u64, ids: &[u64]) -> Fixture {
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let (clock, controller) = mocked_clock();
        let database = Database::open_temporary().unwrap();
        let registry = Arc::new(Registry::open(&database).unwrap());
        let members: Vec<Member> = ids
            .iter()
            .map(|id| Member::new(MemberId::new(*id), address(*id), clock.now()))
            .collect();
        registry.replace_all(&members).unwrap();
        let leader = Arc::new(LeaderCache::new(MemberId::new(me), crate::cluster::resolve_leader(&members)));
        let transport = Arc::new(MockTransport::default());
        let replication = ReplicationCoordinator::new(
            logger.clone(),
            registry.clone(),
            leader.clone(),
            transport.clone(),
            clock.clone(),
            Duration::from_secs(10),
        );
        let store = ChatStore::open(&database).unwrap();

        Fixture {
            node: ChatNode::new(logger, store, registry.clone(), leader, replication, clock),
            registry,
            transport,
            controller,
        }
    }

    fn create(username: &str) -> ProtoCreateAccountReq {
        ProtoCreateAccountReq {
            username: username.to_string(),
            password_hash: format!("{}-hash", username),
        }
    }

    fn send(recipient: &str, sender: &str, content: &str) -> ProtoSendMessageReq {
        ProtoSendMessageReq {
            draft_id: 0,
            recipient: recipient.to_string(),
            sender: sender.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn leader_replicates_successful_client_writes_only() {
        let f = node(0, &[0, 1, 2]);

        let reply = f.node.create_account(create("alice"), Origin::Client).await.unwrap();
        assert!(reply.success);
        let reply = f.node.create_account(create("alice"), Origin::Client).await.unwrap();
        assert_eq!(reply, generic(false, "Username already exists"));

        let replicated = f.transport.replicated();
        assert_eq!(replicated.len(), 2);
        for (_, req) in &replicated {
            assert_eq!(Operation::decode(req).unwrap(), Operation::CreateAccount(create("alice")));
        }
    }

    #[tokio::test]
    async fn replicas_apply_without_fanning_out() {
        let leader = node(0, &[0, 1]);
        let replica = node(1, &[0, 1]);

        leader.node.create_account(create("alice"), Origin::Client).await.unwrap();
        leader.node.create_account(create("bob"), Origin::Client).await.unwrap();
        leader
            .node
            .send_message(send("bob", "alice", "hello"), Origin::Client)
            .await
            .unwrap();

        for (_, req) in leader.transport.replicated() {
            let reply = replica.node.apply(req).await.unwrap();
            assert!(reply.success);
        }

        assert!(replica.transport.replicated().is_empty());
        assert_eq!(
            replica.node.list_accounts().unwrap().usernames,
            vec!["alice".to_string(), "bob".to_string()]
        );
        assert_eq!(
            replica.node.store().snapshot().unwrap(),
            leader.node.store().snapshot().unwrap()
        );
    }

    #[tokio::test]
    async fn non_leader_client_writes_stay_local() {
        let f = node(1, &[0, 1]);

        let reply = f.node.create_account(create("alice"), Origin::Client).await.unwrap();

        assert!(reply.success);
        assert!(f.transport.replicated().is_empty());
    }

    #[tokio::test]
    async fn send_message_reaches_local_session() {
        let f = node(0, &[0]);
        f.node.create_account(create("alice"), Origin::Client).await.unwrap();
        f.node.create_account(create("bob"), Origin::Client).await.unwrap();

        let missing = f.node.send_message(send("carol", "alice", "hi"), Origin::Client).await.unwrap();
        assert!(!missing.success);
        assert_eq!(missing.message, "Recipient does not exist");

        let (stream, queue) = f.node.delivery().attach_stream("bob");
        let sent = f.node.send_message(send("bob", "alice", "hi bob"), Origin::Client).await.unwrap();
        assert!(sent.success);

        match queue.pull(stream, Duration::from_millis(100)).await {
            Pull::Message(live) => {
                assert_eq!(live.msg_id, sent.msg_id);
                assert_eq!(live.msg, "hi bob");
                assert_eq!(live.inbox_count, 1);
            }
            other => panic!("Expected a live message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn login_opens_session_and_logout_closes_it() {
        let f = node(0, &[0]);
        f.node.create_account(create("alice"), Origin::Client).await.unwrap();
        f.node
            .logout(ProtoUsernameReq { username: "alice".to_string() }, Origin::Client)
            .await
            .unwrap();
        assert!(!f.node.delivery().has_session("alice"));

        let bad = ProtoLoginReq {
            username: "alice".to_string(),
            password_hash: "nope".to_string(),
        };
        assert!(!f.node.login(bad, Origin::Client).await.unwrap().success);
        assert!(!f.node.delivery().has_session("alice"));

        let good = ProtoLoginReq {
            username: "alice".to_string(),
            password_hash: "alice-hash".to_string(),
        };
        let reply = f.node.login(good, Origin::Client).await.unwrap();
        assert!(reply.success);
        assert_eq!(reply.inbox_count, 0);
        assert!(f.node.delivery().has_session("alice"));
    }

    #[tokio::test]
    async fn join_registers_member_and_broadcasts_to_others() {
        let f = node(0, &[0, 1]);
        f.node.create_account(create("alice"), Origin::Client).await.unwrap();

        let request = ProtoUpdateRegistryReq {
            id: 2,
            timestamp_millis: 0,
            address: address(2),
        };
        let reply = f.node.update_registry(request).await.unwrap();

        assert!(reply.success);
        let ids: Vec<u64> = reply.members.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(f.registry.member(MemberId::new(2)).unwrap().is_some());

        let snapshot = crate::storage::DatabaseSnapshot::decode(reply.database_snapshot.as_slice()).unwrap();
        assert_eq!(snapshot.accounts.len(), 1);

        // Member 1 got the account write, then the registry broadcast. The joiner got nothing.
        let replicated = f.transport.replicated();
        let last = &replicated.last().unwrap();
        assert_eq!(last.0, address(1));
        assert!(matches!(Operation::decode(&last.1).unwrap(), Operation::SyncRegistry(_)));
        assert!(replicated.iter().all(|(to, _)| *to != address(2)));
    }

    #[tokio::test]
    async fn joiner_is_stamped_with_the_leader_clock() {
        let f = node(0, &[0]);
        let now = f.controller.current_time();

        let request = ProtoUpdateRegistryReq {
            id: 1,
            timestamp_millis: now.as_millis() + 3_600_000,
            address: address(1),
        };
        assert!(f.node.update_registry(request).await.unwrap().success);

        let joiner = f.registry.member(MemberId::new(1)).unwrap().unwrap();
        assert_eq!(joiner.last_heartbeat, now);
    }

    #[tokio::test]
    async fn registry_broadcast_moves_leadership_to_lower_id() {
        let f = node(2, &[2, 3]);
        assert_eq!(f.node.get_leader().unwrap().leader_id, 2);

        let broadcast = Operation::SyncRegistry(ProtoRegistrySnapshot {
            members: vec![
                member_to_proto(&Member::new(MemberId::new(1), address(1), Timestamp::from_millis(2_000_000))),
                member_to_proto(&Member::new(MemberId::new(2), "elsewhere:1".to_string(), Timestamp::from_millis(0))),
            ],
        });
        f.node.apply(broadcast.encode()).await.unwrap();

        let leader = f.node.get_leader().unwrap();
        assert!(leader.success);
        assert_eq!(leader.leader_id, 1);
        assert_eq!(leader.leader_address, address(1));
        // Our own row is ours.
        assert_eq!(f.registry.member(MemberId::new(2)).unwrap().unwrap().address, address(2));
    }

    #[tokio::test]
    async fn apply_rejects_unknown_operations() {
        let f = node(1, &[0, 1]);
        let bogus = ProtoReplicateReq {
            method_name: "Nope".to_string(),
            payload: vec![],
        };
        assert!(matches!(f.node.apply(bogus).await, Err(ApplyError::Decode(_))));
    }
}
