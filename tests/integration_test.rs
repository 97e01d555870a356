use replichat::{ChatClient, ClientConfig, LeaderEvent, MemberConfig, MemberHandle, MemberId, MemberOptions};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tokio::time::{Duration, Instant};

const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(200);
const HEARTBEAT_TIMEOUT: Duration = Duration::from_millis(1000);

#[tokio::test]
async fn replicated_write_survives_leader_death() -> Result<(), Box<dyn Error>> {
    let base_port = 23100;
    let data_dir = data_dir("leader_death");
    let member_0 = start(0, base_port, &data_dir).await?;
    let member_1 = start(1, base_port, &data_dir).await?;
    let member_2 = start(2, base_port, &data_dir).await?;
    assert!(member_0.is_leader());
    assert_eq!(member_2.leader(), Some(MemberId::new(0)));

    let mut client = ChatClient::connect(client_logger(), client_config(base_port, Some(0))).await?;
    let created = client.create_account("alice", "alice-hash").await?;
    assert!(created.success, "{:?}", created);

    // Replication is done by the time the leader answers.
    for id in &[1, 2] {
        let mut direct = ChatClient::connect(client_logger(), client_config(base_port, Some(*id))).await?;
        assert_eq!(direct.list_accounts().await?.usernames, vec!["alice".to_string()]);
    }

    let mut leader_events = member_1.leader_listener();
    member_0.shutdown().await?;

    let deadline = Instant::now() + HEARTBEAT_TIMEOUT + HEARTBEAT_INTERVAL + Duration::from_secs(3);
    loop {
        let event = tokio::time::timeout_at(deadline, leader_events.next_event())
            .await
            .expect("Timeout waiting for member 1 to take over")
            .expect("Expected member 1 to be running");
        if event == LeaderEvent::Leader {
            break;
        }
    }
    wait_until(Duration::from_secs(3), || member_2.leader() == Some(MemberId::new(1))).await;

    let mut on_member_1 = ChatClient::connect(client_logger(), client_config(base_port, Some(1))).await?;
    let leader = on_member_1.get_leader().await?;
    assert!(leader.success);
    assert_eq!(leader.leader_address, member_1.address());
    assert_eq!(on_member_1.list_accounts().await?.usernames, vec!["alice".to_string()]);

    let mut on_member_2 = ChatClient::connect(client_logger(), client_config(base_port, Some(2))).await?;
    assert_eq!(on_member_2.list_accounts().await?.usernames, vec!["alice".to_string()]);

    member_1.shutdown().await?;
    member_2.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn reads_survive_losing_both_replicas() -> Result<(), Box<dyn Error>> {
    let base_port = 23200;
    let data_dir = data_dir("lose_replicas");
    let member_0 = start(0, base_port, &data_dir).await?;
    let member_1 = start(1, base_port, &data_dir).await?;
    let member_2 = start(2, base_port, &data_dir).await?;

    let mut client = ChatClient::connect(client_logger(), client_config(base_port, Some(0))).await?;
    client.create_account("alice", "alice-hash").await?;
    client.create_account("bob", "bob-hash").await?;
    let before = client.list_accounts().await?.usernames;

    member_1.shutdown().await?;
    member_2.shutdown().await?;
    wait_until(HEARTBEAT_TIMEOUT + Duration::from_secs(2), || {
        member_0.members().map(|members| members.len() == 1).unwrap_or(false)
    })
    .await;

    assert!(member_0.is_leader());
    assert_eq!(client.list_accounts().await?.usernames, before);

    member_0.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn new_member_syncs_state_on_join() -> Result<(), Box<dyn Error>> {
    let base_port = 23300;
    let data_dir = data_dir("join_sync");
    let member_0 = start(0, base_port, &data_dir).await?;
    let member_1 = start(1, base_port, &data_dir).await?;

    let mut client = ChatClient::connect(client_logger(), client_config(base_port, Some(0))).await?;
    client.create_account("bob", "bob-hash").await?;
    client.create_account("carol", "carol-hash").await?;
    let sent = client.send_message(0, "carol", "bob", "hi carol").await?;
    assert!(sent.success);

    let member_2 = start(2, base_port, &data_dir).await?;

    let mut on_member_2 = ChatClient::connect(client_logger(), client_config(base_port, Some(2))).await?;
    assert_eq!(
        on_member_2.list_accounts().await?.usernames,
        vec!["bob".to_string(), "carol".to_string()]
    );
    let login = on_member_2.login("carol", "carol-hash").await?;
    assert!(login.success);
    assert_eq!(login.inbox_count, 1);
    assert_eq!(login.inbox_messages[0].msg_id, sent.msg_id);

    // The leader's registry broadcast reaches the members that were already there.
    let member_2_id = MemberId::new(2);
    wait_until(Duration::from_secs(2), || {
        member_1
            .members()
            .map(|members| members.iter().any(|m| m.id == member_2_id))
            .unwrap_or(false)
    })
    .await;

    // Writes after the join reach the new member too.
    client.create_account("dave", "dave-hash").await?;
    assert_eq!(on_member_2.list_accounts().await?.usernames.len(), 3);

    member_2.shutdown().await?;
    member_1.shutdown().await?;
    member_0.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn accounts_survive_full_restart() -> Result<(), Box<dyn Error>> {
    let base_port = 23400;
    let data_dir = data_dir("restart");
    let member_0 = start(0, base_port, &data_dir).await?;
    let member_1 = start(1, base_port, &data_dir).await?;

    let mut client = ChatClient::connect(client_logger(), client_config(base_port, Some(0))).await?;
    client.create_account("alice", "alice-hash").await?;
    drop(client);

    member_1.shutdown().await?;
    member_0.shutdown().await?;

    let member_0 = restart(0, base_port, &data_dir).await?;
    let member_1 = restart(1, base_port, &data_dir).await?;

    for id in &[0, 1] {
        let mut direct = ChatClient::connect(client_logger(), client_config(base_port, Some(*id))).await?;
        assert_eq!(direct.list_accounts().await?.usernames, vec!["alice".to_string()]);
    }

    member_1.shutdown().await?;
    member_0.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn client_fails_over_to_new_leader() -> Result<(), Box<dyn Error>> {
    let base_port = 23500;
    let data_dir = data_dir("client_failover");
    let member_0 = start(0, base_port, &data_dir).await?;
    let member_1 = start(1, base_port, &data_dir).await?;
    let member_2 = start(2, base_port, &data_dir).await?;

    // No initial address, the client has to find the leader itself.
    let mut client = ChatClient::connect(client_logger(), client_config(base_port, None)).await?;
    assert_eq!(client.connected_leader(), Some(MemberId::new(0)));
    assert!(client.create_account("alice", "alice-hash").await?.success);

    member_0.shutdown().await?;

    // Same call, no manual retry. Succeeds once member 1 notices and takes over.
    let created = client.create_account("bob", "bob-hash").await?;
    assert!(created.success, "{:?}", created);
    assert_eq!(client.connected_leader(), Some(MemberId::new(1)));
    assert_eq!(
        client.list_accounts().await?.usernames,
        vec!["alice".to_string(), "bob".to_string()]
    );

    let mut on_member_2 = ChatClient::connect(client_logger(), client_config(base_port, Some(2))).await?;
    assert_eq!(on_member_2.list_accounts().await?.usernames.len(), 2);

    member_1.shutdown().await?;
    member_2.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn live_delivery_pushes_new_messages() -> Result<(), Box<dyn Error>> {
    let base_port = 23600;
    let data_dir = data_dir("live_delivery");
    let member_0 = start(0, base_port, &data_dir).await?;

    let mut alice = ChatClient::connect(client_logger(), client_config(base_port, Some(0))).await?;
    let mut bob = ChatClient::connect(client_logger(), client_config(base_port, Some(0))).await?;
    alice.create_account("alice", "alice-hash").await?;
    bob.create_account("bob", "bob-hash").await?;

    let mut stream = bob.subscribe("bob").await?;
    let sent = alice.send_message(0, "bob", "alice", "hello bob").await?;

    let live = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("Timeout waiting for a live message")?
        .expect("Stream ended early");
    assert_eq!(live.msg_id, sent.msg_id);
    assert_eq!(live.sender, "alice");
    assert_eq!(live.msg, "hello bob");
    assert_eq!(live.inbox_count, 1);

    bob.logout("bob").await?;
    let ended = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("Timeout waiting for the stream to end")?;
    assert_eq!(ended, None);

    member_0.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn live_delivery_follows_failover() -> Result<(), Box<dyn Error>> {
    let base_port = 23700;
    let data_dir = data_dir("live_failover");
    let member_0 = start(0, base_port, &data_dir).await?;
    let member_1 = start(1, base_port, &data_dir).await?;

    let mut alice = ChatClient::connect(client_logger(), client_config(base_port, None)).await?;
    let mut bob = ChatClient::connect(client_logger(), client_config(base_port, None)).await?;
    alice.create_account("alice", "alice-hash").await?;
    bob.create_account("bob", "bob-hash").await?;
    let mut stream = bob.subscribe("bob").await?;

    member_0.shutdown().await?;

    let receiver = tokio::spawn(async move { tokio::time::timeout(Duration::from_secs(15), stream.next()).await });
    let sent = alice.send_message(0, "bob", "alice", "still there?").await?;
    assert!(sent.success);

    let live = receiver
        .await?
        .expect("Timeout waiting for a live message after failover")?
        .expect("Stream ended early");
    assert_eq!(live.msg_id, sent.msg_id);
    assert_eq!(live.msg, "still there?");

    member_1.shutdown().await?;
    Ok(())
}

fn options() -> MemberOptions {
    MemberOptions {
        heartbeat_interval: Some(HEARTBEAT_INTERVAL),
        heartbeat_timeout: Some(HEARTBEAT_TIMEOUT),
        peer_rpc_timeout: Some(HEARTBEAT_INTERVAL),
        delivery_poll_timeout: Some(Duration::from_millis(200)),
        join_attempts: Some(5),
    }
}

fn data_dir(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("replichat-{}-{}", test_name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

async fn start(id: u64, base_port: u16, data_dir: &PathBuf) -> Result<MemberHandle, replichat::MemberStartError> {
    replichat::start_member(MemberConfig {
        member_id: id,
        host: "127.0.0.1".to_string(),
        base_port,
        peer_hosts: vec![],
        data_directory: data_dir.clone(),
        logger: replichat::create_root_logger_for_stdout(id),
        options: options(),
    })
    .await
}

/// The previous incarnation's database and port are released asynchronously, so give them a moment.
async fn restart(id: u64, base_port: u16, data_dir: &PathBuf) -> Result<MemberHandle, replichat::MemberStartError> {
    let mut attempts = 0;
    loop {
        match start(id, base_port, data_dir).await {
            Err(e) if attempts < 10 => {
                println!("Restart of member {} failed, retrying: {}", id, e);
                attempts += 1;
                sleep(Duration::from_millis(200)).await;
            }
            result => return result,
        }
    }
}

fn client_config(base_port: u16, initial_member: Option<u64>) -> ClientConfig {
    ClientConfig {
        hosts: vec!["127.0.0.1".to_string()],
        base_port,
        max_member_id: 5,
        rpc_timeout: Duration::from_millis(500),
        discovery_deadline: Duration::from_secs(10),
        initial_address: initial_member.map(|id| format!("127.0.0.1:{}", base_port + id as u16)),
    }
}

fn client_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

async fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) {
    let deadline = Instant::now() + timeout;
    while !condition() {
        assert!(Instant::now() < deadline, "Condition not met within {:?}", timeout);
        sleep(Duration::from_millis(50)).await;
    }
}

async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}
