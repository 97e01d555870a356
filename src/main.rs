use clap::Parser;
use replichat::{MemberConfig, MemberOptions};
use std::path::PathBuf;
use std::process;
use tokio::time::Duration;

/// One member of a replicated chat cluster.
#[derive(Debug, Parser)]
#[command(name = "replichat-server", version)]
struct Args {
    /// Unique member id. Id 0 bootstraps a new cluster; anyone else joins an existing one.
    #[arg(long)]
    id: u64,

    /// Host to listen on and advertise to peers.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Member `id` listens on `base-port + id`.
    #[arg(long, default_value_t = 12300)]
    base_port: u16,

    /// Host probed for a leader when joining. Repeatable.
    #[arg(long = "peer-host")]
    peer_hosts: Vec<String>,

    /// Directory holding each member's database.
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    #[arg(long)]
    heartbeat_interval_ms: Option<u64>,

    #[arg(long)]
    heartbeat_timeout_ms: Option<u64>,

    /// Log to a file under this directory instead of the terminal.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let logger = match &args.log_dir {
        Some(log_dir) => match replichat::create_root_logger_for_file(log_dir, args.id) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("Failed to open log file under {:?}: {}", log_dir, e);
                process::exit(2);
            }
        },
        None => replichat::create_root_logger_for_stdout(args.id),
    };

    let config = MemberConfig {
        member_id: args.id,
        host: args.host,
        base_port: args.base_port,
        peer_hosts: args.peer_hosts,
        data_directory: args.data_dir,
        logger: logger.clone(),
        options: MemberOptions {
            heartbeat_interval: args.heartbeat_interval_ms.map(Duration::from_millis),
            heartbeat_timeout: args.heartbeat_timeout_ms.map(Duration::from_millis),
            ..MemberOptions::default()
        },
    };

    let mut member = match replichat::start_member(config).await {
        Ok(member) => member,
        Err(e) => {
            slog::crit!(logger, "Failed to start member: {}", e);
            // Let the async drain flush before exiting.
            drop(logger);
            tokio::time::sleep(Duration::from_millis(100)).await;
            process::exit(1);
        }
    };
    slog::info!(logger, "Member {} serving at {}", member.member_id(), member.address());

    let exit_code = tokio::select! {
        ctrl_c = tokio::signal::ctrl_c() => {
            if let Err(e) = ctrl_c {
                slog::error!(logger, "Failed to listen for Ctrl-C: {}", e);
            }
            slog::info!(logger, "Interrupted");
            0
        }
        reason = member.wait_for_fatal() => {
            slog::crit!(logger, "Fatal failure: {}", reason);
            1
        }
    };

    if let Err(e) = member.shutdown().await {
        slog::crit!(logger, "Failed to flush database on shutdown: {}", e);
        drop(logger);
        tokio::time::sleep(Duration::from_millis(100)).await;
        process::exit(1);
    }

    drop(logger);
    tokio::time::sleep(Duration::from_millis(100)).await;
    process::exit(exit_code);
}
