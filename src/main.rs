use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use memtftp::{MemoryStore, RetransmissionConfig, Server};

#[derive(Parser, Debug)]
#[command(name = "memtftp", about = "TFTP server backed by an in-memory store")]
struct Cli {
    /// Address to listen for requests on
    #[arg(long, default_value = "0.0.0.0:9229")]
    bind: SocketAddr,

    /// Bind session sockets to this address instead of the listener's
    #[arg(long)]
    session_ip: Option<IpAddr>,

    /// How long to wait for a reply before retransmitting, in milliseconds
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: u64,

    /// Retransmissions of one packet before a transfer is abandoned
    #[arg(long, default_value_t = RetransmissionConfig::DEFAULT_MAX_RETRANSMISSIONS)]
    max_retries: usize,

    /// Abandon any transfer that runs longer than this many seconds
    #[arg(long)]
    session_deadline_secs: Option<u64>,

    /// Seed the store with the files in this directory
    #[arg(long)]
    preload: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = match cli.preload {
        Some(ref dir) => match MemoryStore::load_dir(dir) {
            Ok(store) => store,
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "couldn't preload store");
                return ExitCode::FAILURE;
            }
        },
        None => MemoryStore::new(),
    };
    let files = store.len();

    let mut config =
        RetransmissionConfig::new(Duration::from_millis(cli.timeout_ms), Some(cli.max_retries));
    if let Some(secs) = cli.session_deadline_secs {
        config = config.with_session_deadline(Duration::from_secs(secs));
    }

    let server = match Server::bind(cli.bind, Arc::new(store), config) {
        Ok(server) => match cli.session_ip {
            Some(ip) => server.with_session_ip(ip),
            None => server,
        },
        Err(e) => {
            error!(addr = %cli.bind, error = %e, "couldn't bind");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %cli.bind, files, "serving TFTP");

    if let Err(e) = server.run() {
        error!(error = %e, "listener failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
