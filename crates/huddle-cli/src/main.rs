//! Huddle terminal client entry point.

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use clap::Parser;
use huddle_cli::{Runtime, SystemEnv, TerminalDriver};
use huddle_client::{ClientConfig, TypingSignal};
use tracing_subscriber::EnvFilter;

/// Huddle group chat client
#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(about = "Terminal client for a Huddle chat room")]
#[command(version)]
struct Args {
    /// Websocket server URL, e.g. `ws://localhost:3000/ws`
    ///
    /// If not provided, runs against an in-process room.
    #[arg(short, long)]
    server: Option<String>,

    /// Join immediately with this display name instead of prompting.
    #[arg(short, long)]
    name: Option<String>,

    /// Quiet period before `stopTyping` is sent.
    #[arg(long, default_value_t = 1000)]
    debounce_ms: u64,

    /// Forget a typing peer after this long without a signal. 0 disables.
    #[arg(long, default_value_t = 5000)]
    peer_ttl_ms: u64,

    /// Send `typing` only when a burst starts instead of on every edit.
    #[arg(long)]
    edge_typing: bool,

    /// Keep relayed copies of messages already in the log.
    #[arg(long)]
    no_dedup: bool,

    /// Have the in-process room relay messages back to their author.
    #[arg(long)]
    echo: bool,

    /// Write logs here (filtered by `RUST_LOG`, default `info`).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        let peer_ttl = (self.peer_ttl_ms > 0).then(|| Duration::from_millis(self.peer_ttl_ms));
        let signal =
            if self.edge_typing { TypingSignal::EdgeOnly } else { TypingSignal::EveryChange };

        ClientConfig::default()
            .with_typing_debounce(Duration::from_millis(self.debounce_ms))
            .with_peer_typing_ttl(peer_ttl)
            .with_typing_signal(signal)
            .with_dedupe_messages(!self.no_dedup)
    }
}

/// The terminal is in raw alternate-screen mode, so logs only go to a file.
fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let driver = match &args.server {
        Some(url) => TerminalDriver::connect(url).await?,
        None => TerminalDriver::offline(args.echo)?,
    };

    let mut runtime = Runtime::with_config(driver, SystemEnv::new(), args.client_config());
    if let Some(name) = &args.name {
        runtime.submit_name(name).await?;
    }

    Ok(runtime.run().await?)
}
