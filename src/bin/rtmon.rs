//! rtmon - terminal monitor for execution-state dumps.
//!
//! Usage:
//!   rtmon                          # poll localhost:1234/debug/grmon every 5s
//!   rtmon -host db:6060 -i 2       # another host, 2 second interval
//!   rtmon -i 0                     # start paused, refresh with `r`
//!   rtmon -self -log /tmp/rtmon.log

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use rtmon::config::{Config, DEFAULT_ENDPOINT, DEFAULT_HOST, DEFAULT_INTERVAL_SECS, normalize_args};
use rtmon::diag::{self, ThreadRegistry, spawn_server};
use rtmon::sampler::{HttpSource, Sampler};
use rtmon::tui::App;

/// Terminal monitor for execution-state dumps.
#[derive(Parser)]
#[command(name = "rtmon", about = "Execution-state dump monitor", version)]
struct Args {
    /// Host (and port) of the monitored process.
    #[arg(long, env = "RTMON_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Path of the dump endpoint.
    #[arg(long, env = "RTMON_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Refresh interval in seconds. 0 starts paused.
    #[arg(short = 'i', long = "interval", default_value_t = DEFAULT_INTERVAL_SECS)]
    interval: u64,

    /// Serve rtmon's own thread dump on the endpoint path.
    #[arg(long = "self")]
    serve_self: bool,

    /// Address for the self dump server.
    #[arg(long = "self-addr", default_value = diag::DEFAULT_ADDR)]
    self_addr: String,

    /// Write logs to this file (nothing is logged otherwise).
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            host: self.host,
            endpoint: self.endpoint,
            interval_secs: self.interval,
            serve_self: self.serve_self,
            self_addr: self.self_addr,
        }
    }
}

/// Initializes file logging. The terminal belongs to the TUI.
fn init_logging(path: &Path, verbose: u8) -> io::Result<()> {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .init();
    Ok(())
}

fn main() {
    let args = Args::parse_from(normalize_args(std::env::args()));

    if let Some(ref path) = args.log
        && let Err(e) = init_logging(path, args.verbose)
    {
        eprintln!("Error: cannot open log file '{}': {}", path.display(), e);
        std::process::exit(1);
    }

    let config = args.into_config();
    let registry = ThreadRegistry::new();

    if config.serve_self {
        let endpoint = config.endpoint_path();
        match spawn_server(Arc::clone(&registry), &config.self_addr, &endpoint) {
            Ok((addr, _)) => info!("serving own dump on http://{}{}", addr, endpoint),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    let target = config.target_url();
    let source = match HttpSource::new(&target) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: cannot set up client for '{}': {}", target, e);
            std::process::exit(1);
        }
    };

    let app = match App::new(
        Sampler::new(Box::new(source)),
        config.interval_secs,
        registry,
    ) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run() {
        eprintln!("Error running TUI: {}", e);
        std::process::exit(1);
    }
}
