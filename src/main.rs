//! Browser profile router.
//!
//! Opens each incoming URL in the browser profile chosen by an ordered list
//! of regex rules.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                   PROFILE ROUTER                      │
//!                    │                                                       │
//!   argv / stdin     │  ┌─────────┐    ┌──────────┐    ┌──────────────┐     │
//!   ─────────────────┼─▶│ events  │───▶│ dispatch │───▶│   routing    │     │
//!   forwarded (sock) │  │ sources │    │  queue   │    │  RuleSet     │     │
//!                    │  └─────────┘    └────┬─────┘    └──────┬───────┘     │
//!                    │                      │ one at a time    │ decision    │
//!                    │                      ▼                  ▼             │
//!                    │                 ┌───────────────────────────┐         │
//!                    │                 │  launcher (spawn browser) │─────────┼──▶ Browser
//!                    │                 └───────────────────────────┘         │
//!                    │                                                       │
//!                    │  ┌─────────┐ ┌──────────────────┐ ┌──────────────┐   │
//!                    │  │ config  │ │ lifecycle        │ │observability │   │
//!                    │  │         │ │ pid file/signals │ │  logging     │   │
//!                    │  └─────────┘ └──────────────────┘ └──────────────┘   │
//!                    └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Exit Codes
//! - `0` URL delivered, or another instance is already running
//! - `1` no URL arrived within the one-shot timeout
//! - `2` configuration error
//! - `3` one or more launches failed

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use profile_router::config::default_config_path;
use profile_router::dispatch::{Dispatcher, ExitStatus};
use profile_router::events::{self, ArgsSource, LineSource, UrlEventSource};
use profile_router::lifecycle::{instance, signals, startup, InstanceError, InstanceGuard, Prepared, Shutdown};
use profile_router::observability::logging;
use profile_router::routing::RoutingDecision;

#[derive(Parser)]
#[command(name = "profile-router")]
#[command(version)]
#[command(about = "Open URLs in the browser profile picked by pattern rules", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as the long-lived listener
    Listen {
        /// Do not read URLs from stdin
        #[arg(long)]
        no_stdin: bool,
    },

    /// Route a single URL and exit
    Open {
        /// URL to open; read from stdin when omitted
        urls: Vec<String>,

        /// Seconds to wait for a URL
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Show where a URL would go without launching anything
    Route {
        url: String,
    },

    /// Validate the configuration
    Check,

    /// Report whether a listener is running
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(config_path) = cli.config.clone().or_else(default_config_path) else {
        eprintln!("Error loading config: cannot determine config directory, pass --config");
        return ExitStatus::ConfigError.into();
    };

    let prepared = match startup::load(&config_path) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("Error loading config {}: {}", config_path.display(), e);
            return ExitStatus::ConfigError.into();
        }
    };

    let level = if cli.debug {
        "debug"
    } else {
        prepared.config.log_level.as_str()
    };
    if let Err(e) = logging::init(level, prepared.config.log_file.as_deref()) {
        eprintln!("{}", e);
        return ExitStatus::ConfigError.into();
    }

    tracing::debug!(
        config = %config_path.display(),
        rules = prepared.router.rules().len(),
        strategy = ?prepared.config.strategy_for_unknown_urls,
        "Configuration loaded"
    );

    let status = match cli.command {
        Commands::Listen { no_stdin } => cmd_listen(prepared, !no_stdin).await,
        Commands::Open { urls, timeout } => cmd_open(prepared, urls, timeout).await,
        Commands::Route { url } => cmd_route(&prepared, &url),
        Commands::Check => cmd_check(&prepared),
        Commands::Status => cmd_status(&prepared),
    };
    status.into()
}

/// Claim the pid file, or report that another instance holds it.
fn acquire_guard(prepared: &Prepared) -> Result<InstanceGuard, ExitStatus> {
    match InstanceGuard::acquire(&prepared.config.pid_file) {
        Ok(guard) => Ok(guard),
        Err(InstanceError::AlreadyRunning { pid }) => {
            tracing::debug!(pid = ?pid, "Another instance is running");
            Err(ExitStatus::Success)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to claim pid file");
            Err(ExitStatus::ConfigError)
        }
    }
}

async fn cmd_listen(prepared: Prepared, read_stdin: bool) -> ExitStatus {
    let guard = match acquire_guard(&prepared) {
        Ok(guard) => guard,
        Err(status) => return status,
    };

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let mut sources: Vec<Box<dyn UrlEventSource>> = Vec::new();
    #[cfg(unix)]
    match events::SocketSource::bind(&prepared.config.socket_path, shutdown.clone()) {
        Ok(source) => sources.push(Box::new(source)),
        Err(e) => {
            tracing::error!(
                path = %prepared.config.socket_path.display(),
                error = %e,
                "Failed to bind socket"
            );
            return ExitStatus::ConfigError;
        }
    }
    if read_stdin {
        sources.push(Box::new(LineSource::stdin()));
    }

    let (dispatcher, sink) = Dispatcher::new(prepared.router, prepared.launcher);
    if let Err(e) = events::start_all(sources, &sink) {
        tracing::error!(error = %e, "Failed to start URL sources");
        return ExitStatus::ConfigError;
    }
    drop(sink);

    tracing::info!(pid = guard.pid(), "Start listening for URLs");
    let report = dispatcher.run(shutdown).await;
    tracing::info!(%report, "Listener finished");

    guard.release();
    report.exit_status()
}

async fn cmd_open(prepared: Prepared, urls: Vec<String>, timeout: Option<u64>) -> ExitStatus {
    let timeout = Duration::from_secs(timeout.unwrap_or(prepared.config.oneshot_timeout_secs));

    let guard = match acquire_guard(&prepared) {
        Ok(guard) => guard,
        Err(ExitStatus::Success) => {
            hand_off(&prepared, urls, timeout).await;
            return ExitStatus::Success;
        }
        Err(status) => return status,
    };

    let source: Box<dyn UrlEventSource> = if urls.is_empty() {
        Box::new(LineSource::stdin())
    } else {
        Box::new(ArgsSource::new(urls))
    };

    let (dispatcher, sink) = Dispatcher::new(prepared.router, prepared.launcher);
    if let Err(e) = events::start_all(vec![source], &sink) {
        tracing::error!(error = %e, "Failed to start URL source");
        return ExitStatus::ConfigError;
    }
    drop(sink);

    let outcome = dispatcher.run_once(timeout).await;

    guard.release();
    outcome.exit_status()
}

/// Pass URLs to the listener that holds the pid file.
///
/// With no URL arguments, stdin lines arriving within `timeout` are passed on.
async fn hand_off(prepared: &Prepared, urls: Vec<String>, timeout: Duration) {
    let urls = if urls.is_empty() {
        read_stdin_urls(timeout).await
    } else {
        urls
    };
    if urls.is_empty() {
        tracing::debug!("Nothing to forward");
        return;
    }

    #[cfg(unix)]
    match events::forward(&prepared.config.socket_path, &urls).await {
        Ok(()) => tracing::info!(count = urls.len(), "Forwarded URLs to running instance"),
        Err(e) => tracing::warn!(
            path = %prepared.config.socket_path.display(),
            error = %e,
            "Could not forward URLs to running instance"
        ),
    }

    #[cfg(not(unix))]
    tracing::warn!(
        count = urls.len(),
        pid_file = %prepared.config.pid_file.display(),
        "Another instance is running; URLs not forwarded"
    );
}

/// Collect non-blank stdin lines until EOF or `timeout`.
///
/// The reader runs on its own thread so a stdin that never closes cannot
/// hold up runtime shutdown.
async fn read_stdin_urls(timeout: Duration) -> Vec<String> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let reader = thread::Builder::new()
        .name("forward-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = reader {
        tracing::warn!(error = %e, "Failed to read stdin");
        return Vec::new();
    }

    let mut urls = Vec::new();
    let collect = async {
        while let Some(line) = rx.recv().await {
            let line = line.trim();
            if !line.is_empty() {
                urls.push(line.to_string());
            }
        }
    };
    if tokio::time::timeout(timeout, collect).await.is_err() {
        tracing::debug!(timeout_secs = timeout.as_secs_f64(), "Stopped waiting for stdin");
    }
    urls
}

fn cmd_route(prepared: &Prepared, url: &str) -> ExitStatus {
    let decision: RoutingDecision = prepared.router.decide(url);
    match decision.profile() {
        Some(profile) => {
            let (program, args) = prepared.launcher.command(profile, url);
            println!("{} -> {}", url, decision);
            println!("  {} {}", program, args.join(" "));
        }
        None => println!("{} -> {}", url, decision),
    }
    ExitStatus::Success
}

fn cmd_check(prepared: &Prepared) -> ExitStatus {
    let rules = prepared.router.rules();
    println!("Configuration OK");
    println!("  browser:          {}", prepared.config.chrome_app_path);
    println!("  default profile:  {}", rules.default_profile());
    println!("  unknown URLs:     {:?}", rules.strategy());
    println!("  rules:            {}", rules.len());
    for (i, rule) in rules.rules().iter().enumerate() {
        println!("    {:>3}. {} -> {}", i, rule.pattern(), rule.profile_directory());
    }
    ExitStatus::Success
}

fn cmd_status(prepared: &Prepared) -> ExitStatus {
    match instance::read_holder(&prepared.config.pid_file) {
        Some(pid) => println!("Listener running (pid {})", pid),
        None => println!("No listener running"),
    }
    ExitStatus::Success
}
