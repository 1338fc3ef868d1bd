//! KeyRelay sender: entry point.
//!
//! Relays key presses and releases to a remote DirectInput injector over TCP.
//! This binary is the headless front end: key events and connection requests
//! are typed on stdin, and the held keys, the peer's log lines and the
//! connection status are printed to stdout.
//!
//! # Usage
//!
//! ```text
//! keyrelay-sender [OPTIONS]
//!
//! Options:
//!   --config <PATH>       Config file [default: platform config dir]
//!   --host <HOST>         Injector host (overrides config)
//!   --port <PORT>         Injector port (overrides config)
//!   --connect             Connect at startup
//!   --log-level <FILTER>  tracing filter (overrides config)
//! ```
//!
//! Every option can also be set through its `KEYRELAY_*` environment
//! variable.  `RUST_LOG`, when set, wins over both `--log-level` and the
//! config file.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config / Cli           -- effective RelayConfig
//!  └─ RelayService::run()         -- owns the dispatcher and TCP transport
//!  └─ stdin loop                  -- ConsoleCommand → RelayHandle
//!       ConsoleObserver           -- prints what the service reports
//! ```

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use keyrelay_sender::application::relay_connection::{ConnectionUiState, RelayObserver};
use keyrelay_sender::infrastructure::console::commands::HELP_TEXT;
use keyrelay_sender::infrastructure::console::{ConsoleCommand, ConsoleObserver};
use keyrelay_sender::infrastructure::relay_service::{RelayHandle, RelayService};
use keyrelay_sender::infrastructure::storage::config::{self, AppConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Relays local key presses to a remote DirectInput injector over TCP.
#[derive(Debug, Parser)]
#[command(name = "keyrelay-sender", version)]
struct Cli {
    /// Path to the TOML config file.
    ///
    /// Defaults to `config.toml` in the platform config directory.  A missing
    /// file is not an error; built-in defaults are used.
    #[arg(long, env = "KEYRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Injector host used by `connect` when none is typed.
    #[arg(long, env = "KEYRELAY_HOST")]
    host: Option<String>,

    /// Injector port used by `connect` when none is typed.
    #[arg(long, env = "KEYRELAY_PORT")]
    port: Option<u16>,

    /// Connect to the configured host as soon as the sender starts.
    #[arg(long, env = "KEYRELAY_CONNECT")]
    connect: bool,

    /// `tracing` filter directive, e.g. `debug` or `keyrelay_sender=trace`.
    #[arg(long, env = "KEYRELAY_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    fn into_app_config(self) -> anyhow::Result<(AppConfig, bool)> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => config::load_config().context("loading config")?,
        };

        if let Some(host) = self.host {
            cfg.relay.host = host;
        }
        if let Some(port) = self.port {
            cfg.relay.port = port;
        }
        if let Some(level) = self.log_level {
            cfg.logging.level = level;
        }
        Ok((cfg, self.connect))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cfg, connect_at_startup) = Cli::parse().into_app_config()?;

    // RUST_LOG wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "KeyRelay sender starting; default target {}:{}",
        cfg.relay.host, cfg.relay.port
    );

    let observer = Arc::new(ConsoleObserver::stdout());
    let (service, handle) = RelayService::new(&cfg.relay, observer.clone());
    let service_task = tokio::spawn(service.run());

    observer.set_connection_ui_state(ConnectionUiState::Disconnected);
    if connect_at_startup {
        handle.connect(cfg.relay.host.clone(), cfg.relay.port)?;
    }

    println!("type 'help' for commands");

    let mut lines = spawn_line_reader(BufReader::new(std::io::stdin()))
        .context("starting stdin reader")?;
    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    break;
                };
                let line = line.context("reading stdin")?;
                if line.trim().is_empty() {
                    continue;
                }
                match ConsoleCommand::parse(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => run_command(command, &handle, &cfg, observer.as_ref()).await?,
                    Err(e) => println!("error: {e}"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("received Ctrl+C; shutting down"),
                    Err(e) => warn!("failed to listen for Ctrl+C: {e}"),
                }
                break;
            }
        }
    }

    // The service may already be gone if it panicked.
    let _ = handle.shutdown();
    service_task.await.context("relay service task failed")?;

    info!("KeyRelay sender stopped");
    Ok(())
}

/// Forwards every line of `reader` over a channel from a dedicated thread.
///
/// The thread is never joined.  A read blocked on an idle terminal cannot
/// hold up runtime shutdown, so Ctrl+C exits at once.  The channel closes at
/// EOF or after the first read error.
fn spawn_line_reader<R>(
    reader: R,
) -> std::io::Result<mpsc::UnboundedReceiver<std::io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
            debug!("stdin reader finished");
        })?;
    Ok(rx)
}

/// Applies one parsed console command.
async fn run_command(
    command: ConsoleCommand,
    handle: &RelayHandle,
    cfg: &AppConfig,
    observer: &dyn RelayObserver,
) -> anyhow::Result<()> {
    match command {
        ConsoleCommand::Connect { host, port } => handle.connect(
            host.unwrap_or_else(|| cfg.relay.host.clone()),
            port.unwrap_or(cfg.relay.port),
        )?,
        ConsoleCommand::Disconnect => handle.disconnect()?,
        ConsoleCommand::Down(key) => handle.key_down(key)?,
        ConsoleCommand::Up(key) => handle.key_up(key)?,
        ConsoleCommand::Tap(key) => {
            handle.key_down(key)?;
            handle.key_up(key)?;
        }
        ConsoleCommand::Keys => {
            let status = handle.status().await?;
            observer.show_pressed_keys(&status.pressed);
            println!("state: {:?}", status.state);
        }
        ConsoleCommand::Help => println!("{HELP_TEXT}"),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cli_from(args: &[&str]) -> Cli {
        let mut argv = vec!["keyrelay-sender"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_cli_without_arguments_has_no_overrides() {
        let cli = cli_from(&[]);
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(!cli.connect);
    }

    #[test]
    fn test_cli_overrides_take_precedence_over_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!("keyrelay_cli_{}.toml", std::process::id()));
        std::fs::write(&path, "[relay]\nhost = \"file-host\"\nport = 1000\n").unwrap();
        let path_arg = path.to_string_lossy().to_string();

        // Act
        let (cfg, connect) = cli_from(&["--config", &path_arg, "--port", "2000", "--connect"])
            .into_app_config()
            .unwrap();

        // Assert
        assert_eq!(cfg.relay.host, "file-host");
        assert_eq!(cfg.relay.port, 2000);
        assert!(connect);

        std::fs::remove_file(&path).ok();
    }

    /// A reader whose `read` blocks until the paired sender is dropped.
    struct StalledInput(std::sync::mpsc::Receiver<()>);

    impl std::io::Read for StalledInput {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_line_reader_forwards_lines_then_closes() {
        // Arrange
        let input = std::io::Cursor::new(b"down w\r\nquit\n".to_vec());

        // Act
        let mut rx = spawn_line_reader(input).unwrap();

        // Assert
        assert_eq!(rx.recv().await.unwrap().unwrap(), "down w");
        assert_eq!(rx.recv().await.unwrap().unwrap(), "quit");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_runtime_shuts_down_while_line_reader_is_blocked() {
        // Arrange
        let (release, stalled) = std::sync::mpsc::channel::<()>();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let started = std::time::Instant::now();

        // Act – the reader is blocked in `read` when the runtime is dropped
        runtime.block_on(async {
            let mut rx = spawn_line_reader(BufReader::new(StalledInput(stalled))).unwrap();
            let pending = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
            assert!(pending.is_err(), "no line is available yet");
        });
        drop(runtime);

        // Assert
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(release);
    }

    #[test]
    fn test_cli_log_level_overrides_config() {
        let path =
            std::env::temp_dir().join(format!("keyrelay_cli_log_{}.toml", std::process::id()));
        std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();
        let path_arg = path.to_string_lossy().to_string();

        let (cfg, _) = cli_from(&["--config", &path_arg, "--log-level", "debug"])
            .into_app_config()
            .unwrap();

        assert_eq!(cfg.logging.level, "debug");
        std::fs::remove_file(&path).ok();
    }
}
