//! studyhall - interactive study tracker session
//!
//! Wires together the pieces for one terminal session:
//! - Settings loading
//! - SQLite-backed local store (stopwatch ledger)
//! - In-memory backend providers with a signed-in dev identity
//! - Stopwatch, group directory, and identity gateway
//! - A single event loop: 1 Hz tick, stdin commands, live group list

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use studyhall_api::{GroupRow, MESSAGE_DISMISS_AFTER, UserMessage, mask_email};
use studyhall_config::load_or_default;
use studyhall_core::{CommitOutcome, GroupDirectory, IdentityGateway, Stopwatch, StopwatchState};
use studyhall_provider::{MemoryAuth, MemoryDirectory};
use studyhall_store::{LedgerStore, SqliteStore};
use studyhall_util::{MonotonicInstant, default_config_path, default_data_dir, format_elapsed};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// studyhall - study-group tracker with a personal time log
#[derive(Parser, Debug)]
#[command(name = "studyhall")]
#[command(about = "Study-group tracker with a personal time log", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/studyhall/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set STUDYHALL_DATA_DIR env var)
    #[arg(short, long, env = "STUDYHALL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Identity to sign in with for this session
    #[arg(short, long, default_value = "student@studyhall.dev")]
    user: String,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

/// Parsed stdin command
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Toggle,
    Save,
    Clear,
    Stats,
    History,
    Groups,
    Create { name: String },
    Join { id: String },
    Leave { id: String },
    WhoAmI,
    SignOut,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    Some(match word.to_lowercase().as_str() {
        "toggle" | "start" | "stop" => Command::Toggle,
        "save" => Command::Save,
        "clear" => Command::Clear,
        "stats" => Command::Stats,
        "history" => Command::History,
        "groups" | "refresh" => Command::Groups,
        "create" => Command::Create { name: rest.into() },
        "join" => Command::Join { id: rest.into() },
        "leave" => Command::Leave { id: rest.into() },
        "whoami" => Command::WhoAmI,
        "signout" | "logout" => Command::SignOut,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.into()),
    })
}

/// One terminal session's state
struct Session {
    stopwatch: Stopwatch,
    directory: GroupDirectory,
    gateway: IdentityGateway,

    /// Transient status message and when it was shown
    status: Option<(UserMessage, MonotonicInstant)>,

    /// Clear-all awaits an explicit "yes"
    awaiting_clear_confirm: bool,
}

impl Session {
    async fn new(args: &Args) -> Result<Self> {
        let settings = load_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| settings.data_dir.clone())
            .unwrap_or_else(default_data_dir);

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join("studyhall.db");
        let store = Arc::new(
            SqliteStore::open(&db_path)
                .map_err(|e| anyhow::anyhow!("Failed to open database {:?}: {}", db_path, e))?,
        );
        info!(db_path = %db_path.display(), "Store initialized");

        let stopwatch = Stopwatch::load(LedgerStore::new(store), &studyhall_util::now());

        // Dev backend: in-memory providers with one signed-in identity
        let provider = Arc::new(MemoryDirectory::new());
        let auth = Arc::new(MemoryAuth::new());
        let gateway = IdentityGateway::with_limits(
            auth.clone(),
            settings.rate_limit_attempts,
            settings.rate_limit_window,
        );
        gateway
            .sign_up(&args.user, "studyhall-dev")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to sign in dev identity: {}", e))?;

        let directory = GroupDirectory::new(provider, auth, settings.max_group_size);

        Ok(Self {
            stopwatch,
            directory,
            gateway,
            status: None,
            awaiting_clear_confirm: false,
        })
    }

    fn show(&mut self, message: UserMessage) {
        let prefix = if message.is_error() { "!" } else { "*" };
        println!("{} {}", prefix, message.text);
        self.status = Some((message, MonotonicInstant::now()));
    }

    /// 1 Hz tick: render elapsed while running, expire the status line
    fn tick(&mut self, now_mono: MonotonicInstant) {
        if let Some((_, shown_at)) = &self.status
            && now_mono.saturating_duration_since(*shown_at) >= MESSAGE_DISMISS_AFTER
        {
            self.status = None;
        }

        if self.stopwatch.is_running() {
            println!("  {}", self.stopwatch.display(now_mono));
        }
    }

    fn print_rows(rows: &[GroupRow]) {
        if rows.is_empty() {
            println!("No groups yet. Create one!");
            return;
        }
        for row in rows {
            let action = if row.joined { "leave" } else { "join" };
            println!(
                "  {} ({})  [{} {}]",
                row.name,
                row.occupancy(),
                action,
                row.id
            );
        }
    }

    /// Handle one command; returns `false` when the session should end
    async fn handle(&mut self, line: &str) -> bool {
        if self.awaiting_clear_confirm {
            self.awaiting_clear_confirm = false;
            if line.trim().eq_ignore_ascii_case("yes") {
                self.stopwatch.clear_all();
                self.show(UserMessage::info("All data cleared"));
            } else {
                self.show(UserMessage::info("Clear cancelled"));
            }
            return true;
        }

        let Some(command) = parse_command(line) else {
            return true;
        };

        match command {
            Command::Toggle => {
                let now_mono = MonotonicInstant::now();
                match self.stopwatch.toggle(now_mono) {
                    StopwatchState::Running => {
                        println!("  running  {}", self.stopwatch.display(now_mono));
                    }
                    StopwatchState::Idle => {
                        println!("  stopped  {}", self.stopwatch.display(now_mono));
                    }
                }
            }
            Command::Save => {
                let outcome = self
                    .stopwatch
                    .commit(&studyhall_util::now(), MonotonicInstant::now());
                match outcome {
                    CommitOutcome::Saved { entry, persisted } => {
                        if !persisted {
                            warn!("Session kept in memory only; storage write failed");
                        }
                        self.show(UserMessage::info(format!(
                            "Session saved: {}",
                            entry.formatted
                        )));
                    }
                    CommitOutcome::TooShort => {}
                    CommitOutcome::Invalid | CommitOutcome::Overflow => {
                        self.show(UserMessage::error(
                            "Could not save session. Please try again.",
                        ));
                    }
                }
            }
            Command::Clear => {
                println!("Clear ALL data? This cannot be undone. Type 'yes' to confirm.");
                self.awaiting_clear_confirm = true;
            }
            Command::Stats => {
                let today = self.stopwatch.today();
                let all_time = self.stopwatch.all_time();
                println!(
                    "  today:    {} over {} session(s)",
                    format_elapsed(today.total_ms),
                    today.sessions
                );
                println!(
                    "  all-time: {} over {} session(s)",
                    format_elapsed(all_time.total_ms),
                    all_time.sessions
                );
            }
            Command::History => {
                let history = self.stopwatch.history();
                if history.is_empty() {
                    println!("No sessions saved yet");
                }
                for entry in history {
                    println!("  {} - {} {}", entry.formatted, entry.date, entry.time);
                }
            }
            Command::Groups => {
                let snapshot = self.directory.subscribe().borrow().clone();
                Self::print_rows(&self.directory.rows(&snapshot));
            }
            Command::Create { name } => match self.directory.create_group(&name).await {
                Ok(group) => self.show(UserMessage::info(format!("Group created: {}", group.name))),
                Err(e) => self.show(e.user_message()),
            },
            Command::Join { id } => match self.directory.join_group(&id.as_str().into()).await {
                Ok(()) => self.show(UserMessage::info("Joined group!")),
                Err(e) => self.show(e.user_message()),
            },
            Command::Leave { id } => match self.directory.leave_group(&id.as_str().into()).await {
                Ok(()) => self.show(UserMessage::info("Left group!")),
                Err(e) => self.show(e.user_message()),
            },
            Command::WhoAmI => match self.gateway.current_user() {
                Some(user) => {
                    let verified = if user.email_verified { "yes" } else { "no" };
                    println!("  {} (verified: {})", mask_email(&user.email), verified);
                }
                None => println!("  not signed in"),
            },
            Command::SignOut => match self.gateway.sign_out().await {
                Ok(()) => self.show(UserMessage::info("Logged out successfully")),
                Err(e) => self.show(e.user_message()),
            },
            Command::Help => {
                println!("  toggle | save | clear | stats | history");
                println!("  groups | create <name> | join <id> | leave <id>");
                println!("  whoami | signout | quit");
            }
            Command::Quit => return false,
            Command::Unknown(text) => {
                println!("Unknown command: {} (try 'help')", text);
            }
        }

        true
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone())),
        )
        .init();

    let mut session = Session::new(&args).await?;
    let mut groups_rx = session.directory.subscribe();

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    let mut tick_timer = tokio::time::interval(std::time::Duration::from_secs(1));
    tick_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    println!("studyhall - type 'help' for commands");

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                break;
            }

            _ = tick_timer.tick() => {
                session.tick(MonotonicInstant::now());
            }

            // Live group-list updates
            Ok(()) = groups_rx.changed() => {
                let snapshot = groups_rx.borrow_and_update().clone();
                println!("groups updated:");
                Session::print_rows(&session.directory.rows(&snapshot));
            }

            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !session.handle(&line).await {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
        }
    }

    info!("Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_commands() {
        assert_eq!(parse_command("toggle"), Some(Command::Toggle));
        assert_eq!(parse_command("start"), Some(Command::Toggle));
        assert_eq!(parse_command("  SAVE  "), Some(Command::Save));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn parse_commands_with_arguments() {
        assert_eq!(
            parse_command("create Chess Club"),
            Some(Command::Create {
                name: "Chess Club".into()
            })
        );
        assert_eq!(
            parse_command("join abc-123"),
            Some(Command::Join {
                id: "abc-123".into()
            })
        );
        assert_eq!(
            parse_command("leave abc-123"),
            Some(Command::Leave {
                id: "abc-123".into()
            })
        );
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(
            parse_command("frobnicate"),
            Some(Command::Unknown("frobnicate".into()))
        );
    }
}
