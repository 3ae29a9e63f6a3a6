//! Command-line interface.
//!
//! Every subcommand is a `cmd_*` function taking a [`Context`] and an output
//! sink, so tests can drive commands without a terminal.

pub mod auth;
pub mod dashboard;
pub mod influencers;
pub mod me;
pub mod misc;
pub mod promo;
pub mod withdrawals;

use crate::config::{AppEnv, Config, DEFAULT_API_URL};
use crate::token::{self, TokenError};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand};
use kumu_client::{ApiError, KumuClient};
use kumu_core::session::{RedbTokenStore, Role, StoreError, TokenStore};
use kumu_core::validation::ValidationErrors;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Not logged in as {0}; run `kumu-admin {0} login` first")]
    NotLoggedIn(Role),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Input(String),
}

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Kumu coaching admin and influencer console.
#[derive(Debug, Parser)]
#[command(name = "kumu-admin", version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the Kumu API.
    #[arg(long, env = "KUMU_API_BASE_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Deployment environment.
    #[arg(long, env = "KUMU_ENV", value_enum, default_value_t = AppEnv::Development, global = true)]
    pub env: AppEnv,

    /// Token database path.
    #[arg(long, env = "KUMU_TOKEN_DB", global = true)]
    pub token_db: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Admin session.
    Admin {
        #[command(subcommand)]
        command: auth::AuthCommand,
    },
    /// Influencer session.
    Influencer {
        #[command(subcommand)]
        command: auth::AuthCommand,
    },
    /// Admin dashboard.
    Dashboard(dashboard::DashboardArgs),
    /// Promo codes (admin).
    Promo {
        #[command(subcommand)]
        command: promo::PromoCommand,
    },
    /// Influencer statistics and onboarding review (admin).
    Influencers {
        #[command(subcommand)]
        command: influencers::InfluencersCommand,
    },
    /// Withdrawal review queue (admin).
    Withdrawals {
        #[command(subcommand)]
        command: withdrawals::WithdrawalsCommand,
    },
    /// Influencer self-service.
    Me {
        #[command(subcommand)]
        command: me::MeCommand,
    },
    /// Apply for an influencer account.
    Register(me::RegisterArgs),
    /// Checkout results.
    Payment {
        #[command(subcommand)]
        command: misc::PaymentCommand,
    },
    /// Run a single field validator.
    Check(misc::CheckArgs),
    /// Resolved configuration.
    Config {
        #[command(subcommand)]
        command: misc::ConfigCommand,
    },
}

impl Commands {
    /// Role whose token the command sends, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self {
            Commands::Dashboard(_)
            | Commands::Promo { .. }
            | Commands::Influencers { .. }
            | Commands::Withdrawals { .. } => Some(Role::Admin),
            Commands::Me { .. } => Some(Role::Influencer),
            _ => None,
        }
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// What every command needs: configuration, output mode and the token store.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub json: bool,
    store: RedbTokenStore,
}

impl Context {
    /// Opens (creating if needed) the token store at `config.token_db`.
    pub fn open(config: Config, json: bool) -> Result<Self, CliError> {
        let store = RedbTokenStore::open(&config.token_db)?;
        Ok(Self {
            config,
            json,
            store,
        })
    }

    #[must_use]
    pub fn store(&self) -> &RedbTokenStore {
        &self.store
    }

    /// Client without a session.
    #[must_use]
    pub fn anonymous(&self) -> KumuClient {
        KumuClient::new(self.config.api_url.clone())
    }

    /// Client carrying the stored session for `role`.
    pub fn client_for(&self, role: Role) -> Result<KumuClient, CliError> {
        let session = self.store.load(role)?.ok_or(CliError::NotLoggedIn(role))?;
        if let Some(at) = token::token_expiry(&session.token).filter(|at| *at <= Utc::now()) {
            warn!(%role, expired_at = %at, "stored token has expired; log in again if requests fail");
        }
        Ok(self.anonymous().with_session(session))
    }

    /// Write `value` as JSON in `--json` mode, otherwise the rendered text.
    pub fn emit<T: Serialize + ?Sized>(
        &self,
        out: &mut impl Write,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<(), CliError> {
        if self.json {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        } else {
            write!(out, "{}", text())?;
        }
        Ok(())
    }

    /// A one-line confirmation; `{"ok":true,"message":..}` in JSON mode.
    pub fn done(&self, out: &mut impl Write, message: &str) -> Result<(), CliError> {
        self.emit(
            out,
            &serde_json::json!({ "ok": true, "message": message }),
            || format!("{}\n", message),
        )
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// `YYYY-MM-DD` or RFC 3339.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>, String> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("Invalid date {:?} (expected YYYY-MM-DD)", text))
}

/// First line of `input`, without the line ending.
pub fn read_secret(input: &mut impl BufRead, what: &str) -> Result<String, CliError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let secret = line.trim_end_matches(['\r', '\n']).to_string();
    if secret.is_empty() {
        return Err(CliError::Input(format!("No {} given on stdin", what)));
    }
    Ok(secret)
}

pub(crate) fn password_or_stdin(password: Option<String>) -> Result<String, CliError> {
    match password {
        Some(password) => Ok(password),
        None => {
            eprint!("Password: ");
            std::io::stderr().flush()?;
            read_secret(&mut std::io::stdin().lock(), "password")
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Run the parsed command against stdout.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::new(cli.api_url, cli.env, cli.token_db);
    info!(api = %config.api_url, env = %config.env, "starting");
    let ctx = Context::open(config, cli.json)?;
    let role = cli.command.role();
    let mut out = std::io::stdout();

    let result = dispatch(&ctx, cli.command, &mut out).await;

    if let (Err(CliError::Api(ApiError::Unauthorized(message))), Some(role)) = (&result, role) {
        warn!(%role, %message, "server rejected the stored token; clearing it");
        ctx.store().clear(role)?;
    }
    result
}

async fn dispatch(ctx: &Context, command: Commands, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        Commands::Admin { command } => auth::run(ctx, Role::Admin, command, out).await,
        Commands::Influencer { command } => auth::run(ctx, Role::Influencer, command, out).await,
        Commands::Dashboard(args) => {
            dashboard::cmd_dashboard(ctx, args.tab, args.watch, None, out).await
        }
        Commands::Promo { command } => promo::run(ctx, command, out).await,
        Commands::Influencers { command } => influencers::run(ctx, command, out).await,
        Commands::Withdrawals { command } => withdrawals::run(ctx, command, out).await,
        Commands::Me { command } => me::run(ctx, command, out).await,
        Commands::Register(args) => me::cmd_register(ctx, args, out).await,
        Commands::Payment { command } => misc::run_payment(ctx, command, out).await,
        Commands::Check(args) => misc::cmd_check(ctx, args.kind, &args.value, out),
        Commands::Config { command } => misc::run_config(ctx, command, out),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kumu-admin",
            "promo",
            "list",
            "--json",
            "--api-url",
            "http://api.test",
            "-vv",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.api_url, "http://api.test");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command.role(), Some(Role::Admin));
    }

    #[test]
    fn command_roles() {
        let me = Cli::try_parse_from(["kumu-admin", "me", "profile"]).unwrap();
        assert_eq!(me.command.role(), Some(Role::Influencer));
        let check = Cli::try_parse_from(["kumu-admin", "check", "routing", "021000021"]).unwrap();
        assert_eq!(check.command.role(), None);
    }

    #[test]
    fn dates_parse() {
        assert_eq!(
            parse_date("2024-06-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date("2024-06-01T10:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
        );
        assert!(parse_date("06/01/2024").is_err());
    }

    #[test]
    fn secret_from_reader() {
        let mut input = std::io::Cursor::new("hunter22\nrest");
        assert_eq!(read_secret(&mut input, "password").unwrap(), "hunter22");
        let mut empty = std::io::Cursor::new("");
        assert!(matches!(read_secret(&mut empty, "password"), Err(CliError::Input(_))));
    }
}
