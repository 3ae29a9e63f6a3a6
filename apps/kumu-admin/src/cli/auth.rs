//! `admin` / `influencer` login, logout and whoami.

use super::{CliError, Context, password_or_stdin};
use crate::render;
use crate::token;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use kumu_core::schema::LoginRequest;
use kumu_core::session::{Role, TokenStore};
use kumu_core::validation::{ValidationErrors, form, messages};
use serde::Serialize;
use std::io::Write;
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Log in and store the token.
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "KUMU_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored token.
    Logout,
    /// Show who the stored token belongs to.
    Whoami,
}

pub async fn run(
    ctx: &Context,
    role: Role,
    command: AuthCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        AuthCommand::Login { email, password } => {
            let password = password_or_stdin(password)?;
            cmd_login(ctx, role, &email, &password, out).await
        }
        AuthCommand::Logout => cmd_logout(ctx, role, out),
        AuthCommand::Whoami => cmd_whoami(ctx, role, out),
    }
}

/// Exchange credentials for a token and store it under the role's key.
pub async fn cmd_login(
    ctx: &Context,
    role: Role,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut errors = ValidationErrors::new();
    errors.check(form::required(email), "email", messages::REQUIRED);
    errors.check(form::required(password), "password", messages::REQUIRED);
    errors.into_result()?;

    let client = ctx.anonymous();
    let request = LoginRequest::new(email.trim(), password);
    let session = match role {
        Role::Admin => client.admin_login(&request).await?,
        Role::Influencer => client.influencer_login(&request).await?,
    };
    ctx.store().save(&session)?;
    info!(%role, "token stored");
    ctx.done(out, &format!("Logged in as {} ({})", role, email.trim()))
}

pub fn cmd_logout(ctx: &Context, role: Role, out: &mut impl Write) -> Result<(), CliError> {
    let message = if ctx.store().clear(role)? {
        format!("Logged out {}", role)
    } else {
        format!("No {} session stored", role)
    };
    ctx.done(out, &message)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WhoAmI {
    role: Role,
    subject: Option<String>,
    email: Option<String>,
    saved_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    expired: bool,
}

/// Decode the stored token. Opaque tokens report no claims.
pub fn cmd_whoami(ctx: &Context, role: Role, out: &mut impl Write) -> Result<(), CliError> {
    let record = ctx
        .store()
        .load_record(role)?
        .ok_or(CliError::NotLoggedIn(role))?;
    let claims = token::decode_claims(&record.token).unwrap_or_default();
    let info = WhoAmI {
        role,
        subject: claims.sub.clone(),
        email: claims.email.clone(),
        saved_at: DateTime::from_timestamp(record.saved_at_unix, 0),
        expires_at: claims.expires_at(),
        expired: claims.is_expired(Utc::now()),
    };

    ctx.emit(out, &info, || {
        let mut text = format!("Logged in as {}\n", role);
        text.push_str(&format!("  subject:  {}\n", info.subject.as_deref().unwrap_or("-")));
        text.push_str(&format!("  email:    {}\n", info.email.as_deref().unwrap_or("-")));
        text.push_str(&format!("  saved:    {}\n", render::opt_date(info.saved_at)));
        let expiry = match info.expires_at {
            Some(at) if info.expired => format!("{} (EXPIRED)", render::date(at)),
            Some(at) => render::date(at),
            None => "-".to_string(),
        };
        text.push_str(&format!("  expires:  {}\n", expiry));
        text
    })
}
