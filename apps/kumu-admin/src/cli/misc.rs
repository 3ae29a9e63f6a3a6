//! `payment verify`, `check` and `config show`.

use super::{CliError, Context};
use crate::render::{self, Table};
use clap::{Args, Subcommand, ValueEnum};
use kumu_client::ApiEndpoints;
use kumu_core::validation::{ValidationErrors, bank, form, messages};
use serde::Serialize;
use std::io::Write;

// =============================================================================
// PAYMENT
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum PaymentCommand {
    /// Look up a finished checkout session.
    Verify { session_id: String },
}

pub async fn run_payment(
    ctx: &Context,
    command: PaymentCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        PaymentCommand::Verify { session_id } => cmd_verify_payment(ctx, &session_id, out).await,
    }
}

pub async fn cmd_verify_payment(
    ctx: &Context,
    session_id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let session_id = session_id.trim();
    if session_id.is_empty() {
        return Err(CliError::Input("No checkout session id given".to_string()));
    }
    let payment = ctx.anonymous().verify_payment(session_id).await?;
    ctx.emit(out, &payment, || {
        format!(
            "Payment confirmed\n  plan:          {}\n  status:        {}\n  next billing:  {}\n",
            payment.plan_name.as_deref().unwrap_or("Kumu Coaching"),
            payment.status.as_deref().map(render::badge).unwrap_or_else(|| "-".to_string()),
            render::opt_date(payment.next_billing_date)
        )
    })
}

// =============================================================================
// CHECK
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckKind {
    Routing,
    Account,
    BankName,
    Holder,
    Email,
    Phone,
}

impl CheckKind {
    fn field(self) -> &'static str {
        match self {
            CheckKind::Routing => "routingNumber",
            CheckKind::Account => "bankAccount",
            CheckKind::BankName => "bankName",
            CheckKind::Holder => "accountHolderName",
            CheckKind::Email => "email",
            CheckKind::Phone => "phone",
        }
    }

    /// Run the validator; the message is the one the forms show.
    #[must_use]
    pub fn check(self, value: &str) -> Result<(), &'static str> {
        let (ok, message) = match self {
            CheckKind::Routing => (bank::routing_number(value), messages::ROUTING_NUMBER),
            CheckKind::Account => (bank::account_number(value), messages::ACCOUNT_NUMBER),
            CheckKind::BankName => (bank::bank_name(value), messages::BANK_NAME),
            CheckKind::Holder => (bank::account_holder_name(value), messages::ACCOUNT_HOLDER_NAME),
            CheckKind::Email => (form::email(value), messages::EMAIL),
            CheckKind::Phone => (form::phone(value), messages::PHONE),
        };
        if ok { Ok(()) } else { Err(message) }
    }
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(value_enum)]
    pub kind: CheckKind,
    pub value: String,
}

/// Prints `ok` for a valid value; an invalid one is an error.
pub fn cmd_check(
    ctx: &Context,
    kind: CheckKind,
    value: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match kind.check(value) {
        Ok(()) => ctx.done(out, "ok"),
        Err(message) => {
            let mut errors = ValidationErrors::new();
            errors.push(kind.field(), message);
            Err(errors.into())
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration and every endpoint URL.
    Show,
}

pub fn run_config(ctx: &Context, command: ConfigCommand, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => cmd_config_show(ctx, out),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView<'a> {
    #[serde(flatten)]
    config: &'a crate::config::Config,
    endpoints: serde_json::Map<String, serde_json::Value>,
}

pub fn cmd_config_show(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let endpoints = ApiEndpoints::new(ctx.config.api_url.clone()).table();
    let view = ConfigView {
        config: &ctx.config,
        endpoints: endpoints
            .iter()
            .map(|(name, url)| ((*name).to_string(), serde_json::Value::String(url.clone())))
            .collect(),
    };
    ctx.emit(out, &view, || {
        let mut text = format!(
            "API URL:      {}\nEnvironment:  {}\nToken store:  {}\n\n",
            ctx.config.api_url,
            ctx.config.env,
            ctx.config.token_db.display()
        );
        let mut table = Table::new(["ENDPOINT", "URL"]);
        for (name, url) in &endpoints {
            table.row([(*name).to_string(), url.clone()]);
        }
        text.push_str(&table.render());
        text
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_kinds_use_form_messages() {
        assert_eq!(CheckKind::Routing.check("021000021"), Ok(()));
        assert_eq!(CheckKind::Routing.check("123456789"), Err(messages::ROUTING_NUMBER));
        assert_eq!(CheckKind::Account.check("123"), Err(messages::ACCOUNT_NUMBER));
        assert_eq!(CheckKind::Phone.check("+1 (555) 010-9999"), Ok(()));
        assert_eq!(CheckKind::Email.check("sam@kumu"), Err(messages::EMAIL));
    }
}
