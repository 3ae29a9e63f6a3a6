//! `withdrawals`: the admin payout review queue.

use super::{CliError, Context};
use crate::render;
use clap::Subcommand;
use kumu_core::money::format_currency;
use kumu_core::schema::WithdrawalStatus;
use kumu_core::session::Role;
use kumu_core::stats::WithdrawalQueueStats;
use kumu_core::workflow::WithdrawalAction;
use std::io::Write;
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum WithdrawalsCommand {
    /// List requests with per-status totals.
    List {
        /// Only requests in this status.
        #[arg(long, value_parser = clap::value_parser!(WithdrawalStatus))]
        status: Option<WithdrawalStatus>,
    },
    /// Approve a pending request.
    Approve { id: String },
    /// Reject a pending request.
    Reject {
        id: String,
        /// Shown to the influencer.
        #[arg(long)]
        reason: Option<String>,
    },
    /// Mark an approved request as paid.
    Pay { id: String },
}

pub async fn run(
    ctx: &Context,
    command: WithdrawalsCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        WithdrawalsCommand::List { status } => cmd_list(ctx, status, out).await,
        WithdrawalsCommand::Approve { id } => {
            cmd_review(ctx, &id, WithdrawalAction::Approve, None, out).await
        }
        WithdrawalsCommand::Reject { id, reason } => {
            cmd_review(ctx, &id, WithdrawalAction::Reject, reason, out).await
        }
        WithdrawalsCommand::Pay { id } => {
            cmd_review(ctx, &id, WithdrawalAction::MarkPaid, None, out).await
        }
    }
}

pub async fn cmd_list(
    ctx: &Context,
    status: Option<WithdrawalStatus>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut requests = ctx.client_for(Role::Admin)?.admin_withdrawals().await?;
    let stats = WithdrawalQueueStats::compute(&requests);
    if let Some(status) = status {
        requests.retain(|w| w.status == status);
    }
    ctx.emit(out, &requests, || {
        let mut text = render::withdrawal_queue(&stats);
        if stats.awaiting_action() > 0 {
            text.push_str(&format!("{} awaiting action\n", stats.awaiting_action()));
        }
        text.push('\n');
        text.push_str(&render::withdrawals(&requests, true));
        text
    })
}

/// Look the request up by id, check the transition, then send the decision.
pub async fn cmd_review(
    ctx: &Context,
    id: &str,
    action: WithdrawalAction,
    reason: Option<String>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let client = ctx.client_for(Role::Admin)?;
    let requests = client.admin_withdrawals().await?;
    let request = requests
        .iter()
        .find(|w| w.id == id)
        .ok_or_else(|| CliError::NotFound(format!("Withdrawal request {}", id)))?;
    client.review_withdrawal(request, action, reason).await?;
    info!(id, %action, "withdrawal reviewed");
    ctx.done(
        out,
        &format!(
            "Withdrawal {} ({}) is now {}",
            request.id,
            format_currency(request.amount),
            action.target()
        ),
    )
}
