//! `influencers`: performance statistics and onboarding review.

use super::{CliError, Context};
use crate::render;
use clap::Subcommand;
use kumu_core::session::Role;
use kumu_core::stats::InfluencerStats;
use kumu_core::workflow::ApprovalAction;
use std::io::Write;
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum InfluencersCommand {
    /// Per-influencer promo code performance.
    Stats {
        /// Show one influencer in detail (case-insensitive).
        #[arg(long)]
        name: Option<String>,
    },
    /// Applications awaiting review.
    Pending,
    /// Approve an application.
    Approve { id: String },
    /// Reject an application.
    Reject { id: String },
}

pub async fn run(
    ctx: &Context,
    command: InfluencersCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        InfluencersCommand::Stats { name } => cmd_stats(ctx, name.as_deref(), out).await,
        InfluencersCommand::Pending => cmd_pending(ctx, out).await,
        InfluencersCommand::Approve { id } => cmd_review(ctx, &id, ApprovalAction::Approve, out).await,
        InfluencersCommand::Reject { id } => cmd_review(ctx, &id, ApprovalAction::Reject, out).await,
    }
}

pub async fn cmd_stats(ctx: &Context, name: Option<&str>, out: &mut impl Write) -> Result<(), CliError> {
    let codes = ctx.client_for(Role::Admin)?.promo_codes().await?;
    let stats = InfluencerStats::aggregate(&codes);

    match name {
        None => ctx.emit(out, &stats, || render::influencer_stats(&stats)),
        Some(name) => {
            let wanted = name.trim().to_lowercase();
            let one = stats
                .iter()
                .find(|s| s.name.to_lowercase() == wanted)
                .ok_or_else(|| CliError::NotFound(format!("Influencer {:?}", name)))?;
            ctx.emit(out, one, || render::influencer_detail(one))
        }
    }
}

pub async fn cmd_pending(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let pending = ctx.client_for(Role::Admin)?.pending_influencers().await?;
    ctx.emit(out, &pending, || render::pending_influencers(&pending))
}

/// Look the application up by id, then approve or reject it.
pub async fn cmd_review(
    ctx: &Context,
    id: &str,
    action: ApprovalAction,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let client = ctx.client_for(Role::Admin)?;
    let pending = client.pending_influencers().await?;
    let applicant = pending
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| CliError::NotFound(format!("Influencer application {}", id)))?;
    client.review_influencer(applicant, action).await?;
    info!(id, %action, "influencer reviewed");
    ctx.done(
        out,
        &format!(
            "Influencer {} ({}) {}",
            applicant.name,
            applicant.email,
            action.target()
        ),
    )
}
