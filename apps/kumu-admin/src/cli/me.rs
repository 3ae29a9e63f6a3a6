//! Influencer self-service (`me ...`) and sign-up (`register`).

use super::dashboard::{Refresh, clear_screen};
use super::{CliError, Context, password_or_stdin};
use crate::render;
use clap::{Args, Subcommand};
use kumu_client::InfluencerSnapshot;
use kumu_core::money::{Amount, format_currency};
use kumu_core::schema::{InfluencerProfile, InfluencerRegistration, NewWithdrawal, ProfileUpdate};
use kumu_core::session::Role;
use kumu_core::stats::EarningsSummary;
use kumu_core::validation::{ValidationErrors, bank, form, messages};
use std::io::Write;
use tracing::{info, warn};

#[derive(Debug, Subcommand)]
pub enum MeCommand {
    /// Profile, earnings, commissions, withdrawals and codes in one view.
    Dashboard {
        /// Refresh every SECS seconds until Ctrl-C.
        #[arg(long, value_name = "SECS", num_args = 0..=1, default_missing_value = "30")]
        watch: Option<u64>,
    },
    /// Show the profile.
    Profile,
    /// Change profile fields.
    UpdateProfile(ProfileArgs),
    /// Earned commissions.
    Commissions,
    /// Own withdrawal requests.
    Withdrawals,
    /// Request a payout of at most the pending earnings. Bank details default
    /// to the profile's.
    Withdraw(WithdrawArgs),
    /// Promo codes attributed to me.
    PromoCodes,
}

#[derive(Debug, Default, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub social_handle: Option<String>,
    #[arg(long)]
    pub bank_account: Option<String>,
    #[arg(long)]
    pub bank_name: Option<String>,
    #[arg(long)]
    pub account_holder: Option<String>,
}

impl ProfileArgs {
    pub fn apply(self, update: &mut ProfileUpdate) {
        let fields = [
            (self.name, &mut update.name),
            (self.email, &mut update.email),
            (self.social_handle, &mut update.social_handle),
            (self.bank_account, &mut update.bank_account),
            (self.bank_name, &mut update.bank_name),
            (self.account_holder, &mut update.account_holder_name),
        ];
        for (given, field) in fields {
            if let Some(value) = given {
                *field = value.trim().to_string();
            }
        }
    }
}

/// Form checks for a profile edit. Bank fields are only checked when set.
pub fn validate_profile(update: &ProfileUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(form::required(&update.name), "name", messages::REQUIRED);
    errors.check(form::email(&update.email), "email", messages::EMAIL);
    if !update.bank_account.is_empty() {
        errors.check(
            bank::account_number(&update.bank_account),
            "bankAccount",
            messages::ACCOUNT_NUMBER,
        );
    }
    if !update.bank_name.is_empty() {
        errors.check(bank::bank_name(&update.bank_name), "bankName", messages::BANK_NAME);
    }
    if !update.account_holder_name.is_empty() {
        errors.check(
            bank::account_holder_name(&update.account_holder_name),
            "accountHolderName",
            messages::ACCOUNT_HOLDER_NAME,
        );
    }
    errors.into_result()
}

#[derive(Debug, Default, Args)]
pub struct WithdrawArgs {
    #[arg(long)]
    pub amount: Amount,
    #[arg(long)]
    pub bank_account: Option<String>,
    #[arg(long)]
    pub bank_name: Option<String>,
    #[arg(long)]
    pub account_holder: Option<String>,
    #[arg(long)]
    pub routing_number: Option<String>,
}

#[derive(Debug, Default, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    /// Read from stdin when omitted.
    #[arg(long, env = "KUMU_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Defaults to the password.
    #[arg(long)]
    pub confirm_password: Option<String>,
    #[arg(long)]
    pub social_handle: String,
    #[arg(long)]
    pub bank_account: Option<String>,
    #[arg(long)]
    pub bank_name: Option<String>,
    #[arg(long)]
    pub account_holder: Option<String>,
}

pub async fn run(ctx: &Context, command: MeCommand, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        MeCommand::Dashboard { watch } => cmd_dashboard(ctx, watch, None, out).await,
        MeCommand::Profile => cmd_profile(ctx, out).await,
        MeCommand::UpdateProfile(args) => cmd_update_profile(ctx, args, out).await,
        MeCommand::Commissions => cmd_commissions(ctx, out).await,
        MeCommand::Withdrawals => cmd_withdrawals(ctx, out).await,
        MeCommand::Withdraw(args) => cmd_withdraw(ctx, args, out).await,
        MeCommand::PromoCodes => cmd_promo_codes(ctx, out).await,
    }
}

fn show(ctx: &Context, snapshot: &InfluencerSnapshot, out: &mut impl Write) -> Result<(), CliError> {
    ctx.emit(out, snapshot, || render::influencer_dashboard(snapshot))
}

pub async fn cmd_dashboard(
    ctx: &Context,
    watch: Option<u64>,
    rounds: Option<u64>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let client = ctx.client_for(Role::Influencer)?;
    let Some(every) = watch else {
        let snapshot = InfluencerSnapshot::load(&client).await;
        return show(ctx, &snapshot, out);
    };

    let mut refresh = Refresh::new(every, rounds);
    while refresh.next().await {
        let snapshot = InfluencerSnapshot::load(&client).await;
        clear_screen(ctx, out)?;
        show(ctx, &snapshot, out)?;
        out.flush()?;
    }
    Ok(())
}

pub async fn cmd_profile(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let profile = ctx.client_for(Role::Influencer)?.influencer_profile().await?;
    ctx.emit(out, &profile, || render::profile(&profile))
}

/// Fetch the profile, overlay the given fields, validate, and save.
pub async fn cmd_update_profile(
    ctx: &Context,
    args: ProfileArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let client = ctx.client_for(Role::Influencer)?;
    let current = client.influencer_profile().await?;
    let mut update = ProfileUpdate::from_profile(&current);
    args.apply(&mut update);
    validate_profile(&update)?;
    client.update_influencer_profile(&update).await?;
    ctx.done(out, "Profile updated")
}

pub async fn cmd_commissions(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let commissions = ctx.client_for(Role::Influencer)?.commissions().await?;
    ctx.emit(out, &commissions, || {
        let summary = EarningsSummary::from_commissions(&commissions);
        format!(
            "{}\nPending {}  Approved {}  Paid {}  Total {}\n",
            render::commissions(&commissions),
            format_currency(summary.pending),
            format_currency(summary.approved),
            format_currency(summary.paid),
            format_currency(summary.total)
        )
    })
}

pub async fn cmd_withdrawals(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let withdrawals = ctx.client_for(Role::Influencer)?.influencer_withdrawals().await?;
    ctx.emit(out, &withdrawals, || render::withdrawals(&withdrawals, false))
}

/// Request a payout capped at the profile's pending earnings.
///
/// When the profile cannot be fetched the cap is unknown and only the
/// minimum amount and the bank details are checked here.
pub async fn cmd_withdraw(
    ctx: &Context,
    args: WithdrawArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let client = ctx.client_for(Role::Influencer)?;
    let profile = client
        .influencer_profile()
        .await
        .map_err(|err| warn!(error = %err, "profile unavailable; no balance cap or bank defaults"))
        .ok();
    let available = profile.as_ref().map(InfluencerProfile::available_for_withdrawal);

    let default = |given: Option<String>, stored: Option<&String>| -> String {
        given
            .or_else(|| stored.cloned())
            .unwrap_or_default()
            .trim()
            .to_string()
    };
    let request = NewWithdrawal {
        amount: args.amount,
        bank_account: default(
            args.bank_account,
            profile.as_ref().and_then(|p| p.bank_account.as_ref()),
        ),
        bank_name: default(args.bank_name, profile.as_ref().and_then(|p| p.bank_name.as_ref())),
        account_holder_name: default(
            args.account_holder,
            profile.as_ref().and_then(|p| p.account_holder_name.as_ref()),
        ),
        routing_number: args.routing_number.map(|r| r.trim().to_string()),
    };

    client.request_withdrawal(&request, available).await?;
    info!(amount = %request.amount, "withdrawal requested");
    ctx.done(
        out,
        &format!(
            "Withdrawal of {} requested to {} {}",
            format_currency(request.amount),
            request.bank_name,
            kumu_core::schema::mask_account(&request.bank_account)
        ),
    )
}

pub async fn cmd_promo_codes(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let codes = ctx.client_for(Role::Influencer)?.influencer_promo_codes().await?;
    ctx.emit(out, &codes, || render::promo_codes(&codes))
}

/// Submit an influencer application. Needs no session.
pub async fn cmd_register(
    ctx: &Context,
    args: RegisterArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let password = password_or_stdin(args.password)?;
    let confirm = args.confirm_password.unwrap_or_else(|| password.clone());
    let registration = InfluencerRegistration {
        name: args.name.trim().to_string(),
        email: args.email.trim().to_string(),
        password,
        social_handle: args.social_handle.trim().to_string(),
        bank_account: args.bank_account.unwrap_or_default().trim().to_string(),
        bank_name: args.bank_name.unwrap_or_default().trim().to_string(),
        account_holder_name: args.account_holder.unwrap_or_default().trim().to_string(),
    };
    ctx.anonymous()
        .register_influencer(&registration, &confirm)
        .await?;
    ctx.done(
        out,
        &format!(
            "Application for {} submitted; an admin will review it before you can log in",
            registration.email
        ),
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn update() -> ProfileUpdate {
        ProfileUpdate {
            name: "Sam Lee".to_string(),
            email: "sam@kumu.app".to_string(),
            social_handle: "@sam".to_string(),
            ..ProfileUpdate::default()
        }
    }

    #[test]
    fn profile_args_overlay_and_trim() {
        let mut current = update();
        ProfileArgs {
            bank_name: Some(" Chase ".to_string()),
            ..ProfileArgs::default()
        }
        .apply(&mut current);
        assert_eq!(current.bank_name, "Chase");
        assert_eq!(current.name, "Sam Lee");
    }

    #[test]
    fn profile_without_bank_details_is_valid() {
        assert!(validate_profile(&update()).is_ok());
    }

    #[test]
    fn profile_bank_fields_checked_when_set() {
        let mut bad = update();
        bad.bank_account = "12ab".to_string();
        bad.email = "nope".to_string();
        let errors = validate_profile(&bad).unwrap_err();
        assert_eq!(errors.for_field("bankAccount"), Some(messages::ACCOUNT_NUMBER));
        assert_eq!(errors.for_field("email"), Some(messages::EMAIL));
    }
}
