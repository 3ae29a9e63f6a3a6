//! `promo` subcommands: CRUD, presets, code testing and checkout sync.

use super::{CliError, Context, parse_date};
use crate::render;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use kumu_core::money::{Amount, format_currency};
use kumu_client::KumuClient;
use kumu_core::schema::{DiscountType, PromoCode, PromoCodeDraft, QuickPreset};
use kumu_core::session::Role;
use kumu_core::stats::BASE_PRICE;
use serde::Serialize;
use std::io::Write;
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum PromoCommand {
    /// List every promo code.
    List,
    /// Show one promo code.
    Show { id: String },
    /// Create a promo code.
    Create(PromoCreateArgs),
    /// Change fields of an existing promo code.
    Update {
        id: String,
        #[command(flatten)]
        changes: PromoChangeArgs,
    },
    /// Delete a promo code.
    Delete {
        id: String,
        /// Required; there is no undo.
        #[arg(long)]
        yes: bool,
    },
    /// Create a preset code (QUICK20 or SAVE10).
    Quick {
        #[arg(value_parser = clap::value_parser!(QuickPreset))]
        preset: QuickPreset,
    },
    /// Check a code against a price.
    Test {
        code: String,
        #[arg(long, default_value = "20.99")]
        amount: Amount,
    },
    /// Push promo codes to the checkout provider.
    Sync,
}

/// Optional fields shared by create and update.
#[derive(Debug, Default, Args)]
pub struct PromoFieldArgs {
    #[arg(long)]
    pub description: Option<String>,
    /// Minimum order amount.
    #[arg(long)]
    pub minimum: Option<Amount>,
    #[arg(long)]
    pub max_uses: Option<u64>,
    #[arg(long, value_parser = parse_date)]
    pub valid_from: Option<DateTime<Utc>>,
    #[arg(long, value_parser = parse_date)]
    pub valid_until: Option<DateTime<Utc>>,
    #[arg(long)]
    pub influencer_name: Option<String>,
    #[arg(long)]
    pub influencer_email: Option<String>,
    #[arg(long)]
    pub influencer_handle: Option<String>,
    #[arg(long)]
    pub influencer_notes: Option<String>,
}

impl PromoFieldArgs {
    fn apply(self, draft: &mut PromoCodeDraft) {
        if let Some(v) = self.description {
            draft.description = Some(v);
        }
        if let Some(v) = self.minimum {
            draft.minimum_amount = Some(v);
        }
        if let Some(v) = self.max_uses {
            draft.max_uses = Some(v);
        }
        if let Some(v) = self.valid_from {
            draft.valid_from = Some(v);
        }
        if let Some(v) = self.valid_until {
            draft.valid_until = Some(v);
        }
        if let Some(v) = self.influencer_name {
            draft.influencer_name = Some(v);
        }
        if let Some(v) = self.influencer_email {
            draft.influencer_email = Some(v);
        }
        if let Some(v) = self.influencer_handle {
            draft.influencer_social_handle = Some(v);
        }
        if let Some(v) = self.influencer_notes {
            draft.influencer_notes = Some(v);
        }
    }
}

#[derive(Debug, Args)]
pub struct PromoCreateArgs {
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub name: String,
    /// percentage or fixed_amount.
    #[arg(long = "type", value_parser = clap::value_parser!(DiscountType))]
    pub discount_type: DiscountType,
    /// Percent for percentage codes, dollars for fixed codes.
    #[arg(long)]
    pub value: Amount,
    #[command(flatten)]
    pub fields: PromoFieldArgs,
}

impl PromoCreateArgs {
    #[must_use]
    pub fn into_draft(self) -> PromoCodeDraft {
        let mut draft = PromoCodeDraft::new(
            self.code.trim().to_ascii_uppercase(),
            self.name,
            self.discount_type,
            self.value,
        );
        self.fields.apply(&mut draft);
        draft
    }
}

#[derive(Debug, Default, Args)]
pub struct PromoChangeArgs {
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "type", value_parser = clap::value_parser!(DiscountType))]
    pub discount_type: Option<DiscountType>,
    #[arg(long)]
    pub value: Option<Amount>,
    #[command(flatten)]
    pub fields: PromoFieldArgs,
}

impl PromoChangeArgs {
    pub fn apply(self, draft: &mut PromoCodeDraft) {
        if let Some(code) = self.code {
            draft.code = code.trim().to_ascii_uppercase();
        }
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(discount_type) = self.discount_type {
            draft.discount_type = discount_type;
        }
        if let Some(value) = self.value {
            draft.value = value;
        }
        self.fields.apply(draft);
    }
}

pub async fn run(ctx: &Context, command: PromoCommand, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        PromoCommand::List => cmd_list(ctx, out).await,
        PromoCommand::Show { id } => cmd_show(ctx, &id, out).await,
        PromoCommand::Create(args) => cmd_create(ctx, args.into_draft(), out).await,
        PromoCommand::Update { id, changes } => cmd_update(ctx, &id, changes, out).await,
        PromoCommand::Delete { id, yes } => cmd_delete(ctx, &id, yes, out).await,
        PromoCommand::Quick { preset } => cmd_quick(ctx, preset, Utc::now(), out).await,
        PromoCommand::Test { code, amount } => cmd_test(ctx, &code, amount, out).await,
        PromoCommand::Sync => cmd_sync(ctx, out).await,
    }
}

pub async fn cmd_list(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    let codes = ctx.client_for(Role::Admin)?.promo_codes().await?;
    ctx.emit(out, &codes, || render::promo_codes(&codes))
}

/// The API has no single-code read; codes are looked up in the full list.
async fn find_code(client: &KumuClient, id: &str) -> Result<PromoCode, CliError> {
    client
        .promo_codes()
        .await?
        .into_iter()
        .find(|code| code.id == id)
        .ok_or_else(|| CliError::NotFound(format!("Promo code {}", id)))
}

pub async fn cmd_show(ctx: &Context, id: &str, out: &mut impl Write) -> Result<(), CliError> {
    let code = find_code(&ctx.client_for(Role::Admin)?, id).await?;
    ctx.emit(out, &code, || render::promo_code_detail(&code))
}

pub async fn cmd_create(
    ctx: &Context,
    draft: PromoCodeDraft,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let created = ctx.client_for(Role::Admin)?.create_promo_code(&draft).await?;
    info!(code = %created.code, id = %created.id, "promo code created");
    ctx.emit(out, &created, || {
        format!("Created {}\n\n{}", created.code, render::promo_code_detail(&created))
    })
}

/// Fetch the code, overlay `changes`, and replace it.
pub async fn cmd_update(
    ctx: &Context,
    id: &str,
    changes: PromoChangeArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let client = ctx.client_for(Role::Admin)?;
    let existing = find_code(&client, id).await?;
    let mut draft = PromoCodeDraft::from_existing(&existing);
    changes.apply(&mut draft);
    let updated = client.update_promo_code(id, &draft).await?;
    ctx.emit(out, &updated, || {
        format!("Updated {}\n\n{}", updated.code, render::promo_code_detail(&updated))
    })
}

pub async fn cmd_delete(ctx: &Context, id: &str, yes: bool, out: &mut impl Write) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::Input(format!(
            "Deleting promo code {} cannot be undone; pass --yes to confirm",
            id
        )));
    }
    ctx.client_for(Role::Admin)?.delete_promo_code(id).await?;
    ctx.done(out, &format!("Deleted promo code {}", id))
}

pub async fn cmd_quick(
    ctx: &Context,
    preset: QuickPreset,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    cmd_create(ctx, preset.draft(now), out).await
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestOutcome {
    code: String,
    amount: Amount,
    valid: bool,
    discount: Amount,
    final_amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Ask the server what `code` would do to `amount`.
pub async fn cmd_test(
    ctx: &Context,
    code: &str,
    amount: Amount,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let code = code.trim().to_ascii_uppercase();
    let answer = ctx.anonymous().validate_promo_code(&code, amount).await?;
    let outcome = TestOutcome {
        valid: answer.valid,
        discount: answer.discount.unwrap_or_default(),
        final_amount: answer.final_price(amount),
        error: answer.error.clone(),
        code,
        amount,
    };
    ctx.emit(out, &outcome, || {
        if outcome.valid {
            let base = if amount == BASE_PRICE { " (base price)" } else { "" };
            format!(
                "VALID  {} on {}{}: discount {}, final {}\n",
                outcome.code,
                format_currency(amount),
                base,
                format_currency(outcome.discount),
                format_currency(outcome.final_amount)
            )
        } else {
            format!(
                "INVALID  {}: {}\n",
                outcome.code,
                outcome.error.as_deref().unwrap_or("code was rejected")
            )
        }
    })
}

pub async fn cmd_sync(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    ctx.client_for(Role::Admin)?.sync_stripe().await?;
    ctx.done(out, "Promo codes synced with Stripe")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn create_args_build_upper_case_draft() {
        let args = PromoCreateArgs {
            code: " spring24 ".to_string(),
            name: "Spring".to_string(),
            discount_type: DiscountType::Percentage,
            value: Amount::from_units(15),
            fields: PromoFieldArgs {
                influencer_name: Some("Alex".to_string()),
                max_uses: Some(50),
                ..PromoFieldArgs::default()
            },
        };
        let draft = args.into_draft();
        assert_eq!(draft.code, "SPRING24");
        assert_eq!(draft.max_uses, Some(50));
        assert_eq!(draft.influencer_name.as_deref(), Some("Alex"));
    }

    #[test]
    fn changes_only_touch_given_fields() {
        let mut draft = PromoCodeDraft::new("A1", "Old", DiscountType::FixedAmount, Amount::from_units(5));
        let changes = PromoChangeArgs {
            name: Some("New".to_string()),
            ..PromoChangeArgs::default()
        };
        changes.apply(&mut draft);
        assert_eq!(draft.name, "New");
        assert_eq!(draft.code, "A1");
        assert_eq!(draft.value, Amount::from_units(5));
    }
}
