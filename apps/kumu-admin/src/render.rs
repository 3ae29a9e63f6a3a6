//! Plain-text rendering of tables, tab bars and detail blocks.
//!
//! Every function returns a `String`; the commands decide where it goes.

use chrono::{DateTime, Utc};
use kumu_client::{AdminSnapshot, InfluencerSnapshot};
use kumu_core::money::{format_currency, format_percent_bps};
use kumu_core::schema::{
    Commission, InfluencerProfile, PendingInfluencer, PromoCode, Subscription, User,
    WithdrawalRequest,
};
use kumu_core::stats::{
    InfluencerStats, InfluencerTally, OverviewStats, WithdrawalQueueStats,
};
use kumu_core::workflow::WithdrawalAction;

// =============================================================================
// PRIMITIVES
// =============================================================================

/// Column-aligned text table with a header rule.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }

        let line = |cells: &[String]| -> String {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    format!("{:<width$}", cell, width = *width)
                })
                .collect();
            padded.join("  ").trim_end().to_string()
        };

        let mut out = line(&self.headers);
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

/// `YYYY-MM-DD`.
#[must_use]
pub fn date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

#[must_use]
pub fn opt_date(at: Option<DateTime<Utc>>) -> String {
    at.map(date).unwrap_or_else(|| "-".to_string())
}

/// Status word as an upper-case badge.
#[must_use]
pub fn badge(status: &str) -> String {
    status.to_ascii_uppercase()
}

/// Up to two upper-case initials: `"Sam Lee"` is `"SL"`.
#[must_use]
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

fn empty_or(table: &Table, what: &str) -> String {
    if table.is_empty() {
        format!("No {} found.\n", what)
    } else {
        table.render()
    }
}

// =============================================================================
// ADMIN DASHBOARD
// =============================================================================

/// Dashboard tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Tab {
    Overview,
    Users,
    Subscriptions,
    PromoCodes,
    Influencers,
    Pending,
    Withdrawals,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Overview,
        Tab::Users,
        Tab::Subscriptions,
        Tab::PromoCodes,
        Tab::Influencers,
        Tab::Pending,
        Tab::Withdrawals,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Users => "Users",
            Tab::Subscriptions => "Subscriptions",
            Tab::PromoCodes => "Promo Codes",
            Tab::Influencers => "Influencers",
            Tab::Pending => "Pending Influencers",
            Tab::Withdrawals => "Withdrawals",
        }
    }

    /// Item count shown next to the label; the overview has none.
    #[must_use]
    pub fn count(self, snapshot: &AdminSnapshot) -> Option<usize> {
        match self {
            Tab::Overview => None,
            Tab::Users => Some(snapshot.users.len()),
            Tab::Subscriptions => Some(snapshot.subscriptions.len()),
            Tab::PromoCodes => Some(snapshot.promo_codes.len()),
            Tab::Influencers => Some(InfluencerTally::by_exact_name(&snapshot.promo_codes).len()),
            Tab::Pending => Some(snapshot.pending_influencers.len()),
            Tab::Withdrawals => Some(snapshot.withdrawals.len()),
        }
    }
}

/// `[Overview] | Users (12) | ...` with the active tab bracketed.
#[must_use]
pub fn tab_bar(snapshot: &AdminSnapshot, active: Tab) -> String {
    let tabs: Vec<String> = Tab::ALL
        .iter()
        .map(|tab| {
            let label = match tab.count(snapshot) {
                Some(n) => format!("{} ({})", tab.label(), n),
                None => tab.label().to_string(),
            };
            if *tab == active {
                format!("[{}]", label)
            } else {
                label
            }
        })
        .collect();
    tabs.join(" | ")
}

/// Tab bar, the active tab's content, and a note for lists that failed.
#[must_use]
pub fn admin_dashboard(snapshot: &AdminSnapshot, tab: Tab) -> String {
    let mut out = tab_bar(snapshot, tab);
    out.push_str("\n\n");
    let body = match tab {
        Tab::Overview => overview(&snapshot.overview()),
        Tab::Users => users(&snapshot.users),
        Tab::Subscriptions => subscriptions(&snapshot.subscriptions),
        Tab::PromoCodes => promo_codes(&snapshot.promo_codes),
        Tab::Influencers => influencer_tally(&InfluencerTally::by_exact_name(&snapshot.promo_codes)),
        Tab::Pending => pending_influencers(&snapshot.pending_influencers),
        Tab::Withdrawals => {
            let mut text = withdrawal_queue(&snapshot.withdrawal_stats());
            text.push('\n');
            text.push_str(&withdrawals(&snapshot.withdrawals, true));
            text
        }
    };
    out.push_str(&body);
    out.push_str(&failed_note(&snapshot.failed));
    out
}

fn failed_note(failed: &[&str]) -> String {
    if failed.is_empty() {
        String::new()
    } else {
        format!("\n(could not load: {})\n", failed.join(", "))
    }
}

#[must_use]
pub fn overview(stats: &OverviewStats) -> String {
    let cards = [
        ("Total Users", stats.total_users.to_string()),
        ("Active Subscriptions", stats.active_subscriptions.to_string()),
        ("Total Subscriptions", stats.total_subscriptions.to_string()),
        ("Total Revenue", format_currency(stats.total_revenue)),
        ("Active Promo Codes", stats.active_promo_codes.to_string()),
        ("Total Promo Codes", stats.total_promo_codes.to_string()),
        ("Promo Code Uses", stats.total_promo_uses.to_string()),
        ("Influencers", stats.total_influencers.to_string()),
    ];
    let width = cards.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    cards
        .iter()
        .map(|(k, v)| format!("{:<width$}  {}\n", k, v, width = width))
        .collect()
}

#[must_use]
pub fn users(users: &[User]) -> String {
    let mut table = Table::new(["EMAIL", "ROLE", "EMAIL STATUS", "JOINED"]);
    for user in users {
        table.row([
            user.email.clone(),
            badge(&user.role),
            badge(user.verification_label()),
            date(user.created_at),
        ]);
    }
    empty_or(&table, "users")
}

#[must_use]
pub fn subscriptions(subscriptions: &[Subscription]) -> String {
    let mut table = Table::new(["ID", "STATUS", "AMOUNT", "CURRENCY", "PERIOD END", "CREATED"]);
    for sub in subscriptions {
        table.row([
            sub.id.clone(),
            sub.status.to_string(),
            format_currency(sub.amount),
            sub.currency.to_ascii_uppercase(),
            opt_date(sub.current_period_end),
            date(sub.created_at),
        ]);
    }
    empty_or(&table, "subscriptions")
}

#[must_use]
pub fn promo_codes(codes: &[PromoCode]) -> String {
    let mut table = Table::new(["ID", "CODE", "NAME", "DISCOUNT", "USES", "STATUS", "INFLUENCER", "VALID UNTIL"]);
    for code in codes {
        let uses = match code.max_uses {
            Some(max) => format!("{}/{}", code.used_count, max),
            None => code.used_count.to_string(),
        };
        table.row([
            code.id.clone(),
            code.code.clone(),
            code.name.clone(),
            code.value_label(),
            uses,
            badge(code.status.as_str()),
            or_dash(code.influencer()),
            opt_date(code.valid_until),
        ]);
    }
    empty_or(&table, "promo codes")
}

#[must_use]
pub fn promo_code_detail(code: &PromoCode) -> String {
    let remaining = code
        .remaining_uses()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unlimited".to_string());
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", code.code, code.name));
    out.push_str(&format!("  id:           {}\n", code.id));
    out.push_str(&format!("  discount:     {} ({})\n", code.value_label(), code.discount_type.as_str()));
    out.push_str(&format!("  status:       {}\n", badge(code.status.as_str())));
    out.push_str(&format!("  uses:         {} (remaining {})\n", code.used_count, remaining));
    if let Some(min) = code.minimum_amount {
        out.push_str(&format!("  minimum:      {}\n", format_currency(min)));
    }
    out.push_str(&format!(
        "  valid:        {} to {}\n",
        opt_date(code.valid_from),
        opt_date(code.valid_until)
    ));
    if let Some(description) = code.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("  description:  {}\n", description));
    }
    if let Some(name) = code.influencer() {
        out.push_str(&format!("  influencer:   {}", name));
        if let Some(handle) = code.influencer_social_handle.as_deref().filter(|h| !h.is_empty()) {
            out.push_str(&format!(" {}", handle));
        }
        if let Some(email) = code.influencer_email.as_deref().filter(|e| !e.is_empty()) {
            out.push_str(&format!(" <{}>", email));
        }
        out.push('\n');
        if let Some(notes) = code.influencer_notes.as_deref().filter(|n| !n.is_empty()) {
            out.push_str(&format!("  notes:        {}\n", notes));
        }
    }
    out.push_str(&format!("  created:      {}\n", date(code.created_at)));
    out
}

#[must_use]
pub fn influencer_tally(rows: &[InfluencerTally]) -> String {
    let mut table = Table::new(["", "INFLUENCER", "CODES", "TOTAL USES", "PERFORMANCE"]);
    for row in rows {
        table.row([
            initials(&row.name),
            row.name.clone(),
            row.codes.to_string(),
            row.total_uses.to_string(),
            row.tier().label().to_string(),
        ]);
    }
    empty_or(&table, "influencers")
}

#[must_use]
pub fn influencer_stats(stats: &[InfluencerStats]) -> String {
    let mut table = Table::new([
        "INFLUENCER", "CODES", "ACTIVE", "USES", "DISCOUNT GIVEN", "AVG DISCOUNT", "CONVERSION", "TOP CODE", "PERFORMANCE",
    ]);
    for s in stats {
        table.row([
            s.name.clone(),
            s.total_codes.to_string(),
            s.active_codes.to_string(),
            s.total_uses.to_string(),
            format_currency(s.total_discount),
            format_currency(s.average_discount),
            format_percent_bps(s.conversion_rate_bps),
            or_dash(s.top_performing_code.as_deref()),
            s.tier().label().to_string(),
        ]);
    }
    empty_or(&table, "influencers")
}

#[must_use]
pub fn influencer_detail(stats: &InfluencerStats) -> String {
    let mut out = format!("{} [{}]\n", stats.name, initials(&stats.name));
    out.push_str(&format!("  email:          {}\n", or_dash(Some(stats.email.as_str()))));
    out.push_str(&format!("  social handle:  {}\n", or_dash(Some(stats.social_handle.as_str()))));
    out.push_str(&format!("  codes:          {} ({} active)\n", stats.total_codes, stats.active_codes));
    out.push_str(&format!("  total uses:     {}\n", stats.total_uses));
    out.push_str(&format!("  discount given: {}\n", format_currency(stats.total_discount)));
    out.push_str(&format!("  avg discount:   {}\n", format_currency(stats.average_discount)));
    out.push_str(&format!("  conversion:     {}\n", format_percent_bps(stats.conversion_rate_bps)));
    out.push_str(&format!("  top code:       {}\n", or_dash(stats.top_performing_code.as_deref())));
    out.push_str(&format!("  performance:    {}\n\n", stats.tier()));
    out.push_str(&promo_codes(&stats.promo_codes));
    out
}

#[must_use]
pub fn pending_influencers(pending: &[PendingInfluencer]) -> String {
    let mut table = Table::new(["ID", "NAME", "EMAIL", "SOCIAL", "BANK", "STATUS", "APPLIED"]);
    for p in pending {
        table.row([
            p.id.clone(),
            p.name.clone(),
            p.email.clone(),
            or_dash(Some(p.social_handle.as_str())),
            or_dash(p.bank_name.as_deref()),
            badge(p.status.as_str()),
            date(p.created_at),
        ]);
    }
    empty_or(&table, "pending influencers")
}

#[must_use]
pub fn withdrawal_queue(stats: &WithdrawalQueueStats) -> String {
    format!(
        "Pending {} ({})  Approved {} ({})  Paid {} ({})  Rejected {} ({})\n",
        stats.pending.count,
        format_currency(stats.pending.amount),
        stats.approved.count,
        format_currency(stats.approved.amount),
        stats.paid.count,
        format_currency(stats.paid.amount),
        stats.rejected.count,
        format_currency(stats.rejected.amount),
    )
}

fn actions_label(withdrawal: &WithdrawalRequest) -> String {
    let actions: Vec<&str> = withdrawal
        .status
        .available_actions()
        .iter()
        .map(|a: &WithdrawalAction| a.path_segment())
        .collect();
    if actions.is_empty() {
        "-".to_string()
    } else {
        actions.join("/")
    }
}

/// Admin view adds the influencer and the open actions.
#[must_use]
pub fn withdrawals(withdrawals: &[WithdrawalRequest], admin_view: bool) -> String {
    let mut headers = vec!["ID"];
    if admin_view {
        headers.push("INFLUENCER");
    }
    headers.extend(["AMOUNT", "STATUS", "BANK", "ACCOUNT", "REQUESTED", "PROCESSED", "NOTE"]);
    if admin_view {
        headers.push("ACTIONS");
    }

    let mut table = Table::new(headers);
    for w in withdrawals {
        let mut cells = vec![w.id.clone()];
        if admin_view {
            cells.push(or_dash(w.influencer_name.as_deref()));
        }
        cells.extend([
            format_currency(w.amount),
            badge(w.status.as_str()),
            w.bank_name.clone(),
            w.masked_account(),
            date(w.requested_at),
            opt_date(w.processed_at),
            or_dash(w.rejection_reason.as_deref()),
        ]);
        if admin_view {
            cells.push(actions_label(w));
        }
        table.row(cells);
    }
    empty_or(&table, "withdrawal requests")
}

// =============================================================================
// INFLUENCER DASHBOARD
// =============================================================================

#[must_use]
pub fn commissions(commissions: &[Commission]) -> String {
    let mut table = Table::new(["ID", "PROMO CODE", "AMOUNT", "STATUS", "EARNED", "PAID"]);
    for c in commissions {
        table.row([
            c.id.clone(),
            or_dash(Some(c.promo_code.as_str())),
            format_currency(c.amount),
            badge(c.status.as_str()),
            date(c.created_at),
            opt_date(c.paid_at),
        ]);
    }
    empty_or(&table, "commissions")
}

#[must_use]
pub fn profile(profile: &InfluencerProfile) -> String {
    let mut out = format!("{} [{}]\n", profile.name, initials(&profile.name));
    out.push_str(&format!("  email:           {}\n", profile.email));
    out.push_str(&format!("  social handle:   {}\n", or_dash(Some(profile.social_handle.as_str()))));
    if let Some(status) = profile.status {
        out.push_str(&format!("  status:          {}\n", badge(status.as_str())));
    }
    out.push_str(&format!("  total earnings:  {}\n", format_currency(profile.total_earnings)));
    out.push_str(&format!("  pending:         {}\n", format_currency(profile.pending_earnings)));
    out.push_str(&format!("  paid:            {}\n", format_currency(profile.paid_earnings)));
    out.push_str(&format!(
        "  commissions:     {} ({} active)\n",
        profile.total_commissions, profile.active_commissions
    ));
    out.push_str(&format!("  bank:            {}\n", or_dash(profile.bank_name.as_deref())));
    out.push_str(&format!(
        "  account:         {}\n",
        profile
            .bank_account
            .as_deref()
            .map(kumu_core::schema::mask_account)
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "  account holder:  {}\n",
        or_dash(profile.account_holder_name.as_deref())
    ));
    out
}

#[must_use]
pub fn influencer_dashboard(snapshot: &InfluencerSnapshot) -> String {
    let mut out = String::new();
    match &snapshot.profile {
        Some(p) => out.push_str(&profile(p)),
        None => out.push_str("Profile unavailable.\n"),
    }
    let earnings = snapshot.earnings();
    out.push_str(&format!(
        "\nCommissions: {} pending, {} approved, {} paid ({} total)\n",
        format_currency(earnings.pending),
        format_currency(earnings.approved),
        format_currency(earnings.paid),
        earnings.count
    ));
    out.push_str(&format!(
        "Available for withdrawal: {}\n\n",
        snapshot
            .available_balance()
            .map_or_else(|| "-".to_string(), format_currency)
    ));
    out.push_str("Recent commissions\n");
    out.push_str(&commissions(&snapshot.commissions));
    out.push_str("\nWithdrawal requests\n");
    out.push_str(&withdrawals(&snapshot.withdrawals, false));
    out.push_str("\nYour promo codes\n");
    out.push_str(&promo_codes(&snapshot.promo_codes));
    out.push_str(&failed_note(&snapshot.failed));
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(["NAME", "USES"]);
        table.row(["Sam Lee", "12"]);
        table.row(["Al", "3"]);
        let text = table.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "NAME     USES");
        assert_eq!(lines[1], "-------  ----");
        assert_eq!(lines[2], "Sam Lee  12");
        assert_eq!(lines[3], "Al       3");
    }

    #[test]
    fn dates_and_badges() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 0).unwrap();
        assert_eq!(date(at), "2024-03-09");
        assert_eq!(opt_date(None), "-");
        assert_eq!(badge("pending"), "PENDING");
    }

    #[test]
    fn initials_of_names() {
        assert_eq!(initials("Sam Lee"), "SL");
        assert_eq!(initials("madonna"), "M");
        assert_eq!(initials("Mary Jane Watson"), "MJ");
        assert_eq!(initials("  "), "?");
    }

    #[test]
    fn tab_bar_counts() {
        let snapshot = AdminSnapshot::default();
        let bar = tab_bar(&snapshot, Tab::Users);
        assert!(bar.starts_with("Overview | [Users (0)] | Subscriptions (0)"));
        assert!(bar.ends_with("Withdrawals (0)"));
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(users(&[]), "No users found.\n");
        let text = admin_dashboard(&AdminSnapshot::default(), Tab::Overview);
        assert!(text.contains("Total Revenue         $0.00"));
        assert!(!text.contains("could not load"));
    }

    #[test]
    fn failed_lists_are_noted() {
        let snapshot = AdminSnapshot {
            failed: vec!["users", "withdrawals"],
            ..AdminSnapshot::default()
        };
        let text = admin_dashboard(&snapshot, Tab::Users);
        assert!(text.contains("(could not load: users, withdrawals)"));
    }
}
