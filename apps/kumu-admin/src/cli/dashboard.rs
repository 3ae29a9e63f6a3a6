//! Admin dashboard and the auto-refresh loop shared with `me dashboard`.

use super::{CliError, Context};
use crate::render::{self, Tab};
use clap::Args;
use kumu_client::AdminSnapshot;
use kumu_core::session::Role;
use kumu_core::stats::OverviewStats;
use serde::Serialize;
use std::io::{IsTerminal, Write};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Tab to show.
    #[arg(long, value_enum, default_value_t = Tab::Overview)]
    pub tab: Tab,

    /// Refresh every SECS seconds (30 when omitted) until Ctrl-C.
    #[arg(long, value_name = "SECS", num_args = 0..=1, default_missing_value = "30")]
    pub watch: Option<u64>,
}

/// Fixed-period refresh ticks.
///
/// A round is fetched and rendered before the next tick is awaited, and
/// ticks missed meanwhile are skipped, so fetches never overlap.
#[derive(Debug)]
pub struct Refresh {
    ticker: Interval,
    remaining: Option<u64>,
}

impl Refresh {
    /// `rounds` stops the loop after that many refreshes.
    #[must_use]
    pub fn new(every_secs: u64, rounds: Option<u64>) -> Self {
        let mut ticker = tokio::time::interval(Duration::from_secs(every_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            ticker,
            remaining: rounds,
        }
    }

    /// Waits for the next tick. `false` once rounds run out or on Ctrl-C.
    pub async fn next(&mut self) -> bool {
        if self.remaining == Some(0) {
            return false;
        }
        tokio::select! {
            _ = self.ticker.tick() => {
                if let Some(left) = self.remaining.as_mut() {
                    *left -= 1;
                }
                true
            }
            _ = tokio::signal::ctrl_c() => {
                info!("refresh stopped");
                false
            }
        }
    }
}

/// Clears the terminal between refreshes. Does nothing for pipes and JSON.
pub(crate) fn clear_screen(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    if !ctx.json && std::io::stdout().is_terminal() {
        write!(out, "\x1b[2J\x1b[H")?;
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminView<'a> {
    overview: OverviewStats,
    #[serde(flatten)]
    snapshot: &'a AdminSnapshot,
}

fn show(ctx: &Context, snapshot: &AdminSnapshot, tab: Tab, out: &mut impl Write) -> Result<(), CliError> {
    let view = AdminView {
        overview: snapshot.overview(),
        snapshot,
    };
    ctx.emit(out, &view, || render::admin_dashboard(snapshot, tab))
}

/// Load every admin list and render `tab`; with `watch`, keep refreshing.
pub async fn cmd_dashboard(
    ctx: &Context,
    tab: Tab,
    watch: Option<u64>,
    rounds: Option<u64>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let client = ctx.client_for(Role::Admin)?;
    let Some(every) = watch else {
        let snapshot = AdminSnapshot::load(&client).await;
        return show(ctx, &snapshot, tab, out);
    };

    let mut refresh = Refresh::new(every, rounds);
    while refresh.next().await {
        let snapshot = AdminSnapshot::load(&client).await;
        debug!(failed = snapshot.failed.len(), "dashboard refreshed");
        clear_screen(ctx, out)?;
        show(ctx, &snapshot, tab, out)?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refresh_stops_after_rounds() {
        let mut refresh = Refresh::new(0, Some(2));
        assert!(refresh.next().await);
        assert!(refresh.next().await);
        assert!(!refresh.next().await);
    }
}
