//! # Workflow Module
//!
//! Admin decisions on withdrawals and influencer applications.
//!
//! The server owns every status change. These guards only stop the console
//! from sending a decision the current status cannot take:
//!
//! ```text
//! withdrawal:  pending --approve--> approved --mark paid--> paid
//!              pending --reject---> rejected
//! influencer:  pending --approve--> approved
//!              pending --reject---> rejected
//! ```

use crate::schema::{ApprovalStatus, WithdrawalStatus};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A decision that does not apply to the record's current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} {subject}: status is {status}")]
pub struct TransitionError {
    pub subject: &'static str,
    pub status: &'static str,
    pub action: &'static str,
}

// =============================================================================
// WITHDRAWALS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WithdrawalAction {
    Approve,
    Reject,
    MarkPaid,
}

impl WithdrawalAction {
    /// Status the request moves to.
    #[must_use]
    pub const fn target(self) -> WithdrawalStatus {
        match self {
            WithdrawalAction::Approve => WithdrawalStatus::Approved,
            WithdrawalAction::Reject => WithdrawalStatus::Rejected,
            WithdrawalAction::MarkPaid => WithdrawalStatus::Paid,
        }
    }

    /// Last URL segment of `PUT /admin/withdrawals/{id}/{segment}`.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            WithdrawalAction::Approve => "approve",
            WithdrawalAction::Reject => "reject",
            WithdrawalAction::MarkPaid => "pay",
        }
    }

    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            WithdrawalAction::Approve => "approve",
            WithdrawalAction::Reject => "reject",
            WithdrawalAction::MarkPaid => "mark paid",
        }
    }
}

impl fmt::Display for WithdrawalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

impl WithdrawalStatus {
    /// Whether `action` may be sent for a request in this status.
    pub fn can_apply(self, action: WithdrawalAction) -> Result<WithdrawalStatus, TransitionError> {
        let allowed = matches!(
            (self, action),
            (WithdrawalStatus::Pending, WithdrawalAction::Approve | WithdrawalAction::Reject)
                | (WithdrawalStatus::Approved, WithdrawalAction::MarkPaid)
        );
        if allowed {
            Ok(action.target())
        } else {
            Err(TransitionError {
                subject: "withdrawal",
                status: self.as_str(),
                action: action.verb(),
            })
        }
    }

    /// Decisions open to an admin for a request in this status.
    #[must_use]
    pub fn available_actions(self) -> &'static [WithdrawalAction] {
        match self {
            WithdrawalStatus::Pending => &[WithdrawalAction::Approve, WithdrawalAction::Reject],
            WithdrawalStatus::Approved => &[WithdrawalAction::MarkPaid],
            WithdrawalStatus::Rejected | WithdrawalStatus::Paid | WithdrawalStatus::Other => &[],
        }
    }
}

// =============================================================================
// INFLUENCER APPLICATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl ApprovalAction {
    #[must_use]
    pub const fn target(self) -> ApprovalStatus {
        match self {
            ApprovalAction::Approve => ApprovalStatus::Approved,
            ApprovalAction::Reject => ApprovalStatus::Rejected,
        }
    }

    /// Last URL segment of `PUT /admin/influencers/{id}/{segment}`.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            ApprovalAction::Approve => "approve",
            ApprovalAction::Reject => "reject",
        }
    }
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ApprovalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(ApprovalAction::Approve),
            "reject" => Ok(ApprovalAction::Reject),
            other => Err(format!("Unknown decision: {}", other)),
        }
    }
}

impl ApprovalStatus {
    /// Only applications still pending can be decided.
    pub fn can_apply(self, action: ApprovalAction) -> Result<ApprovalStatus, TransitionError> {
        if self == ApprovalStatus::Pending {
            Ok(action.target())
        } else {
            Err(TransitionError {
                subject: "influencer application",
                status: self.as_str(),
                action: action.path_segment(),
            })
        }
    }
}
