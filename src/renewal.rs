//! Loan renewal policy
//!
//! Decides whether a proposed due-back date is an acceptable renewal. The
//! policy is pure: persisting an accepted date onto the loaned copy is left to
//! [`crate::services::loans::LoansService`].

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::LoansConfig;

/// Why a renewal was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// The proposed date lies before today
    PastDate,
    /// The proposed date lies beyond the renewal window
    TooFarFuture,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::PastDate => "PAST_DATE",
            RejectionReason::TooFarFuture => "TOO_FAR_FUTURE",
        }
    }

    /// Human readable message shown next to the renewal input
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::PastDate => "Invalid date - renewal in past",
            RejectionReason::TooFarFuture => "Invalid date - renewal beyond the allowed window",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of evaluating a renewal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalDecision {
    Accepted(NaiveDate),
    Rejected(RejectionReason),
}

impl RenewalDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RenewalDecision::Accepted(_))
    }
}

/// The policy's default was configured outside its own window
#[derive(Debug, thiserror::Error)]
#[error("default renewal offset of {default} days lies outside the 0..={max} day window")]
pub struct InvalidWindow {
    pub default: i64,
    pub max: i64,
}

/// Renewal window: a proposal is valid between today and `today + max_ahead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    max_ahead: Duration,
    default_ahead: Duration,
}

impl RenewalPolicy {
    /// Four weeks is the furthest a loan may be renewed
    pub const MAX_WEEKS: i64 = 4;
    /// Renewal forms are pre-filled three weeks ahead
    pub const DEFAULT_WEEKS: i64 = 3;

    /// Build a policy. The default proposal has to validate under the policy
    /// itself, so `default_ahead` must lie within `0..=max_ahead`.
    pub fn new(max_ahead: Duration, default_ahead: Duration) -> Result<Self, InvalidWindow> {
        if default_ahead < Duration::zero() || default_ahead > max_ahead {
            return Err(InvalidWindow {
                default: default_ahead.num_days(),
                max: max_ahead.num_days(),
            });
        }
        Ok(Self {
            max_ahead,
            default_ahead,
        })
    }

    pub fn from_config(config: &LoansConfig) -> Result<Self, InvalidWindow> {
        Self::new(
            Duration::weeks(config.renewal_max_weeks),
            Duration::weeks(config.renewal_default_weeks),
        )
    }

    /// Latest acceptable due-back date for a renewal requested on `today`
    pub fn latest(&self, today: NaiveDate) -> NaiveDate {
        today + self.max_ahead
    }

    /// Date used to pre-fill a renewal request
    pub fn default_proposal(&self, today: NaiveDate) -> NaiveDate {
        today + self.default_ahead
    }

    pub fn evaluate(&self, today: NaiveDate, proposed_due_back: NaiveDate) -> RenewalDecision {
        if proposed_due_back < today {
            return RenewalDecision::Rejected(RejectionReason::PastDate);
        }
        if proposed_due_back > self.latest(today) {
            return RenewalDecision::Rejected(RejectionReason::TooFarFuture);
        }
        RenewalDecision::Accepted(proposed_due_back)
    }
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            max_ahead: Duration::weeks(Self::MAX_WEEKS),
            default_ahead: Duration::weeks(Self::DEFAULT_WEEKS),
        }
    }
}
