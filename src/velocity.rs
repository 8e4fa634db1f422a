// 🚦 Velocity Validator - daily count, daily sum, week-to-date sum
// Pure decision logic: no store access, no side effects.

use crate::load::LoadRecord;
use serde::{Deserialize, Serialize};

// ============================================================================
// LIMITS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityLimits {
    /// Same-day loads already on file before the candidate is declined
    pub max_daily_loads: usize,

    /// Inclusive daily cap in minor units (default: $5,000.00)
    pub max_daily_amount: i64,

    /// Inclusive week-to-date cap in minor units (default: $20,000.00)
    pub max_weekly_amount: i64,
}

impl Default for VelocityLimits {
    fn default() -> Self {
        VelocityLimits {
            max_daily_loads: 3,
            max_daily_amount: 500_000,
            max_weekly_amount: 2_000_000,
        }
    }
}

// ============================================================================
// DECISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclineReason {
    /// Too many loads already on file for the day
    DailyCount,

    /// Day total would exceed the daily cap
    DailyAmount,

    /// Week-to-date total would exceed the weekly cap
    WeeklyAmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VelocityDecision {
    pub accepted: bool,
    pub reasons: Vec<DeclineReason>,
}

// ============================================================================
// VALIDATOR CONTRACT
// ============================================================================

/// Velocity rules evaluated against a candidate and its history.
///
/// `same_day` must hold the customer's records in the candidate's UTC day,
/// `week_to_date` those from Monday 00:00 UTC through the candidate's time.
pub trait LoadValidator: Send + Sync {
    fn under_daily_count(&self, same_day: &[LoadRecord]) -> bool;

    fn under_daily_amount(&self, same_day: &[LoadRecord], candidate: &LoadRecord) -> bool;

    fn under_weekly_amount(&self, week_to_date: &[LoadRecord], candidate: &LoadRecord) -> bool;

    fn assess(
        &self,
        candidate: &LoadRecord,
        same_day: &[LoadRecord],
        week_to_date: &[LoadRecord],
    ) -> VelocityDecision {
        let mut reasons = Vec::new();

        if !self.under_daily_count(same_day) {
            reasons.push(DeclineReason::DailyCount);
        }
        if !self.under_daily_amount(same_day, candidate) {
            reasons.push(DeclineReason::DailyAmount);
        }
        if !self.under_weekly_amount(week_to_date, candidate) {
            reasons.push(DeclineReason::WeeklyAmount);
        }

        VelocityDecision {
            accepted: reasons.is_empty(),
            reasons,
        }
    }

    fn evaluate(
        &self,
        candidate: &LoadRecord,
        same_day: &[LoadRecord],
        week_to_date: &[LoadRecord],
    ) -> bool {
        self.assess(candidate, same_day, week_to_date).accepted
    }
}

// ============================================================================
// DEFAULT VALIDATOR
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityValidator {
    pub limits: VelocityLimits,
}

impl VelocityValidator {
    /// Validator with the standard limits (3 loads, $5,000/day, $20,000/week)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: VelocityLimits) -> Self {
        VelocityValidator { limits }
    }
}

impl LoadValidator for VelocityValidator {
    fn under_daily_count(&self, same_day: &[LoadRecord]) -> bool {
        same_day.len() < self.limits.max_daily_loads
    }

    fn under_daily_amount(&self, same_day: &[LoadRecord], candidate: &LoadRecord) -> bool {
        within_cap(same_day, candidate.amount, self.limits.max_daily_amount)
    }

    fn under_weekly_amount(&self, week_to_date: &[LoadRecord], candidate: &LoadRecord) -> bool {
        within_cap(week_to_date, candidate.amount, self.limits.max_weekly_amount)
    }
}

/// `sum(history) + amount <= cap`, without summing when `amount` alone is over
fn within_cap(history: &[LoadRecord], amount: i64, cap: i64) -> bool {
    if amount > cap {
        return false;
    }

    let total = history
        .iter()
        .fold(amount, |acc, record| acc.saturating_add(record.amount));

    total <= cap
}
