//! Split calculation
//!
//! Turns an expense amount, a split policy, and a participant set into one
//! share line per participant. Every mode guarantees that the share lines
//! reconcile with the total: Equal, Percentage, and Shares are exact by
//! construction; Custom is validated against the `Money::EPSILON`
//! tolerance because its amounts come from the caller.

use std::collections::HashMap;

use core_kernel::{MemberId, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ExpenseError;

/// Allowed drift when validating that percentages sum to 100.
pub const PERCENT_TOLERANCE: Decimal = dec!(0.5);

/// How an expense is divided among its participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitType {
    Equal,
    Percentage,
    Shares,
    Custom,
}

/// A percentage assigned to one participant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentShare {
    pub member: MemberId,
    pub percent: Decimal,
}

/// An integer weight assigned to one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightShare {
    pub member: MemberId,
    pub weight: u32,
}

/// An explicit amount assigned to one participant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomShare {
    pub member: MemberId,
    pub amount: Money,
}

/// Caller-supplied split policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SplitSpec {
    /// Even split, remainder cents to the earliest participants
    Equal,
    /// Percentage per participant; must sum to 100 within
    /// [`PERCENT_TOLERANCE`]
    Percentage(Vec<PercentShare>),
    /// Weight per participant; all weights must be positive
    Shares(Vec<WeightShare>),
    /// Explicit amount per participant; must sum to the total within
    /// `Money::EPSILON`
    Custom(Vec<CustomShare>),
}

impl SplitSpec {
    pub fn split_type(&self) -> SplitType {
        match self {
            SplitSpec::Equal => SplitType::Equal,
            SplitSpec::Percentage(_) => SplitType::Percentage,
            SplitSpec::Shares(_) => SplitType::Shares,
            SplitSpec::Custom(_) => SplitType::Custom,
        }
    }
}

/// One member's computed portion of a split expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareLine {
    pub member: MemberId,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl ShareLine {
    fn plain(member: MemberId, amount: Money) -> Self {
        Self {
            member,
            amount,
            percentage: None,
            weight: None,
        }
    }
}

/// Computes the per-participant share lines for an expense.
///
/// `total` must already be in the group's base currency. Share lines are
/// returned in participant order.
pub fn compute_split(
    total: Money,
    participants: &[MemberId],
    spec: &SplitSpec,
) -> Result<Vec<ShareLine>, ExpenseError> {
    validate_participants(participants)?;

    match spec {
        SplitSpec::Equal => equal_split(total, participants),
        SplitSpec::Percentage(shares) => percentage_split(total, participants, shares),
        SplitSpec::Shares(weights) => weighted_split(total, participants, weights),
        SplitSpec::Custom(amounts) => custom_split(total, participants, amounts),
    }
}

fn validate_participants(participants: &[MemberId]) -> Result<(), ExpenseError> {
    if participants.is_empty() {
        return Err(ExpenseError::validation("an expense needs participants"));
    }

    let mut seen = std::collections::HashSet::new();
    for member in participants {
        if !seen.insert(member) {
            return Err(ExpenseError::Validation(format!(
                "duplicate participant {member}"
            )));
        }
    }
    Ok(())
}

/// Collects keyed split entries into a map, requiring exactly one entry per
/// participant and nothing else.
fn keyed_entries<T: Copy>(
    participants: &[MemberId],
    entries: impl Iterator<Item = (MemberId, T)>,
    what: &str,
) -> Result<HashMap<MemberId, T>, ExpenseError> {
    let mut map = HashMap::new();
    for (member, value) in entries {
        if map.insert(member, value).is_some() {
            return Err(ExpenseError::Validation(format!(
                "duplicate {what} entry for {member}"
            )));
        }
    }

    for member in participants {
        if !map.contains_key(member) {
            return Err(ExpenseError::Validation(format!(
                "missing {what} entry for participant {member}"
            )));
        }
    }
    if map.len() != participants.len() {
        return Err(ExpenseError::Validation(format!(
            "{what} entries reference non-participants"
        )));
    }

    Ok(map)
}

fn equal_split(total: Money, participants: &[MemberId]) -> Result<Vec<ShareLine>, ExpenseError> {
    let parts = total.allocate(participants.len() as u32)?;

    Ok(participants
        .iter()
        .zip(parts)
        .map(|(member, amount)| ShareLine::plain(*member, amount))
        .collect())
}

fn percentage_split(
    total: Money,
    participants: &[MemberId],
    shares: &[PercentShare],
) -> Result<Vec<ShareLine>, ExpenseError> {
    let by_member = keyed_entries(
        participants,
        shares.iter().map(|s| (s.member, s.percent)),
        "percentage",
    )?;

    for (member, pct) in &by_member {
        if *pct < Decimal::ZERO || *pct > dec!(100) {
            return Err(ExpenseError::Validation(format!(
                "percentage {pct} for {member} is outside 0..=100"
            )));
        }
    }

    let sum: Decimal = by_member.values().sum();
    if (sum - dec!(100)).abs() > PERCENT_TOLERANCE {
        return Err(ExpenseError::Validation(format!(
            "percentages sum to {sum}, expected 100 within {PERCENT_TOLERANCE}"
        )));
    }

    let mut lines: Vec<ShareLine> = participants
        .iter()
        .map(|member| {
            let pct = by_member[member];
            let mut line = ShareLine::plain(*member, total.multiply(pct / dec!(100)));
            line.percentage = Some(pct);
            line
        })
        .collect();

    fold_residual_into_first(total, &mut lines)?;
    Ok(lines)
}

fn weighted_split(
    total: Money,
    participants: &[MemberId],
    weights: &[WeightShare],
) -> Result<Vec<ShareLine>, ExpenseError> {
    let by_member = keyed_entries(
        participants,
        weights.iter().map(|w| (w.member, w.weight)),
        "weight",
    )?;

    for (member, weight) in &by_member {
        if *weight == 0 {
            return Err(ExpenseError::Validation(format!(
                "weight for {member} must be positive"
            )));
        }
    }
    let weight_sum: u64 = by_member.values().map(|w| u64::from(*w)).sum();
    if weight_sum == 0 {
        return Err(ExpenseError::validation("weights sum to zero"));
    }

    let mut lines: Vec<ShareLine> = participants
        .iter()
        .map(|member| {
            let weight = by_member[member];
            let ratio = Decimal::from(weight) / Decimal::from(weight_sum);
            let mut line = ShareLine::plain(*member, total.multiply(ratio));
            line.weight = Some(weight);
            line
        })
        .collect();

    fold_residual_into_first(total, &mut lines)?;
    Ok(lines)
}

fn custom_split(
    total: Money,
    participants: &[MemberId],
    amounts: &[CustomShare],
) -> Result<Vec<ShareLine>, ExpenseError> {
    let by_member = keyed_entries(
        participants,
        amounts.iter().map(|c| (c.member, c.amount)),
        "amount",
    )?;

    let mut sum = Money::zero(total.currency());
    for (member, amount) in &by_member {
        if amount.currency() != total.currency() {
            return Err(ExpenseError::Validation(format!(
                "amount for {member} is in {}, expected {}",
                amount.currency(),
                total.currency()
            )));
        }
        sum = sum.checked_add(amount)?;
    }

    if !sum.approx_eq(&total) {
        return Err(ExpenseError::Validation(format!(
            "custom amounts sum to {sum}, expected {total}"
        )));
    }

    Ok(participants
        .iter()
        .map(|member| ShareLine::plain(*member, by_member[member]))
        .collect())
}

/// Adds any rounding residual to the first participant's share so the
/// lines sum exactly to the total. The residual is bounded by per-line
/// rounding plus the percentage tolerance.
fn fold_residual_into_first(total: Money, lines: &mut [ShareLine]) -> Result<(), ExpenseError> {
    let mut sum = Money::zero(total.currency());
    for line in lines.iter() {
        sum = sum.checked_add(&line.amount)?;
    }

    let residual = total.checked_sub(&sum)?;
    if !residual.is_zero() {
        lines[0].amount = lines[0].amount.checked_add(&residual)?;
    }
    Ok(())
}
