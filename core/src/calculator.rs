//! Compensation and progression rules.
//!
//! Every function here is pure: same inputs, same outputs, no I/O and no
//! failure modes. Tables come in from `DeskConfig` so tests and callers
//! can swap them without touching this module.
//!
//! Percentages are returned unrounded in the range [0, 100]. Rounding to
//! two places is a display concern (see `money`).

use crate::config::{ColonyThresholds, CommissionTable, RankTable, RankTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionOutcome {
    /// Rate of the highest tier reached, 0 below the first tier.
    pub rate:                  Decimal,
    /// Threshold of the next tier up; None once the top tier is reached.
    pub next_goal:             Option<Decimal>,
    /// `total * rate`, unrounded.
    pub commission_amount:     Decimal,
    /// How far the total is toward `next_goal`, measured from zero.
    pub goal_progress_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankOutcome {
    pub current_tier:     RankTier,
    pub next_tier:        Option<RankTier>,
    /// Progress through the current tier's band toward the next one.
    pub progress_percent: Decimal,
    /// Amount still missing for the next tier; 0 at the top.
    pub distance_to_next: Decimal,
}

/// Stage of the team planet, driven by collective-goal progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColonyStage {
    Dead,
    Hydrosphere,
    Vegetation,
    Atmosphere,
    Colony,
}

impl ColonyStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dead        => "dead",
            Self::Hydrosphere => "hydrosphere",
            Self::Vegetation  => "vegetation",
            Self::Atmosphere  => "atmosphere",
            Self::Colony      => "colony",
        }
    }

    /// Status line shown over the planet.
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Dead        => "PLANETA MORTO",
            Self::Hydrosphere => "HIDROSFERA DETECTADA",
            Self::Vegetation  => "VEGETAÇÃO EM CRESCIMENTO",
            Self::Atmosphere  => "ATMOSFERA ESTÁVEL",
            Self::Colony      => "COLÔNIA ESTABELECIDA",
        }
    }
}

/// Commission rate, amount and next goal for a cumulative total.
/// Boundaries belong to the higher tier.
pub fn compute_commission(total_sales: Decimal, table: &CommissionTable) -> CommissionOutcome {
    let tiers = table.tiers();
    let reached = tiers.iter().rposition(|t| total_sales >= t.threshold);

    let (rate, next_goal) = match reached {
        Some(i) => (tiers[i].rate, tiers.get(i + 1).map(|t| t.threshold)),
        None    => (Decimal::ZERO, tiers.first().map(|t| t.threshold)),
    };

    let goal_progress_percent = match next_goal {
        Some(goal) => percent_of(total_sales, goal),
        None       => Decimal::ONE_HUNDRED,
    };

    CommissionOutcome {
        rate,
        next_goal,
        commission_amount: total_sales * rate,
        goal_progress_percent,
    }
}

/// Current rank tier and progress toward the next one.
///
/// Totals below every threshold sit in the lowest tier.
pub fn compute_rank(total_sales: Decimal, table: &RankTable) -> RankOutcome {
    let tiers = table.tiers();
    let index = tiers
        .iter()
        .rposition(|t| total_sales >= t.threshold)
        .unwrap_or(0);
    let current = &tiers[index];

    match tiers.get(index + 1) {
        Some(next) => {
            let band = next.threshold - current.threshold;
            let into_band = total_sales - current.threshold;
            let progress = into_band
                .checked_mul(Decimal::ONE_HUNDRED)
                .and_then(|scaled| scaled.checked_div(band))
                .or_else(|| into_band.checked_div(band)?.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ONE_HUNDRED)
                .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            RankOutcome {
                current_tier:     current.clone(),
                next_tier:        Some(next.clone()),
                progress_percent: progress,
                distance_to_next: next.threshold - total_sales,
            }
        }
        None => RankOutcome {
            current_tier:     current.clone(),
            next_tier:        None,
            progress_percent: Decimal::ONE_HUNDRED,
            distance_to_next: Decimal::ZERO,
        },
    }
}

/// Team progress toward the collective goal, capped at 100.
/// A team total too large to represent is past any goal.
pub fn compute_collective_progress(totals: &[Decimal], goal: Decimal) -> Decimal {
    totals
        .iter()
        .try_fold(Decimal::ZERO, |sum, total| sum.checked_add(*total))
        .map_or(Decimal::ONE_HUNDRED, |team_total| percent_of(team_total, goal))
}

/// One side's progress in a duel, capped at 100.
pub fn compute_duel_progress(agent_total: Decimal, goal: Decimal) -> Decimal {
    percent_of(agent_total, goal)
}

/// Highest colony stage whose threshold the percentage has reached.
pub fn colony_stage(percent: Decimal, stages: &ColonyThresholds) -> ColonyStage {
    if percent >= stages.colony {
        ColonyStage::Colony
    } else if percent >= stages.atmosphere {
        ColonyStage::Atmosphere
    } else if percent >= stages.vegetation {
        ColonyStage::Vegetation
    } else if percent >= stages.hydrosphere {
        ColonyStage::Hydrosphere
    } else {
        ColonyStage::Dead
    }
}

/// `min(100, value / goal * 100)`, floored at 0.
/// A non-positive goal counts as already met.
fn percent_of(value: Decimal, goal: Decimal) -> Decimal {
    if goal <= Decimal::ZERO {
        return Decimal::ONE_HUNDRED;
    }
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(goal))
        .or_else(|| value.checked_div(goal)?.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ONE_HUNDRED)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommissionTier, RankTier};
    use rust_decimal_macros::dec;

    #[test]
    fn commission_below_first_tier_targets_first_threshold() {
        let outcome = compute_commission(dec!(10000), &CommissionTable::canonical());
        assert_eq!(outcome.rate, Decimal::ZERO);
        assert_eq!(outcome.next_goal, Some(dec!(50000)));
        assert_eq!(outcome.commission_amount, Decimal::ZERO);
        assert_eq!(outcome.goal_progress_percent, dec!(20));
    }

    #[test]
    fn commission_amount_is_unrounded() {
        let outcome = compute_commission(dec!(101000.01), &CommissionTable::canonical());
        assert_eq!(outcome.rate, dec!(0.0125));
        assert_eq!(outcome.commission_amount, dec!(1262.500125));
    }

    #[test]
    fn rank_uses_custom_table() {
        let table = RankTable::new(vec![
            RankTier::new("bronze", dec!(0)),
            RankTier::new("silver", dec!(10)),
        ])
        .unwrap();
        let outcome = compute_rank(dec!(2.5), &table);
        assert_eq!(outcome.current_tier.name, "bronze");
        assert_eq!(outcome.progress_percent, dec!(25));
        assert_eq!(outcome.distance_to_next, dec!(7.5));
    }

    #[test]
    fn rank_below_every_threshold_sits_in_lowest_tier() {
        let table = RankTable::new(vec![
            RankTier::new("starter", dec!(100)),
            RankTier::new("pro", dec!(200)),
        ])
        .unwrap();
        let outcome = compute_rank(dec!(50), &table);
        assert_eq!(outcome.current_tier.name, "starter");
        assert_eq!(outcome.progress_percent, Decimal::ZERO);
        assert_eq!(outcome.distance_to_next, dec!(150));
    }

    #[test]
    fn single_tier_commission_table() {
        let table = CommissionTable::new(vec![CommissionTier::new(dec!(0), dec!(0.02))]).unwrap();
        let outcome = compute_commission(dec!(0), &table);
        assert_eq!(outcome.rate, dec!(0.02));
        assert_eq!(outcome.next_goal, None);
        assert_eq!(outcome.goal_progress_percent, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn colony_stage_boundaries() {
        let stages = ColonyThresholds::default();
        assert_eq!(colony_stage(dec!(24.99), &stages), ColonyStage::Dead);
        assert_eq!(colony_stage(dec!(25), &stages), ColonyStage::Hydrosphere);
        assert_eq!(colony_stage(dec!(50), &stages), ColonyStage::Vegetation);
        assert_eq!(colony_stage(dec!(99.9), &stages), ColonyStage::Atmosphere);
        assert_eq!(colony_stage(dec!(100), &stages), ColonyStage::Colony);
    }

    #[test]
    fn oversized_totals_cap_instead_of_overflowing() {
        let goal = dec!(500000);
        assert_eq!(compute_collective_progress(&[Decimal::MAX, Decimal::MAX], goal), dec!(100));
        assert_eq!(compute_collective_progress(&[Decimal::MAX], goal), dec!(100));
        assert_eq!(compute_duel_progress(Decimal::MAX, goal), dec!(100));

        let table = RankTable::new(vec![
            RankTier::new("low", dec!(0)),
            RankTier::new("high", Decimal::MAX),
        ])
        .unwrap();
        let outcome = compute_rank(dec!(1000000000000000000000000000), &table);
        assert_eq!(outcome.current_tier.name, "low");
        assert!(outcome.progress_percent > dec!(1) && outcome.progress_percent < dec!(2));
    }

    #[test]
    fn zero_goal_counts_as_met() {
        assert_eq!(compute_duel_progress(dec!(0), Decimal::ZERO), Decimal::ONE_HUNDRED);
    }
}
