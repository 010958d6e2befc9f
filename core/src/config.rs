//! Desk configuration: rank tiers, commission tiers and team settings.
//!
//! Tables are immutable once built and always validated on the way in,
//! whether they come from `data/` or from code. The calculator only ever
//! sees tables that passed validation.

use crate::error::{DeskError, DeskResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ── Rank tiers ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankTier {
    pub name:      String,
    pub threshold: Decimal,
}

impl RankTier {
    pub fn new(name: &str, threshold: Decimal) -> Self {
        Self { name: name.to_string(), threshold }
    }
}

/// Rank tiers in strictly ascending threshold order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<RankTier>", into = "Vec<RankTier>")]
pub struct RankTable {
    tiers: Vec<RankTier>,
}

impl RankTable {
    pub fn new(tiers: Vec<RankTier>) -> DeskResult<Self> {
        if tiers.is_empty() {
            return Err(invalid("rank table is empty"));
        }
        for tier in &tiers {
            if tier.threshold.is_sign_negative() {
                return Err(invalid(format!(
                    "rank '{}' has negative threshold {}",
                    tier.name, tier.threshold
                )));
            }
            if tier.name.trim().is_empty() {
                return Err(invalid("rank tier with blank name"));
            }
        }
        ensure_ascending("rank", tiers.iter().map(|t| t.threshold))?;
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[RankTier] {
        &self.tiers
    }

    /// The five ranks used by the sales floor.
    pub fn canonical() -> Self {
        Self {
            tiers: vec![
                RankTier::new("Cadete Espacial",    Decimal::from(0)),
                RankTier::new("Agente de Campo",    Decimal::from(20_000)),
                RankTier::new("Capitão de Fragata", Decimal::from(50_000)),
                RankTier::new("Comandante Estelar", Decimal::from(80_000)),
                RankTier::new("Almirante da Frota", Decimal::from(100_000)),
            ],
        }
    }
}

impl TryFrom<Vec<RankTier>> for RankTable {
    type Error = DeskError;

    fn try_from(tiers: Vec<RankTier>) -> DeskResult<Self> {
        Self::new(tiers)
    }
}

impl From<RankTable> for Vec<RankTier> {
    fn from(table: RankTable) -> Self {
        table.tiers
    }
}

// ── Commission tiers ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommissionTier {
    /// Lowest cumulative total (inclusive) that earns `rate`.
    pub threshold: Decimal,
    /// Fraction of the total paid out, e.g. 0.0125 for 1.25%.
    pub rate:      Decimal,
}

impl CommissionTier {
    pub fn new(threshold: Decimal, rate: Decimal) -> Self {
        Self { threshold, rate }
    }
}

/// Commission tiers in strictly ascending threshold order.
/// Totals below the first threshold earn nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<CommissionTier>", into = "Vec<CommissionTier>")]
pub struct CommissionTable {
    tiers: Vec<CommissionTier>,
}

impl CommissionTable {
    pub fn new(tiers: Vec<CommissionTier>) -> DeskResult<Self> {
        if tiers.is_empty() {
            return Err(invalid("commission table is empty"));
        }
        for tier in &tiers {
            if tier.threshold.is_sign_negative() {
                return Err(invalid(format!(
                    "commission threshold {} is negative",
                    tier.threshold
                )));
            }
            if tier.rate.is_sign_negative() || tier.rate > Decimal::ONE {
                return Err(invalid(format!(
                    "commission rate {} outside [0, 1]",
                    tier.rate
                )));
            }
        }
        ensure_ascending("commission", tiers.iter().map(|t| t.threshold))?;
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[CommissionTier] {
        &self.tiers
    }

    /// 0.50% from 50k, 1.00% from 80k, 1.25% from 101k, 1.50% from 150k.
    pub fn canonical() -> Self {
        Self {
            tiers: vec![
                CommissionTier::new(Decimal::from(50_000),  Decimal::new(50, 4)),
                CommissionTier::new(Decimal::from(80_000),  Decimal::new(100, 4)),
                CommissionTier::new(Decimal::from(101_000), Decimal::new(125, 4)),
                CommissionTier::new(Decimal::from(150_000), Decimal::new(150, 4)),
            ],
        }
    }
}

impl TryFrom<Vec<CommissionTier>> for CommissionTable {
    type Error = DeskError;

    fn try_from(tiers: Vec<CommissionTier>) -> DeskResult<Self> {
        Self::new(tiers)
    }
}

impl From<CommissionTable> for Vec<CommissionTier> {
    fn from(table: CommissionTable) -> Self {
        table.tiers
    }
}

// ── Colony stages ──────────────────────────────────────────────────

/// Collective-goal percentages at which the team planet changes stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColonyThresholds {
    pub hydrosphere: Decimal,
    pub vegetation:  Decimal,
    pub atmosphere:  Decimal,
    pub colony:      Decimal,
}

impl ColonyThresholds {
    fn validate(&self) -> DeskResult<()> {
        let steps = [self.hydrosphere, self.vegetation, self.atmosphere, self.colony];
        if steps.iter().any(|s| s.is_sign_negative() || *s > Decimal::ONE_HUNDRED) {
            return Err(invalid("colony thresholds must lie in [0, 100]"));
        }
        ensure_ascending("colony stage", steps.into_iter())
    }
}

impl Default for ColonyThresholds {
    fn default() -> Self {
        Self {
            hydrosphere: Decimal::from(25),
            vegetation:  Decimal::from(50),
            atmosphere:  Decimal::from(75),
            colony:      Decimal::ONE_HUNDRED,
        }
    }
}

// ── On-disk layout ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct RankTiersFile {
    tiers: RankTable,
}

#[derive(Debug, Clone, Deserialize)]
struct CommissionTiersFile {
    tiers: CommissionTable,
}

#[derive(Debug, Clone, Deserialize)]
struct TeamFile {
    collective_goal:   Decimal,
    #[serde(default)]
    colony_stages:     ColonyThresholds,
    supervisor_roster: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub ranks:             RankTable,
    pub commissions:       CommissionTable,
    /// Team-wide sales target behind the colony progress bar.
    pub collective_goal:   Decimal,
    pub colony_stages:     ColonyThresholds,
    /// Lower-cased names allowed to register as supervisors.
    pub supervisor_roster: Vec<String>,
}

impl DeskConfig {
    /// Load from the data/ directory.
    /// In tests, use DeskConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let rank_path = format!("{data_dir}/progression/rank_tiers.json");
        let rank_content = std::fs::read_to_string(&rank_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {rank_path}: {e}"))?;
        let rank_file: RankTiersFile = serde_json::from_str(&rank_content)
            .map_err(|e| anyhow::anyhow!("Invalid {rank_path}: {e}"))?;

        let commission_path = format!("{data_dir}/progression/commission_tiers.json");
        let commission_content = std::fs::read_to_string(&commission_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {commission_path}: {e}"))?;
        let commission_file: CommissionTiersFile = serde_json::from_str(&commission_content)
            .map_err(|e| anyhow::anyhow!("Invalid {commission_path}: {e}"))?;

        let team_path = format!("{data_dir}/team/team.json");
        let team_content = std::fs::read_to_string(&team_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {team_path}: {e}"))?;
        let team_file: TeamFile = serde_json::from_str(&team_content)
            .map_err(|e| anyhow::anyhow!("Invalid {team_path}: {e}"))?;

        let config = Self {
            ranks:             rank_file.tiers,
            commissions:       commission_file.tiers,
            collective_goal:   team_file.collective_goal,
            colony_stages:     team_file.colony_stages,
            supervisor_roster: team_file
                .supervisor_roster
                .iter()
                .map(|n| normalize_name(n))
                .collect(),
        };
        config.validate()?;
        log::debug!(
            "config: loaded {} ranks, {} commission tiers from {data_dir}",
            config.ranks.tiers().len(),
            config.commissions.tiers().len()
        );
        Ok(config)
    }

    /// Checks the values that the table constructors cannot see.
    pub fn validate(&self) -> DeskResult<()> {
        if self.collective_goal <= Decimal::ZERO {
            return Err(invalid(format!(
                "collective goal must be positive, got {}",
                self.collective_goal
            )));
        }
        self.colony_stages.validate()
    }

    pub fn is_supervisor_allowed(&self, name: &str) -> bool {
        let wanted = normalize_name(name);
        self.supervisor_roster.iter().any(|n| *n == wanted)
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            ranks:             RankTable::canonical(),
            commissions:       CommissionTable::canonical(),
            collective_goal:   Decimal::from(500_000),
            colony_stages:     ColonyThresholds::default(),
            supervisor_roster: vec![
                "fernanda gomes".into(),
                "nair oliveira".into(),
                "brunno leonard".into(),
                "maicon nascimento".into(),
            ],
        }
    }
}

/// Trimmed, lower-cased form used for name comparisons.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn ensure_ascending(
    table: &str,
    thresholds: impl Iterator<Item = Decimal>,
) -> DeskResult<()> {
    let mut previous: Option<Decimal> = None;
    for threshold in thresholds {
        if let Some(prev) = previous {
            if threshold <= prev {
                return Err(invalid(format!(
                    "{table} thresholds must be strictly ascending ({prev} then {threshold})"
                )));
            }
        }
        previous = Some(threshold);
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> DeskError {
    DeskError::InvalidConfig { reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_tables_pass_validation() {
        let ranks = RankTable::new(RankTable::canonical().tiers().to_vec());
        let commissions = CommissionTable::new(CommissionTable::canonical().tiers().to_vec());
        assert!(ranks.is_ok());
        assert!(commissions.is_ok());
        assert!(DeskConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let result = RankTable::new(vec![
            RankTier::new("a", Decimal::from(0)),
            RankTier::new("b", Decimal::from(50)),
            RankTier::new("c", Decimal::from(50)),
        ]);
        assert!(matches!(result, Err(DeskError::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_empty_and_out_of_range_tables() {
        assert!(CommissionTable::new(vec![]).is_err());
        assert!(RankTable::new(vec![]).is_err());

        let too_generous = CommissionTable::new(vec![CommissionTier::new(
            Decimal::from(10),
            Decimal::from(2),
        )]);
        assert!(too_generous.is_err());
    }

    #[test]
    fn tables_deserialize_through_validation() {
        let ok: RankTable = serde_json::from_str(
            r#"[{"name":"low","threshold":"0"},{"name":"high","threshold":"10"}]"#,
        )
        .unwrap();
        assert_eq!(ok.tiers().len(), 2);

        let bad = serde_json::from_str::<CommissionTable>(
            r#"[{"threshold":"10","rate":"0.01"},{"threshold":"5","rate":"0.02"}]"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn supervisor_names_compare_trimmed_and_case_insensitive() {
        let config = DeskConfig::default();
        assert!(config.is_supervisor_allowed("  Fernanda Gomes "));
        assert!(!config.is_supervisor_allowed("Christian Serello"));
    }

    #[test]
    fn zero_collective_goal_is_invalid() {
        let config = DeskConfig {
            collective_goal: Decimal::ZERO,
            ..DeskConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
