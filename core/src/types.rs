//! Shared primitive types used across the desk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable, unique identifier for an agent profile.
pub type AgentId = String;

/// Identifier of a single sales record.
pub type SaleId = String;

/// Identifier of a duel challenge.
pub type DuelId = String;

/// Identifier assigned to every submitted command.
pub type CommandId = String;

/// Wall-clock instant, always UTC.
pub type Timestamp = DateTime<Utc>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Operator,
    Supervisor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator   => "operator",
            Self::Supervisor => "supervisor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "operator"   => Some(Self::Operator),
            "supervisor" => Some(Self::Supervisor),
            _            => None,
        }
    }
}

/// The three products a sale can be booked against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Loan,
    CreditCardRmc,
    CreditCardBenefit,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loan              => "loan",
            Self::CreditCardRmc     => "credit_card_rmc",
            Self::CreditCardBenefit => "credit_card_benefit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "loan"                => Some(Self::Loan),
            "credit_card_rmc"     => Some(Self::CreditCardRmc),
            "credit_card_benefit" => Some(Self::CreditCardBenefit),
            _                     => None,
        }
    }

    /// Label shown on the sales form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loan              => "Empréstimo",
            Self::CreditCardRmc     => "Cartão RMC",
            Self::CreditCardBenefit => "Cartão Benefício",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
