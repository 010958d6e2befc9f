//! Demo roster: a deterministic synthetic team for local runs.
//!
//! The plan is generated up front from a seed and then applied through
//! the normal command path, so demo data obeys every ledger rule.

use crate::{
    command::DeskCommand,
    desk::{rejection, SalesDesk},
    error::{DeskError, DeskResult},
    event::DeskEvent,
    money,
    name_generator::NameGenerator,
    rng::{DeskRng, Stream},
    types::{AgentId, ProductKind, Role},
};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Smallest demo sale, in reais.
const SALE_MIN: f64 = 500.0;
/// Largest demo sale, in reais.
const SALE_CAP: f64 = 60_000.0;
const SALE_ALPHA: f64 = 1.6;

#[derive(Debug, Clone, PartialEq)]
pub struct DemoSale {
    pub client_name:    String,
    pub agreement_name: String,
    pub product:        ProductKind,
    pub value:          Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoAgent {
    pub name:  String,
    pub sales: Vec<DemoSale>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoRoster {
    pub seed:   u64,
    pub agents: Vec<DemoAgent>,
}

impl DemoRoster {
    pub fn generate(seed: u64, agents: usize, sales_per_agent: usize) -> Self {
        let mut roster_rng = Stream::Roster.rng(seed);
        let mut sales_rng = Stream::Sales.rng(seed);

        let mut taken = HashSet::new();
        let agents = (0..agents)
            .map(|_| {
                let name = unique_name(&mut roster_rng, &mut taken);
                let sales = (0..sales_per_agent)
                    .map(|_| demo_sale(&mut sales_rng))
                    .collect();
                DemoAgent { name, sales }
            })
            .collect();

        Self { seed, agents }
    }

    /// Register every demo agent as an operator and book their sales.
    /// Returns the new agent ids in roster order.
    pub fn apply(&self, desk: &mut SalesDesk) -> DeskResult<Vec<AgentId>> {
        let mut ids = Vec::with_capacity(self.agents.len());
        for agent in &self.agents {
            let events = desk.submit(DeskCommand::RegisterAgent {
                name: agent.name.clone(),
                role: Role::Operator,
            })?;
            let agent_id = registered_id(&events).ok_or_else(|| {
                DeskError::Other(anyhow::anyhow!(
                    "demo agent '{}' was not registered: {}",
                    agent.name,
                    rejection(&events).unwrap_or("no reason given")
                ))
            })?;

            for sale in &agent.sales {
                desk.submit(DeskCommand::RecordSale {
                    agent_id:       agent_id.clone(),
                    client_name:    sale.client_name.clone(),
                    agreement_name: sale.agreement_name.clone(),
                    product:        sale.product,
                    value:          sale.value,
                })?;
            }
            ids.push(agent_id);
        }

        log::info!(
            "demo: seeded {} agents from seed {}",
            self.agents.len(),
            self.seed
        );
        Ok(ids)
    }
}

fn registered_id(events: &[DeskEvent]) -> Option<AgentId> {
    events.iter().find_map(|e| match e {
        DeskEvent::AgentRegistered { agent_id, .. } => Some(agent_id.clone()),
        _ => None,
    })
}

fn unique_name(rng: &mut DeskRng, taken: &mut HashSet<String>) -> String {
    let base = NameGenerator::generate_full_name(rng);
    let mut name = base.clone();
    let mut suffix = 2;
    while !taken.insert(name.to_lowercase()) {
        name = format!("{base} {suffix}");
        suffix += 1;
    }
    name
}

fn demo_sale(rng: &mut DeskRng) -> DemoSale {
    let product = match rng.next_u64_below(10) {
        0..=5 => ProductKind::Loan,
        6..=7 => ProductKind::CreditCardRmc,
        _     => ProductKind::CreditCardBenefit,
    };
    let reais = rng.pareto(SALE_MIN, SALE_ALPHA).min(SALE_CAP);
    DemoSale {
        client_name:    NameGenerator::generate_full_name(rng),
        agreement_name: NameGenerator::generate_agreement(rng).to_string(),
        product,
        value:          money::from_cents((reais * 100.0).round() as i64),
    }
}
