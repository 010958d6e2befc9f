//! Operator dashboard and supervisor team view.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use starbank_core::{
    calculator::ColonyStage,
    command::DeskCommand,
    desk::SalesDesk,
    error::DeskError,
    event::DeskEvent,
    types::{AgentId, ProductKind, Role},
};

fn register(desk: &mut SalesDesk, name: &str, role: Role) -> AgentId {
    desk.submit(DeskCommand::RegisterAgent { name: name.into(), role })
        .unwrap()
        .into_iter()
        .find_map(|e| match e {
            DeskEvent::AgentRegistered { agent_id, .. } => Some(agent_id),
            _ => None,
        })
        .expect("agent registered")
}

fn sell(desk: &mut SalesDesk, agent_id: &str, value: Decimal) {
    desk.submit(DeskCommand::RecordSale {
        agent_id:       agent_id.into(),
        client_name:    "Cliente".into(),
        agreement_name: "INSS".into(),
        product:        ProductKind::Loan,
        value,
    })
    .unwrap();
}

#[test]
fn operator_dashboard_combines_commission_rank_and_team() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza", Role::Operator);
    let bia = register(&mut desk, "Bia Lima", Role::Operator);
    sell(&mut desk, &ana, dec!(50000));
    sell(&mut desk, &ana, dec!(30000));
    sell(&mut desk, &bia, dec!(45000));

    let view = desk.operator_dashboard(&ana).unwrap();

    assert_eq!(view.agent.sales_total, dec!(80000));
    assert_eq!(view.sales.len(), 2);
    assert_eq!(view.sales[0].value, dec!(30000));
    assert_eq!(view.commission.rate, dec!(0.01));
    assert_eq!(view.commission.commission_amount, dec!(800));
    assert_eq!(view.rank.current_tier.name, "Comandante Estelar");
    assert_eq!(view.team_total, dec!(125000));
    assert_eq!(view.collective_percent, dec!(25));
    assert_eq!(view.colony_stage, ColonyStage::Hydrosphere);
    assert!(view.duel.is_none());
}

#[test]
fn team_view_is_for_supervisors_only() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza", Role::Operator);

    let err = desk.team_view(&ana, None).unwrap_err();
    assert!(matches!(err, DeskError::Forbidden { .. }));
}

#[test]
fn team_view_orders_by_total_and_marks_the_leader() {
    let mut desk = SalesDesk::build_test().unwrap();
    let boss = register(&mut desk, "Nair Oliveira", Role::Supervisor);
    let ana = register(&mut desk, "Ana Souza", Role::Operator);
    let bia = register(&mut desk, "Bia Lima", Role::Operator);
    sell(&mut desk, &ana, dec!(30000));
    sell(&mut desk, &bia, dec!(45000));

    let view = desk.team_view(&boss, None).unwrap();

    let names: Vec<&str> = view.rows.iter().map(|r| r.agent.name.as_str()).collect();
    assert_eq!(names, vec!["Bia Lima", "Ana Souza", "Nair Oliveira"]);
    assert!(view.rows[0].is_leader);
    assert!(!view.rows[1].is_leader);
    assert_eq!(view.rows[0].rank_name, "Agente de Campo");
    assert_eq!(view.rows[0].commission_rate, dec!(0));
    assert_eq!(view.team_total, dec!(75000));
    assert_eq!(view.collective_percent, dec!(15));
}

#[test]
fn search_filters_without_moving_the_leader() {
    let mut desk = SalesDesk::build_test().unwrap();
    let boss = register(&mut desk, "Nair Oliveira", Role::Supervisor);
    let ana = register(&mut desk, "Ana Souza", Role::Operator);
    let bia = register(&mut desk, "Bia Lima", Role::Operator);
    sell(&mut desk, &ana, dec!(30000));
    sell(&mut desk, &bia, dec!(45000));

    let view = desk.team_view(&boss, Some("  SOUZA ")).unwrap();

    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].agent.agent_id, ana);
    assert!(!view.rows[0].is_leader);
    // Team figures are not affected by the search.
    assert_eq!(view.team_total, dec!(75000));
}

#[test]
fn nobody_leads_an_empty_board() {
    let mut desk = SalesDesk::build_test().unwrap();
    let boss = register(&mut desk, "Nair Oliveira", Role::Supervisor);
    register(&mut desk, "Ana Souza", Role::Operator);

    let view = desk.team_view(&boss, None).unwrap();

    assert_eq!(view.rows.len(), 2);
    assert!(view.rows.iter().all(|r| !r.is_leader));
    assert_eq!(view.colony_stage, ColonyStage::Dead);
}
