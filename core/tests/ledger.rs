//! Ledger tests: sales, deletions and the running-total invariant.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use starbank_core::{
    command::DeskCommand,
    desk::{rejection, SalesDesk},
    event::DeskEvent,
    types::{AgentId, ProductKind, Role},
};

fn register(desk: &mut SalesDesk, name: &str) -> AgentId {
    let events = desk
        .submit(DeskCommand::RegisterAgent { name: name.into(), role: Role::Operator })
        .unwrap();
    events
        .iter()
        .find_map(|e| match e {
            DeskEvent::AgentRegistered { agent_id, .. } => Some(agent_id.clone()),
            _ => None,
        })
        .expect("agent registered")
}

fn sell(desk: &mut SalesDesk, agent_id: &str, client: &str, value: Decimal) -> Vec<DeskEvent> {
    desk.submit(DeskCommand::RecordSale {
        agent_id:       agent_id.into(),
        client_name:    client.into(),
        agreement_name: "INSS".into(),
        product:        ProductKind::Loan,
        value,
    })
    .unwrap()
}

fn sale_id(events: &[DeskEvent]) -> String {
    events
        .iter()
        .find_map(|e| match e {
            DeskEvent::SaleRecorded { sale_id, .. } => Some(sale_id.clone()),
            _ => None,
        })
        .expect("sale recorded")
}

#[test]
fn recording_sales_accumulates_the_total() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza");

    sell(&mut desk, &ana, "Maria", dec!(1000));
    let events = sell(&mut desk, &ana, "João", dec!(2500.50));

    assert!(events.contains(&DeskEvent::AgentTotalChanged {
        agent_id:       ana.clone(),
        previous_total: dec!(1000),
        new_total:      dec!(3500.50),
    }));
    assert_eq!(desk.agent(&ana).unwrap().sales_total, dec!(3500.50));
    assert!(desk.audit_totals().unwrap().is_empty());
}

#[test]
fn deleting_a_sale_reduces_the_total() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza");

    sell(&mut desk, &ana, "Maria", dec!(30000));
    let second = sale_id(&sell(&mut desk, &ana, "João", dec!(15000)));

    let events = desk
        .submit(DeskCommand::DeleteSale { agent_id: ana.clone(), sale_id: second.clone() })
        .unwrap();

    assert!(events.iter().any(|e| matches!(e, DeskEvent::SaleDeleted { sale_id, .. } if *sale_id == second)));
    assert_eq!(desk.agent(&ana).unwrap().sales_total, dec!(30000));
    assert_eq!(desk.sales_for(&ana).unwrap().len(), 1);
    assert!(desk.audit_totals().unwrap().is_empty());
}

#[test]
fn sales_are_listed_newest_first() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza");

    for client in ["Primeiro", "Segundo", "Terceiro"] {
        sell(&mut desk, &ana, client, dec!(100));
    }

    let clients: Vec<String> = desk
        .sales_for(&ana)
        .unwrap()
        .into_iter()
        .map(|s| s.client_name)
        .collect();
    assert_eq!(clients, vec!["Terceiro", "Segundo", "Primeiro"]);
}

#[test]
fn invalid_sales_are_rejected_without_side_effects() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza");

    for (client, value) in [("Maria", dec!(-10)), ("  ", dec!(100)), ("Maria", dec!(10.005))] {
        let events = sell(&mut desk, &ana, client, value);
        assert!(rejection(&events).is_some(), "expected rejection for {client:?} {value}");
    }

    let events = sell(&mut desk, "no-such-agent", "Maria", dec!(100));
    assert!(rejection(&events).unwrap().contains("unknown agent"));

    assert_eq!(desk.store().sale_count().unwrap(), 0);
    assert_eq!(desk.agent(&ana).unwrap().sales_total, dec!(0));
}

#[test]
fn oversized_sale_is_rejected_as_out_of_range() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza");
    let command: DeskCommand = serde_json::from_str(&format!(
        r#"{{"cmd":"record_sale","agent_id":"{ana}","client_name":"Maria",
            "agreement_name":"INSS","product":"loan","value":"79228162514264337593543950335"}}"#
    ))
    .unwrap();

    let events = desk.submit(command).unwrap();

    assert!(rejection(&events).unwrap().contains("out of range"));
    assert_eq!(desk.store().sale_count().unwrap(), 0);
    assert_eq!(desk.agent(&ana).unwrap().sales_total, dec!(0));
}

#[test]
fn zero_value_sale_is_accepted() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza");

    let events = sell(&mut desk, &ana, "Maria", dec!(0));

    assert!(rejection(&events).is_none());
    assert_eq!(desk.store().sale_count().unwrap(), 1);
    assert_eq!(desk.agent(&ana).unwrap().sales_total, dec!(0));
}

#[test]
fn agents_cannot_delete_each_others_sales() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza");
    let bia = register(&mut desk, "Bia Lima");
    let sale = sale_id(&sell(&mut desk, &ana, "Maria", dec!(5000)));

    let events = desk
        .submit(DeskCommand::DeleteSale { agent_id: bia, sale_id: sale.clone() })
        .unwrap();

    assert!(rejection(&events).unwrap().contains("does not belong"));
    assert!(desk.store().sale(&sale).unwrap().is_some());
    assert_eq!(desk.agent(&ana).unwrap().sales_total, dec!(5000));
}

#[test]
fn deleting_an_unknown_sale_is_rejected() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza");

    let events = desk
        .submit(DeskCommand::DeleteSale { agent_id: ana, sale_id: "missing".into() })
        .unwrap();

    assert!(rejection(&events).unwrap().contains("unknown sale"));
}

#[test]
fn sale_fields_are_stored_as_given() {
    let mut desk = SalesDesk::build_test().unwrap();
    let ana = register(&mut desk, "Ana Souza");

    desk.submit(DeskCommand::RecordSale {
        agent_id:       ana.clone(),
        client_name:    "  Maria da Silva ".into(),
        agreement_name: "SIAPE".into(),
        product:        ProductKind::CreditCardBenefit,
        value:          dec!(1234.56),
    })
    .unwrap();

    let sales = desk.sales_for(&ana).unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].client_name, "Maria da Silva");
    assert_eq!(sales[0].agreement_name, "SIAPE");
    assert_eq!(sales[0].product, ProductKind::CreditCardBenefit);
    assert_eq!(sales[0].value, dec!(1234.56));
    assert_eq!(sales[0].agent_id, ana);
}
