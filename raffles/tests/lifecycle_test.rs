//! Raffle lifecycle integration tests.
//!
//! Ticket generation, regeneration and clearing guards, and protected
//! fields on update.
//!
//! Run with: `cargo test --test lifecycle_test`

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

mod common;

use common::{engine, environment, raffle, reseller};
use proptest::prelude::*;
use raffles::{
    Modality, Money, NewRaffle, ProtectedField, RaffleEngine, RafflePatch, RaffleStatus,
    SaleDetails, TicketStatus,
};
use std::collections::HashSet;

fn sorted_numbers(engine: &RaffleEngine, raffle_id: &raffles::RaffleId) -> Vec<String> {
    let mut numbers: Vec<String> = engine
        .tickets(raffle_id)
        .unwrap()
        .into_iter()
        .map(|t| t.number)
        .collect();
    numbers.sort();
    numbers
}

#[test]
fn every_modality_generates_each_number_exactly_once() {
    let engine = engine();

    for (id, modality) in [
        ("hundred", Modality::Hundred),
        ("thousand", Modality::Thousand),
        ("ten-thousand", Modality::TenThousand),
    ] {
        let raffle_id = raffle(&engine, id, modality, 1);
        let tickets = engine.tickets(&raffle_id).unwrap();

        assert_eq!(tickets.len(), modality.total_tickets() as usize);
        let unique: HashSet<&str> = tickets.iter().map(|t| t.number.as_str()).collect();
        assert_eq!(unique.len(), tickets.len(), "{modality} has duplicate numbers");
        assert!(tickets.iter().all(|t| t.number.len() == modality.width()));
        assert!(tickets.iter().all(|t| t.status == TicketStatus::Available));
    }
}

#[test]
fn generation_is_not_repeated() {
    let engine = engine();
    let raffle_id = raffle(&engine, "r1", Modality::Hundred, 5);

    let report = engine.generate_tickets(&raffle_id).unwrap();
    assert_eq!(report.generated, 0);
    assert!(report.already_generated);
    assert_eq!(engine.tickets(&raffle_id).unwrap().len(), 100);
}

#[test]
fn creating_an_existing_raffle_changes_nothing() {
    let engine = engine();
    let raffle_id = raffle(&engine, "r1", Modality::Hundred, 5);
    let before = engine.tickets(&raffle_id).unwrap();

    let again = engine
        .create_raffle(NewRaffle::new(
            "r1",
            "Outro título",
            Money::from_reais(9),
            Modality::Thousand,
            common::draw_date(),
        ))
        .unwrap();

    assert_eq!(again, raffle_id);
    let stored = engine.raffle(&raffle_id).unwrap().unwrap();
    assert_eq!(stored.title, "Rifa r1");
    assert_eq!(stored.price, Money::from_reais(5));
    assert_eq!(engine.tickets(&raffle_id).unwrap(), before);
}

#[test]
fn ten_thousand_sheet_positions_are_unique() {
    let engine = engine();
    let raffle_id = raffle(&engine, "big", Modality::TenThousand, 1);

    let positions: HashSet<_> = engine
        .tickets(&raffle_id)
        .unwrap()
        .into_iter()
        .map(|t| t.position.expect("ten-thousand tickets carry a position"))
        .collect();
    assert_eq!(positions.len(), 10_000);

    let page = engine.sheet_page(&raffle_id, 'J', 100).unwrap();
    assert_eq!(page.len(), 10);
}

#[test]
fn smaller_modalities_have_no_sheet_layout() {
    let engine = engine();
    let raffle_id = raffle(&engine, "r1", Modality::Thousand, 1);
    assert!(engine.tickets(&raffle_id).unwrap().iter().all(|t| t.position.is_none()));
    assert!(engine.sheet_letters(&raffle_id).unwrap().is_empty());
}

#[test]
fn regenerate_reshuffles_only_uncommitted_raffles() {
    let engine = engine();
    let raffle_id = raffle(&engine, "r1", Modality::Hundred, 5);
    let first: Vec<String> = engine.tickets(&raffle_id).unwrap().into_iter().map(|t| t.number).collect();

    assert!(engine.regenerate_tickets(&raffle_id).unwrap());
    let second: Vec<String> = engine.tickets(&raffle_id).unwrap().into_iter().map(|t| t.number).collect();
    assert_eq!(second.len(), 100);
    assert_ne!(first, second, "a fresh shuffle should change the order");

    let ana = reseller(&engine, "Ana", 10);
    engine.assign_to_reseller(&raffle_id, &ana, ["10"]).unwrap();
    assert!(!engine.regenerate_tickets(&raffle_id).unwrap());
    assert_eq!(
        engine.ticket(&raffle_id, "10").unwrap().unwrap().status,
        TicketStatus::Reserved
    );
}

#[test]
fn clear_refuses_raffles_with_sales() {
    let engine = engine();
    let raffle_id = raffle(&engine, "r1", Modality::Hundred, 5);

    engine.sell_tickets(&raffle_id, ["42"], SaleDetails::default()).unwrap();
    assert!(!engine.clear_tickets(&raffle_id).unwrap());
    assert_eq!(engine.tickets(&raffle_id).unwrap().len(), 100);
}

#[test]
fn clear_discards_reservations_and_allows_regeneration() {
    let engine = engine();
    let raffle_id = raffle(&engine, "r1", Modality::Hundred, 5);
    let ana = reseller(&engine, "Ana", 10);
    engine.assign_to_reseller(&raffle_id, &ana, ["01", "02"]).unwrap();

    assert!(engine.clear_tickets(&raffle_id).unwrap());
    assert!(engine.tickets(&raffle_id).unwrap().is_empty());

    let report = engine.generate_tickets(&raffle_id).unwrap();
    assert_eq!(report.generated, 100);
    assert!(engine.tickets_for_reseller(&raffle_id, &ana).unwrap().is_empty());
}

#[test]
fn update_drops_price_and_modality_once_committed() {
    let engine = engine();
    let raffle_id = raffle(&engine, "r1", Modality::Hundred, 5);
    let ana = reseller(&engine, "Ana", 10);
    engine.assign_to_reseller(&raffle_id, &ana, ["07"]).unwrap();

    let report = engine
        .update_raffle(
            &raffle_id,
            RafflePatch {
                title: Some("Rifa Nova".to_string()),
                price: Some(Money::from_reais(8)),
                modality: Some(Modality::Thousand),
                status: Some(RaffleStatus::Closed),
                ..RafflePatch::default()
            },
        )
        .unwrap();

    assert_eq!(report.dropped_fields, vec![ProtectedField::Price, ProtectedField::Modality]);
    let stored = engine.raffle(&raffle_id).unwrap().unwrap();
    assert_eq!(stored.title, "Rifa Nova");
    assert_eq!(stored.status, RaffleStatus::Closed);
    assert_eq!(stored.price, Money::from_reais(5));
    assert_eq!(stored.modality, Modality::Hundred);
}

#[test]
fn update_of_uncommitted_modality_rebuilds_tickets() {
    let engine = engine();
    let raffle_id = raffle(&engine, "r1", Modality::Hundred, 5);

    let report = engine
        .update_raffle(
            &raffle_id,
            RafflePatch {
                modality: Some(Modality::Thousand),
                ..RafflePatch::default()
            },
        )
        .unwrap();

    assert!(report.dropped_fields.is_empty());
    assert!(report.regenerated);
    assert_eq!(engine.tickets(&raffle_id).unwrap().len(), 1_000);
}

#[test]
fn update_of_unknown_raffle_is_an_error() {
    let engine = engine();
    let err = engine
        .update_raffle(&"missing".into(), RafflePatch::default())
        .unwrap_err();
    assert!(matches!(err, raffles::RaffleError::RaffleNotFound(_)));
}

#[test]
fn sheet_order_is_shuffled_for_every_seed() {
    let sorted: Vec<String> = (0..10_000).map(|n| format!("{n:04}")).collect();

    for seed in 0..5 {
        let engine = RaffleEngine::new(environment(seed));
        let raffle_id = raffle(&engine, "big", Modality::TenThousand, 1);
        let mut tickets = engine.tickets(&raffle_id).unwrap();
        tickets.sort_by_key(|t| t.position);

        let by_position: Vec<String> = tickets.into_iter().map(|t| t.number).collect();
        assert_ne!(by_position, sorted, "seed {seed} produced the identity order");
        assert_eq!(sorted_numbers(&engine, &raffle_id), sorted);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_seed_yields_a_permutation(seed in any::<u64>()) {
        let engine = RaffleEngine::new(environment(seed));
        let raffle_id = raffle(&engine, "p", Modality::Hundred, 1);

        let expected: Vec<String> = (0..100).map(|n| format!("{n:02}")).collect();
        prop_assert_eq!(sorted_numbers(&engine, &raffle_id), expected);
    }
}
