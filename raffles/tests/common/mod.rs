//! Shared fixtures for raffle engine integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use raffle_core::environment::Clock;
use raffle_testing::test_clock;
use raffles::{
    CommissionRate, Modality, Money, NewRaffle, NewReseller, RaffleEngine, RaffleEnvironment,
    RaffleId, ResellerId, SeededShuffler, SequentialIds,
};
use std::sync::Arc;

/// Deterministic environment: fixed clock, sequential ids, seeded shuffle
pub fn environment(seed: u64) -> RaffleEnvironment {
    RaffleEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialIds::new()),
        Arc::new(SeededShuffler::new(seed)),
    )
}

/// Engine with no persistence
pub fn engine() -> RaffleEngine {
    RaffleEngine::new(environment(42))
}

/// Draw date used by every fixture raffle
pub fn draw_date() -> DateTime<Utc> {
    test_clock().now() + chrono::Duration::days(30)
}

/// Create a raffle with the given modality and price in reais
pub fn raffle(engine: &RaffleEngine, id: &str, modality: Modality, reais: u64) -> RaffleId {
    engine
        .create_raffle(NewRaffle::new(
            id,
            format!("Rifa {id}"),
            Money::from_reais(reais),
            modality,
            draw_date(),
        ))
        .unwrap()
}

/// Register a reseller at a whole-percent commission
pub fn reseller(engine: &RaffleEngine, name: &str, percent: u32) -> ResellerId {
    engine
        .add_reseller(NewReseller::new(name, CommissionRate::from_percent(percent).unwrap()))
        .unwrap()
}
