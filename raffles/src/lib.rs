//! Raffle Engine - numbered-ticket raffles sold through resellers
//!
//! A single aggregate holds every raffle, its tickets, the resellers who sell
//! them, and the sales log. All mutations go through one reducer behind a
//! locked store, which makes bulk ticket claims atomic:
//!
//! ```text
//! ┌──────────────┐   RaffleAction    ┌──────────────┐   Effect::Persist   ┌──────────────┐
//! │ RaffleEngine │ ────────────────▶ │ RaffleReducer│ ──────────────────▶ │ JSON snapshot│
//! │   (facade)   │ ◀──────────────── │ (RaffleState)│                     │   on disk    │
//! └──────────────┘     Outcome       └──────────────┘                     └──────────────┘
//!                                          │  ▲
//!                                          ▼  │ SaleRecorded (follow-up)
//!                                     reseller ledger
//! ```
//!
//! # Key Features
//!
//! ## 1. Ticket generation
//!
//! Every number of the raffle's modality is shuffled (Fisher–Yates) and
//! stored once. Ten-thousand raffles also get a sheet position
//! (letter A–J, block 1–100, index 1–10).
//!
//! ## 2. Guarded allocation
//!
//! Assigning to a reseller only claims available tickets; revoking only
//! releases the reseller's own reservations. Two resellers racing for the
//! same number never both win.
//!
//! ## 3. Money in integer cents
//!
//! Prices and totals are cents, commission rates are basis points, and
//! commissions are rounded once per raffle.
//!
//! # Usage
//!
//! ```ignore
//! let engine = RaffleEngine::from_config(&Config::from_env())?;
//! let raffle = engine.create_raffle(NewRaffle::new("r1", "Rifa", Money::from_reais(5), Modality::Hundred, draw))?;
//! let stats = engine.financial_stats(&raffle)?;
//! ```

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod allocation;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod financial;
pub mod ledger;
pub mod lifecycle;
pub mod metrics;
pub mod numbering;
pub mod ranges;
pub mod snapshot;
pub mod state;
pub mod tickets;
pub mod types;

pub use aggregate::{RaffleAction, RaffleReducer};
pub use config::Config;
pub use engine::RaffleEngine;
pub use environment::{IdGenerator, RaffleEnvironment, SequentialIds, UuidIds};
pub use error::{RaffleError, Result};
pub use numbering::{NumberShuffler, SeededShuffler, ThreadRngShuffler};
pub use snapshot::JsonSnapshotStore;
pub use state::{Outcome, RaffleState};
pub use types::{
    AllocationReport, CommissionRate, DeletionReport, FinancialStats, GenerationReport, Modality,
    Money, NewRaffle, NewReseller, PatchReport, PaymentStatus, ProtectedField, Raffle,
    RaffleDetails, RaffleId, RafflePatch, RaffleStatus, Reseller, ResellerAllocation, ResellerId,
    ResellerPatch, ResellerStatement, Sale, SaleDetails, SaleId, SheetPosition, Ticket,
    TicketStatus, TransitionReport,
};
