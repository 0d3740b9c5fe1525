//! Raffle Engine Demo
//!
//! Walks through one raffle end to end:
//! - Raffle creation with ticket generation
//! - Reseller registration and ticket assignment
//! - A sale through the reseller
//! - Financial summary and reseller statement
//!
//! # Usage
//!
//! ```bash
//! RAFFLES_SNAPSHOT_PATH=/tmp/demo.json cargo run --bin demo
//! ```

use chrono::{Duration, Utc};
use raffles::{
    CommissionRate, Config, Modality, Money, NewRaffle, NewReseller, RaffleEngine, SaleDetails,
    TicketStatus, metrics::register_business_metrics,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    register_business_metrics();

    println!("\n🎟️  ============================================");
    println!("   Raffle Engine - Live Demo");
    println!("============================================\n");

    let engine = RaffleEngine::from_config(&config)?;
    println!("✓ Engine ready (snapshot: {})\n", config.snapshot_path.display());

    // Step 1: Create the raffle
    println!("1️⃣  Creating a hundred-number raffle at R$ 5,00...");
    let raffle_id = engine.create_raffle(NewRaffle::new(
        format!("demo-{}", Utc::now().timestamp()),
        "Rifa Beneficente",
        Money::from_reais(5),
        Modality::Hundred,
        Utc::now() + Duration::days(30),
    ))?;
    let tickets = engine.tickets(&raffle_id)?;
    println!("   ✓ {} tickets generated for {raffle_id}\n", tickets.len());

    // Step 2: Register a reseller
    println!("2️⃣  Registering a reseller with 10% commission...");
    let reseller_id = engine.add_reseller(
        NewReseller::new("Maria Souza", CommissionRate::from_percent(10)?).phone("11 99999-0000"),
    )?;
    println!("   ✓ Reseller {reseller_id}\n");

    // Step 3: Assign tickets
    println!("3️⃣  Assigning tickets 00-02 to the reseller...");
    let assigned = engine.reserve_from_text(&raffle_id, &reseller_id, "0-2")?;
    println!("   ✓ Reserved: {:?}", assigned.applied);
    println!("   ✓ Skipped:  {:?}\n", assigned.skipped);

    // Step 4: Sell two of them
    println!("4️⃣  Selling tickets 00 and 01 through the reseller...");
    let sale = engine.sell_tickets(
        &raffle_id,
        ["00", "01"],
        SaleDetails::default()
            .buyer("João Pereira", "11 98888-7777")
            .via_reseller(reseller_id.clone()),
    )?;
    println!("   ✓ Sold: {:?} (sale {:?})\n", sale.applied, sale.sale_id);

    // Step 5: Report
    println!("5️⃣  Financial summary");
    let stats = engine.financial_stats(&raffle_id)?;
    println!("   Potential value: {}", stats.total_potential_value);
    println!("   Sold / reserved: {} / {}", stats.sold_count, stats.reserved_count);
    println!("   Sales:           {}", stats.total_sales_value);
    println!("   Commissions:     {}", stats.total_commissions);
    println!("   Estimated profit: {}\n", stats.estimated_profit);

    if let Some(statement) = engine.reseller_statement(&reseller_id)? {
        println!("   {} owes {} ({} sold, {} commission)", statement.name, statement.outstanding, statement.total_sales, statement.commission);
    }

    let still_reserved = engine.tickets_with_status(&raffle_id, TicketStatus::Reserved)?;
    println!("   Still reserved: {}", still_reserved.len());

    engine.flush()?;
    println!("\n✓ Demo complete\n");
    Ok(())
}
