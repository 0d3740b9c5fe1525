//! Business metrics for the raffle engine.
//!
//! Recorded through the `metrics` facade; the embedding application decides
//! which recorder (if any) to install.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `raffles_created_total` - Raffles created
//! - `raffles_tickets_generated_total` - Tickets generated (including regenerations)
//! - `raffles_tickets_total{transition}` - Tickets reserved, revoked, sold, cloned, released
//! - `raffles_sales_total` - Sale records created
//! - `raffles_sales_revenue_cents_total` - Value of recorded sales in cents
//! - `raffles_guard_refusals_total{operation}` - Operations refused to protect committed tickets
//! - `raffles_settlements_cents_total` - Reseller payments recorded in cents

use metrics::describe_counter;

/// Initialize and register all business metrics descriptions.
///
/// Call once at startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!("raffles_created_total", "Total number of raffles created");
    describe_counter!(
        "raffles_tickets_generated_total",
        "Total number of tickets generated, including regenerations"
    );
    describe_counter!(
        "raffles_tickets_total",
        "Tickets moved by transition (reserved, revoked, sold, cloned, released)"
    );
    describe_counter!("raffles_sales_total", "Total number of sale records");
    describe_counter!(
        "raffles_sales_revenue_cents_total",
        "Total value of recorded sales in cents"
    );
    describe_counter!(
        "raffles_guard_refusals_total",
        "Operations refused because tickets were already reserved or sold"
    );
    describe_counter!(
        "raffles_settlements_cents_total",
        "Total reseller payments recorded in cents"
    );

    raffle_runtime::metrics::register_metrics();
    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a raffle created
pub fn record_raffle_created() {
    metrics::counter!("raffles_created_total").increment(1);
}

/// Record a generated ticket set
pub fn record_tickets_generated(count: usize) {
    metrics::counter!("raffles_tickets_generated_total").increment(count as u64);
    tracing::debug!(count, "Recorded tickets_generated metric");
}

/// Record tickets moved by a transition
///
/// # Arguments
///
/// * `transition` - One of `reserved`, `revoked`, `sold`, `cloned`, `released`, `overwritten`
/// * `count` - Number of tickets moved
pub fn record_tickets(transition: &'static str, count: usize) {
    if count == 0 {
        return;
    }
    metrics::counter!("raffles_tickets_total", "transition" => transition).increment(count as u64);
    tracing::debug!(transition, count, "Recorded tickets metric");
}

/// Record a sale record
pub fn record_sale(amount_cents: u64) {
    metrics::counter!("raffles_sales_total").increment(1);
    metrics::counter!("raffles_sales_revenue_cents_total").increment(amount_cents);
    tracing::debug!(amount_cents, "Recorded sale metric");
}

/// Record a refused regenerate/clear/update
pub fn record_guard_refusal(operation: &'static str) {
    metrics::counter!("raffles_guard_refusals_total", "operation" => operation).increment(1);
}

/// Record a reseller payment
pub fn record_settlement(amount_cents: u64) {
    metrics::counter!("raffles_settlements_cents_total").increment(amount_cents);
}
