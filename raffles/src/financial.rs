//! Financial aggregation.
//!
//! Pure reads over raffle metadata, ticket state and the reseller ledger.
//! Nothing here is stored; every figure is recomputed on demand.

use crate::state::RaffleState;
use crate::types::{
    FinancialStats, RaffleId, ResellerAllocation, ResellerId, TicketStatus, round_basis_points,
};

/// Financial summary of a raffle
///
/// Commissions use each reseller's current rate, so changing a rate changes
/// the commissions reported for tickets sold earlier. Tickets whose reseller
/// was deleted earn no commission. An unknown raffle yields all zeros.
#[must_use]
pub fn compute_stats(state: &RaffleState, raffle_id: &RaffleId) -> FinancialStats {
    let Some(raffle) = state.raffle(raffle_id) else {
        return FinancialStats::default();
    };

    let mut sold_count: u32 = 0;
    let mut reserved_count: u32 = 0;
    // Exact sum in cent-basis-points, rounded once at the end.
    let mut commission_bps: u128 = 0;

    for ticket in state.tickets.for_raffle(raffle_id) {
        match ticket.status {
            TicketStatus::Sold => {
                sold_count += 1;
                let rate = ticket
                    .reseller_id
                    .as_ref()
                    .and_then(|id| state.ledger.get(id))
                    .map(|r| r.commission_rate);
                if let Some(rate) = rate {
                    commission_bps += u128::from(raffle.price.cents()) * u128::from(rate.basis_points());
                }
            }
            TicketStatus::Reserved => reserved_count += 1,
            TicketStatus::Available | TicketStatus::Blocked => {}
        }
    }

    let total_sales_value = raffle.price.times(u64::from(sold_count));
    let total_commissions = round_basis_points(commission_bps);

    FinancialStats {
        total_potential_value: raffle.price.times(u64::from(raffle.total_tickets())),
        sold_count,
        reserved_count,
        total_sales_value,
        total_commissions,
        estimated_profit: total_sales_value.saturating_sub(total_commissions),
    }
}

/// Per-raffle ticket counts of one reseller, skipping raffles with none
#[must_use]
pub fn reseller_allocations(state: &RaffleState, reseller_id: &ResellerId) -> Vec<ResellerAllocation> {
    state
        .raffles
        .keys()
        .filter_map(|raffle_id| {
            let mut row = ResellerAllocation {
                raffle_id: raffle_id.clone(),
                total: 0,
                reserved: 0,
                sold: 0,
            };
            for ticket in state.tickets.for_reseller(raffle_id, reseller_id) {
                row.total += 1;
                match ticket.status {
                    TicketStatus::Reserved => row.reserved += 1,
                    TicketStatus::Sold => row.sold += 1,
                    TicketStatus::Available | TicketStatus::Blocked => {}
                }
            }
            (row.total > 0).then_some(row)
        })
        .collect()
}
