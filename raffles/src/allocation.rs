//! Guarded bulk allocation of tickets to resellers.
//!
//! Unlike a forced overwrite, every operation here checks each ticket's
//! current state first and skips what does not qualify. Nothing matching is
//! not an error; the report says what was applied and what was skipped.

use crate::tickets::{Overwrite, TicketBook};
use crate::types::{AllocationReport, DeletionReport, RaffleId, ResellerId, TicketStatus};
use chrono::{DateTime, Utc};

/// Reserve every listed ticket that is currently `available`
pub fn assign(
    book: &mut TicketBook,
    raffle_id: &RaffleId,
    reseller_id: &ResellerId,
    numbers: &[String],
    now: DateTime<Utc>,
) -> AllocationReport {
    let (candidates, mut skipped): (Vec<String>, Vec<String>) = numbers.iter().cloned().partition(|n| {
        book.get(raffle_id, n)
            .is_some_and(|t| t.status == TicketStatus::Available)
    });

    let (applied, repeated) = book.overwrite(
        raffle_id,
        &candidates,
        Overwrite {
            status: TicketStatus::Reserved,
            reseller_id: Some(reseller_id),
            buyer: None,
            now,
        },
    );
    skipped.extend(repeated);

    AllocationReport {
        applied,
        skipped,
        rejected: Vec::new(),
    }
}

/// Release tickets reserved by `reseller_id` back to `available`
///
/// Tickets held by another reseller, sold, or in any other state are left
/// alone.
pub fn revoke(
    book: &mut TicketBook,
    raffle_id: &RaffleId,
    reseller_id: &ResellerId,
    numbers: &[String],
) -> AllocationReport {
    let mut report = AllocationReport::default();

    for number in numbers {
        match book.get_mut(raffle_id, number) {
            Some(ticket) if ticket.is_reserved_by(reseller_id) => {
                ticket.status = TicketStatus::Available;
                ticket.reseller_id = None;
                ticket.reserved_at = None;
                report.applied.push(number.clone());
            }
            _ => report.skipped.push(number.clone()),
        }
    }

    report
}

/// Copy the reservations of `source` onto the same numbers in `target`
///
/// Only numbers available in the target are reserved, for the reseller that
/// holds them in the source. Raffles of different modality share no number
/// space, so `compatible == false` skips everything.
pub fn clone_reservations(
    book: &mut TicketBook,
    source: &RaffleId,
    target: &RaffleId,
    only_reseller: Option<&ResellerId>,
    compatible: bool,
    now: DateTime<Utc>,
) -> AllocationReport {
    let reservations: Vec<(String, ResellerId)> = book
        .with_status(source, TicketStatus::Reserved)
        .filter_map(|t| t.reseller_id.clone().map(|r| (t.number.clone(), r)))
        .filter(|(_, r)| only_reseller.is_none_or(|only| only == r))
        .collect();

    if !compatible {
        return AllocationReport::all_skipped(reservations.into_iter().map(|(n, _)| n).collect());
    }

    let mut report = AllocationReport::default();
    for (number, reseller_id) in reservations {
        match book.get_mut(target, &number) {
            Some(ticket) if ticket.status == TicketStatus::Available => {
                ticket.status = TicketStatus::Reserved;
                ticket.reseller_id = Some(reseller_id);
                ticket.reserved_at = Some(now);
                report.applied.push(number);
            }
            _ => report.skipped.push(number),
        }
    }
    report
}

/// Detach every ticket from a reseller about to be deleted
///
/// Reserved tickets return to `available`. Sold tickets keep the reference
/// for history and are flagged `reseller_deleted`.
pub fn release_reseller(book: &mut TicketBook, reseller_id: &ResellerId) -> DeletionReport {
    let mut report = DeletionReport::default();

    for ticket in book
        .iter_mut()
        .filter(|t| t.reseller_id.as_ref() == Some(reseller_id))
    {
        match ticket.status {
            TicketStatus::Sold => {
                ticket.reseller_deleted = true;
                report.flagged += 1;
            }
            TicketStatus::Reserved => {
                ticket.status = TicketStatus::Available;
                ticket.reseller_id = None;
                ticket.reserved_at = None;
                report.released += 1;
            }
            TicketStatus::Available | TicketStatus::Blocked => {
                ticket.reseller_id = None;
            }
        }
    }

    report
}
