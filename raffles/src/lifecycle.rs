//! Raffle lifecycle: creation, guarded edits, regeneration and clearing.
//!
//! Once any ticket of a raffle is reserved or sold, the raffle's number space
//! and price are frozen and its ticket set can no longer be rebuilt.

use crate::error::{RaffleError, Result};
use crate::metrics;
use crate::numbering::{self, NumberShuffler};
use crate::state::RaffleState;
use crate::types::{
    GenerationReport, Money, NewRaffle, PatchReport, ProtectedField, Raffle, RaffleId,
    RafflePatch, TicketStatus,
};
use chrono::{DateTime, Utc};

const COMMITTED: [TicketStatus; 2] = [TicketStatus::Reserved, TicketStatus::Sold];

/// Store a new raffle and generate its tickets
///
/// Creating an id that already exists changes nothing and reports the
/// existing ticket set.
///
/// # Errors
///
/// - [`RaffleError::InvalidTitle`] for a blank title
/// - [`RaffleError::InvalidPrice`] for a zero price
pub fn create(
    state: &mut RaffleState,
    new: NewRaffle,
    now: DateTime<Utc>,
    shuffler: &dyn NumberShuffler,
) -> Result<(RaffleId, GenerationReport)> {
    let title = validate_title(&new.title)?;
    validate_price(new.price)?;

    let raffle_id = new.id;
    if state.raffles.contains_key(&raffle_id) {
        tracing::debug!(raffle_id = %raffle_id, "Raffle already exists, not recreating");
    } else {
        state.raffles.insert(
            raffle_id.clone(),
            Raffle {
                id: raffle_id.clone(),
                title,
                price: new.price,
                modality: new.modality,
                draw_date: new.draw_date,
                status: new.status,
                created_at: now,
                details: new.details,
            },
        );
        metrics::record_raffle_created();
        tracing::info!(raffle_id = %raffle_id, modality = %new.modality, "Raffle created");
    }

    let generation = generate(state, &raffle_id, shuffler);
    Ok((raffle_id, generation))
}

/// Generate the raffle's tickets unless it already has some
pub fn generate(
    state: &mut RaffleState,
    raffle_id: &RaffleId,
    shuffler: &dyn NumberShuffler,
) -> GenerationReport {
    let Some(raffle) = state.raffles.get(raffle_id) else {
        tracing::warn!(raffle_id = %raffle_id, "Cannot generate tickets for unknown raffle");
        return GenerationReport::default();
    };

    if state.tickets.has_tickets(raffle_id) {
        tracing::debug!(raffle_id = %raffle_id, "Tickets already generated, skipping");
        return GenerationReport {
            generated: 0,
            already_generated: true,
        };
    }

    let tickets = numbering::generate_tickets(raffle_id, raffle.modality, shuffler);
    let generated = tickets.len();
    state.tickets.install(raffle_id, tickets);

    metrics::record_tickets_generated(generated);
    tracing::info!(raffle_id = %raffle_id, generated, "Tickets generated");

    GenerationReport {
        generated,
        already_generated: false,
    }
}

/// Discard and reshuffle the raffle's tickets
///
/// Refused (returns `false`) when any ticket is reserved or sold, or the
/// raffle is unknown.
pub fn regenerate(
    state: &mut RaffleState,
    raffle_id: &RaffleId,
    shuffler: &dyn NumberShuffler,
) -> bool {
    if !state.raffles.contains_key(raffle_id) {
        tracing::warn!(raffle_id = %raffle_id, "Cannot regenerate unknown raffle");
        return false;
    }
    if state.tickets.any_in(raffle_id, &COMMITTED) {
        metrics::record_guard_refusal("regenerate");
        tracing::warn!(raffle_id = %raffle_id, "Refusing to regenerate: tickets reserved or sold");
        return false;
    }

    state.tickets.remove_raffle(raffle_id);
    generate(state, raffle_id, shuffler);
    true
}

/// Remove every ticket of the raffle
///
/// Refused (returns `false`) when any ticket is sold, or the raffle is
/// unknown. Reservations are discarded with the tickets.
pub fn clear(state: &mut RaffleState, raffle_id: &RaffleId) -> bool {
    if !state.raffles.contains_key(raffle_id) {
        tracing::warn!(raffle_id = %raffle_id, "Cannot clear unknown raffle");
        return false;
    }
    if state.tickets.any_in(raffle_id, &[TicketStatus::Sold]) {
        metrics::record_guard_refusal("clear");
        tracing::warn!(raffle_id = %raffle_id, "Refusing to clear tickets: raffle has sales");
        return false;
    }

    let removed = state.tickets.remove_raffle(raffle_id);
    tracing::info!(raffle_id = %raffle_id, removed, "Tickets cleared");
    true
}

/// Apply a partial update
///
/// With tickets reserved or sold, price and modality changes are dropped
/// from the patch and listed in the report; everything else applies. A
/// modality change on an uncommitted raffle rebuilds its ticket set.
///
/// # Errors
///
/// - [`RaffleError::RaffleNotFound`] for an unknown id
/// - [`RaffleError::InvalidTitle`] for a blank title
/// - [`RaffleError::InvalidPrice`] for a zero price
pub fn update(
    state: &mut RaffleState,
    raffle_id: &RaffleId,
    mut patch: RafflePatch,
    shuffler: &dyn NumberShuffler,
) -> Result<PatchReport> {
    let committed = state.tickets.any_in(raffle_id, &COMMITTED);
    let title = patch.title.as_deref().map(validate_title).transpose()?;
    if let Some(price) = patch.price {
        validate_price(price)?;
    }

    let raffle = state
        .raffles
        .get_mut(raffle_id)
        .ok_or_else(|| RaffleError::RaffleNotFound(raffle_id.clone()))?;

    let mut report = PatchReport::default();
    if committed {
        if patch.price.take().is_some_and(|p| p != raffle.price) {
            report.dropped_fields.push(ProtectedField::Price);
        }
        if patch.modality.take().is_some_and(|m| m != raffle.modality) {
            report.dropped_fields.push(ProtectedField::Modality);
        }
        if !report.dropped_fields.is_empty() {
            metrics::record_guard_refusal("update");
            tracing::warn!(
                raffle_id = %raffle_id,
                dropped = ?report.dropped_fields,
                "Protected fields dropped: tickets reserved or sold"
            );
        }
    }

    if let Some(title) = title {
        raffle.title = title;
    }
    if let Some(price) = patch.price {
        raffle.price = price;
    }
    if let Some(draw_date) = patch.draw_date {
        raffle.draw_date = draw_date;
    }
    if let Some(status) = patch.status {
        raffle.status = status;
    }
    if let Some(details) = patch.details {
        raffle.details = details;
    }

    let new_modality = patch.modality.filter(|m| *m != raffle.modality);
    if let Some(modality) = new_modality {
        raffle.modality = modality;
        state.tickets.remove_raffle(raffle_id);
        generate(state, raffle_id, shuffler);
        report.regenerated = true;
        tracing::info!(raffle_id = %raffle_id, %modality, "Modality changed, tickets regenerated");
    }

    Ok(report)
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(RaffleError::InvalidTitle("Raffle title"));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: Money) -> Result<()> {
    if price.is_zero() {
        return Err(RaffleError::InvalidPrice);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::numbering::SeededShuffler;
    use crate::types::Modality;
    use raffle_core::environment::Clock;
    use raffle_testing::test_clock;

    fn new_raffle(modality: Modality) -> NewRaffle {
        NewRaffle::new("r", "Rifa", Money::from_reais(5), modality, test_clock().now())
    }

    fn created(modality: Modality) -> (RaffleState, RaffleId, SeededShuffler) {
        let shuffler = SeededShuffler::new(3);
        let mut state = RaffleState::default();
        let (id, generation) =
            create(&mut state, new_raffle(modality), test_clock().now(), &shuffler).unwrap();
        assert_eq!(generation.generated, modality.total_tickets() as usize);
        (state, id, shuffler)
    }

    #[test]
    fn create_validates_title_and_price() {
        let mut state = RaffleState::default();
        let shuffler = SeededShuffler::new(1);
        let mut blank = new_raffle(Modality::Hundred);
        blank.title = "   ".into();
        assert_eq!(
            create(&mut state, blank, test_clock().now(), &shuffler),
            Err(RaffleError::InvalidTitle("Raffle title"))
        );

        let mut free = new_raffle(Modality::Hundred);
        free.price = Money::ZERO;
        assert_eq!(
            create(&mut state, free, test_clock().now(), &shuffler),
            Err(RaffleError::InvalidPrice)
        );
        assert!(state.raffles.is_empty());
    }

    #[test]
    fn creating_twice_generates_once() {
        let (mut state, _, shuffler) = created(Modality::Hundred);
        let (_, again) =
            create(&mut state, new_raffle(Modality::Thousand), test_clock().now(), &shuffler).unwrap();
        assert!(again.already_generated);
        assert_eq!(state.tickets.len(), 100);
    }

    #[test]
    fn regenerate_refuses_with_reservations() {
        let (mut state, id, shuffler) = created(Modality::Hundred);
        state.tickets.get_mut(&id, "07").unwrap().status = TicketStatus::Reserved;
        assert!(!regenerate(&mut state, &id, &shuffler));
        assert_eq!(state.tickets.count(&id, TicketStatus::Reserved), 1);
    }

    #[test]
    fn regenerate_reshuffles_uncommitted_raffle() {
        let (mut state, id, shuffler) = created(Modality::Thousand);
        let before: Vec<String> = state.tickets.for_raffle(&id).iter().map(|t| t.number.clone()).collect();
        assert!(regenerate(&mut state, &id, &shuffler));
        let after: Vec<String> = state.tickets.for_raffle(&id).iter().map(|t| t.number.clone()).collect();
        assert_eq!(after.len(), 1_000);
        assert_ne!(before, after);
    }

    #[test]
    fn clear_allows_reservations_but_not_sales() {
        let (mut state, id, _) = created(Modality::Hundred);
        state.tickets.get_mut(&id, "01").unwrap().status = TicketStatus::Sold;
        assert!(!clear(&mut state, &id));
        assert_eq!(state.tickets.len(), 100);

        state.tickets.get_mut(&id, "01").unwrap().status = TicketStatus::Reserved;
        assert!(clear(&mut state, &id));
        assert!(!state.tickets.has_tickets(&id));
    }

    #[test]
    fn update_drops_protected_fields_once_committed() {
        let (mut state, id, shuffler) = created(Modality::Hundred);
        state.tickets.get_mut(&id, "01").unwrap().status = TicketStatus::Sold;

        let patch = RafflePatch {
            title: Some("Nova".into()),
            price: Some(Money::from_reais(9)),
            modality: Some(Modality::TenThousand),
            ..RafflePatch::default()
        };
        let report = update(&mut state, &id, patch, &shuffler).unwrap();

        assert_eq!(report.dropped_fields, vec![ProtectedField::Price, ProtectedField::Modality]);
        assert!(!report.regenerated);
        let raffle = state.raffle(&id).unwrap();
        assert_eq!(raffle.title, "Nova");
        assert_eq!(raffle.price, Money::from_reais(5));
        assert_eq!(raffle.total_tickets(), 100);
    }

    #[test]
    fn modality_change_rebuilds_uncommitted_raffle() {
        let (mut state, id, shuffler) = created(Modality::Hundred);
        let patch = RafflePatch {
            modality: Some(Modality::TenThousand),
            ..RafflePatch::default()
        };
        let report = update(&mut state, &id, patch, &shuffler).unwrap();
        assert!(report.regenerated);
        assert_eq!(state.tickets.for_raffle(&id).len(), 10_000);
        assert!(state.tickets.for_raffle(&id).iter().all(|t| t.position.is_some()));
    }

    #[test]
    fn update_unknown_raffle_is_not_found() {
        let mut state = RaffleState::default();
        let result = update(&mut state, &RaffleId::new("x"), RafflePatch::default(), &SeededShuffler::new(1));
        assert_eq!(result, Err(RaffleError::RaffleNotFound(RaffleId::new("x"))));
    }
}
