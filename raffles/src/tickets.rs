//! Ticket store.
//!
//! Holds every ticket of every raffle, one row per (raffle, number). Rows of
//! a raffle are kept in generation order with a number index beside them.

use crate::types::{RaffleId, ResellerId, Ticket, TicketStatus};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Tickets of a single raffle
#[derive(Clone, Debug, Default)]
struct RaffleTickets {
    rows: Vec<Ticket>,
    by_number: HashMap<String, usize>,
}

impl RaffleTickets {
    fn push(&mut self, ticket: Ticket) -> bool {
        if self.by_number.contains_key(&ticket.number) {
            return false;
        }
        self.by_number.insert(ticket.number.clone(), self.rows.len());
        self.rows.push(ticket);
        true
    }

    fn get_mut(&mut self, number: &str) -> Option<&mut Ticket> {
        let idx = *self.by_number.get(number)?;
        self.rows.get_mut(idx)
    }
}

/// Parameters of a forced status overwrite
#[derive(Clone, Copy, Debug)]
pub struct Overwrite<'a> {
    /// Target status
    pub status: TicketStatus,
    /// Reseller to attach; `None` keeps the current one (reserved/sold only)
    pub reseller_id: Option<&'a ResellerId>,
    /// Buyer to record on sold tickets
    pub buyer: Option<(&'a str, &'a str)>,
    /// Transition time, used as `reserved_at` for reservations
    pub now: DateTime<Utc>,
}

/// The authoritative ticket collection across all raffles
#[derive(Clone, Debug, Default)]
pub struct TicketBook {
    raffles: BTreeMap<RaffleId, RaffleTickets>,
}

impl TicketBook {
    /// Empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted rows
    ///
    /// Keeps the first row of any duplicated (raffle, number) pair and returns
    /// how many duplicates were dropped.
    pub fn from_rows(rows: impl IntoIterator<Item = Ticket>) -> (Self, usize) {
        let mut book = Self::new();
        let mut duplicates = 0;
        for ticket in rows {
            let entry = book.raffles.entry(ticket.raffle_id.clone()).or_default();
            if !entry.push(ticket) {
                duplicates += 1;
            }
        }
        (book, duplicates)
    }

    /// Whether the raffle has any tickets
    #[must_use]
    pub fn has_tickets(&self, raffle_id: &RaffleId) -> bool {
        self.raffles.get(raffle_id).is_some_and(|t| !t.rows.is_empty())
    }

    /// Install a freshly generated ticket set
    ///
    /// Refuses (returns `false`) when the raffle already has tickets.
    pub fn install(&mut self, raffle_id: &RaffleId, tickets: Vec<Ticket>) -> bool {
        if self.has_tickets(raffle_id) {
            return false;
        }
        let mut set = RaffleTickets::default();
        for ticket in tickets {
            set.push(ticket);
        }
        self.raffles.insert(raffle_id.clone(), set);
        true
    }

    /// Remove every ticket of a raffle, returning how many were removed
    pub fn remove_raffle(&mut self, raffle_id: &RaffleId) -> usize {
        self.raffles.remove(raffle_id).map_or(0, |t| t.rows.len())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Tickets of a raffle in generation order
    #[must_use]
    pub fn for_raffle(&self, raffle_id: &RaffleId) -> &[Ticket] {
        self.raffles
            .get(raffle_id)
            .map(|t| t.rows.as_slice())
            .unwrap_or_default()
    }

    /// One ticket
    #[must_use]
    pub fn get(&self, raffle_id: &RaffleId, number: &str) -> Option<&Ticket> {
        let set = self.raffles.get(raffle_id)?;
        set.by_number.get(number).and_then(|&idx| set.rows.get(idx))
    }

    /// One ticket, mutably
    pub fn get_mut(&mut self, raffle_id: &RaffleId, number: &str) -> Option<&mut Ticket> {
        self.raffles.get_mut(raffle_id)?.get_mut(number)
    }

    /// Tickets of a raffle in `status`
    pub fn with_status<'a>(
        &'a self,
        raffle_id: &RaffleId,
        status: TicketStatus,
    ) -> impl Iterator<Item = &'a Ticket> + use<'a> {
        self.for_raffle(raffle_id).iter().filter(move |t| t.status == status)
    }

    /// Tickets of a raffle referencing `reseller_id`
    pub fn for_reseller<'a>(
        &'a self,
        raffle_id: &RaffleId,
        reseller_id: &'a ResellerId,
    ) -> impl Iterator<Item = &'a Ticket> + use<'a> {
        self.for_raffle(raffle_id)
            .iter()
            .filter(move |t| t.reseller_id.as_ref() == Some(reseller_id))
    }

    /// Count of a raffle's tickets in `status`
    #[must_use]
    pub fn count(&self, raffle_id: &RaffleId, status: TicketStatus) -> usize {
        self.with_status(raffle_id, status).count()
    }

    /// Whether any ticket of the raffle is in one of `statuses`
    #[must_use]
    pub fn any_in(&self, raffle_id: &RaffleId, statuses: &[TicketStatus]) -> bool {
        self.for_raffle(raffle_id).iter().any(|t| statuses.contains(&t.status))
    }

    /// Every ticket across all raffles, grouped by raffle
    pub fn iter(&self) -> impl Iterator<Item = &Ticket> {
        self.raffles.values().flat_map(|t| t.rows.iter())
    }

    /// Every ticket across all raffles, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ticket> {
        self.raffles.values_mut().flat_map(|t| t.rows.iter_mut())
    }

    /// Total row count
    #[must_use]
    pub fn len(&self) -> usize {
        self.raffles.values().map(|t| t.rows.len()).sum()
    }

    /// Whether the book holds no tickets at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Sheet layout
    // ========================================================================

    /// Distinct sheet letters of a raffle, in order
    #[must_use]
    pub fn sheet_letters(&self, raffle_id: &RaffleId) -> Vec<char> {
        let mut letters: Vec<char> = self
            .for_raffle(raffle_id)
            .iter()
            .filter_map(|t| t.position.map(|p| p.group_letter))
            .collect();
        letters.sort_unstable();
        letters.dedup();
        letters
    }

    /// Distinct blocks under one letter, in order
    #[must_use]
    pub fn sheet_blocks(&self, raffle_id: &RaffleId, letter: char) -> Vec<u8> {
        let mut blocks: Vec<u8> = self
            .for_raffle(raffle_id)
            .iter()
            .filter_map(|t| t.position.filter(|p| p.group_letter == letter).map(|p| p.block))
            .collect();
        blocks.sort_unstable();
        blocks.dedup();
        blocks
    }

    /// Tickets of one (letter, block), ordered by index
    #[must_use]
    pub fn sheet_page(&self, raffle_id: &RaffleId, letter: char, block: u8) -> Vec<&Ticket> {
        let mut page: Vec<&Ticket> = self
            .for_raffle(raffle_id)
            .iter()
            .filter(|t| {
                t.position
                    .is_some_and(|p| p.group_letter == letter && p.block == block)
            })
            .collect();
        page.sort_by_key(|t| t.position.map(|p| p.index));
        page
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Overwrite the status of every listed ticket, whatever its current status
    ///
    /// Callers needing "only if available" semantics filter first. Returns the
    /// numbers that matched a ticket and those that did not (unknown or
    /// repeated).
    pub fn overwrite(
        &mut self,
        raffle_id: &RaffleId,
        numbers: &[String],
        change: Overwrite<'_>,
    ) -> (Vec<String>, Vec<String>) {
        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();

        let Some(set) = self.raffles.get_mut(raffle_id) else {
            return (applied, numbers.to_vec());
        };

        for number in numbers {
            if !seen.insert(number.as_str()) {
                skipped.push(number.clone());
                continue;
            }
            match set.get_mut(number) {
                Some(ticket) => {
                    apply_overwrite(ticket, change);
                    applied.push(number.clone());
                }
                None => skipped.push(number.clone()),
            }
        }

        (applied, skipped)
    }
}

fn apply_overwrite(ticket: &mut Ticket, change: Overwrite<'_>) {
    ticket.status = change.status;

    if change.status.holds_reseller() {
        if let Some(reseller_id) = change.reseller_id {
            if ticket.reseller_id.as_ref() != Some(reseller_id) {
                ticket.reseller_deleted = false;
            }
            ticket.reseller_id = Some(reseller_id.clone());
        }
    } else {
        ticket.reseller_id = None;
        ticket.reseller_deleted = false;
        ticket.buyer_name = None;
        ticket.buyer_phone = None;
    }

    match change.status {
        TicketStatus::Reserved => ticket.reserved_at = Some(change.now),
        TicketStatus::Sold => {
            if let Some((name, phone)) = change.buyer {
                ticket.buyer_name = Some(name.to_string());
                ticket.buyer_phone = Some(phone.to_string());
            }
        }
        TicketStatus::Available | TicketStatus::Blocked => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Modality;
    use raffle_core::environment::Clock;
    use raffle_testing::test_clock;

    fn book_with(raffle: &RaffleId, modality: Modality) -> TicketBook {
        let tickets = crate::numbering::ordered_numbers(modality)
            .into_iter()
            .map(|n| Ticket::available(raffle.clone(), n, None))
            .collect();
        let mut book = TicketBook::new();
        assert!(book.install(raffle, tickets));
        book
    }

    fn numbers(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn install_refuses_second_generation() {
        let raffle = RaffleId::new("r");
        let mut book = book_with(&raffle, Modality::Hundred);
        assert!(!book.install(&raffle, Vec::new()));
        assert_eq!(book.for_raffle(&raffle).len(), 100);
    }

    #[test]
    fn overwrite_ignores_prior_status_and_reports_unknown_numbers() {
        let raffle = RaffleId::new("r");
        let reseller = ResellerId::new("x");
        let mut book = book_with(&raffle, Modality::Hundred);
        let now = test_clock().now();

        let (applied, skipped) = book.overwrite(
            &raffle,
            &numbers(&["01", "02", "01", "777"]),
            Overwrite {
                status: TicketStatus::Sold,
                reseller_id: Some(&reseller),
                buyer: Some(("Ana", "555")),
                now,
            },
        );
        assert_eq!(applied, ["01", "02"]);
        assert_eq!(skipped, ["01", "777"]);

        // Force back to reserved without naming a reseller keeps the current one.
        let (applied, _) = book.overwrite(
            &raffle,
            &numbers(&["01"]),
            Overwrite {
                status: TicketStatus::Reserved,
                reseller_id: None,
                buyer: None,
                now,
            },
        );
        assert_eq!(applied.len(), 1);
        let ticket = book.get(&raffle, "01").unwrap();
        assert_eq!(ticket.status, TicketStatus::Reserved);
        assert_eq!(ticket.reseller_id, Some(reseller));
        assert_eq!(ticket.reserved_at, Some(now));
    }

    #[test]
    fn releasing_drops_reseller_reference() {
        let raffle = RaffleId::new("r");
        let reseller = ResellerId::new("x");
        let mut book = book_with(&raffle, Modality::Hundred);
        let now = test_clock().now();
        let reserve = Overwrite {
            status: TicketStatus::Reserved,
            reseller_id: Some(&reseller),
            buyer: None,
            now,
        };
        book.overwrite(&raffle, &numbers(&["10"]), reserve);
        book.overwrite(
            &raffle,
            &numbers(&["10"]),
            Overwrite {
                status: TicketStatus::Blocked,
                ..reserve
            },
        );
        let ticket = book.get(&raffle, "10").unwrap();
        assert_eq!(ticket.reseller_id, None);
        assert_eq!(book.count(&raffle, TicketStatus::Blocked), 1);
    }

    #[test]
    fn unknown_raffle_skips_everything() {
        let mut book = TicketBook::new();
        let (applied, skipped) = book.overwrite(
            &RaffleId::new("nope"),
            &numbers(&["01"]),
            Overwrite {
                status: TicketStatus::Blocked,
                reseller_id: None,
                buyer: None,
                now: test_clock().now(),
            },
        );
        assert!(applied.is_empty());
        assert_eq!(skipped, ["01"]);
    }

    #[test]
    fn from_rows_drops_duplicates() {
        let raffle = RaffleId::new("r");
        let rows = vec![
            Ticket::available(raffle.clone(), "01".into(), None),
            Ticket::available(raffle.clone(), "01".into(), None),
            Ticket::available(RaffleId::new("other"), "01".into(), None),
        ];
        let (book, duplicates) = TicketBook::from_rows(rows);
        assert_eq!(duplicates, 1);
        assert_eq!(book.len(), 2);
    }
}
