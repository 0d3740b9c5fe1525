//! Number space generation.
//!
//! A raffle's tickets cover its modality's whole range exactly once. The
//! order is randomized with an unbiased Fisher–Yates shuffle; for
//! `ten_thousand` raffles the shuffled sequence is then laid out over the
//! printed sheets (10 letters × 100 blocks × 10 slots) in walk order, so the
//! number printed at a sheet position looks random.

use crate::types::{Modality, RaffleId, SheetPosition, Ticket};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Mutex, PoisonError};

/// Sheet letters in walk order
pub const SHEET_LETTERS: [char; 10] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];

/// Blocks per letter
pub const BLOCKS_PER_LETTER: usize = 100;

/// Slots per block
pub const SLOTS_PER_BLOCK: usize = 10;

/// Source of randomness for ticket shuffles
///
/// Injected through the environment so tests can shuffle deterministically.
pub trait NumberShuffler: Send + Sync {
    /// Permute `numbers` in place
    fn shuffle(&self, numbers: &mut [String]);
}

/// Shuffles with the thread-local generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngShuffler;

impl NumberShuffler for ThreadRngShuffler {
    fn shuffle(&self, numbers: &mut [String]) {
        fisher_yates(numbers, &mut rand::thread_rng());
    }
}

/// Shuffles with a seeded generator; the same seed gives the same sequence
#[derive(Debug)]
pub struct SeededShuffler {
    rng: Mutex<StdRng>,
}

impl SeededShuffler {
    /// Create from a seed
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl NumberShuffler for SeededShuffler {
    fn shuffle(&self, numbers: &mut [String]) {
        // A panic mid-shuffle leaves the generator usable.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        fisher_yates(numbers, &mut *rng);
    }
}

/// In-place Fisher–Yates shuffle
///
/// Walks from the last index down to 1, swapping each element with a
/// uniformly chosen index at or before it.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Every number of the modality, in ascending order
#[must_use]
pub fn ordered_numbers(modality: Modality) -> Vec<String> {
    (0..u64::from(modality.total_tickets()))
        .map(|value| modality.format_number(value))
        .collect()
}

/// Sheet position of the `ordinal`-th ticket in walk order
///
/// Returns `None` past the last slot of the last letter.
#[must_use]
pub fn sheet_position(ordinal: usize) -> Option<SheetPosition> {
    let per_letter = BLOCKS_PER_LETTER * SLOTS_PER_BLOCK;
    let letter = *SHEET_LETTERS.get(ordinal / per_letter)?;
    let within = ordinal % per_letter;
    Some(SheetPosition {
        group_letter: letter,
        block: u8::try_from(within / SLOTS_PER_BLOCK + 1).ok()?,
        index: u8::try_from(within % SLOTS_PER_BLOCK + 1).ok()?,
    })
}

/// Build the full, shuffled ticket set of a raffle
///
/// Every ticket is `available`. Only `ten_thousand` tickets get sheet
/// positions.
#[must_use]
pub fn generate_tickets(
    raffle_id: &RaffleId,
    modality: Modality,
    shuffler: &dyn NumberShuffler,
) -> Vec<Ticket> {
    let mut numbers = ordered_numbers(modality);
    shuffler.shuffle(&mut numbers);

    numbers
        .into_iter()
        .enumerate()
        .map(|(ordinal, number)| {
            let position = if modality.has_sheet_layout() {
                sheet_position(ordinal)
            } else {
                None
            };
            Ticket::available(raffle_id.clone(), number, position)
        })
        .collect()
}
