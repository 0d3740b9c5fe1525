//! Free-text ticket selections such as `"1,2,3"` or `"1-10,20-30"`.
//!
//! The parser only expands text into zero-padded numbers. Whether a number
//! exists or is available is decided by the allocation step that consumes
//! the list.

use crate::types::Modality;

/// Expanded numbers plus the tokens that could not be read
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedSelection {
    /// Zero-padded numbers in input order
    pub numbers: Vec<String>,
    /// Malformed tokens, trimmed
    pub rejected: Vec<String>,
}

impl ParsedSelection {
    /// Nothing usable and nothing malformed: the text was blank
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.numbers.is_empty() && self.rejected.is_empty()
    }
}

/// Expand `text` for a raffle of `modality`
///
/// Comma-separated tokens are either a single number or an inclusive
/// `start-end` range with `start <= end`. Anything else is rejected without
/// affecting the other tokens. Ranges are clamped to the modality's last
/// number; values beyond it could never match a ticket.
#[must_use]
pub fn parse_selection(text: &str, modality: Modality) -> ParsedSelection {
    let last = u64::from(modality.total_tickets()) - 1;
    let mut parsed = ParsedSelection::default();

    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_token(token) {
            Some(Token::Single(value)) => parsed.numbers.push(modality.format_number(value)),
            Some(Token::Range(start, end)) => {
                if start <= last {
                    parsed
                        .numbers
                        .extend((start..=end.min(last)).map(|value| modality.format_number(value)));
                }
            }
            None => parsed.rejected.push(token.to_string()),
        }
    }

    parsed
}

enum Token {
    Single(u64),
    Range(u64, u64),
}

fn parse_token(token: &str) -> Option<Token> {
    match token.split_once('-') {
        None => token.parse().ok().map(Token::Single),
        Some((start, end)) => {
            let start: u64 = start.trim().parse().ok()?;
            let end: u64 = end.trim().parse().ok()?;
            (start <= end).then_some(Token::Range(start, end))
        }
    }
}
