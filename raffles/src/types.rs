//! Domain types for the raffle engine.
//!
//! Value objects (identifiers, money, commission rates, modalities), the four
//! persisted entities (raffles, tickets, resellers, sales), command payloads,
//! and the structured reports every mutation returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier text
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a raffle, chosen by the caller at creation time
    RaffleId
);

string_id!(
    /// Identifier of a reseller, generated when the reseller is added
    ResellerId
);

string_id!(
    /// Identifier of a sale record
    SaleId
);

// ============================================================================
// Value Objects
// ============================================================================

/// Money in the smallest currency unit (centavos)
///
/// Serialized as an integer number of cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole reais, saturating on overflow
    #[must_use]
    pub const fn from_reais(reais: u64) -> Self {
        Self(reais.saturating_mul(100))
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two amounts, saturating at the maximum
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts, returning zero instead of a negative amount
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiplies by a ticket count, saturating at the maximum
    #[must_use]
    pub const fn times(self, count: u64) -> Self {
        Self(self.0.saturating_mul(count))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Reseller commission rate, stored in basis points (1/100 of a percent)
///
/// Always within 0..=100%.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// Basis points in 100%
    pub const FULL: u32 = 10_000;

    /// Create from whole percent (0..=100)
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::InvalidCommissionRate`] above 100%.
    ///
    /// [`RaffleError::InvalidCommissionRate`]: crate::error::RaffleError::InvalidCommissionRate
    pub fn from_percent(percent: u32) -> crate::error::Result<Self> {
        Self::from_basis_points(percent.saturating_mul(100))
    }

    /// Create from basis points (0..=10000)
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::InvalidCommissionRate`] above 10000.
    ///
    /// [`RaffleError::InvalidCommissionRate`]: crate::error::RaffleError::InvalidCommissionRate
    pub fn from_basis_points(bps: u32) -> crate::error::Result<Self> {
        if bps > Self::FULL {
            return Err(crate::error::RaffleError::InvalidCommissionRate(bps));
        }
        Ok(Self(bps))
    }

    /// The rate in basis points
    #[must_use]
    pub const fn basis_points(&self) -> u32 {
        self.0
    }

    /// Commission on `amount`, rounded half-up to the cent
    #[must_use]
    pub fn commission_on(&self, amount: Money) -> Money {
        round_basis_points(u128::from(amount.cents()) * u128::from(self.0))
    }
}

/// Convert an exact amount in cent-basis-points to money, rounding half-up
#[must_use]
pub(crate) fn round_basis_points(cent_bps: u128) -> Money {
    let full = u128::from(CommissionRate::FULL);
    let cents = (cent_bps + full / 2) / full;
    Money::from_cents(u64::try_from(cents).unwrap_or(u64::MAX))
}

impl TryFrom<u32> for CommissionRate {
    type Error = crate::error::RaffleError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Self::from_basis_points(bps)
    }
}

impl From<CommissionRate> for u32 {
    fn from(rate: CommissionRate) -> Self {
        rate.0
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Size class of a raffle's number space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// 100 tickets, "00" to "99"
    Hundred,
    /// 1,000 tickets, "000" to "999"
    Thousand,
    /// 10,000 tickets, "0000" to "9999", laid out on lettered sheets
    TenThousand,
}

impl Modality {
    /// Number of tickets in the number space
    #[must_use]
    pub const fn total_tickets(self) -> u32 {
        match self {
            Self::Hundred => 100,
            Self::Thousand => 1_000,
            Self::TenThousand => 10_000,
        }
    }

    /// Digits in a ticket number
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Hundred => 2,
            Self::Thousand => 3,
            Self::TenThousand => 4,
        }
    }

    /// Whether tickets carry letter/block/index coordinates
    #[must_use]
    pub const fn has_sheet_layout(self) -> bool {
        matches!(self, Self::TenThousand)
    }

    /// Zero-pad `value` to this modality's width
    ///
    /// Values outside the number space are padded but never match a ticket.
    #[must_use]
    pub fn format_number(self, value: u64) -> String {
        format!("{value:0width$}", width = self.width())
    }

    /// Canonical ticket number for caller input such as `"7"`, `" 007 "` or
    /// `"0005"`
    ///
    /// Values inside the number space are re-padded to this modality's width
    /// whatever their leading zeros. Values outside it come back unchanged so
    /// they can be reported as unknown. Returns `None` for non-numeric text.
    #[must_use]
    pub fn normalize_number(self, input: &str) -> Option<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let canonical = trimmed
            .parse::<u64>()
            .ok()
            .filter(|value| *value < u64::from(self.total_tickets()))
            .map(|value| self.format_number(value));
        Some(canonical.unwrap_or_else(|| trimmed.to_string()))
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hundred => "hundred",
            Self::Thousand => "thousand",
            Self::TenThousand => "ten_thousand",
        })
    }
}

/// Raffle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaffleStatus {
    /// Selling
    #[default]
    Active,
    /// Sales closed
    Closed,
    /// Not yet published
    Draft,
}

/// Ticket status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Free to reserve or sell
    Available,
    /// Held against a reseller, not yet paid
    Reserved,
    /// Sold (terminal in practice)
    Sold,
    /// Withheld by an administrator
    Blocked,
}

impl TicketStatus {
    /// Whether a ticket in this status may carry a reseller reference
    #[must_use]
    pub const fn holds_reseller(self) -> bool {
        matches!(self, Self::Reserved | Self::Sold)
    }

    /// Lowercase label used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status of a sale
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment
    Pending,
    /// Paid at the counter or confirmed
    #[default]
    Paid,
}

// ============================================================================
// Entities
// ============================================================================

/// Optional presentation metadata of a raffle
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleDetails {
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Main image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Second image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image2_url: Option<String>,
    /// Third image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image3_url: Option<String>,
    /// What the proceeds fund
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Prize description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize: Option<String>,
    /// Regulation text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation: Option<String>,
    /// Background used on printed tickets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_background_url: Option<String>,
}

/// A raffle campaign
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Raffle {
    /// Identifier
    pub id: RaffleId,
    /// Title shown to buyers
    pub title: String,
    /// Price of one ticket
    pub price: Money,
    /// Number space
    pub modality: Modality,
    /// Draw date
    pub draw_date: DateTime<Utc>,
    /// Status
    pub status: RaffleStatus,
    /// When the raffle was created
    pub created_at: DateTime<Utc>,
    /// Optional metadata
    #[serde(flatten)]
    pub details: RaffleDetails,
}

impl Raffle {
    /// Ticket count, always derived from the modality
    #[must_use]
    pub const fn total_tickets(&self) -> u32 {
        self.modality.total_tickets()
    }
}

/// Letter/block/index position of a ticket on the printed sheets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPosition {
    /// Sheet letter, `A` to `J`
    pub group_letter: char,
    /// Block within the letter, 1 to 100
    pub block: u8,
    /// Slot within the block, 1 to 10
    pub index: u8,
}

/// One numbered ticket of a raffle
///
/// Identity is the pair (`raffle_id`, `number`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Owning raffle
    pub raffle_id: RaffleId,
    /// Zero-padded number
    pub number: String,
    /// Current status
    pub status: TicketStatus,
    /// Sheet coordinates (`ten_thousand` only)
    #[serde(flatten)]
    pub position: Option<SheetPosition>,
    /// Reseller holding or having sold the ticket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reseller_id: Option<ResellerId>,
    /// Buyer name (sold tickets)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    /// Buyer phone (sold tickets)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_phone: Option<String>,
    /// When the ticket was last reserved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_at: Option<DateTime<Utc>>,
    /// The reseller of this sold ticket has been deleted
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reseller_deleted: bool,
}

impl Ticket {
    /// A fresh, available ticket
    #[must_use]
    pub const fn available(raffle_id: RaffleId, number: String, position: Option<SheetPosition>) -> Self {
        Self {
            raffle_id,
            number,
            status: TicketStatus::Available,
            position,
            reseller_id: None,
            buyer_name: None,
            buyer_phone: None,
            reserved_at: None,
            reseller_deleted: false,
        }
    }

    /// Whether the ticket is reserved by `reseller_id`
    #[must_use]
    pub fn is_reserved_by(&self, reseller_id: &ResellerId) -> bool {
        self.status == TicketStatus::Reserved && self.reseller_id.as_ref() == Some(reseller_id)
    }
}

/// A reseller selling tickets on commission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reseller {
    /// Identifier
    pub id: ResellerId,
    /// Display name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// PIX key for payouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    /// Commission rate
    #[serde(rename = "commissionRateBps")]
    pub commission_rate: CommissionRate,
    /// Cumulative value of every sale attributed to this reseller
    pub total_sales: Money,
    /// Amount the reseller has already paid in
    pub balance: Money,
}

/// A recorded sale
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Identifier
    pub id: SaleId,
    /// Raffle the tickets belong to
    pub raffle_id: RaffleId,
    /// Numbers sold in this transaction
    pub ticket_numbers: Vec<String>,
    /// Ticket count times the raffle price at the time of sale
    pub total_amount: Money,
    /// Buyer name
    pub buyer_name: String,
    /// Buyer phone
    pub buyer_phone: String,
    /// Attributed reseller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reseller_id: Option<ResellerId>,
    /// When the sale was recorded
    pub created_at: DateTime<Utc>,
    /// Payment status
    pub payment_status: PaymentStatus,
    /// Caller-supplied deduplication key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

// ============================================================================
// Command Payloads
// ============================================================================

/// Input for creating a raffle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRaffle {
    /// Identifier chosen by the caller
    pub id: RaffleId,
    /// Title, must not be blank
    pub title: String,
    /// Ticket price, must be positive
    pub price: Money,
    /// Number space
    pub modality: Modality,
    /// Draw date
    pub draw_date: DateTime<Utc>,
    /// Initial status
    pub status: RaffleStatus,
    /// Optional metadata
    pub details: RaffleDetails,
}

impl NewRaffle {
    /// An active raffle with no optional metadata
    #[must_use]
    pub fn new(
        id: impl Into<RaffleId>,
        title: impl Into<String>,
        price: Money,
        modality: Modality,
        draw_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            modality,
            draw_date,
            status: RaffleStatus::Active,
            details: RaffleDetails::default(),
        }
    }

    /// Attach optional metadata
    #[must_use]
    pub fn with_details(mut self, details: RaffleDetails) -> Self {
        self.details = details;
        self
    }
}

/// Partial update of a raffle; `None` leaves a field unchanged
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RafflePatch {
    /// New title
    pub title: Option<String>,
    /// New price (protected once tickets are reserved or sold)
    pub price: Option<Money>,
    /// New modality (protected; otherwise regenerates tickets)
    pub modality: Option<Modality>,
    /// New draw date
    pub draw_date: Option<DateTime<Utc>>,
    /// New status
    pub status: Option<RaffleStatus>,
    /// Replacement metadata
    pub details: Option<RaffleDetails>,
}

/// Input for adding a reseller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewReseller {
    /// Display name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// PIX key
    pub pix_key: Option<String>,
    /// Commission rate
    pub commission_rate: CommissionRate,
}

impl NewReseller {
    /// Reseller with a name and rate; no phone or PIX key
    #[must_use]
    pub fn new(name: impl Into<String>, commission_rate: CommissionRate) -> Self {
        Self {
            name: name.into(),
            phone: String::new(),
            pix_key: None,
            commission_rate,
        }
    }

    /// Set the contact phone
    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}

/// Partial update of a reseller; `None` leaves a field unchanged
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResellerPatch {
    /// New name
    pub name: Option<String>,
    /// New phone
    pub phone: Option<String>,
    /// New PIX key
    pub pix_key: Option<String>,
    /// New commission rate
    pub commission_rate: Option<CommissionRate>,
}

/// Buyer and payment details of a sale
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleDetails {
    /// Buyer name
    pub buyer_name: String,
    /// Buyer phone
    pub buyer_phone: String,
    /// Reseller credited with the sale
    pub reseller_id: Option<ResellerId>,
    /// Payment status
    pub payment_status: PaymentStatus,
    /// Retries carrying the same key record only one sale
    pub idempotency_key: Option<String>,
}

impl SaleDetails {
    /// Name used when the buyer is not identified
    pub const COUNTER_BUYER: &'static str = "Cliente Balcão";

    /// Set the buyer
    #[must_use]
    pub fn buyer(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.buyer_name = name.into();
        self.buyer_phone = phone.into();
        self
    }

    /// Credit the sale to a reseller
    #[must_use]
    pub fn via_reseller(mut self, reseller_id: ResellerId) -> Self {
        self.reseller_id = Some(reseller_id);
        self
    }

    /// Record the sale as awaiting payment
    #[must_use]
    pub fn pending(mut self) -> Self {
        self.payment_status = PaymentStatus::Pending;
        self
    }

    /// Attach an idempotency key
    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

impl Default for SaleDetails {
    fn default() -> Self {
        Self {
            buyer_name: Self::COUNTER_BUYER.to_string(),
            buyer_phone: String::new(),
            reseller_id: None,
            payment_status: PaymentStatus::Paid,
            idempotency_key: None,
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Result of a ticket generation request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Tickets created by this call
    pub generated: usize,
    /// The raffle already had tickets; nothing was done
    pub already_generated: bool,
}

/// Result of a raffle update
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Protected fields removed from the patch because tickets are committed
    pub dropped_fields: Vec<ProtectedField>,
    /// The modality changed and the ticket set was rebuilt
    pub regenerated: bool,
}

/// Raffle fields frozen once any ticket is reserved or sold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtectedField {
    /// Ticket price
    Price,
    /// Number space (and therefore total ticket count)
    Modality,
}

/// Result of a bulk status overwrite or sale
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionReport {
    /// Numbers whose ticket was changed
    pub applied: Vec<String>,
    /// Numbers with no ticket in the raffle, or repeated
    pub skipped: Vec<String>,
    /// Sale recorded for this call
    pub sale_id: Option<SaleId>,
    /// The idempotency key was already used; nothing changed
    pub replayed: bool,
}

/// Result of a guarded bulk allocation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocationReport {
    /// Numbers whose ticket changed
    pub applied: Vec<String>,
    /// Numbers whose ticket did not qualify or does not exist
    pub skipped: Vec<String>,
    /// Input tokens that could not be parsed as numbers or ranges
    pub rejected: Vec<String>,
}

impl AllocationReport {
    /// Report where every number was skipped
    #[must_use]
    pub fn all_skipped(numbers: Vec<String>) -> Self {
        Self {
            skipped: numbers,
            ..Self::default()
        }
    }
}

/// Result of a safe reseller deletion
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Reserved tickets returned to `available`
    pub released: usize,
    /// Sold tickets flagged `reseller_deleted`
    pub flagged: usize,
}

/// Financial summary of one raffle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStats {
    /// Every ticket sold at the current price
    pub total_potential_value: Money,
    /// Tickets sold
    pub sold_count: u32,
    /// Tickets reserved
    pub reserved_count: u32,
    /// `sold_count` times the price
    pub total_sales_value: Money,
    /// Commissions owed on reseller-attributed sold tickets
    pub total_commissions: Money,
    /// Sales value minus commissions
    pub estimated_profit: Money,
}

/// What a reseller owes
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResellerStatement {
    /// Reseller
    pub reseller_id: ResellerId,
    /// Reseller name
    pub name: String,
    /// Cumulative sales
    pub total_sales: Money,
    /// Commission at the current rate
    pub commission: Money,
    /// Sales minus commission
    pub net_payable: Money,
    /// Already paid in
    pub settled: Money,
    /// Still owed
    pub outstanding: Money,
}

/// A reseller's tickets in one raffle
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResellerAllocation {
    /// Raffle
    pub raffle_id: RaffleId,
    /// Tickets referencing the reseller
    pub total: u32,
    /// Of which reserved
    pub reserved: u32,
    /// Of which sold
    pub sold: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn modality_drives_width_and_total() {
        assert_eq!(Modality::Hundred.total_tickets(), 100);
        assert_eq!(Modality::TenThousand.width(), 4);
        assert_eq!(Modality::Thousand.format_number(7), "007");
    }

    #[test]
    fn normalize_pads_short_input_and_rejects_text() {
        assert_eq!(Modality::Thousand.normalize_number(" 7 "), Some("007".to_string()));
        assert_eq!(Modality::Hundred.normalize_number("05"), Some("05".to_string()));
        assert_eq!(Modality::Hundred.normalize_number("abc"), None);
        assert_eq!(Modality::Hundred.normalize_number(""), None);
    }

    #[test]
    fn normalize_strips_extra_leading_zeros_inside_the_range() {
        assert_eq!(Modality::Thousand.normalize_number("0005"), Some("005".to_string()));
        assert_eq!(Modality::Hundred.normalize_number("000"), Some("00".to_string()));
        assert_eq!(Modality::Hundred.normalize_number("100"), Some("100".to_string()));
        assert_eq!(
            Modality::TenThousand.normalize_number("99999999999999999999"),
            Some("99999999999999999999".to_string())
        );
    }

    #[test]
    fn commission_rate_bounds() {
        assert!(CommissionRate::from_percent(100).is_ok());
        assert!(CommissionRate::from_percent(101).is_err());
        assert_eq!(CommissionRate::from_basis_points(750).unwrap().to_string(), "7.50%");
    }

    #[test]
    fn commission_rounds_half_up() {
        let rate = CommissionRate::from_basis_points(750).unwrap();
        // 7.5% of 0.10 is 0.0075
        assert_eq!(rate.commission_on(Money::from_cents(10)), Money::from_cents(1));
        assert_eq!(rate.commission_on(Money::from_cents(6)), Money::ZERO);
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(1005).to_string(), "R$ 10.05");
    }

    #[test]
    fn ticket_serializes_camel_case_with_flattened_position() {
        let mut ticket = Ticket::available(
            RaffleId::new("r"),
            "0042".to_string(),
            Some(SheetPosition {
                group_letter: 'B',
                block: 3,
                index: 7,
            }),
        );
        ticket.reseller_id = Some(ResellerId::new("x"));
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["raffleId"], "r");
        assert_eq!(json["groupLetter"], "B");
        assert_eq!(json["block"], 3);
        assert_eq!(json["resellerId"], "x");
        assert!(json.get("resellerDeleted").is_none());

        let back: Ticket = serde_json::from_value(json).unwrap();
        assert_eq!(back, ticket);
    }

    #[test]
    fn ticket_without_position_deserializes() {
        let json = serde_json::json!({"raffleId": "r", "number": "01", "status": "available"});
        let ticket: Ticket = serde_json::from_value(json).unwrap();
        assert_eq!(ticket.position, None);
        assert!(!ticket.reseller_deleted);
    }

    #[test]
    fn commission_rate_deserialization_is_validated() {
        assert!(serde_json::from_str::<CommissionRate>("10001").is_err());
        assert_eq!(
            serde_json::from_str::<CommissionRate>("1000").unwrap(),
            CommissionRate::from_percent(10).unwrap()
        );
    }

    #[test]
    fn sale_details_defaults_to_counter_buyer() {
        let details = SaleDetails::default();
        assert_eq!(details.buyer_name, "Cliente Balcão");
        assert_eq!(details.payment_status, PaymentStatus::Paid);
    }
}
