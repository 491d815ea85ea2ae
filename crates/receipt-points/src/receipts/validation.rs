//! Admission gate for inbound receipts.
//!
//! Validation is exhaustive: every violation is collected so callers can fix a receipt in
//! one round trip. An empty list is the only acceptance signal.

use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

use super::domain::{Item, Receipt};

lazy_static! {
    /// ASCII word characters, ASCII whitespace, hyphen and ampersand.
    static ref TEXT_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_\t\n\f\r &-]+$").unwrap();

    /// Fixed-point amount with exactly two fractional digits. The integer part is capped so
    /// every admitted amount stays exact in the points arithmetic.
    static ref AMOUNT_PATTERN: Regex = Regex::new(r"^[0-9]{1,15}\.[0-9]{2}$").unwrap();

    static ref DATE_PATTERN: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();

    static ref TIME_PATTERN: Regex = Regex::new(r"^[0-9]{2}:[0-9]{2}(:[0-9]{2})?$").unwrap();
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Stable classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Retailer,
    PurchaseDate,
    PurchaseTime,
    Items,
    Total,
    ItemDescription,
    ItemPrice,
}

/// One rule violation, carrying the offending value for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("invalid receipt retailer: '{0}' is not a valid retailer")]
    Retailer(String),
    #[error("invalid receipt purchaseDate: '{0}' is not a valid purchaseDate")]
    PurchaseDate(String),
    #[error("invalid receipt purchaseTime: '{0}' is not a valid purchaseTime")]
    PurchaseTime(String),
    #[error("invalid receipt items: receipt does not contain any items")]
    NoItems,
    #[error("invalid receipt total: '{0}' is not a valid total")]
    Total(String),
    #[error("invalid receipt item shortDescription: '{value}' is not a valid shortDescription for item ({index})")]
    ItemDescription { index: usize, value: String },
    #[error("invalid receipt item price: '{value}' is not a valid price for item ({index})")]
    ItemPrice { index: usize, value: String },
}

impl ValidationFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            ValidationFailure::Retailer(_) => FailureKind::Retailer,
            ValidationFailure::PurchaseDate(_) => FailureKind::PurchaseDate,
            ValidationFailure::PurchaseTime(_) => FailureKind::PurchaseTime,
            ValidationFailure::NoItems => FailureKind::Items,
            ValidationFailure::Total(_) => FailureKind::Total,
            ValidationFailure::ItemDescription { .. } => FailureKind::ItemDescription,
            ValidationFailure::ItemPrice { .. } => FailureKind::ItemPrice,
        }
    }

    /// The rejected input, if the failure is tied to one.
    pub fn value(&self) -> Option<&str> {
        match self {
            ValidationFailure::Retailer(value)
            | ValidationFailure::PurchaseDate(value)
            | ValidationFailure::PurchaseTime(value)
            | ValidationFailure::Total(value)
            | ValidationFailure::ItemDescription { value, .. }
            | ValidationFailure::ItemPrice { value, .. } => Some(value),
            ValidationFailure::NoItems => None,
        }
    }
}

/// Returns every violation found in `receipt`; empty means the receipt may be admitted.
pub fn validate_receipt(receipt: &Receipt) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    if !is_valid_text(&receipt.retailer) {
        failures.push(ValidationFailure::Retailer(receipt.retailer.clone()));
    }

    if parse_purchase_date(&receipt.purchase_date).is_none() {
        failures.push(ValidationFailure::PurchaseDate(
            receipt.purchase_date.clone(),
        ));
    }

    if parse_purchase_time(&receipt.purchase_time).is_none() {
        failures.push(ValidationFailure::PurchaseTime(
            receipt.purchase_time.clone(),
        ));
    }

    if receipt.items.is_empty() {
        failures.push(ValidationFailure::NoItems);
    }

    if !is_valid_amount(&receipt.total) {
        failures.push(ValidationFailure::Total(receipt.total.clone()));
    }

    for (index, item) in receipt.items.iter().enumerate() {
        validate_item(index, item, &mut failures);
    }

    failures
}

fn validate_item(index: usize, item: &Item, failures: &mut Vec<ValidationFailure>) {
    if !is_valid_text(&item.short_description) {
        failures.push(ValidationFailure::ItemDescription {
            index,
            value: item.short_description.clone(),
        });
    }

    if !is_valid_amount(&item.price) {
        failures.push(ValidationFailure::ItemPrice {
            index,
            value: item.price.clone(),
        });
    }
}

// Whitespace-only text matches the character class but would score as a zero-length
// description, so it is rejected too.
fn is_valid_text(value: &str) -> bool {
    TEXT_PATTERN.is_match(value) && !value.trim().is_empty()
}

fn is_valid_amount(value: &str) -> bool {
    AMOUNT_PATTERN.is_match(value)
}

pub(crate) fn parse_purchase_date(value: &str) -> Option<NaiveDate> {
    if !DATE_PATTERN.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub(crate) fn parse_purchase_time(value: &str) -> Option<NaiveTime> {
    if !TIME_PATTERN.is_match(value) {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}
