use std::str::FromStr;

use chrono::{Datelike, Timelike};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::super::domain::Receipt;
use super::super::validation::{parse_purchase_date, parse_purchase_time};
use super::ScoringError;

const ROUND_DOLLAR_POINTS: u64 = 50;
const QUARTER_MULTIPLE_POINTS: u64 = 25;
const ITEM_PAIR_POINTS: u64 = 5;
const ODD_DAY_POINTS: u64 = 6;
const AFTERNOON_POINTS: u64 = 10;
const AFTERNOON_START_HOUR: u32 = 14;
const AFTERNOON_END_HOUR: u32 = 16;
const DESCRIPTION_LENGTH_MULTIPLE: usize = 3;

/// The fixed reward rules, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsRule {
    RetailerLetters,
    RoundDollarTotal,
    QuarterMultipleTotal,
    ItemPairs,
    OddPurchaseDay,
    AfternoonPurchase,
    ItemDescriptionLength,
}

impl PointsRule {
    pub const ALL: [PointsRule; 7] = [
        PointsRule::RetailerLetters,
        PointsRule::RoundDollarTotal,
        PointsRule::QuarterMultipleTotal,
        PointsRule::ItemPairs,
        PointsRule::OddPurchaseDay,
        PointsRule::AfternoonPurchase,
        PointsRule::ItemDescriptionLength,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            PointsRule::RetailerLetters => "retailer letters",
            PointsRule::RoundDollarTotal => "round dollar total",
            PointsRule::QuarterMultipleTotal => "total multiple of 0.25",
            PointsRule::ItemPairs => "item pairs",
            PointsRule::OddPurchaseDay => "odd purchase day",
            PointsRule::AfternoonPurchase => "purchased 2pm-4pm",
            PointsRule::ItemDescriptionLength => "description length multiple of 3",
        }
    }

    pub(crate) fn apply(self, facts: &ReceiptFacts) -> Result<(u64, String), ScoringError> {
        let outcome = match self {
            PointsRule::RetailerLetters => {
                let letters = facts
                    .retailer
                    .chars()
                    .filter(char::is_ascii_alphabetic)
                    .count() as u64;
                (letters, format!("{letters} letter(s) in retailer name"))
            }
            PointsRule::RoundDollarTotal => {
                if facts.total.fract().is_zero() {
                    (ROUND_DOLLAR_POINTS, format!("total {} has no cents", facts.total))
                } else {
                    (0, String::new())
                }
            }
            PointsRule::QuarterMultipleTotal => {
                let remainder = facts
                    .total
                    .checked_rem(Decimal::new(25, 2))
                    .ok_or(ScoringError::Overflow)?;
                if remainder.is_zero() {
                    (
                        QUARTER_MULTIPLE_POINTS,
                        format!("total {} is a multiple of 0.25", facts.total),
                    )
                } else {
                    (0, String::new())
                }
            }
            PointsRule::ItemPairs => {
                let pairs = (facts.item_count / 2) as u64;
                (
                    ITEM_PAIR_POINTS * pairs,
                    format!("{pairs} pair(s) across {} item(s)", facts.item_count),
                )
            }
            PointsRule::OddPurchaseDay => {
                if facts.day % 2 == 1 {
                    (ODD_DAY_POINTS, format!("purchased on day {}", facts.day))
                } else {
                    (0, String::new())
                }
            }
            PointsRule::AfternoonPurchase => {
                if (AFTERNOON_START_HOUR..AFTERNOON_END_HOUR).contains(&facts.hour) {
                    (AFTERNOON_POINTS, format!("purchased at hour {}", facts.hour))
                } else {
                    (0, String::new())
                }
            }
            PointsRule::ItemDescriptionLength => {
                let mut points: u64 = 0;
                let mut matched = 0usize;
                for item in &facts.items {
                    if item.description_len % DESCRIPTION_LENGTH_MULTIPLE != 0 {
                        continue;
                    }
                    let bonus = item
                        .price
                        .checked_mul(Decimal::new(2, 1))
                        .ok_or(ScoringError::Overflow)?
                        .ceil()
                        .to_u64()
                        .ok_or(ScoringError::Overflow)?;
                    points = points.checked_add(bonus).ok_or(ScoringError::Overflow)?;
                    matched += 1;
                }
                (points, format!("{matched} item(s) with qualifying description"))
            }
        };
        Ok(outcome)
    }
}

pub(crate) struct ItemFacts {
    description_len: usize,
    price: Decimal,
}

/// Parsed view of a receipt shared by every rule.
pub(crate) struct ReceiptFacts<'a> {
    retailer: &'a str,
    total: Decimal,
    item_count: usize,
    day: u32,
    hour: u32,
    items: Vec<ItemFacts>,
}

impl<'a> ReceiptFacts<'a> {
    pub(crate) fn extract(receipt: &'a Receipt) -> Result<Self, ScoringError> {
        let total = parse_amount(&receipt.total)
            .ok_or_else(|| ScoringError::Total(receipt.total.clone()))?;

        let day = parse_purchase_date(&receipt.purchase_date)
            .ok_or_else(|| ScoringError::PurchaseDate(receipt.purchase_date.clone()))?
            .day();

        let hour = parse_purchase_time(&receipt.purchase_time)
            .ok_or_else(|| ScoringError::PurchaseTime(receipt.purchase_time.clone()))?
            .hour();

        let items = receipt
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let price = parse_amount(&item.price).ok_or_else(|| ScoringError::ItemPrice {
                    index,
                    value: item.price.clone(),
                })?;
                Ok(ItemFacts {
                    description_len: item.short_description.trim().chars().count(),
                    price,
                })
            })
            .collect::<Result<Vec<_>, ScoringError>>()?;

        Ok(Self {
            retailer: &receipt.retailer,
            total,
            item_count: receipt.items.len(),
            day,
            hour,
            items,
        })
    }
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .ok()
        .filter(|amount| !amount.is_sign_negative())
}
