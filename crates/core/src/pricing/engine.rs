use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::service::{resolve_line_items, PricedItem, ServiceId};
use crate::errors::DomainError;
use crate::pricing::rates::RateBook;
use crate::pricing::terms::ContractTerm;

/// Percentage and/or fixed-dollar discount for one term option.
///
/// The percentage applies to the upfront total first, then the dollar
/// amount is subtracted from the result, clamped so the discounted upfront
/// total never goes below zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountSpec {
    #[serde(default)]
    pub percent: Decimal,
    #[serde(default)]
    pub dollar: Decimal,
}

impl DiscountSpec {
    pub fn percent(percent: Decimal) -> Self {
        Self { percent, dollar: Decimal::ZERO }
    }

    pub fn is_zero(&self) -> bool {
        self.percent.is_zero() && self.dollar.is_zero()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item: PricedItem,
    pub name: String,
    /// Advertised monthly rate, pre-discount.
    pub base_price: Decimal,
    /// Monthly rate after proportional discount scaling. Equals
    /// `base_price` when no discount applies.
    pub final_price: Decimal,
}

/// Full pricing output for one (services, term, discount) evaluation.
/// Consumed verbatim by the web view and document renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub lines: Vec<LineItem>,
    /// Sum of the advertised rates actually used per line: the combo rate
    /// when the collapse applies, never the sum of the two individual
    /// rates it replaced.
    pub subtotal: Decimal,
    /// Per-month display figure: what the monthly rate would have been
    /// without discount minus what it is with discount.
    pub discount_amount: Decimal,
    /// Monthly rate after discount.
    pub total: Decimal,
    /// What checkout will charge for the whole term. Undiscounted, this is
    /// the exact summed processor amount; discounted, it is derived from
    /// that amount with the discount applied.
    pub upfront_total: Decimal,
    pub term_months: u32,
    pub term: ContractTerm,
}

pub trait PricingEngine: Send + Sync {
    fn price(
        &self,
        services: &[ServiceId],
        term: ContractTerm,
        discount: &DiscountSpec,
    ) -> Result<PricingBreakdown, DomainError>;
}

/// Pure, deterministic engine over an injected [`RateBook`]. No I/O, no
/// shared mutable state; identical inputs yield identical output.
pub struct StandardPricingEngine {
    rates: RateBook,
}

impl StandardPricingEngine {
    pub fn new(rates: RateBook) -> Self {
        Self { rates }
    }
}

impl Default for StandardPricingEngine {
    fn default() -> Self {
        Self::new(RateBook::standard())
    }
}

impl PricingEngine for StandardPricingEngine {
    fn price(
        &self,
        services: &[ServiceId],
        term: ContractTerm,
        discount: &DiscountSpec,
    ) -> Result<PricingBreakdown, DomainError> {
        if services.is_empty() {
            return Err(DomainError::EmptySelection);
        }

        let months = Decimal::from(term.months());
        let mut lines = Vec::new();
        let mut subtotal = Decimal::ZERO;
        let mut base_upfront = Decimal::ZERO;

        for item in resolve_line_items(services) {
            let rate = self.rates.advertised_rate(item, term)?;
            // Processor truth anchors the charge; derive from the
            // advertised rate only when the term has no exact value.
            let upfront = self.rates.processor_upfront(item, term).unwrap_or(rate * months);
            subtotal += rate;
            base_upfront += upfront;
            lines.push(LineItem {
                item,
                name: item.display_name().to_string(),
                base_price: rate,
                final_price: rate,
            });
        }

        if discount.is_zero() {
            // Undiscounted proposals must match checkout to the cent, so
            // the summed processor amount is used as-is, never recomputed
            // via multiplication.
            return Ok(PricingBreakdown {
                lines,
                subtotal,
                discount_amount: Decimal::ZERO,
                total: subtotal,
                upfront_total: base_upfront,
                term_months: term.months(),
                term,
            });
        }

        let after_percent =
            base_upfront * (Decimal::ONE - discount.percent / Decimal::ONE_HUNDRED);
        let upfront_total = after_percent - discount.dollar.min(after_percent);
        let total = (upfront_total / months).round_dp(2);

        let ratio = if subtotal.is_zero() { Decimal::ZERO } else { total / subtotal };
        for line in &mut lines {
            line.final_price = (line.base_price * ratio).round_dp(2);
        }

        Ok(PricingBreakdown {
            lines,
            subtotal,
            discount_amount: subtotal - total,
            total,
            upfront_total,
            term_months: term.months(),
            term,
        })
    }
}
