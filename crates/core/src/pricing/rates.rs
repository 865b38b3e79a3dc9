use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::service::PricedItem;
use crate::errors::DomainError;
use crate::pricing::terms::ContractTerm;

/// Immutable rate configuration injected into the pricing engine.
///
/// Two parallel tables keyed by (item, term):
/// - advertised monthly list prices, required for every pair;
/// - exact processor upfront totals, optional per pair. These are the
///   amounts the payment processor actually charges and are the
///   reconciliation anchor for undiscounted proposals. Absent means "no
///   exact value for this term", never zero.
#[derive(Clone, Debug, Default)]
pub struct RateBook {
    advertised: HashMap<(PricedItem, ContractTerm), Decimal>,
    processor_upfront: HashMap<(PricedItem, ContractTerm), Decimal>,
}

impl RateBook {
    pub fn new(
        advertised: HashMap<(PricedItem, ContractTerm), Decimal>,
        processor_upfront: HashMap<(PricedItem, ContractTerm), Decimal>,
    ) -> Self {
        Self { advertised, processor_upfront }
    }

    /// Marketing-facing monthly list price. A miss is a configuration
    /// defect: the tables must be complete for the closed enums, and a
    /// silent zero would corrupt a financial computation.
    pub fn advertised_rate(
        &self,
        item: PricedItem,
        term: ContractTerm,
    ) -> Result<Decimal, DomainError> {
        self.advertised
            .get(&(item, term))
            .copied()
            .ok_or(DomainError::MissingRate { item, term })
    }

    /// Exact upfront total the processor charges for this (item, term).
    pub fn processor_upfront(&self, item: PricedItem, term: ContractTerm) -> Option<Decimal> {
        self.processor_upfront.get(&(item, term)).copied()
    }

    /// Contractual price points mirrored from the processor's configured
    /// products. Whole dollars; do not edit without updating checkout.
    pub fn standard() -> Self {
        let mut advertised = HashMap::new();
        let mut processor_upfront = HashMap::new();

        // (item, monthly, quarterly, bi_annual, annual)
        let advertised_rows: [(PricedItem, i64, i64, i64, i64); 4] = [
            (PricedItem::Seo, 999, 849, 749, 699),
            (PricedItem::PaidAds, 1999, 1699, 1499, 1399),
            (PricedItem::SeoPaidCombo, 2998, 2548, 2249, 2099),
            (PricedItem::Website, 399, 339, 299, 279),
        ];
        let upfront_rows: [(PricedItem, i64, i64, i64, i64); 4] = [
            (PricedItem::Seo, 999, 2547, 4496, 8399),
            (PricedItem::PaidAds, 1999, 5097, 8996, 16800),
            (PricedItem::SeoPaidCombo, 2998, 7645, 13491, 25200),
            (PricedItem::Website, 399, 1017, 1796, 3348),
        ];

        for (item, monthly, quarterly, bi_annual, annual) in advertised_rows {
            insert_row(&mut advertised, item, monthly, quarterly, bi_annual, annual);
        }
        for (item, monthly, quarterly, bi_annual, annual) in upfront_rows {
            insert_row(&mut processor_upfront, item, monthly, quarterly, bi_annual, annual);
        }

        Self { advertised, processor_upfront }
    }
}

fn insert_row(
    table: &mut HashMap<(PricedItem, ContractTerm), Decimal>,
    item: PricedItem,
    monthly: i64,
    quarterly: i64,
    bi_annual: i64,
    annual: i64,
) {
    table.insert((item, ContractTerm::Monthly), Decimal::from(monthly));
    table.insert((item, ContractTerm::Quarterly), Decimal::from(quarterly));
    table.insert((item, ContractTerm::BiAnnual), Decimal::from(bi_annual));
    table.insert((item, ContractTerm::Annual), Decimal::from(annual));
}
