pub mod engine;
pub mod rates;
pub mod terms;

use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceId;
use crate::errors::DomainError;

pub use self::engine::{
    DiscountSpec, LineItem, PricingBreakdown, PricingEngine, StandardPricingEngine,
};
pub use self::rates::RateBook;
pub use self::terms::ContractTerm;

/// One selectable commitment length with its own discount parameters.
/// Proposals carry one or many of these, ordered longest term first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermOption {
    pub term: ContractTerm,
    #[serde(default)]
    pub discount: DiscountSpec,
}

impl TermOption {
    pub fn undiscounted(term: ContractTerm) -> Self {
        Self { term, discount: DiscountSpec::default() }
    }
}

/// A term option paired with its computed breakdown, one tier of the
/// side-by-side pricing comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermQuote {
    pub option: TermOption,
    pub breakdown: PricingBreakdown,
}

/// Price every term option independently, preserving input order. Which
/// tier is "best value" and any inter-term savings copy are presentation
/// decisions left to the renderer.
pub fn price_term_options(
    engine: &dyn PricingEngine,
    services: &[ServiceId],
    options: &[TermOption],
) -> Result<Vec<TermQuote>, DomainError> {
    options
        .iter()
        .map(|option| {
            let breakdown = engine.price(services, option.term, &option.discount)?;
            Ok(TermQuote { option: option.clone(), breakdown })
        })
        .collect()
}
