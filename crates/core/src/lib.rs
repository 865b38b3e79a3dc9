pub mod checkout;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod token;

pub use checkout::{has_website_addon, CheckoutKey, CheckoutLinks};
pub use domain::proposal::{
    CallInsights, Proposal, ProposalConfig, SignatureRecord, Template,
};
pub use domain::service::{resolve_line_items, PricedItem, ServiceId};
pub use errors::{ApplicationError, DomainError};
pub use pricing::{
    price_term_options, ContractTerm, DiscountSpec, LineItem, PricingBreakdown, PricingEngine,
    RateBook, StandardPricingEngine, TermOption, TermQuote,
};
