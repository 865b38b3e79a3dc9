use thiserror::Error;

use crate::domain::service::PricedItem;
use crate::pricing::terms::ContractTerm;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A (item, term) pair absent from the advertised rate table. The
    /// tables must be complete for valid closed-enum inputs, so this is a
    /// configuration defect and must never default to zero.
    #[error("no advertised rate configured for {item:?} at term {term:?}")]
    MissingRate { item: PricedItem, term: ContractTerm },
    #[error("proposal must select at least one service")]
    EmptySelection,
    #[error("proposal is locked and can no longer be changed")]
    ProposalLocked,
    #[error("could not decode share token: {0}")]
    TokenDecode(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}
