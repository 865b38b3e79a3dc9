pub mod proposal;

use async_trait::async_trait;
use propel_core::{Proposal, ProposalConfig, SignatureRecord};
use thiserror::Error;

pub use proposal::SqlProposalRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored payload could not be decoded: {0}")]
    Corrupt(String),
    #[error("no proposal found for slug `{slug}`")]
    NotFound { slug: String },
    #[error("proposal `{slug}` is locked and can no longer be changed")]
    Locked { slug: String },
}

#[async_trait]
pub trait ProposalRepository: Send + Sync {
    async fn create(&self, config: &ProposalConfig) -> Result<(), RepositoryError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Proposal>, RepositoryError>;
    /// Record the customer signature and lock the proposal in one
    /// transaction. Signing a locked proposal is rejected.
    async fn sign(&self, slug: &str, signature: &SignatureRecord) -> Result<(), RepositoryError>;
}
