use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceId;
use crate::errors::DomainError;
use crate::pricing::TermOption;

/// Proposal narrative template chosen by the rep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    Leads,
    Ecom,
}

/// Insights extracted from a sales call transcript. Sourced externally;
/// the proposal only carries them through to rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInsights {
    pub pain_points: Vec<String>,
    pub discussion_topics: Vec<String>,
    pub solutions: Vec<String>,
    pub summary: String,
}

/// Electronic signature captured when the customer accepts the proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub full_name: String,
    pub email: String,
    pub signed_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub agreed_to_terms: bool,
}

/// The selection inputs a rep submits. This is the only authoritative
/// state: pricing is recomputed from current rate tables on every view and
/// never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalConfig {
    pub slug: String,
    pub customer_name: String,
    pub company_name: String,
    pub template: Template,
    pub selected_services: Vec<ServiceId>,
    /// Ordered longest term first; the first entry renders as "best value".
    pub term_options: Vec<TermOption>,
    pub sales_rep_name: String,
    pub sales_rep_email: String,
    pub transcript_url: Option<String>,
    pub insights: Option<CallInsights>,
    pub business_context: Option<String>,
    pub custom_executive_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_locked: bool,
}

impl ProposalConfig {
    /// Input validation owed to the engine: the engine itself assumes
    /// pre-validated closed-set inputs and does not re-check these.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.selected_services.is_empty() {
            return Err(DomainError::EmptySelection);
        }
        if self.term_options.is_empty() {
            return Err(DomainError::InvariantViolation(
                "proposal must carry at least one term option".to_string(),
            ));
        }

        for option in &self.term_options {
            let percent = option.discount.percent;
            if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                return Err(DomainError::InvariantViolation(format!(
                    "discount percentage {percent} is outside 0..=100"
                )));
            }
            if option.discount.dollar < Decimal::ZERO {
                return Err(DomainError::InvariantViolation(
                    "dollar discount cannot be negative".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Stored proposal: the rep's configuration plus the signature record once
/// the customer has signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub config: ProposalConfig,
    pub signature: Option<SignatureRecord>,
}

impl Proposal {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}
