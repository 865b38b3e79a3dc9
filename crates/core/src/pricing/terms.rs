use serde::{Deserialize, Serialize};

/// Contract commitment length. The set is closed; every term has a fixed
/// duration in months and a customer-facing display name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractTerm {
    Annual,
    BiAnnual,
    Quarterly,
    Monthly,
}

impl ContractTerm {
    /// Longest term first, matching how tiers are presented.
    pub const ALL: [ContractTerm; 4] =
        [ContractTerm::Annual, ContractTerm::BiAnnual, ContractTerm::Quarterly, ContractTerm::Monthly];

    pub fn months(self) -> u32 {
        match self {
            ContractTerm::Annual => 12,
            ContractTerm::BiAnnual => 6,
            ContractTerm::Quarterly => 3,
            ContractTerm::Monthly => 1,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ContractTerm::Annual => "Annual",
            ContractTerm::BiAnnual => "Bi-Annual",
            ContractTerm::Quarterly => "Quarterly",
            ContractTerm::Monthly => "Monthly",
        }
    }
}
