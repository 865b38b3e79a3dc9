//! Checkout link resolution for fulfilled service combinations.
//!
//! The link table is external configuration mirrored from the payment
//! processor: one absolute URL per (term, combination) pair. Website is
//! always an add-on chosen on the checkout page itself, so it never
//! appears in a key; a website-only selection has no standalone link.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceId;
use crate::pricing::terms::ContractTerm;

/// The service combinations that have their own checkout products.
/// Derivation mirrors the pricing combo collapse: both qualifying services
/// map to the combined key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutKey {
    Seo,
    PaidAds,
    SeoPaidAds,
}

impl CheckoutKey {
    pub fn for_services(services: &[ServiceId]) -> Option<Self> {
        let has_seo = services.contains(&ServiceId::Seo);
        let has_paid_ads = services.contains(&ServiceId::PaidAds);

        match (has_seo, has_paid_ads) {
            (true, true) => Some(CheckoutKey::SeoPaidAds),
            (true, false) => Some(CheckoutKey::Seo),
            (false, true) => Some(CheckoutKey::PaidAds),
            (false, false) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CheckoutLinks {
    links: HashMap<(ContractTerm, CheckoutKey), String>,
}

impl CheckoutLinks {
    pub fn new(links: HashMap<(ContractTerm, CheckoutKey), String>) -> Self {
        Self { links }
    }

    /// Resolve the checkout URL for a selection and term. `None` when the
    /// term has no entries in the current table revision or the selection
    /// has no standalone checkout product.
    pub fn resolve(&self, services: &[ServiceId], term: ContractTerm) -> Option<&str> {
        let key = CheckoutKey::for_services(services)?;
        self.links.get(&(term, key)).map(String::as_str)
    }

    /// Hosted payment links configured on the processor side.
    pub fn standard() -> Self {
        let rows: [(ContractTerm, CheckoutKey, &str); 12] = [
            (
                ContractTerm::Monthly,
                CheckoutKey::Seo,
                "https://buy.stripe.com/4gw8x67exbnH85G7sR?client_reference_id=049e965d-8d5d-4c2a-929c-80a6796ab5ad",
            ),
            (
                ContractTerm::Monthly,
                CheckoutKey::PaidAds,
                "https://buy.stripe.com/3cs3cM7ex1N7dq0bJe?client_reference_id=8d4dd8c3-0d6a-47e3-8730-c7b3d2846303",
            ),
            (
                ContractTerm::Monthly,
                CheckoutKey::SeoPaidAds,
                "https://buy.stripe.com/cN28x61UdbnH5Xy3cM?client_reference_id=8ffaf857-c886-4d3c-bd7c-b1de9e85baba",
            ),
            (
                ContractTerm::Quarterly,
                CheckoutKey::Seo,
                "https://buy.stripe.com/fZufZh4xB1QleSv5fFbbG12?client_reference_id=b168e221-e541-4947-b3b7-6b7d244b0ba3",
            ),
            (
                ContractTerm::Quarterly,
                CheckoutKey::PaidAds,
                "https://buy.stripe.com/6oU28r3txeD75hV9vVbbG15?client_reference_id=42437bbf-67f8-4c1b-bc02-aebebf4d0c53",
            ),
            (
                ContractTerm::Quarterly,
                CheckoutKey::SeoPaidAds,
                "https://buy.stripe.com/bJeaEXc038eJ6lZ6jJbbG1b?client_reference_id=86908001-bd45-4895-8cee-826e5b1f2100",
            ),
            (
                ContractTerm::BiAnnual,
                CheckoutKey::Seo,
                "https://buy.stripe.com/14A7sLe8bcuZaCf5fFbbG14?client_reference_id=2a1c6a5a-1a69-4c29-8d63-a82442d5c450",
            ),
            (
                ContractTerm::BiAnnual,
                CheckoutKey::PaidAds,
                "https://buy.stripe.com/eVq14n9RVfHbfWzbE3bbG16?client_reference_id=3f62006e-613f-4842-8990-255b785c5acd",
            ),
            (
                ContractTerm::BiAnnual,
                CheckoutKey::SeoPaidAds,
                "https://buy.stripe.com/eVq8wP3tx7aF5hVfUjbbG1a?client_reference_id=2b21104b-e235-4bf2-9040-ab1069660ebd",
            ),
            (
                ContractTerm::Annual,
                CheckoutKey::Seo,
                "https://buy.stripe.com/eVq7sL2pt2UpbGjbE3bbG1C?client_reference_id=93c22364-d3a4-48fd-ac66-d674097f8f6c",
            ),
            (
                ContractTerm::Annual,
                CheckoutKey::PaidAds,
                "https://buy.stripe.com/28EfZh0hlfHbaCfeQfbbG1D?client_reference_id=9f5f0a70-4133-4137-9d75-b9bff2b266dd",
            ),
            (
                ContractTerm::Annual,
                CheckoutKey::SeoPaidAds,
                "https://buy.stripe.com/aFa4gz8NR3Yt8u74bBbbG1E?client_reference_id=954dec9e-71bb-40fb-8d30-d97ad14de399",
            ),
        ];

        let mut links = HashMap::new();
        for (term, key, url) in rows {
            links.insert((term, key), url.to_string());
        }
        Self { links }
    }
}

/// Website is attached during external checkout rather than purchased
/// standalone.
pub fn has_website_addon(services: &[ServiceId]) -> bool {
    services.contains(&ServiceId::Website)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::domain::service::ServiceId;
    use crate::pricing::terms::ContractTerm;

    use super::{has_website_addon, CheckoutKey, CheckoutLinks};

    #[test]
    fn both_qualifying_services_resolve_to_the_combined_key() {
        let key = CheckoutKey::for_services(&[
            ServiceId::Seo,
            ServiceId::PaidAds,
            ServiceId::Website,
        ]);
        assert_eq!(key, Some(CheckoutKey::SeoPaidAds));
    }

    #[test]
    fn website_only_selections_have_no_checkout_key() {
        assert_eq!(CheckoutKey::for_services(&[ServiceId::Website]), None);
    }

    #[test]
    fn standard_table_covers_every_term_and_key() {
        let links = CheckoutLinks::standard();
        for term in ContractTerm::ALL {
            for services in
                [&[ServiceId::Seo][..], &[ServiceId::PaidAds][..], &[ServiceId::Seo, ServiceId::PaidAds][..]]
            {
                let url = links.resolve(services, term).expect("link present");
                assert!(url.starts_with("https://buy.stripe.com/"));
            }
        }
    }

    #[test]
    fn website_addon_does_not_change_the_resolved_link() {
        let links = CheckoutLinks::standard();
        let with_addon = links
            .resolve(&[ServiceId::Seo, ServiceId::Website], ContractTerm::Annual)
            .expect("link");
        let without = links.resolve(&[ServiceId::Seo], ContractTerm::Annual).expect("link");
        assert_eq!(with_addon, without);
    }

    #[test]
    fn terms_absent_from_a_table_revision_resolve_to_none() {
        let links = CheckoutLinks::new(HashMap::new());
        assert_eq!(links.resolve(&[ServiceId::Seo], ContractTerm::Monthly), None);
    }

    #[test]
    fn website_addon_detection() {
        assert!(has_website_addon(&[ServiceId::Seo, ServiceId::Website]));
        assert!(!has_website_addon(&[ServiceId::Seo, ServiceId::PaidAds]));
    }
}
