use serde::{Deserialize, Serialize};

/// A service a rep can put on a proposal. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    Seo,
    PaidAds,
    Website,
}

/// A priceable line item. Distinct from [`ServiceId`] because SEO and Paid
/// Ads collapse into a single bundled item when both are selected; the
/// bundle has its own rate table entries and is not the sum of the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricedItem {
    Seo,
    PaidAds,
    SeoPaidCombo,
    Website,
}

impl ServiceId {
    pub fn display_name(self) -> &'static str {
        self.priced_item().display_name()
    }

    fn priced_item(self) -> PricedItem {
        match self {
            ServiceId::Seo => PricedItem::Seo,
            ServiceId::PaidAds => PricedItem::PaidAds,
            ServiceId::Website => PricedItem::Website,
        }
    }
}

impl PricedItem {
    pub fn display_name(self) -> &'static str {
        match self {
            PricedItem::Seo => "SEO & GEO Agent",
            PricedItem::PaidAds => "Paid Ads Agent",
            PricedItem::SeoPaidCombo => "SEO & Paid Ads Agent",
            PricedItem::Website => "Website Agent",
        }
    }
}

/// Collapse a service selection into the ordered line items that get priced.
///
/// SEO and Paid Ads become one combo line when both are present, otherwise
/// they price individually in declaration order. Website is always its own
/// trailing add-on line and never participates in the collapse.
pub fn resolve_line_items(services: &[ServiceId]) -> Vec<PricedItem> {
    let has_seo = services.contains(&ServiceId::Seo);
    let has_paid_ads = services.contains(&ServiceId::PaidAds);
    let has_website = services.contains(&ServiceId::Website);

    let mut items = Vec::with_capacity(3);
    if has_seo && has_paid_ads {
        items.push(PricedItem::SeoPaidCombo);
    } else {
        if has_seo {
            items.push(PricedItem::Seo);
        }
        if has_paid_ads {
            items.push(PricedItem::PaidAds);
        }
    }
    if has_website {
        items.push(PricedItem::Website);
    }
    items
}
