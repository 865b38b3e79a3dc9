use std::str::FromStr;

use propel_core::pricing::{
    ContractTerm, DiscountSpec, PricingEngine, StandardPricingEngine,
};
use propel_core::ServiceId;
use rust_decimal::Decimal;

use crate::commands::CommandResult;

pub fn run(
    services: &[String],
    term: &str,
    discount_percent: &str,
    discount_dollar: &str,
) -> CommandResult {
    let services = match services.iter().map(|raw| parse_service(raw)).collect::<Result<Vec<_>, _>>()
    {
        Ok(services) => services,
        Err(message) => return CommandResult::failure("price", "invalid_service", message, 2),
    };

    let term = match parse_term(term) {
        Ok(term) => term,
        Err(message) => return CommandResult::failure("price", "invalid_term", message, 2),
    };

    let percent = match parse_percent(discount_percent) {
        Ok(value) => value,
        Err(message) => return CommandResult::failure("price", "invalid_discount", message, 2),
    };
    let dollar = match parse_amount("discount-dollar", discount_dollar) {
        Ok(value) => value,
        Err(message) => return CommandResult::failure("price", "invalid_discount", message, 2),
    };

    let engine = StandardPricingEngine::default();
    let breakdown =
        match engine.price(&services, term, &DiscountSpec { percent, dollar }) {
            Ok(breakdown) => breakdown,
            Err(error) => {
                return CommandResult::failure("price", "pricing", error.to_string(), 3);
            }
        };

    match serde_json::to_string_pretty(&breakdown) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("price", "serialization", error.to_string(), 3),
    }
}

fn parse_service(raw: &str) -> Result<ServiceId, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "seo" => Ok(ServiceId::Seo),
        "paid_ads" | "paid-ads" | "ads" => Ok(ServiceId::PaidAds),
        "website" => Ok(ServiceId::Website),
        other => Err(format!("unknown service `{other}` (expected seo, paid_ads, website)")),
    }
}

fn parse_term(raw: &str) -> Result<ContractTerm, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "monthly" => Ok(ContractTerm::Monthly),
        "quarterly" => Ok(ContractTerm::Quarterly),
        "bi_annual" | "bi-annual" => Ok(ContractTerm::BiAnnual),
        "annual" => Ok(ContractTerm::Annual),
        other => Err(format!(
            "unknown term `{other}` (expected monthly, quarterly, bi_annual, annual)"
        )),
    }
}

fn parse_percent(raw: &str) -> Result<Decimal, String> {
    let value = parse_amount("discount-percent", raw)?;
    if value > Decimal::ONE_HUNDRED {
        return Err(format!("--discount-percent must not exceed 100, got `{raw}`"));
    }
    Ok(value)
}

fn parse_amount(flag: &str, raw: &str) -> Result<Decimal, String> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|_| format!("--{flag} must be a decimal number, got `{raw}`"))?;
    if value < Decimal::ZERO {
        return Err(format!("--{flag} must not be negative"));
    }
    Ok(value)
}
