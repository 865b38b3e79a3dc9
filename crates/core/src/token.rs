//! Share-token codec for proposals.
//!
//! A token is base64url(JSON) over a compact payload with short field
//! names, so the whole selection travels inside a link. Only selection
//! inputs are encoded; pricing is always recomputed on decode-and-view.
//! Version 1 payloads carried a single term (`ct`/`d`); version 2 carries
//! the multi-term list (`st`). Both decode.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::proposal::{CallInsights, ProposalConfig, Template};
use crate::domain::service::ServiceId;
use crate::errors::DomainError;
use crate::pricing::{ContractTerm, DiscountSpec, TermOption};

const TOKEN_VERSION: u8 = 2;
const SLUG_LENGTH: usize = 12;

#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    #[serde(default = "legacy_version")]
    v: u8,
    cn: String,
    co: String,
    t: Template,
    a: Vec<ServiceId>,
    sr: String,
    se: String,
    /// Creation time, unix milliseconds.
    ts: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    st: Option<Vec<TokenTerm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ct: Option<ContractTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fi: Option<CallInsights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ces: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenTerm {
    t: ContractTerm,
    #[serde(default)]
    d: Decimal,
    #[serde(default)]
    dd: Decimal,
}

fn legacy_version() -> u8 {
    1
}

pub fn encode(config: &ProposalConfig) -> Result<String, DomainError> {
    let payload = TokenPayload {
        v: TOKEN_VERSION,
        cn: config.customer_name.clone(),
        co: config.company_name.clone(),
        t: config.template,
        a: config.selected_services.clone(),
        sr: config.sales_rep_name.clone(),
        se: config.sales_rep_email.clone(),
        ts: config.created_at.timestamp_millis(),
        st: Some(
            config
                .term_options
                .iter()
                .map(|option| TokenTerm {
                    t: option.term,
                    d: option.discount.percent,
                    dd: option.discount.dollar,
                })
                .collect(),
        ),
        ct: None,
        d: None,
        ff: config.transcript_url.clone(),
        fi: config.insights.clone(),
        bc: config.business_context.clone(),
        ces: config.custom_executive_summary.clone(),
    };

    let json = serde_json::to_vec(&payload).map_err(|error| {
        DomainError::InvariantViolation(format!("token payload serialization failed: {error}"))
    })?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode(token: &str) -> Result<ProposalConfig, DomainError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|error| DomainError::TokenDecode(format!("invalid base64url: {error}")))?;
    let payload: TokenPayload = serde_json::from_slice(&bytes)
        .map_err(|error| DomainError::TokenDecode(format!("invalid payload: {error}")))?;

    let term_options = match (payload.st, payload.ct) {
        (Some(terms), _) if !terms.is_empty() => terms
            .into_iter()
            .map(|term| TermOption {
                term: term.t,
                discount: DiscountSpec { percent: term.d, dollar: term.dd },
            })
            .collect(),
        (_, Some(term)) => vec![TermOption {
            term,
            discount: DiscountSpec {
                percent: payload.d.unwrap_or(Decimal::ZERO),
                dollar: Decimal::ZERO,
            },
        }],
        _ => {
            return Err(DomainError::TokenDecode(
                "payload carries neither term options nor a legacy term".to_string(),
            ))
        }
    };

    let created_at = DateTime::<Utc>::from_timestamp_millis(payload.ts)
        .ok_or_else(|| DomainError::TokenDecode("timestamp out of range".to_string()))?;

    Ok(ProposalConfig {
        slug: token.chars().take(SLUG_LENGTH).collect(),
        customer_name: payload.cn,
        company_name: payload.co,
        template: payload.t,
        selected_services: payload.a,
        term_options,
        sales_rep_name: payload.sr,
        sales_rep_email: payload.se,
        transcript_url: payload.ff,
        insights: payload.fi,
        business_context: payload.bc,
        custom_executive_summary: payload.ces,
        created_at,
        is_locked: false,
    })
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::proposal::{CallInsights, ProposalConfig, Template};
    use crate::domain::service::ServiceId;
    use crate::errors::DomainError;
    use crate::pricing::{ContractTerm, DiscountSpec, TermOption};

    use super::{decode, encode};

    fn config() -> ProposalConfig {
        ProposalConfig {
            slug: String::new(),
            customer_name: "Dana Price".to_string(),
            company_name: "Northwind Outfitters".to_string(),
            template: Template::Ecom,
            selected_services: vec![ServiceId::Seo, ServiceId::PaidAds, ServiceId::Website],
            term_options: vec![
                TermOption {
                    term: ContractTerm::Annual,
                    discount: DiscountSpec::percent(Decimal::from(10)),
                },
                TermOption::undiscounted(ContractTerm::Monthly),
            ],
            sales_rep_name: "Alex Romero".to_string(),
            sales_rep_email: "alex@agency.example".to_string(),
            transcript_url: Some("https://app.fireflies.ai/view/abc123".to_string()),
            insights: Some(CallInsights {
                pain_points: vec!["Lead volume dropped 40%".to_string()],
                discussion_topics: vec!["Quarterly budget".to_string()],
                solutions: vec!["Rebuild paid funnels".to_string()],
                summary: "Your team needs predictable lead flow.".to_string(),
            }),
            business_context: Some("Outdoor gear, seasonal peaks".to_string()),
            custom_executive_summary: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).single().expect("timestamp"),
            is_locked: false,
        }
    }

    #[test]
    fn round_trip_preserves_every_selection_field() {
        let original = config();
        let token = encode(&original).expect("encode");
        let decoded = decode(&token).expect("decode");

        assert_eq!(decoded.customer_name, original.customer_name);
        assert_eq!(decoded.company_name, original.company_name);
        assert_eq!(decoded.template, original.template);
        assert_eq!(decoded.selected_services, original.selected_services);
        assert_eq!(decoded.term_options, original.term_options);
        assert_eq!(decoded.transcript_url, original.transcript_url);
        assert_eq!(decoded.insights, original.insights);
        assert_eq!(decoded.business_context, original.business_context);
        assert_eq!(decoded.created_at, original.created_at);
    }

    #[test]
    fn token_is_url_safe_and_prefix_derives_the_slug() {
        let token = encode(&config()).expect("encode");
        assert!(!token.contains('+') && !token.contains('/') && !token.contains('='));

        let decoded = decode(&token).expect("decode");
        assert_eq!(decoded.slug, token.chars().take(12).collect::<String>());
    }

    #[test]
    fn unicode_fields_survive_the_round_trip() {
        let mut original = config();
        original.business_context = Some("Budget \u{2014} \u{201c}flexible\u{201d}".to_string());
        let decoded = decode(&encode(&original).expect("encode")).expect("decode");
        assert_eq!(decoded.business_context, original.business_context);
    }

    #[test]
    fn legacy_single_term_payloads_decode_to_one_option() {
        let json = serde_json::json!({
            "cn": "Dana Price",
            "co": "Northwind Outfitters",
            "t": "leads",
            "a": ["seo"],
            "sr": "Alex Romero",
            "se": "alex@agency.example",
            "ts": 1_700_000_000_000_i64,
            "ct": "annual",
            "d": 15,
        });
        let token = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&json).expect("json"));

        let decoded = decode(&token).expect("decode legacy");
        assert_eq!(
            decoded.term_options,
            vec![TermOption {
                term: ContractTerm::Annual,
                discount: DiscountSpec::percent(Decimal::from(15)),
            }],
        );
    }

    #[test]
    fn garbage_tokens_fail_with_a_typed_error() {
        assert!(matches!(decode("not-base64!!!"), Err(DomainError::TokenDecode(_))));

        let valid_base64_bad_json =
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"{\"cn\": 12}");
        assert!(matches!(decode(&valid_base64_bad_json), Err(DomainError::TokenDecode(_))));
    }
}
