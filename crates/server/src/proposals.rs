//! Proposal API routes.
//!
//! - `POST /api/proposals`             — create a proposal and mint its share link
//! - `GET  /api/proposals/{slug}`      — view a proposal with recomputed pricing
//! - `POST /api/proposals/{slug}/sign` — capture the customer signature
//!
//! Stored proposals hold selection inputs only. Every view recomputes
//! pricing from the rate tables, so a price change never disagrees with
//! what the page shows.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use propel_core::pricing::{price_term_options, StandardPricingEngine, TermOption};
use propel_core::{
    has_website_addon, token, CallInsights, CheckoutLinks, ContractTerm, DomainError, LineItem,
    ProposalConfig, ServiceId, SignatureRecord, Template,
};
use propel_db::{DbPool, ProposalRepository, RepositoryError, SqlProposalRepository};
use propel_insights::{extract_insights, InsightRequest, LlmClient};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ProposalsState {
    repository: Arc<dyn ProposalRepository>,
    llm: Option<Arc<dyn LlmClient>>,
    public_base_url: String,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProposalRequest {
    pub customer_name: String,
    pub company_name: String,
    pub template: Template,
    pub selected_services: Vec<ServiceId>,
    pub term_options: Vec<TermOption>,
    pub sales_rep_name: String,
    pub sales_rep_email: String,
    pub transcript_url: Option<String>,
    /// Raw meeting summary to analyze. When present and a model is
    /// configured, extracted insights are stored with the proposal.
    pub transcript_summary: Option<String>,
    pub business_context: Option<String>,
    pub custom_executive_summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateProposalResponse {
    pub slug: String,
    pub token: String,
    pub share_url: String,
}

#[derive(Debug, Serialize)]
pub struct ProposalView {
    pub slug: String,
    pub customer_name: String,
    pub company_name: String,
    pub template: Template,
    pub selected_services: Vec<ServiceId>,
    pub sales_rep_name: String,
    pub sales_rep_email: String,
    pub insights: Option<CallInsights>,
    pub executive_summary: Option<String>,
    pub business_context: Option<String>,
    pub created_at: DateTime<Utc>,
    pub website_addon: bool,
    pub quotes: Vec<QuoteView>,
    pub is_signed: bool,
    pub signature: Option<SignatureView>,
}

#[derive(Debug, Serialize)]
pub struct QuoteView {
    pub term: ContractTerm,
    pub term_display: &'static str,
    pub months: u32,
    pub discount_percent: Decimal,
    pub discount_dollar: Decimal,
    pub lines: Vec<LineItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub upfront_total: Decimal,
    pub checkout_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignatureView {
    pub full_name: String,
    pub email: String,
    pub signed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    pub full_name: String,
    pub email: String,
    pub agreed_to_terms: bool,
}

#[derive(Debug, Serialize)]
pub struct SignResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(
    db_pool: DbPool,
    llm: Option<Arc<dyn LlmClient>>,
    public_base_url: String,
) -> Router {
    Router::new()
        .route("/api/proposals", post(create_proposal))
        .route("/api/proposals/{slug}", get(view_proposal))
        .route("/api/proposals/{slug}/sign", post(sign_proposal))
        .with_state(ProposalsState {
            repository: Arc::new(SqlProposalRepository::new(db_pool)),
            llm,
            public_base_url,
        })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_proposal(
    State(state): State<ProposalsState>,
    Json(body): Json<CreateProposalRequest>,
) -> Result<(StatusCode, Json<CreateProposalResponse>), (StatusCode, Json<ApiError>)> {
    let insights = match &body.transcript_summary {
        Some(summary) if !summary.trim().is_empty() => Some(
            extract_insights(
                state.llm.as_deref(),
                &InsightRequest {
                    transcript_summary: summary.clone(),
                    company_name: Some(body.company_name.clone()),
                },
            )
            .await,
        ),
        _ => None,
    };

    let mut config = ProposalConfig {
        slug: String::new(),
        customer_name: body.customer_name,
        company_name: body.company_name,
        template: body.template,
        selected_services: body.selected_services,
        term_options: body.term_options,
        sales_rep_name: body.sales_rep_name,
        sales_rep_email: body.sales_rep_email,
        transcript_url: body.transcript_url,
        insights,
        business_context: body.business_context,
        custom_executive_summary: body.custom_executive_summary,
        created_at: Utc::now(),
        is_locked: false,
    };

    config.validate().map_err(bad_request)?;

    let token = token::encode(&config).map_err(|err| {
        error!(error = %err, "failed to encode proposal token");
        internal_error()
    })?;
    config.slug = token.chars().take(12).collect();

    state.repository.create(&config).await.map_err(repo_error)?;

    info!(
        event_name = "proposal.created",
        slug = %config.slug,
        company = %config.company_name,
        "proposal created"
    );

    let share_url = format!("{}/p/{token}", state.public_base_url.trim_end_matches('/'));
    Ok((
        StatusCode::CREATED,
        Json(CreateProposalResponse { slug: config.slug, token, share_url }),
    ))
}

async fn view_proposal(
    Path(slug): Path<String>,
    State(state): State<ProposalsState>,
) -> Result<Json<ProposalView>, (StatusCode, Json<ApiError>)> {
    let proposal = state
        .repository
        .find_by_slug(&slug)
        .await
        .map_err(repo_error)?
        .ok_or_else(not_found)?;

    let config = proposal.config;
    let engine = StandardPricingEngine::default();
    let term_quotes = price_term_options(&engine, &config.selected_services, &config.term_options)
        .map_err(pricing_error)?;

    let checkout_links = CheckoutLinks::standard();
    let quotes = term_quotes
        .into_iter()
        .map(|quote| QuoteView {
            term: quote.option.term,
            term_display: quote.option.term.display_name(),
            months: quote.option.term.months(),
            discount_percent: quote.option.discount.percent,
            discount_dollar: quote.option.discount.dollar,
            lines: quote.breakdown.lines,
            subtotal: quote.breakdown.subtotal,
            discount_amount: quote.breakdown.discount_amount,
            total: quote.breakdown.total,
            upfront_total: quote.breakdown.upfront_total,
            checkout_url: checkout_links
                .resolve(&config.selected_services, quote.option.term)
                .map(ToString::to_string),
        })
        .collect();

    let executive_summary = config
        .custom_executive_summary
        .clone()
        .or_else(|| config.insights.as_ref().map(|insights| insights.summary.clone()));

    let is_signed = proposal.signature.is_some();
    Ok(Json(ProposalView {
        slug: config.slug,
        customer_name: config.customer_name,
        company_name: config.company_name,
        template: config.template,
        website_addon: has_website_addon(&config.selected_services),
        selected_services: config.selected_services,
        sales_rep_name: config.sales_rep_name,
        sales_rep_email: config.sales_rep_email,
        insights: config.insights,
        executive_summary,
        business_context: config.business_context,
        created_at: config.created_at,
        quotes,
        is_signed,
        signature: proposal.signature.map(|record| SignatureView {
            full_name: record.full_name,
            email: record.email,
            signed_at: record.signed_at,
        }),
    }))
}

async fn sign_proposal(
    Path(slug): Path<String>,
    State(state): State<ProposalsState>,
    headers: HeaderMap,
    Json(body): Json<SignRequest>,
) -> Result<Json<SignResponse>, (StatusCode, Json<ApiError>)> {
    let full_name = body.full_name.trim();
    let email = body.email.trim();
    if full_name.is_empty() || email.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError { error: "signer name and email are required".to_string() }),
        ));
    }
    if !body.agreed_to_terms {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError { error: "terms must be accepted to sign".to_string() }),
        ));
    }

    let signature = SignatureRecord {
        full_name: full_name.to_string(),
        email: email.to_string(),
        signed_at: Utc::now(),
        ip_address: header_value(&headers, "x-forwarded-for").unwrap_or_else(|| "unknown".to_string()),
        user_agent: header_value(&headers, "user-agent").unwrap_or_default(),
        agreed_to_terms: true,
    };

    state.repository.sign(&slug, &signature).await.map_err(repo_error)?;

    info!(event_name = "proposal.signed", slug = %slug, "proposal signed and locked");

    Ok(Json(SignResponse {
        success: true,
        message: "Proposal signed. Your sales rep has been notified.".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn bad_request(error: DomainError) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: error.to_string() }))
}

fn pricing_error(error: DomainError) -> (StatusCode, Json<ApiError>) {
    warn!(error = %error, "stored proposal could not be priced");
    (StatusCode::UNPROCESSABLE_ENTITY, Json(ApiError { error: error.to_string() }))
}

fn not_found() -> (StatusCode, Json<ApiError>) {
    (StatusCode::NOT_FOUND, Json(ApiError { error: "proposal not found".to_string() }))
}

fn internal_error() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError { error: "an internal error occurred".to_string() }),
    )
}

fn repo_error(error: RepositoryError) -> (StatusCode, Json<ApiError>) {
    match error {
        RepositoryError::NotFound { .. } => not_found(),
        RepositoryError::Locked { .. } => (
            StatusCode::CONFLICT,
            Json(ApiError { error: "proposal is already signed".to_string() }),
        ),
        other => {
            error!(error = %other, "proposal repository error");
            internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::Json;
    use propel_core::pricing::{ContractTerm, DiscountSpec, TermOption};
    use propel_core::{token, ServiceId, Template};
    use propel_db::{connect_with_settings, migrations, SqlProposalRepository};
    use rust_decimal::Decimal;

    use super::{
        create_proposal, sign_proposal, view_proposal, CreateProposalRequest, ProposalsState,
        SignRequest,
    };

    async fn state() -> (ProposalsState, sqlx::SqlitePool) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let state = ProposalsState {
            repository: Arc::new(SqlProposalRepository::new(pool.clone())),
            llm: None,
            public_base_url: "https://proposals.example".to_string(),
        };
        (state, pool)
    }

    fn request() -> CreateProposalRequest {
        CreateProposalRequest {
            customer_name: "Dana Price".to_string(),
            company_name: "Northwind Outfitters".to_string(),
            template: Template::Leads,
            selected_services: vec![ServiceId::Seo, ServiceId::PaidAds, ServiceId::Website],
            term_options: vec![
                TermOption {
                    term: ContractTerm::Annual,
                    discount: DiscountSpec::percent(Decimal::from(10)),
                },
                TermOption::undiscounted(ContractTerm::Quarterly),
            ],
            sales_rep_name: "Alex Romero".to_string(),
            sales_rep_email: "alex@agency.example".to_string(),
            transcript_url: None,
            transcript_summary: None,
            business_context: None,
            custom_executive_summary: None,
        }
    }

    #[tokio::test]
    async fn create_returns_slug_token_and_share_url() {
        let (state, pool) = state().await;

        let (status, Json(response)) =
            create_proposal(State(state), Json(request())).await.expect("create");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.slug.chars().count(), 12);
        assert!(response.token.starts_with(&response.slug));
        assert_eq!(
            response.share_url,
            format!("https://proposals.example/p/{}", response.token)
        );

        let decoded = token::decode(&response.token).expect("token decodes");
        assert_eq!(decoded.customer_name, "Dana Price");

        pool.close().await;
    }

    #[tokio::test]
    async fn create_rejects_empty_service_selection() {
        let (state, pool) = state().await;

        let mut body = request();
        body.selected_services.clear();

        let result = create_proposal(State(state), Json(body)).await;
        let (status, _) = result.expect_err("should reject");
        assert_eq!(status, StatusCode::BAD_REQUEST);

        pool.close().await;
    }

    #[tokio::test]
    async fn view_recomputes_pricing_and_resolves_checkout_links() {
        let (state, pool) = state().await;

        let (_, Json(created)) =
            create_proposal(State(state.clone()), Json(request())).await.expect("create");

        let Json(view) = view_proposal(Path(created.slug.clone()), State(state))
            .await
            .expect("view");

        assert_eq!(view.slug, created.slug);
        assert!(view.website_addon);
        assert!(!view.is_signed);
        assert_eq!(view.quotes.len(), 2);

        let annual = &view.quotes[0];
        assert_eq!(annual.term, ContractTerm::Annual);
        assert_eq!(annual.months, 12);
        // SEO + paid ads collapse to the combo; website stays separate.
        assert_eq!(annual.lines.len(), 2);
        assert_eq!(annual.subtotal, Decimal::from(2099) + Decimal::from(279));
        assert!(annual.checkout_url.as_deref().is_some_and(|url| url.contains("stripe.com")));

        let quarterly = &view.quotes[1];
        assert_eq!(quarterly.term, ContractTerm::Quarterly);
        // No discount: upfront is the exact processor table sum.
        assert_eq!(quarterly.upfront_total, Decimal::from(7645) + Decimal::from(1017));

        pool.close().await;
    }

    #[tokio::test]
    async fn view_unknown_slug_is_not_found() {
        let (state, pool) = state().await;

        let result = view_proposal(Path("missing-slug".to_string()), State(state)).await;
        let (status, _) = result.expect_err("should be missing");
        assert_eq!(status, StatusCode::NOT_FOUND);

        pool.close().await;
    }

    #[tokio::test]
    async fn signing_locks_the_proposal_and_second_signature_conflicts() {
        let (state, pool) = state().await;

        let (_, Json(created)) =
            create_proposal(State(state.clone()), Json(request())).await.expect("create");

        let sign_body = || {
            Json(SignRequest {
                full_name: "Dana Price".to_string(),
                email: "dana@northwind.example".to_string(),
                agreed_to_terms: true,
            })
        };

        let mut headers = HeaderMap::new();
        headers.insert("user-agent", "Mozilla/5.0".parse().expect("header"));

        let Json(response) = sign_proposal(
            Path(created.slug.clone()),
            State(state.clone()),
            headers.clone(),
            sign_body(),
        )
        .await
        .expect("first signature");
        assert!(response.success);

        let Json(view) = view_proposal(Path(created.slug.clone()), State(state.clone()))
            .await
            .expect("view after signing");
        assert!(view.is_signed);
        let signature = view.signature.expect("signature present");
        assert_eq!(signature.full_name, "Dana Price");

        let result =
            sign_proposal(Path(created.slug), State(state), headers, sign_body()).await;
        let (status, _) = result.expect_err("second signature should conflict");
        assert_eq!(status, StatusCode::CONFLICT);

        pool.close().await;
    }

    #[tokio::test]
    async fn signing_requires_terms_acceptance() {
        let (state, pool) = state().await;

        let (_, Json(created)) =
            create_proposal(State(state.clone()), Json(request())).await.expect("create");

        let result = sign_proposal(
            Path(created.slug),
            State(state),
            HeaderMap::new(),
            Json(SignRequest {
                full_name: "Dana Price".to_string(),
                email: "dana@northwind.example".to_string(),
                agreed_to_terms: false,
            }),
        )
        .await;

        let (status, _) = result.expect_err("should reject");
        assert_eq!(status, StatusCode::BAD_REQUEST);

        pool.close().await;
    }
}
