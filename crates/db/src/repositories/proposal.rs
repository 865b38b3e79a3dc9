use async_trait::async_trait;
use chrono::{DateTime, Utc};
use propel_core::{
    CallInsights, Proposal, ProposalConfig, ServiceId, SignatureRecord, Template, TermOption,
};
use sqlx::Row;

use super::{ProposalRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProposalRepository {
    pool: DbPool,
}

impl SqlProposalRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProposalRepository for SqlProposalRepository {
    async fn create(&self, config: &ProposalConfig) -> Result<(), RepositoryError> {
        let selected_services = to_json(&config.selected_services)?;
        let term_options = to_json(&config.term_options)?;
        let insights = config.insights.as_ref().map(to_json).transpose()?;

        sqlx::query(
            "INSERT INTO proposals (
                slug, customer_name, company_name, template, selected_services,
                term_options, sales_rep_name, sales_rep_email, transcript_url,
                insights, business_context, custom_executive_summary, created_at, is_locked
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&config.slug)
        .bind(&config.customer_name)
        .bind(&config.company_name)
        .bind(template_to_str(config.template))
        .bind(selected_services)
        .bind(term_options)
        .bind(&config.sales_rep_name)
        .bind(&config.sales_rep_email)
        .bind(&config.transcript_url)
        .bind(insights)
        .bind(&config.business_context)
        .bind(&config.custom_executive_summary)
        .bind(config.created_at.to_rfc3339())
        .bind(i64::from(config.is_locked))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Proposal>, RepositoryError> {
        let row = sqlx::query(
            "SELECT p.slug, p.customer_name, p.company_name, p.template,
                    p.selected_services, p.term_options, p.sales_rep_name,
                    p.sales_rep_email, p.transcript_url, p.insights,
                    p.business_context, p.custom_executive_summary, p.created_at,
                    p.is_locked,
                    s.full_name AS sig_full_name, s.email AS sig_email,
                    s.signed_at AS sig_signed_at, s.ip_address AS sig_ip_address,
                    s.user_agent AS sig_user_agent,
                    s.agreed_to_terms AS sig_agreed_to_terms
             FROM proposals p
             LEFT JOIN signatures s ON s.proposal_slug = p.slug
             WHERE p.slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let selected_services: Vec<ServiceId> =
            from_json(&row.try_get::<String, _>("selected_services")?)?;
        let term_options: Vec<TermOption> = from_json(&row.try_get::<String, _>("term_options")?)?;
        let insights: Option<CallInsights> = row
            .try_get::<Option<String>, _>("insights")?
            .map(|raw| from_json(&raw))
            .transpose()?;

        let config = ProposalConfig {
            slug: row.try_get("slug")?,
            customer_name: row.try_get("customer_name")?,
            company_name: row.try_get("company_name")?,
            template: template_from_str(&row.try_get::<String, _>("template")?)?,
            selected_services,
            term_options,
            sales_rep_name: row.try_get("sales_rep_name")?,
            sales_rep_email: row.try_get("sales_rep_email")?,
            transcript_url: row.try_get("transcript_url")?,
            insights,
            business_context: row.try_get("business_context")?,
            custom_executive_summary: row.try_get("custom_executive_summary")?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
            is_locked: row.try_get::<i64, _>("is_locked")? != 0,
        };

        let signature = match row.try_get::<Option<String>, _>("sig_full_name")? {
            Some(full_name) => Some(SignatureRecord {
                full_name,
                email: row.try_get("sig_email")?,
                signed_at: parse_timestamp(&row.try_get::<String, _>("sig_signed_at")?)?,
                ip_address: row.try_get("sig_ip_address")?,
                user_agent: row.try_get("sig_user_agent")?,
                agreed_to_terms: row.try_get::<i64, _>("sig_agreed_to_terms")? != 0,
            }),
            None => None,
        };

        Ok(Some(Proposal { config, signature }))
    }

    async fn sign(&self, slug: &str, signature: &SignatureRecord) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT is_locked FROM proposals WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(RepositoryError::NotFound { slug: slug.to_string() });
        };
        if row.try_get::<i64, _>("is_locked")? != 0 {
            return Err(RepositoryError::Locked { slug: slug.to_string() });
        }

        sqlx::query(
            "INSERT INTO signatures (
                proposal_slug, full_name, email, signed_at, ip_address,
                user_agent, agreed_to_terms
             ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(slug)
        .bind(&signature.full_name)
        .bind(&signature.email)
        .bind(signature.signed_at.to_rfc3339())
        .bind(&signature.ip_address)
        .bind(&signature.user_agent)
        .bind(i64::from(signature.agreed_to_terms))
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE proposals SET is_locked = 1 WHERE slug = ?")
            .bind(slug)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn template_to_str(template: Template) -> &'static str {
    match template {
        Template::Leads => "leads",
        Template::Ecom => "ecom",
    }
}

fn template_from_str(raw: &str) -> Result<Template, RepositoryError> {
    match raw {
        "leads" => Ok(Template::Leads),
        "ecom" => Ok(Template::Ecom),
        other => Err(RepositoryError::Corrupt(format!("unknown template `{other}`"))),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|error| RepositoryError::Corrupt(error.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(raw).map_err(|error| RepositoryError::Corrupt(error.to_string()))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Corrupt(format!("bad timestamp `{raw}`: {error}")))
}
