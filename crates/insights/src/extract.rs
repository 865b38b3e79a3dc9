use anyhow::Result;
use propel_core::CallInsights;
use serde::Deserialize;

use crate::llm::LlmClient;

/// Inputs for one extraction run.
#[derive(Clone, Debug)]
pub struct InsightRequest {
    pub transcript_summary: String,
    pub company_name: Option<String>,
}

/// Analyze a transcript summary. Falls back to [`heuristic_insights`]
/// when no client is available, the model call fails, or the reply
/// cannot be parsed.
pub async fn extract_insights(
    client: Option<&dyn LlmClient>,
    request: &InsightRequest,
) -> CallInsights {
    let Some(client) = client else {
        return heuristic_insights(&request.transcript_summary);
    };

    let prompt = analysis_prompt(request);
    match client.complete(&prompt).await.and_then(|reply| parse_insights(&reply)) {
        Ok(insights) => insights,
        Err(error) => {
            tracing::warn!(%error, "transcript analysis failed, using heuristic insights");
            heuristic_insights(&request.transcript_summary)
        }
    }
}

fn analysis_prompt(request: &InsightRequest) -> String {
    let company = request.company_name.as_deref().unwrap_or("the prospect");
    format!(
        "You are analyzing a sales call summary to create a tailored marketing proposal. \
The prospect's company is \"{company}\".\n\n\
Here is the meeting summary:\n\n{summary}\n\n\
Extract the following as a JSON object:\n\n\
1. \"pain_points\" - Array of 3-6 specific challenges/frustrations the PROSPECT mentioned \
(not what the sales rep said). Be specific to their business.\n\
2. \"discussion_topics\" - Array of 4-8 key business topics discussed (budget, channels, \
goals, team size, industry specifics, etc.)\n\
3. \"solutions\" - Array of 3-6 specific ways our services address their needs. Map each \
solution to a pain point. Be concrete, not generic.\n\
4. \"summary\" - A 2-3 sentence executive summary written FOR the proposal. Address the \
prospect directly (\"your team\", \"your challenges\"). Use \"our\" or \"we\" for the agency. \
This should feel personalized, not templated.\n\n\
IMPORTANT: Focus on what the PROSPECT said and needs, not what the sales rep pitched.\n\n\
Respond with ONLY the JSON object, no other text.",
        summary = request.transcript_summary,
    )
}

fn parse_insights(reply: &str) -> Result<CallInsights> {
    #[derive(Deserialize)]
    struct RawInsights {
        #[serde(default)]
        pain_points: Vec<String>,
        #[serde(default)]
        discussion_topics: Vec<String>,
        #[serde(default)]
        solutions: Vec<String>,
        #[serde(default)]
        summary: String,
    }

    // Models sometimes wrap the object in prose or a code fence, so
    // parse the outermost brace-delimited span.
    let start = reply.find('{').ok_or_else(|| anyhow::anyhow!("no JSON object in reply"))?;
    let end = reply.rfind('}').ok_or_else(|| anyhow::anyhow!("no JSON object in reply"))?;
    if end < start {
        anyhow::bail!("no JSON object in reply");
    }

    let raw: RawInsights = serde_json::from_str(&reply[start..=end])?;
    Ok(CallInsights {
        pain_points: raw.pain_points,
        discussion_topics: raw.discussion_topics,
        solutions: raw.solutions,
        summary: raw.summary,
    })
}

/// Deterministic extraction from the summary's bullet points. The first
/// three bullets become pain points and the next four become topics.
pub fn heuristic_insights(transcript_summary: &str) -> CallInsights {
    let bullets: Vec<String> = transcript_summary
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-') || line.starts_with('*') || line.starts_with('\u{2022}'))
        .map(clean_bullet)
        .filter(|line| !line.is_empty())
        .collect();

    CallInsights {
        pain_points: bullets.iter().take(3).cloned().collect(),
        discussion_topics: bullets.iter().skip(3).take(4).cloned().collect(),
        solutions: vec![
            "AI-powered campaign optimization tailored to your specific needs".to_string(),
            "End-to-end management with dedicated account support".to_string(),
            "Data-driven lead scoring and qualification framework".to_string(),
        ],
        summary: "Based on our conversation, we've prepared this proposal to address your \
                  specific marketing challenges with a data-driven, AI-powered approach that \
                  delivers measurable results."
            .to_string(),
    }
}

fn clean_bullet(line: &str) -> String {
    line.trim_start_matches(['-', '*', '\u{2022}'])
        .trim_start_matches("**")
        .replace("**", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;

    use crate::llm::LlmClient;

    use super::{extract_insights, heuristic_insights, parse_insights, InsightRequest};

    struct CannedClient {
        reply: Result<String, String>,
    }

    #[async_trait]
    impl LlmClient for CannedClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(anyhow::anyhow!(message.clone())),
            }
        }
    }

    fn request() -> InsightRequest {
        InsightRequest {
            transcript_summary: "- Lead volume fell 40%\n- CAC doubled this year\n\
                                 - Agency reporting was opaque\n- Budget is $8k monthly\n\
                                 - Wants to own the website"
                .to_string(),
            company_name: Some("Northwind Outfitters".to_string()),
        }
    }

    #[tokio::test]
    async fn parses_a_clean_model_reply() {
        let client = CannedClient {
            reply: Ok(r#"{
                "pain_points": ["Lead volume fell 40%"],
                "discussion_topics": ["Budget", "Channels"],
                "solutions": ["Rebuild the paid funnel end to end"],
                "summary": "Your team needs predictable lead flow."
            }"#
            .to_string()),
        };

        let insights = extract_insights(Some(&client), &request()).await;
        assert_eq!(insights.pain_points, vec!["Lead volume fell 40%"]);
        assert_eq!(insights.summary, "Your team needs predictable lead flow.");
    }

    #[tokio::test]
    async fn prose_wrapped_json_is_still_parsed() {
        let client = CannedClient {
            reply: Ok("Here is the analysis:\n```json\n{\"pain_points\": [\"High CAC\"], \
                       \"discussion_topics\": [], \"solutions\": [], \"summary\": \"s\"}\n```"
                .to_string()),
        };

        let insights = extract_insights(Some(&client), &request()).await;
        assert_eq!(insights.pain_points, vec!["High CAC"]);
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_heuristic() {
        let client = CannedClient { reply: Err("rate limited".to_string()) };

        let insights = extract_insights(Some(&client), &request()).await;
        assert_eq!(insights.pain_points.len(), 3);
        assert_eq!(insights.pain_points[0], "Lead volume fell 40%");
        assert!(!insights.solutions.is_empty());
    }

    #[tokio::test]
    async fn no_client_means_heuristic() {
        let insights = extract_insights(None, &request()).await;
        assert_eq!(insights, heuristic_insights(&request().transcript_summary));
    }

    #[test]
    fn heuristic_splits_bullets_into_pains_and_topics() {
        let insights = heuristic_insights(&request().transcript_summary);
        assert_eq!(
            insights.pain_points,
            vec!["Lead volume fell 40%", "CAC doubled this year", "Agency reporting was opaque"]
        );
        assert_eq!(
            insights.discussion_topics,
            vec!["Budget is $8k monthly", "Wants to own the website"]
        );
    }

    #[test]
    fn garbage_reply_is_an_error() {
        assert!(parse_insights("no structured data here").is_err());
    }
}
