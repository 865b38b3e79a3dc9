//! Call insight extraction for proposal personalization.
//!
//! Turns a sales call transcript summary into the structured
//! `CallInsights` block a proposal renders (pain points, discussion
//! topics, proposed solutions, executive summary). The language model
//! is strictly a summarizer. It never decides prices or terms; those
//! are deterministic decisions made by the pricing core.
//!
//! When no model is configured, or the model reply cannot be parsed,
//! extraction degrades to a deterministic heuristic so proposal
//! creation never blocks on the integration.

pub mod extract;
pub mod llm;

pub use extract::{extract_insights, heuristic_insights, InsightRequest};
pub use llm::{AnthropicClient, LlmClient};
