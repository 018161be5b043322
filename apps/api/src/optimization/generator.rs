//! Text generation contract: the two remote operations the optimization loop depends on.
//!
//! `TextGenerator` is the seam between the loop and the network: `GenerationClient`
//! implements it over HTTP, tests substitute scripted doubles. The loop never sees
//! prompts or wire payloads.

use async_trait::async_trait;
use serde::Deserialize;

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, SCOPE_INSTRUCTION};
use crate::llm_client::{parse_json_text, GenerationClient, GenerationServiceError};
use crate::optimization::models::{
    to_score_scale, CandidateProfile, CriterionScores, Evaluation, JobContext,
};
use crate::optimization::prompts::{
    EVALUATE_PROMPT_TEMPLATE, EVALUATE_SYSTEM, OPTIMIZE_PROMPT_TEMPLATE, OPTIMIZE_SYSTEM,
};

/// Carried in `AppState` as `Arc<dyn TextGenerator>`.
/// Implementations must be stateless from the caller's view and safe to share
/// between concurrent runs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Rewrites `text` for `job`, grounded on `profile`.
    async fn optimize(
        &self,
        text: &str,
        job: &JobContext,
        profile: &CandidateProfile,
    ) -> Result<String, GenerationServiceError>;

    /// Scores `text` against `job` on the 0–10 scale. The overall score is the
    /// evaluator's own aggregate and is never recomputed from the criteria.
    async fn evaluate(
        &self,
        text: &str,
        job: &JobContext,
    ) -> Result<Evaluation, GenerationServiceError>;
}

#[async_trait]
impl TextGenerator for GenerationClient {
    async fn optimize(
        &self,
        text: &str,
        job: &JobContext,
        profile: &CandidateProfile,
    ) -> Result<String, GenerationServiceError> {
        let prompt = build_optimize_prompt(text, job, profile);
        let letter = self.call(&prompt, OPTIMIZE_SYSTEM).await?;
        Ok(letter.trim().to_string())
    }

    async fn evaluate(
        &self,
        text: &str,
        job: &JobContext,
    ) -> Result<Evaluation, GenerationServiceError> {
        let prompt = build_evaluate_prompt(text, job);
        let raw = self.call(&prompt, EVALUATE_SYSTEM).await?;
        parse_evaluation(&raw)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation payload
// ────────────────────────────────────────────────────────────────────────────

/// The evaluator's JSON, as requested by `EVALUATE_PROMPT_TEMPLATE`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationPayload {
    #[serde(default)]
    scores: Option<CriterionScores>,
    total_score: Option<f64>,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Parses the evaluator output and converts its 0–100 aggregate to the 0–10 scale.
/// A missing or out-of-range `totalScore` is a malformed payload.
pub(crate) fn parse_evaluation(raw: &str) -> Result<Evaluation, GenerationServiceError> {
    let payload: EvaluationPayload = parse_json_text(raw)?;

    let total = payload.total_score.ok_or_else(|| {
        GenerationServiceError::MalformedResponse("evaluation is missing totalScore".to_string())
    })?;
    let score = to_score_scale(total).ok_or_else(|| {
        GenerationServiceError::MalformedResponse(format!(
            "evaluation totalScore {total} is outside 0-100"
        ))
    })?;

    Ok(Evaluation {
        score,
        feedback: payload.feedback,
        suggestions: payload.suggestions,
        criteria: payload.scores,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt builders
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn build_optimize_prompt(
    text: &str,
    job: &JobContext,
    profile: &CandidateProfile,
) -> String {
    let skills = if profile.key_skills.is_empty() {
        "none listed".to_string()
    } else {
        profile
            .key_skills
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let requirements = if job.requirements.is_empty() {
        "see description".to_string()
    } else {
        job.requirements.join(", ")
    };
    let signals = format!(
        "leadership={}, mentoring={}",
        profile.leadership, profile.mentoring
    );

    OPTIMIZE_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{scope_instruction}", SCOPE_INSTRUCTION)
        .replace("{job_title}", &job.title)
        .replace("{job_description}", &job.description)
        .replace("{job_requirements}", &requirements)
        .replace("{profile_skills}", &skills)
        .replace(
            "{profile_experience}",
            &format!("{} years", profile.years_of_experience),
        )
        .replace("{profile_education}", &profile.education)
        .replace("{profile_signals}", &signals)
        // Letter goes last so placeholder-looking text inside it is left alone.
        .replace("{cover_letter}", text)
}

pub(crate) fn build_evaluate_prompt(text: &str, job: &JobContext) -> String {
    EVALUATE_PROMPT_TEMPLATE
        .replace("{job_title}", &job.title)
        .replace("{job_description}", &job.description)
        .replace("{cover_letter}", text)
}
