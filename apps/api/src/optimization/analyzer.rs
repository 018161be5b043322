//! Profile Analyzer: pluggable, trait-based extraction of `CandidateProfile` from CV text.
//!
//! Default: `KeywordProfileAnalyzer` (pure-Rust, deterministic, no remote call).
//! Optional: `LlmProfileAnalyzer` (delegates extraction to the generation service).
//!
//! `AppState` holds an `Arc<dyn ProfileAnalyzer>`, selected at startup via config.
//! Extraction is best-effort: a missing signal yields `false`/empty, never an error.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::llm_client::GenerationClient;
use crate::optimization::errors::OptimizationError;
use crate::optimization::models::CandidateProfile;
use crate::optimization::prompts::{ANALYZE_PROMPT_TEMPLATE, ANALYZE_SYSTEM};
use crate::optimization::signals::{
    canonical_skills, degree_families, employment_span_years, find_skills, first_phrase, tokenize,
    year_claims, LEADERSHIP_PHRASES, MENTORING_PHRASES,
};

/// Analyzer trait. Implement this to swap extraction backends without touching
/// the loop or the handlers.
#[async_trait]
pub trait ProfileAnalyzer: Send + Sync {
    /// Fails with `InvalidInput` on blank text; remote backends may also fail
    /// with `GenerationService`.
    async fn analyze(&self, cv_text: &str) -> Result<CandidateProfile, OptimizationError>;

    /// Backend label for logs ("keyword" | "llm").
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordProfileAnalyzer: default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic keyword analyzer.
///
/// - experience: max of explicit "N years" claims and the span of date ranges
/// - skills: fixed vocabulary, canonical casing
/// - leadership / mentoring: phrase lists shared with the consistency checker
/// - education: first line naming a degree
pub struct KeywordProfileAnalyzer;

#[async_trait]
impl ProfileAnalyzer for KeywordProfileAnalyzer {
    async fn analyze(&self, cv_text: &str) -> Result<CandidateProfile, OptimizationError> {
        ensure_cv_text(cv_text)?;
        Ok(extract_profile(cv_text, Utc::now().year()))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

/// Pure extraction; `reference_year` closes open-ended ranges like "2020-Present".
pub(crate) fn extract_profile(cv_text: &str, reference_year: i32) -> CandidateProfile {
    let tokens = tokenize(cv_text);

    let claimed = year_claims(&tokens).into_iter().max().unwrap_or(0);
    let spanned = employment_span_years(&tokens, reference_year);

    let profile = CandidateProfile {
        years_of_experience: claimed.max(spanned),
        key_skills: find_skills(&tokens),
        leadership: first_phrase(&tokens, LEADERSHIP_PHRASES).is_some(),
        mentoring: first_phrase(&tokens, MENTORING_PHRASES).is_some(),
        education: extract_education(cv_text),
    };

    debug!(
        years = profile.years_of_experience,
        skills = profile.key_skills.len(),
        leadership = profile.leadership,
        mentoring = profile.mentoring,
        "Extracted candidate profile"
    );
    profile
}

/// Returns the first CV line that names a degree, trimmed of bullet markers.
fn extract_education(cv_text: &str) -> String {
    cv_text
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .find(|line| !degree_families(&tokenize(line)).is_empty())
        .map(String::from)
        .unwrap_or_default()
}

fn ensure_cv_text(cv_text: &str) -> Result<(), OptimizationError> {
    if cv_text.trim().is_empty() {
        return Err(OptimizationError::InvalidInput(
            "cv_text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// LlmProfileAnalyzer: remote extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extraction via the generation service. Enabled with ENABLE_LLM_PROFILE_ANALYSIS.
pub struct LlmProfileAnalyzer(pub GenerationClient);

/// Lenient shape for the model's answer; absent fields mean "no signal".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfilePayload {
    #[serde(default)]
    years_of_experience: Option<f64>,
    #[serde(default)]
    key_skills: Vec<String>,
    #[serde(default)]
    leadership: bool,
    #[serde(default)]
    mentoring: bool,
    #[serde(default)]
    education: Option<String>,
}

impl From<ProfilePayload> for CandidateProfile {
    fn from(payload: ProfilePayload) -> Self {
        let years = payload
            .years_of_experience
            .filter(|y| y.is_finite() && *y > 0.0)
            .map(|y| y.floor() as u32)
            .unwrap_or(0);
        // Keep the model's spelling and add the vocabulary names, so the
        // consistency checker sees the same names as with the keyword backend.
        let mut key_skills = BTreeSet::new();
        for raw in payload.key_skills {
            let skill = raw.trim();
            if skill.is_empty() {
                continue;
            }
            key_skills.extend(canonical_skills(skill));
            key_skills.insert(skill.to_string());
        }

        CandidateProfile {
            years_of_experience: years,
            key_skills,
            leadership: payload.leadership,
            mentoring: payload.mentoring,
            education: payload.education.unwrap_or_default().trim().to_string(),
        }
    }
}

#[async_trait]
impl ProfileAnalyzer for LlmProfileAnalyzer {
    async fn analyze(&self, cv_text: &str) -> Result<CandidateProfile, OptimizationError> {
        ensure_cv_text(cv_text)?;
        let prompt = ANALYZE_PROMPT_TEMPLATE.replace("{cv_text}", cv_text);
        let payload: ProfilePayload = self.0.call_json(&prompt, ANALYZE_SYSTEM).await?;
        Ok(payload.into())
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{http::StatusCode, routing::post, Router};

    use crate::llm_client::stub_server::{client, completion_body, serve};
    use crate::optimization::consistency::check_detailed;

    const SAMPLE_CV: &str = "JOHN DOE
        Software Developer

        EXPERIENCE
        Senior Developer, Tech Corp (2020-Present)
        - Led team of 5 developers in cloud migration project
        - Mentored 3 junior developers in React and Node.js
        - Implemented CI/CD pipelines using AWS

        EDUCATION
        - B.Sc Computer Science, State University";

    #[tokio::test]
    async fn test_keyword_analyzer_rejects_blank_cv() {
        let err = KeywordProfileAnalyzer.analyze("   \n ").await.unwrap_err();
        assert!(matches!(err, OptimizationError::InvalidInput(_)));
    }

    #[test]
    fn test_extract_profile_from_sample_cv() {
        let profile = extract_profile(SAMPLE_CV, 2025);
        assert_eq!(profile.years_of_experience, 5);
        for skill in ["React", "Node.js", "AWS", "CI/CD"] {
            assert!(profile.key_skills.contains(skill), "missing {skill}");
        }
        assert!(profile.leadership);
        assert!(profile.mentoring);
        assert_eq!(profile.education, "B.Sc Computer Science, State University");
    }

    #[test]
    fn test_explicit_years_claim_beats_shorter_span() {
        let cv = "Backend engineer with 8+ years of experience.\nAcme (2021-2023)";
        assert_eq!(extract_profile(cv, 2025).years_of_experience, 8);
    }

    #[test]
    fn test_absent_signals_yield_defaults() {
        let profile = extract_profile("Enthusiastic graduate looking for a first role.", 2025);
        assert_eq!(profile.years_of_experience, 0);
        assert!(profile.key_skills.is_empty());
        assert!(!profile.leadership);
        assert!(!profile.mentoring);
        assert!(profile.education.is_empty());
    }

    #[test]
    fn test_education_header_without_degree_is_skipped() {
        let cv = "EDUCATION\nMaster of Science in Data Engineering";
        assert_eq!(
            extract_profile(cv, 2025).education,
            "Master of Science in Data Engineering"
        );
    }

    #[test]
    fn test_profile_payload_conversion_is_lenient() {
        let payload: ProfilePayload = serde_json::from_str(
            r#"{"yearsOfExperience": 4.7, "keySkills": [" Rust ", "", "Go"], "leadership": true}"#,
        )
        .unwrap();
        let profile: CandidateProfile = payload.into();
        assert_eq!(profile.years_of_experience, 4);
        assert!(profile.key_skills.contains("Rust"));
        assert!(profile.key_skills.contains("Go"));
        assert!(profile.key_skills.contains("Golang"));
        assert!(!profile.key_skills.contains(""));
        assert!(profile.leadership);
        assert!(!profile.mentoring);
        assert!(profile.education.is_empty());
    }

    #[test]
    fn test_llm_skill_spellings_pass_consistency_check() {
        let payload: ProfilePayload = serde_json::from_str(
            r#"{"yearsOfExperience": 3, "keySkills": ["ReactJS", "Go", "Postgres"]}"#,
        )
        .unwrap();
        let profile: CandidateProfile = payload.into();

        let report = check_detailed(
            "I build ReactJS frontends and Golang services on Postgres.",
            &profile,
        );
        assert!(report.consistent, "unexpected claims: {:?}", report.unsupported_claims);
        assert!(!check_detailed("I also run Kubernetes clusters.", &profile).consistent);
    }

    #[test]
    fn test_profile_payload_negative_years_clamp_to_zero() {
        let payload: ProfilePayload =
            serde_json::from_str(r#"{"yearsOfExperience": -3}"#).unwrap();
        let profile: CandidateProfile = payload.into();
        assert_eq!(profile.years_of_experience, 0);
    }

    #[tokio::test]
    async fn test_llm_analyzer_unreachable_service_is_generation_error() {
        // Nothing listens on port 1; the single attempt fails to connect.
        let analyzer = LlmProfileAnalyzer(client("http://127.0.0.1:1", Duration::from_secs(2), 1));

        let err = analyzer.analyze(SAMPLE_CV).await.unwrap_err();

        assert!(matches!(err, OptimizationError::GenerationService(_)), "{err:?}");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_llm_analyzer_blank_cv_makes_no_call() {
        let analyzer = LlmProfileAnalyzer(client("http://127.0.0.1:1", Duration::from_secs(2), 1));
        let err = analyzer.analyze("  ").await.unwrap_err();
        assert!(matches!(err, OptimizationError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_llm_analyzer_reads_model_payload() {
        let answer = r#"{"yearsOfExperience": 5, "keySkills": ["ReactJS", "AWS"], "leadership": true, "education": "B.Sc Computer Science"}"#;
        let router = Router::new().route(
            "/chat/completions",
            post(move || async move { (StatusCode::OK, completion_body(answer)) }),
        );
        let base = serve(router).await;
        let analyzer = LlmProfileAnalyzer(client(&base, Duration::from_secs(5), 1));

        let profile = analyzer.analyze(SAMPLE_CV).await.unwrap();

        assert_eq!(profile.years_of_experience, 5);
        assert!(profile.key_skills.contains("React"));
        assert!(profile.key_skills.contains("ReactJS"));
        assert!(profile.leadership);
        assert!(!profile.mentoring);
        assert_eq!(analyzer.backend(), "llm");
    }

    #[test]
    fn test_backend_labels() {
        assert_eq!(KeywordProfileAnalyzer.backend(), "keyword");
    }
}
