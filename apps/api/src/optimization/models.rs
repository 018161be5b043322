//! Core records shared by the analyzer, the generation client and the optimization loop.
//!
//! Scores are on a single 0–10 scale everywhere in this crate. The remote evaluator
//! reports 0–100; the client converts once at its boundary (see `to_score_scale`).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Upper bound of the system-wide score scale.
pub const SCORE_SCALE_MAX: f64 = 10.0;
/// Upper bound of the raw scale the remote evaluator reports on.
pub const RAW_SCORE_MAX: f64 = 100.0;

pub const DEFAULT_TARGET_SCORE: f64 = 9.0;
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

/// The job a letter is being tailored to. Supplied once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobContext {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl JobContext {
    /// A job is usable only when it has a description to tailor against.
    pub fn is_empty(&self) -> bool {
        self.description.trim().is_empty()
    }
}

/// Structured facts extracted from free-form CV text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub years_of_experience: u32,
    #[serde(default)]
    pub key_skills: BTreeSet<String>,
    #[serde(default)]
    pub leadership: bool,
    #[serde(default)]
    pub mentoring: bool,
    #[serde(default)]
    pub education: String,
}

impl CandidateProfile {
    /// True when no signal at all was extracted: nothing to ground a letter on.
    pub fn is_empty(&self) -> bool {
        self.years_of_experience == 0
            && self.key_skills.is_empty()
            && !self.leadership
            && !self.mentoring
            && self.education.trim().is_empty()
    }

    /// Case-insensitive skill membership.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.key_skills
            .iter()
            .any(|s| s.eq_ignore_ascii_case(skill))
    }
}

/// Stopping criteria for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationParams {
    /// Inclusive threshold on the 0–10 scale.
    pub target_score: f64,
    pub max_iterations: u32,
}

impl Default for OptimizationParams {
    fn default() -> Self {
        Self {
            target_score: DEFAULT_TARGET_SCORE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl OptimizationParams {
    /// Rejects budgets of zero and thresholds that are not on the 0–10 scale.
    /// A 0–100 threshold such as 90 is an error here, never silently rescaled.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".to_string());
        }
        if !self.target_score.is_finite()
            || self.target_score <= 0.0
            || self.target_score > SCORE_SCALE_MAX
        {
            return Err(format!(
                "target_score must be within (0, {SCORE_SCALE_MAX}], got {}",
                self.target_score
            ));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

/// Per-criterion scores exactly as reported by the evaluator (0–100 each).
/// Informational only: the overall score is the evaluator's own aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriterionScores {
    #[serde(default)]
    pub relevance: u32,
    #[serde(default)]
    pub tone: u32,
    #[serde(default)]
    pub examples: u32,
    #[serde(default)]
    pub skills: u32,
    #[serde(default)]
    pub clarity: u32,
    #[serde(default)]
    pub impact: u32,
}

/// One evaluation of a letter against a job, already on the 0–10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: f64,
    pub feedback: String,
    pub suggestions: Vec<String>,
    pub criteria: Option<CriterionScores>,
}

/// Converts an evaluator aggregate (0–100) to the system scale.
/// Returns `None` for values the evaluator cannot legitimately produce.
pub fn to_score_scale(raw: f64) -> Option<f64> {
    if raw.is_finite() && (0.0..=RAW_SCORE_MAX).contains(&raw) {
        Some(raw * SCORE_SCALE_MAX / RAW_SCORE_MAX)
    } else {
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outputs
// ────────────────────────────────────────────────────────────────────────────

/// One optimize→evaluate pass. Appended once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    /// Starts at 1.
    pub iteration_number: u32,
    pub letter_text: String,
    pub score: f64,
    pub feedback: String,
    pub suggestions: Vec<String>,
}

/// Final artifact of a run, owned by the caller after return.
///
/// `final_text`/`final_score` always mirror the last history record, and
/// `history.len() == iterations_used`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub final_text: String,
    pub final_score: f64,
    pub iterations_used: u32,
    pub consistency_verified: bool,
    pub history: Vec<IterationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_skill(skill: &str) -> CandidateProfile {
        CandidateProfile {
            key_skills: [skill.to_string()].into_iter().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_profile_is_empty() {
        assert!(CandidateProfile::default().is_empty());
    }

    #[test]
    fn test_profile_with_only_education_is_not_empty() {
        let profile = CandidateProfile {
            education: "B.Sc Computer Science".to_string(),
            ..Default::default()
        };
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_has_skill_ignores_case() {
        let profile = profile_with_skill("TypeScript");
        assert!(profile.has_skill("typescript"));
        assert!(!profile.has_skill("Rust"));
    }

    #[test]
    fn test_job_without_description_is_empty() {
        let job = JobContext {
            title: "Engineer".to_string(),
            description: "   ".to_string(),
            requirements: vec![],
        };
        assert!(job.is_empty());
    }

    #[test]
    fn test_params_reject_zero_iterations() {
        let params = OptimizationParams {
            target_score: 9.0,
            max_iterations: 0,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_reject_hundred_point_threshold() {
        let params = OptimizationParams {
            target_score: 90.0,
            max_iterations: 3,
        };
        let err = params.validate().unwrap_err();
        assert!(err.contains("90"), "message should echo the bad value: {err}");
    }

    #[test]
    fn test_params_accept_scale_maximum() {
        let params = OptimizationParams {
            target_score: SCORE_SCALE_MAX,
            max_iterations: 1,
        };
        assert!(params.validate().is_ok());
        assert!(OptimizationParams::default().validate().is_ok());
    }

    #[test]
    fn test_to_score_scale_converts_and_bounds() {
        assert_eq!(to_score_scale(84.0), Some(8.4));
        assert_eq!(to_score_scale(0.0), Some(0.0));
        assert_eq!(to_score_scale(100.0), Some(10.0));
        assert_eq!(to_score_scale(101.0), None);
        assert_eq!(to_score_scale(-1.0), None);
        assert_eq!(to_score_scale(f64::NAN), None);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = OptimizationResult {
            final_text: "draft".to_string(),
            final_score: 9.2,
            iterations_used: 1,
            consistency_verified: true,
            history: vec![IterationRecord {
                iteration_number: 1,
                letter_text: "draft".to_string(),
                score: 9.2,
                feedback: "Good".to_string(),
                suggestions: vec![],
            }],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["finalText"], "draft");
        assert_eq!(value["iterationsUsed"], 1);
        assert_eq!(value["consistencyVerified"], true);
        assert_eq!(value["history"][0]["iterationNumber"], 1);
        assert_eq!(value["history"][0]["letterText"], "draft");
    }
}
