//! Job matching: ranks listings for a candidate by a fixed additive score.
//!
//! Weights:
//! - saved listing        +30
//! - applied to listing   +20
//! - each requirement covered by a candidate skill  +10
//! - same location        +15
//! - preferred job type   +10
//!
//! String comparisons ignore ASCII case. Ties keep the input order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::JobRow;

pub const SAVED_WEIGHT: u32 = 30;
pub const APPLIED_WEIGHT: u32 = 20;
pub const REQUIREMENT_WEIGHT: u32 = 10;
pub const LOCATION_WEIGHT: u32 = 15;
pub const JOB_TYPE_WEIGHT: u32 = 10;

/// Number of listings returned by `rank_jobs`.
pub const TOP_MATCHES: usize = 10;

/// What the caller knows about the candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchCandidate {
    #[serde(default)]
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub preferred_job_type: Option<String>,
    #[serde(default)]
    pub saved_job_ids: Vec<Uuid>,
    #[serde(default)]
    pub applied_job_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobMatch {
    pub job: JobRow,
    pub score: u32,
}

pub fn calculate_match_score(candidate: &MatchCandidate, job: &JobRow) -> u32 {
    let mut score = 0;

    if candidate.saved_job_ids.contains(&job.id) {
        score += SAVED_WEIGHT;
    }
    if candidate.applied_job_ids.contains(&job.id) {
        score += APPLIED_WEIGHT;
    }

    let covered = job
        .requirements
        .iter()
        .filter(|req| candidate.skills.iter().any(|s| s.eq_ignore_ascii_case(req)))
        .count() as u32;
    score += covered * REQUIREMENT_WEIGHT;

    if same_text(candidate.location.as_deref(), job.location.as_deref()) {
        score += LOCATION_WEIGHT;
    }
    if same_text(candidate.preferred_job_type.as_deref(), job.job_type.as_deref()) {
        score += JOB_TYPE_WEIGHT;
    }

    score
}

/// Scores every listing and keeps the best `TOP_MATCHES`, highest first.
pub fn rank_jobs(candidate: &MatchCandidate, jobs: Vec<JobRow>) -> Vec<JobMatch> {
    let mut matches: Vec<JobMatch> = jobs
        .into_iter()
        .map(|job| JobMatch {
            score: calculate_match_score(candidate, &job),
            job,
        })
        .collect();

    // sort_by is stable
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(TOP_MATCHES);
    matches
}

fn same_text(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            let (a, b) = (a.trim(), b.trim());
            !a.is_empty() && a.eq_ignore_ascii_case(b)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_job(title: &str, requirements: &[&str], location: Option<&str>, job_type: Option<&str>) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: location.map(String::from),
            description: "Build things".to_string(),
            requirements: requirements.iter().map(|s| s.to_string()).collect(),
            job_type: job_type.map(String::from),
            application_link: None,
            source: "manual".to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_all_weights_add_up() {
        let job = make_job("Engineer", &["React", "AWS", "Go"], Some("Lagos"), Some("Full-time"));
        let candidate = MatchCandidate {
            skills: vec!["react".to_string(), "AWS".to_string()],
            location: Some("lagos".to_string()),
            preferred_job_type: Some("full-time".to_string()),
            saved_job_ids: vec![job.id],
            applied_job_ids: vec![job.id],
        };
        assert_eq!(calculate_match_score(&candidate, &job), 30 + 20 + 20 + 15 + 10);
    }

    #[test]
    fn test_missing_fields_score_zero() {
        let job = make_job("Engineer", &["React"], None, None);
        assert_eq!(calculate_match_score(&MatchCandidate::default(), &job), 0);
    }

    #[test]
    fn test_rank_keeps_top_ten_descending() {
        let jobs: Vec<JobRow> = (0..15)
            .map(|i| {
                let reqs: Vec<&str> = ["React", "AWS", "Go", "Rust"].into_iter().take(i % 5).collect();
                make_job(&format!("job {i}"), &reqs, None, None)
            })
            .collect();
        let candidate = MatchCandidate {
            skills: ["React", "AWS", "Go", "Rust"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };

        let ranked = rank_jobs(&candidate, jobs);

        assert_eq!(ranked.len(), TOP_MATCHES);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(ranked[0].score, 40);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let jobs = vec![
            make_job("first", &[], None, None),
            make_job("second", &[], None, None),
        ];
        let ranked = rank_jobs(&MatchCandidate::default(), jobs);
        assert_eq!(ranked[0].job.title, "first");
        assert_eq!(ranked[1].job.title, "second");
    }
}
