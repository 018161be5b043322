//! Consistency Checker: post-hoc advisory check that a letter does not overstate
//! the candidate's profile.
//!
//! Advisory, not gating: `check` returns `false` on any unsupported claim and
//! never fails the run. Claims are detected with the same token signals the
//! analyzer uses, so a letter built only from profile facts always passes.

use serde::{Deserialize, Serialize};

use crate::optimization::models::CandidateProfile;
use crate::optimization::signals::{
    contains_phrase, degree_families, find_skills, first_phrase, tokenize, year_claims,
    LEADERSHIP_PHRASES, MENTORING_PHRASES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    Experience,
    Skill,
    Leadership,
    Mentoring,
    Education,
}

/// A claim found in the letter with no support in the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupportedClaim {
    pub kind: ClaimKind,
    pub claim: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub consistent: bool,
    pub unsupported_claims: Vec<UnsupportedClaim>,
}

/// Whether every detectable claim in `final_text` is traceable to `profile`.
pub fn check(final_text: &str, profile: &CandidateProfile) -> bool {
    check_detailed(final_text, profile).consistent
}

/// Same as `check`, listing each unsupported claim.
pub fn check_detailed(final_text: &str, profile: &CandidateProfile) -> ConsistencyReport {
    let tokens = tokenize(final_text);
    let mut unsupported = Vec::new();

    for years in year_claims(&tokens) {
        if years > profile.years_of_experience {
            unsupported.push(UnsupportedClaim {
                kind: ClaimKind::Experience,
                claim: format!(
                    "{years} years (profile lists {})",
                    profile.years_of_experience
                ),
            });
        }
    }

    for skill in find_skills(&tokens) {
        if !profile.has_skill(&skill) {
            unsupported.push(UnsupportedClaim {
                kind: ClaimKind::Skill,
                claim: skill,
            });
        }
    }

    if !profile.leadership {
        if let Some(phrase) = first_phrase(&tokens, LEADERSHIP_PHRASES) {
            unsupported.push(UnsupportedClaim {
                kind: ClaimKind::Leadership,
                claim: phrase.to_string(),
            });
        }
    }

    if !profile.mentoring {
        if let Some(phrase) = first_phrase(&tokens, MENTORING_PHRASES) {
            unsupported.push(UnsupportedClaim {
                kind: ClaimKind::Mentoring,
                claim: phrase.to_string(),
            });
        }
    }

    unsupported.extend(education_claims(&tokens, profile));

    ConsistencyReport {
        consistent: unsupported.is_empty(),
        unsupported_claims: unsupported,
    }
}

fn education_claims(tokens: &[String], profile: &CandidateProfile) -> Vec<UnsupportedClaim> {
    let claimed = degree_families(tokens);
    let held = degree_families(&tokenize(&profile.education));

    let mut claims: Vec<UnsupportedClaim> = claimed
        .difference(&held)
        .map(|family| UnsupportedClaim {
            kind: ClaimKind::Education,
            claim: format!("{family:?} degree"),
        })
        .collect();

    // A generic "degree" mention needs some education on record.
    if claimed.is_empty()
        && profile.education.trim().is_empty()
        && contains_phrase(tokens, "degree")
    {
        claims.push(UnsupportedClaim {
            kind: ClaimKind::Education,
            claim: "degree".to_string(),
        });
    }
    claims
}
