//! Text signals shared by the profile analyzer and the consistency checker.
//!
//! Everything here works on a simple token stream: lowercase words where `+`, `#`
//! and inner `.` are kept so that "C++", "C#", "Node.js" and "B.Sc" survive intact.
//! Multi-word phrases match as consecutive tokens.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Canonical skill name followed by the spellings that count as a mention.
const SKILL_VOCABULARY: &[(&str, &[&str])] = &[
    ("Rust", &["rust"]),
    ("Python", &["python"]),
    ("Java", &["java"]),
    ("JavaScript", &["javascript"]),
    ("TypeScript", &["typescript"]),
    ("Golang", &["golang"]),
    ("C++", &["c++"]),
    ("C#", &["c#"]),
    ("Ruby", &["ruby"]),
    ("PHP", &["php"]),
    ("Kotlin", &["kotlin"]),
    ("Scala", &["scala"]),
    ("SQL", &["sql"]),
    ("React", &["react", "react.js", "reactjs"]),
    ("Angular", &["angular"]),
    ("Vue", &["vue", "vue.js"]),
    ("Node.js", &["node.js", "nodejs"]),
    ("Express.js", &["express.js", "expressjs"]),
    ("Next.js", &["next.js", "nextjs"]),
    ("Django", &["django"]),
    ("Flask", &["flask"]),
    ("Spring Boot", &["spring boot"]),
    ("GraphQL", &["graphql"]),
    ("REST APIs", &["rest api", "rest apis", "restful"]),
    ("AWS", &["aws", "amazon web services"]),
    ("Azure", &["azure"]),
    ("GCP", &["gcp", "google cloud"]),
    ("Docker", &["docker"]),
    ("Kubernetes", &["kubernetes", "k8s"]),
    ("Terraform", &["terraform"]),
    ("CI/CD", &["ci/cd", "ci cd"]),
    ("PostgreSQL", &["postgresql", "postgres"]),
    ("MySQL", &["mysql"]),
    ("MongoDB", &["mongodb", "mongo"]),
    ("Redis", &["redis"]),
    ("Kafka", &["kafka"]),
    ("Linux", &["linux"]),
    ("Git", &["git"]),
    ("HTML", &["html"]),
    ("CSS", &["css"]),
    ("Machine Learning", &["machine learning"]),
    ("TensorFlow", &["tensorflow"]),
    ("PyTorch", &["pytorch"]),
    ("Microservices", &["microservices", "microservice"]),
];

/// Spellings that name a skill only when they are the whole entry, such as a
/// skills list item "Go". In running text they are ordinary words.
const STANDALONE_SKILL_ALIASES: &[(&str, &str)] = &[("go", "Golang")];

pub(crate) const LEADERSHIP_PHRASES: &[&str] = &[
    "led",
    "leadership",
    "team lead",
    "tech lead",
    "technical lead",
    "lead developer",
    "lead engineer",
    "head of",
    "managed a team",
    "managed teams",
    "managing a team",
    "leading a team",
    "leading teams",
    "supervised",
    "spearheaded",
];

pub(crate) const MENTORING_PHRASES: &[&str] = &[
    "mentor",
    "mentors",
    "mentored",
    "mentoring",
    "mentorship",
    "coached",
    "coaching",
];

const YEAR_UNITS: &[&str] = &["year", "years", "yrs", "yr"];

const NUMBER_WORDS: &[(&str, u32)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("fifteen", 15),
    ("twenty", 20),
];

const OPEN_RANGE_ENDS: &[&str] = &["present", "current", "now", "today"];

/// Broad degree families; a letter may only claim a family the CV shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeFamily {
    Bachelor,
    Master,
    Doctorate,
}

const DEGREE_MARKERS: &[(DegreeFamily, &[&str])] = &[
    (
        DegreeFamily::Bachelor,
        &[
            "bachelor", "bachelors", "b.sc", "bsc", "b.s", "b.a", "b.eng", "beng", "b.tech",
            "btech", "undergraduate degree",
        ],
    ),
    (
        DegreeFamily::Master,
        &[
            "master", "masters", "m.sc", "msc", "m.s", "mba", "m.eng", "meng", "m.tech", "mtech",
        ],
    ),
    (
        DegreeFamily::Doctorate,
        &["phd", "ph.d", "doctorate", "doctoral", "d.phil", "dphil"],
    ),
];

// ────────────────────────────────────────────────────────────────────────────
// Tokenizer
// ────────────────────────────────────────────────────────────────────────────

/// Lowercased tokens. Separators are any characters other than alphanumerics,
/// `+`, `#` and `.`; leading/trailing dots are trimmed from each token.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#' || c == '.'))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// True if the token stream contains `phrase` as consecutive tokens.
pub(crate) fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let needle = tokenize(phrase);
    if needle.is_empty() || needle.len() > tokens.len() {
        return false;
    }
    tokens.windows(needle.len()).any(|w| w == needle.as_slice())
}

/// Returns the first phrase from `phrases` present in `tokens`.
pub(crate) fn first_phrase<'a>(tokens: &[String], phrases: &[&'a str]) -> Option<&'a str> {
    phrases.iter().copied().find(|p| contains_phrase(tokens, p))
}

// ────────────────────────────────────────────────────────────────────────────
// Extractors
// ────────────────────────────────────────────────────────────────────────────

/// Canonical names of every vocabulary skill mentioned in `tokens`.
pub(crate) fn find_skills(tokens: &[String]) -> BTreeSet<String> {
    SKILL_VOCABULARY
        .iter()
        .filter(|(_, aliases)| aliases.iter().any(|a| contains_phrase(tokens, a)))
        .map(|(canonical, _)| canonical.to_string())
        .collect()
}

/// Canonical vocabulary names for one skill entry as written by a person or a
/// model, e.g. "ReactJS" gives "React" and "Postgres" gives "PostgreSQL".
pub(crate) fn canonical_skills(entry: &str) -> BTreeSet<String> {
    let mut skills = find_skills(&tokenize(entry));
    let whole = entry.trim().to_lowercase();
    for (alias, canonical) in STANDALONE_SKILL_ALIASES {
        if whole == *alias {
            skills.insert(canonical.to_string());
        }
    }
    skills
}

/// Every "N years" style claim, e.g. "5 years", "5+ yrs", "five years".
pub(crate) fn year_claims(tokens: &[String]) -> Vec<u32> {
    tokens
        .windows(2)
        .filter(|w| YEAR_UNITS.contains(&w[1].as_str()))
        .filter_map(|w| parse_count(&w[0]))
        .collect()
}

fn parse_count(token: &str) -> Option<u32> {
    let digits = token.trim_end_matches('+');
    if let Ok(n) = digits.parse::<u32>() {
        // Four-digit numbers before "years" are calendar years, not durations.
        return (n < 100).then_some(n);
    }
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == digits)
        .map(|(_, n)| *n)
}

/// Years spanned by date ranges such as "2015-2020" or "2020 - Present".
/// Returns the distance from the earliest start to the latest end.
pub(crate) fn employment_span_years(tokens: &[String], reference_year: i32) -> u32 {
    let mut earliest: Option<i32> = None;
    let mut latest: Option<i32> = None;

    for w in tokens.windows(2) {
        let Some(start) = parse_calendar_year(&w[0], reference_year) else {
            continue;
        };
        let end = if OPEN_RANGE_ENDS.contains(&w[1].as_str()) {
            reference_year
        } else if let Some(end) = parse_calendar_year(&w[1], reference_year) {
            end
        } else {
            continue;
        };
        if end < start {
            continue;
        }
        earliest = Some(earliest.map_or(start, |e| e.min(start)));
        latest = Some(latest.map_or(end, |l| l.max(end)));
    }

    match (earliest, latest) {
        (Some(start), Some(end)) => (end - start) as u32,
        _ => 0,
    }
}

fn parse_calendar_year(token: &str, reference_year: i32) -> Option<i32> {
    if token.len() != 4 {
        return None;
    }
    token
        .parse::<i32>()
        .ok()
        .filter(|y| (1950..=reference_year).contains(y))
}

/// Degree families mentioned in `tokens`.
pub(crate) fn degree_families(tokens: &[String]) -> BTreeSet<DegreeFamily> {
    DEGREE_MARKERS
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| contains_phrase(tokens, m)))
        .map(|(family, _)| *family)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_language_punctuation() {
        let tokens = tokenize("Built APIs in C++, C# and Node.js. Holds a B.Sc.");
        assert!(tokens.contains(&"c++".to_string()));
        assert!(tokens.contains(&"c#".to_string()));
        assert!(tokens.contains(&"node.js".to_string()));
        assert!(tokens.contains(&"b.sc".to_string()));
    }

    #[test]
    fn test_contains_phrase_requires_consecutive_tokens() {
        let tokens = tokenize("I managed a small team of five");
        assert!(contains_phrase(&tokens, "managed a small team"));
        assert!(!contains_phrase(&tokens, "managed a team"));
    }

    #[test]
    fn test_find_skills_uses_word_boundaries() {
        // "javascript" must not produce "Java"; "trust" must not produce "Rust".
        let skills = find_skills(&tokenize("I trust JavaScript and React.js"));
        assert!(skills.contains("JavaScript"));
        assert!(skills.contains("React"));
        assert!(!skills.contains("Java"));
        assert!(!skills.contains("Rust"));
    }

    #[test]
    fn test_find_skills_multi_word_and_aliases() {
        let skills = find_skills(&tokenize("Shipped CI/CD on k8s with Spring Boot"));
        assert!(skills.contains("CI/CD"));
        assert!(skills.contains("Kubernetes"));
        assert!(skills.contains("Spring Boot"));
    }

    #[test]
    fn test_canonical_skills_maps_common_spellings() {
        assert!(canonical_skills("ReactJS").contains("React"));
        assert!(canonical_skills("Postgres").contains("PostgreSQL"));
        assert!(canonical_skills(" Go ").contains("Golang"));
        assert!(canonical_skills("Node.js / AWS").contains("AWS"));
        assert!(canonical_skills("Team building").is_empty());
    }

    #[test]
    fn test_go_in_running_text_is_not_a_skill() {
        assert!(!find_skills(&tokenize("Ready to go live")).contains("Golang"));
    }

    #[test]
    fn test_year_claims_digits_plus_and_words() {
        let tokens = tokenize("5+ years of Rust, three years of Go, and 2 yrs on-call");
        assert_eq!(year_claims(&tokens), vec![5, 3, 2]);
    }

    #[test]
    fn test_year_claims_ignores_calendar_years() {
        assert!(year_claims(&tokenize("in 2019 years were different")).is_empty());
    }

    #[test]
    fn test_employment_span_open_and_closed_ranges() {
        let tokens = tokenize("Tech Corp (2020-Present)\nStartup Inc (2016 - 2019)");
        assert_eq!(employment_span_years(&tokens, 2024), 8);
    }

    #[test]
    fn test_employment_span_without_ranges_is_zero() {
        assert_eq!(employment_span_years(&tokenize("Graduated 2018"), 2024), 0);
    }

    #[test]
    fn test_degree_families() {
        let families = degree_families(&tokenize("B.Sc Computer Science, then a PhD"));
        assert!(families.contains(&DegreeFamily::Bachelor));
        assert!(families.contains(&DegreeFamily::Doctorate));
        assert!(!families.contains(&DegreeFamily::Master));
    }

    #[test]
    fn test_first_phrase_finds_leadership_signal() {
        let tokens = tokenize("Led team of 5 developers");
        assert_eq!(first_phrase(&tokens, LEADERSHIP_PHRASES), Some("led"));
        assert_eq!(first_phrase(&tokens, MENTORING_PHRASES), None);
    }
}
