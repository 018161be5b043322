// All prompt constants for the cover-letter optimization module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for the rewrite step. Plain-text output, not JSON.
pub const OPTIMIZE_SYSTEM: &str = "You are an expert career advisor rewriting cover letters \
    for maximum impact. Respond with the rewritten cover letter only. \
    Do NOT include commentary, headings about your changes, or markdown code fences.";

/// Rewrite prompt template.
/// Replace: {grounding_instruction}, {scope_instruction}, {job_title}, {job_description},
///          {job_requirements}, {profile_skills}, {profile_experience}, {profile_education},
///          {profile_signals}, {cover_letter}
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"Optimize this cover letter for maximum impact.

{grounding_instruction}

{scope_instruction}

JOB DETAILS:
Title: {job_title}
Description: {job_description}
Key Requirements: {job_requirements}

CANDIDATE PROFILE:
Skills: {profile_skills}
Experience: {profile_experience}
Education: {profile_education}
Signals: {profile_signals}

CURRENT COVER LETTER:
{cover_letter}

OPTIMIZATION GUIDELINES:
1. Maintain professional tone and natural flow
2. Highlight specific matching skills from the candidate profile
3. Address key job requirements directly
4. Keep under 400 words
5. Use active voice and impactful language
6. Include measurable achievements where the profile supports them
7. Remove generic statements

Return the optimized cover letter as plain text."#;

/// System prompt for the evaluation step: enforces JSON-only output.
pub const EVALUATE_SYSTEM: &str = "You are a strict hiring manager scoring cover letters. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Evaluation prompt template. Replace: {cover_letter}, {job_title}, {job_description}
pub const EVALUATE_PROMPT_TEMPLATE: &str = r#"Evaluate this cover letter against the job below.
Score each criterion from 0 to 100 and give an overall totalScore from 0 to 100.

COVER LETTER:
{cover_letter}

JOB DETAILS:
Title: {job_title}
Description: {job_description}

EVALUATION CRITERIA:
1. relevance — how well it matches the job requirements
2. tone — professional tone and language
3. examples — specific examples and achievements
4. skills — skills alignment
5. clarity — clarity and conciseness
6. impact — overall impact

Return a JSON object with this EXACT schema:
{
  "scores": {
    "relevance": 0,
    "tone": 0,
    "examples": 0,
    "skills": 0,
    "clarity": 0,
    "impact": 0
  },
  "totalScore": 0,
  "feedback": "one or two sentences summarising the letter's quality",
  "suggestions": [
    "specific improvement point 1",
    "specific improvement point 2"
  ]
}"#;

/// System prompt for CV analysis: enforces JSON-only output.
pub const ANALYZE_SYSTEM: &str = "You are a senior technical recruiter extracting facts from CVs. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT infer facts that are not stated in the CV.";

/// CV analysis prompt template. Replace: {cv_text}
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"Extract the candidate's qualifications from the CV below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "yearsOfExperience": 5,
  "keySkills": ["React", "Node.js"],
  "leadership": true,
  "mentoring": false,
  "education": "B.Sc Computer Science"
}

Rules:
- yearsOfExperience: total professional years as a whole number; 0 if unknown
- keySkills: technical skills explicitly named in the CV
- leadership: true only if the CV states leading or managing people or projects
- mentoring: true only if the CV states mentoring, coaching or training others
- education: highest degree as written, or "" if none

CV TEXT:
{cv_text}"#;
