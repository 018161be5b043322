// Shared prompt constants and prompt-building utilities.
// Each service that needs generation calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Common instruction appended to every rewriting prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Every claim in the letter must be traceable to the CANDIDATE PROFILE. \
    Do NOT invent employers, years of experience, skills, degrees, or team sizes. \
    If the profile does not support a claim, omit it entirely.";

/// Instruction to avoid inflating the candidate's role.
pub const SCOPE_INSTRUCTION: &str = "\
    CRITICAL: Only describe leadership (led, managed, headed) when the profile marks \
    leadership as true, and only describe mentoring when the profile marks mentoring as true. \
    NEVER state more years of experience than the profile lists. This is a hard rule.";
