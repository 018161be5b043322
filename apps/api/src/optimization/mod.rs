// Cover-letter optimization: profile analysis, the optimize/evaluate loop and
// the post-hoc consistency check.
// All remote generation goes through llm_client via the TextGenerator trait.

pub mod analyzer;
pub mod consistency;
pub mod errors;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod optimizer;
pub mod prompts;
pub mod signals;

#[cfg(test)]
pub(crate) mod testing;
