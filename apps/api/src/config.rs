use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::optimization::handlers::MAX_ITERATIONS_CAP;
use crate::optimization::models::OptimizationParams;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub generation_api_key: String,
    pub generation_api_url: String,
    pub generation_model: String,
    pub generation_timeout_secs: u64,
    pub generation_max_attempts: u32,
    /// Default target on the 0–10 scale, overridable per request.
    pub target_score: f64,
    pub max_iterations: u32,
    /// Outer wall-clock budget for a whole optimization run.
    pub optimization_timeout_secs: u64,
    pub enable_llm_profile_analysis: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            generation_api_key: require_env("GENERATION_API_KEY")?,
            generation_api_url: std::env::var("GENERATION_API_URL")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_API_URL.to_string()),
            generation_model: std::env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_MODEL.to_string()),
            generation_timeout_secs: env_or("GENERATION_TIMEOUT_SECS", 30)?,
            generation_max_attempts: env_or("GENERATION_MAX_ATTEMPTS", 3)?,
            target_score: env_or("TARGET_SCORE", 9.0)?,
            max_iterations: env_or("MAX_ITERATIONS", 3)?,
            optimization_timeout_secs: env_or("OPTIMIZATION_TIMEOUT_SECS", 300)?,
            enable_llm_profile_analysis: env_or("ENABLE_LLM_PROFILE_ANALYSIS", false)?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Stopping criteria used when a request does not override them.
    pub fn default_params(&self) -> OptimizationParams {
        OptimizationParams {
            target_score: self.target_score,
            max_iterations: self.max_iterations,
        }
    }

    /// Range checks that parsing alone cannot catch.
    fn validate(&self) -> Result<()> {
        self.default_params()
            .validate()
            .map_err(|e| anyhow!("Invalid TARGET_SCORE / MAX_ITERATIONS: {e}"))?;
        if self.max_iterations > MAX_ITERATIONS_CAP {
            return Err(anyhow!(
                "MAX_ITERATIONS must be at most {MAX_ITERATIONS_CAP}, got {}",
                self.max_iterations
            ));
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, falling back to `default` when unset.
/// A set-but-unparseable value is a startup error, not a silent default.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}"))
}
