//! Scripted test double for `TextGenerator`.
//!
//! Each optimize/evaluate call pops the next scripted answer; an exhausted script
//! answers with a malformed-response error so over-calling fails loudly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::llm_client::GenerationServiceError;
use crate::optimization::generator::TextGenerator;
use crate::optimization::models::{CandidateProfile, Evaluation, JobContext};

#[derive(Default)]
pub(crate) struct ScriptedGenerator {
    drafts: Mutex<VecDeque<Result<String, GenerationServiceError>>>,
    evaluations: Mutex<VecDeque<Result<Evaluation, GenerationServiceError>>>,
    optimize_inputs: Mutex<Vec<String>>,
    optimize_calls: AtomicU32,
    evaluate_calls: AtomicU32,
    cancel_after_evaluations: Option<(u32, CancellationToken)>,
}

impl ScriptedGenerator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues one successful optimize→evaluate round.
    pub(crate) fn with_round(self, draft: &str, score: f64) -> Self {
        self.with_draft(Ok(draft.to_string()))
            .with_evaluation(Ok(evaluation(score)))
    }

    pub(crate) fn with_draft(self, draft: Result<String, GenerationServiceError>) -> Self {
        self.drafts.lock().unwrap().push_back(draft);
        self
    }

    pub(crate) fn with_evaluation(
        self,
        evaluation: Result<Evaluation, GenerationServiceError>,
    ) -> Self {
        self.evaluations.lock().unwrap().push_back(evaluation);
        self
    }

    /// Cancels `token` as soon as the `n`th evaluation has been answered.
    pub(crate) fn cancelling_after(mut self, n: u32, token: CancellationToken) -> Self {
        self.cancel_after_evaluations = Some((n, token));
        self
    }

    pub(crate) fn optimize_calls(&self) -> u32 {
        self.optimize_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn evaluate_calls(&self) -> u32 {
        self.evaluate_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn total_calls(&self) -> u32 {
        self.optimize_calls() + self.evaluate_calls()
    }

    /// The letter text handed to each optimize call, in order.
    pub(crate) fn optimize_inputs(&self) -> Vec<String> {
        self.optimize_inputs.lock().unwrap().clone()
    }
}

pub(crate) fn evaluation(score: f64) -> Evaluation {
    Evaluation {
        score,
        feedback: format!("scored {score}"),
        suggestions: vec![format!("suggestion for {score}")],
        criteria: None,
    }
}

fn exhausted() -> GenerationServiceError {
    GenerationServiceError::MalformedResponse("script exhausted".to_string())
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn optimize(
        &self,
        text: &str,
        _job: &JobContext,
        _profile: &CandidateProfile,
    ) -> Result<String, GenerationServiceError> {
        self.optimize_calls.fetch_add(1, Ordering::SeqCst);
        self.optimize_inputs.lock().unwrap().push(text.to_string());
        self.drafts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted()))
    }

    async fn evaluate(
        &self,
        _text: &str,
        _job: &JobContext,
    ) -> Result<Evaluation, GenerationServiceError> {
        let n = self.evaluate_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let answer = self
            .evaluations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted()));
        if let Some((after, token)) = &self.cancel_after_evaluations {
            if n >= *after {
                token.cancel();
            }
        }
        answer
    }
}
