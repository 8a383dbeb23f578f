use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time;
use tracing::debug;

use super::error::ExecutionError;
use super::step::StepDefinition;

/// Opaque data collected at a step. The engine never inspects it; it is
/// committed verbatim on success and handed back through the view.
pub type StepPayload = Value;

/// The asynchronous action bound to a step's submission.
///
/// Implementations must not reach into wizard state; the machine interprets
/// the returned outcome. This is the seam where a production host swaps in
/// a real backend call.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(
        &self,
        step: &StepDefinition,
        payload: &StepPayload,
    ) -> Result<StepPayload, ExecutionError>;
}

/// Default executor: resolves successfully after a fixed delay, standing in
/// for the round-trip a real submission would make.
pub struct SimulatedExecutor {
    delay: Duration,
}

impl SimulatedExecutor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Zero-delay variant for fast test execution.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl StepExecutor for SimulatedExecutor {
    async fn execute(
        &self,
        step: &StepDefinition,
        payload: &StepPayload,
    ) -> Result<StepPayload, ExecutionError> {
        if !self.delay.is_zero() {
            time::sleep(self.delay).await;
        }
        debug!(step = %step.id, "simulated step resolved");
        Ok(payload.clone())
    }
}

/// Executor with per-step scripted failures, for exercising the error path
/// deterministically.
///
/// Each queued failure is consumed by one submission of that step;
/// submissions with no queued failure succeed like [`SimulatedExecutor`].
pub struct ScriptedExecutor {
    delay: Duration,
    failures: Mutex<HashMap<String, VecDeque<ExecutionError>>>,
}

impl ScriptedExecutor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Queue a failure for the next submission of `step_id`.
    pub fn fail_next(&self, step_id: impl Into<String>, error: ExecutionError) {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(step_id.into())
            .or_default()
            .push_back(error);
    }

    fn take_failure(&self, step_id: &str) -> Option<ExecutionError> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get_mut(step_id)
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl StepExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        step: &StepDefinition,
        payload: &StepPayload,
    ) -> Result<StepPayload, ExecutionError> {
        if !self.delay.is_zero() {
            time::sleep(self.delay).await;
        }

        match self.take_failure(&step.id) {
            Some(error) => {
                debug!(step = %step.id, %error, "scripted step rejected");
                Err(error)
            }
            None => Ok(payload.clone()),
        }
    }
}

/// Wraps any executor with a maximum wait; an elapsed wait resolves to
/// [`ExecutionError::Timeout`].
pub struct Deadline<E> {
    inner: E,
    limit: Duration,
}

impl<E> Deadline<E> {
    pub fn new(inner: E, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<E: StepExecutor> StepExecutor for Deadline<E> {
    async fn execute(
        &self,
        step: &StepDefinition,
        payload: &StepPayload,
    ) -> Result<StepPayload, ExecutionError> {
        match time::timeout(self.limit, self.inner.execute(step, payload)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ExecutionError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(id: &str) -> StepDefinition {
        StepDefinition::new(id, id.to_uppercase(), 0)
    }

    #[tokio::test]
    async fn simulated_executor_echoes_payload() {
        let executor = SimulatedExecutor::instant();
        let payload = json!({ "amount": 25_000 });
        let committed = executor.execute(&step("commit"), &payload).await.unwrap();
        assert_eq!(committed, payload);
    }

    #[tokio::test]
    async fn scripted_failure_is_consumed_once() {
        let executor = ScriptedExecutor::new(Duration::ZERO);
        executor.fail_next("wire", ExecutionError::Rejected("declined".to_string()));

        let payload = json!({ "confirmed": true });
        let first = executor.execute(&step("wire"), &payload).await;
        assert_eq!(
            first,
            Err(ExecutionError::Rejected("declined".to_string()))
        );

        let second = executor.execute(&step("wire"), &payload).await;
        assert_eq!(second, Ok(payload));
    }

    #[tokio::test]
    async fn scripted_failures_are_per_step() {
        let executor = ScriptedExecutor::new(Duration::ZERO);
        executor.fail_next("wire", ExecutionError::Timeout);

        let ok = executor.execute(&step("kyc"), &json!({})).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn deadline_maps_slow_steps_to_timeout() {
        let executor = Deadline::new(
            SimulatedExecutor::new(Duration::from_millis(200)),
            Duration::from_millis(10),
        );
        let outcome = executor.execute(&step("signing"), &json!({})).await;
        assert_eq!(outcome, Err(ExecutionError::Timeout));
    }

    #[tokio::test]
    async fn deadline_passes_fast_steps_through() {
        let executor = Deadline::new(SimulatedExecutor::instant(), Duration::from_secs(1));
        let outcome = executor.execute(&step("signing"), &json!({"ok": true})).await;
        assert_eq!(outcome, Ok(json!({"ok": true})));
    }
}
