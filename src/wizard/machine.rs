use std::collections::HashMap;

use tracing::{debug, info};

use super::error::{ExecutionError, Result, WizardError};
use super::executor::StepPayload;
use super::progress::{self, StepReport};
use super::step::{StepDefinition, StepSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStatus {
    /// Awaiting user action on the current step.
    Idle,
    /// A submission is in flight; further submissions are rejected.
    Submitting,
    /// The last submission failed; the step may be retried.
    Error,
    /// All steps resolved. Terminal.
    Complete,
}

/// Identifies one in-flight submission. A ticket is only honored if no
/// other transition happened since it was issued, which makes outcomes
/// that arrive after a reset, retreat, or teardown harmless no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    epoch: u64,
}

/// Derived, read-only snapshot for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardView {
    /// Index of the active step; equals the step count once complete.
    pub current_index: usize,
    pub status: WizardStatus,
    pub last_error: Option<ExecutionError>,
    pub progress: Vec<StepReport>,
}

/// Single source of truth for flow progress. All mutation goes through the
/// transition methods; rendering reads [`WizardMachine::view`].
pub struct WizardMachine {
    steps: StepSet,
    current: usize,
    status: WizardStatus,
    last_error: Option<ExecutionError>,
    data: HashMap<String, StepPayload>,
    epoch: u64,
}

impl WizardMachine {
    pub fn new(steps: StepSet) -> Self {
        Self {
            steps,
            current: 0,
            status: WizardStatus::Idle,
            last_error: None,
            data: HashMap::new(),
            epoch: 0,
        }
    }

    pub fn steps(&self) -> &StepSet {
        &self.steps
    }

    /// The step the flow is on, or None once complete.
    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.steps.get(self.current)
    }

    /// Payload committed for a step, if it has resolved successfully.
    pub fn data(&self, step_id: &str) -> Option<&StepPayload> {
        self.data.get(step_id)
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == WizardStatus::Complete
    }

    /// Move the current step into `Submitting`.
    ///
    /// Legal from `Idle` or `Error` (retry clears the recorded error). The
    /// returned ticket must be handed back to [`resolve`](Self::resolve)
    /// with the executor's outcome. A second `begin` while a submission is
    /// in flight is rejected without touching state.
    pub fn begin(&mut self) -> Result<SubmitTicket> {
        match self.status {
            WizardStatus::Submitting => Err(WizardError::InvalidTransition(
                "a submission is already in flight".to_string(),
            )),
            WizardStatus::Complete => Err(WizardError::InvalidTransition(
                "the flow is already complete".to_string(),
            )),
            WizardStatus::Idle | WizardStatus::Error => {
                self.status = WizardStatus::Submitting;
                self.last_error = None;
                self.epoch += 1;
                debug!(step = self.current, "submission started");
                Ok(SubmitTicket { epoch: self.epoch })
            }
        }
    }

    /// Apply an executor outcome for the submission identified by `ticket`.
    ///
    /// Success commits the payload under the current step id and advances
    /// the index, entering `Complete` after the last step. Failure records
    /// the error and stays on the step. A ticket issued before any other
    /// transition (reset, retreat, another resolve) is stale and rejected
    /// with no state change.
    pub fn resolve(
        &mut self,
        ticket: SubmitTicket,
        outcome: std::result::Result<StepPayload, ExecutionError>,
    ) -> Result<()> {
        if self.status != WizardStatus::Submitting || ticket.epoch != self.epoch {
            return Err(WizardError::InvalidTransition(
                "stale submission outcome".to_string(),
            ));
        }

        self.epoch += 1;

        match outcome {
            Ok(payload) => {
                let step_id = self
                    .steps
                    .get(self.current)
                    .map(|s| s.id.clone())
                    .ok_or_else(|| {
                        WizardError::InvalidTransition("no active step".to_string())
                    })?;
                self.data.insert(step_id.clone(), payload);

                if self.current + 1 == self.steps.len() {
                    self.current = self.steps.len();
                    self.status = WizardStatus::Complete;
                    info!(step = %step_id, "flow complete");
                } else {
                    self.current += 1;
                    self.status = WizardStatus::Idle;
                    debug!(step = %step_id, next = self.current, "step resolved");
                }
                Ok(())
            }
            Err(error) => {
                debug!(step = self.current, %error, "step failed");
                self.status = WizardStatus::Error;
                self.last_error = Some(error);
                Ok(())
            }
        }
    }

    /// Step back by exactly one, where the current step permits it.
    /// Collected payloads are kept for the re-visit.
    pub fn retreat(&mut self) -> Result<()> {
        match self.status {
            WizardStatus::Submitting => {
                return Err(WizardError::InvalidTransition(
                    "a submission is in flight".to_string(),
                ));
            }
            WizardStatus::Complete => {
                return Err(WizardError::InvalidTransition(
                    "the flow is already complete".to_string(),
                ));
            }
            WizardStatus::Idle | WizardStatus::Error => {}
        }

        let step = self.steps.get(self.current).ok_or_else(|| {
            WizardError::InvalidTransition("no active step".to_string())
        })?;

        if !step.allow_retreat {
            return Err(WizardError::InvalidTransition(format!(
                "step '{}' does not allow backward navigation",
                step.id
            )));
        }

        if self.current == 0 {
            return Err(WizardError::InvalidTransition(
                "already on the first step".to_string(),
            ));
        }

        self.epoch += 1;
        self.current -= 1;
        self.status = WizardStatus::Idle;
        self.last_error = None;
        debug!(step = self.current, "stepped back");
        Ok(())
    }

    /// Return to the construction state. Always succeeds; collected data
    /// is discarded and any in-flight submission becomes stale.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.current = 0;
        self.status = WizardStatus::Idle;
        self.last_error = None;
        self.data.clear();
        debug!("flow reset");
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            current_index: self.current,
            status: self.status,
            last_error: self.last_error.clone(),
            progress: progress::report(&self.steps, self.current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn machine() -> WizardMachine {
        let steps = StepSet::new(vec![
            StepDefinition::new("commit", "Commit", 0),
            StepDefinition::new("kyc", "Identity", 1).with_retreat(),
            StepDefinition::new("signing", "Signing", 2).with_retreat(),
            StepDefinition::new("wire", "Wire", 3),
        ])
        .unwrap();
        WizardMachine::new(steps)
    }

    fn advance_ok(m: &mut WizardMachine, payload: StepPayload) {
        let ticket = m.begin().unwrap();
        m.resolve(ticket, Ok(payload)).unwrap();
    }

    #[test]
    fn index_increases_by_one_per_successful_submission() {
        let mut m = machine();
        for expected in 1..=4 {
            advance_ok(&mut m, json!({}));
            assert_eq!(m.view().current_index, expected);
        }
        assert_eq!(m.status(), WizardStatus::Complete);
    }

    #[test]
    fn second_begin_while_submitting_is_rejected() {
        let mut m = machine();
        let ticket = m.begin().unwrap();

        let err = m.begin().unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition(_)));

        let before = m.view();
        assert_eq!(before.current_index, 0);
        assert_eq!(before.status, WizardStatus::Submitting);

        // The original submission still resolves normally.
        m.resolve(ticket, Ok(json!({}))).unwrap();
        assert_eq!(m.view().current_index, 1);
    }

    #[test]
    fn failure_keeps_the_index_and_records_the_error() {
        let mut m = machine();
        let ticket = m.begin().unwrap();
        m.resolve(ticket, Err(ExecutionError::Rejected("declined".to_string())))
            .unwrap();

        let view = m.view();
        assert_eq!(view.current_index, 0);
        assert_eq!(view.status, WizardStatus::Error);
        assert_eq!(
            view.last_error,
            Some(ExecutionError::Rejected("declined".to_string()))
        );
        assert!(m.data("commit").is_none());
    }

    #[test]
    fn retry_after_failure_clears_the_error_and_advances() {
        let mut m = machine();
        let ticket = m.begin().unwrap();
        m.resolve(ticket, Err(ExecutionError::Timeout)).unwrap();

        let ticket = m.begin().unwrap();
        assert!(m.view().last_error.is_none());
        m.resolve(ticket, Ok(json!({"attempt": 2}))).unwrap();

        assert_eq!(m.view().current_index, 1);
        assert_eq!(m.data("commit"), Some(&json!({"attempt": 2})));
    }

    #[test]
    fn committed_payload_round_trips() {
        let mut m = machine();
        let payload = json!({ "amount": 50_000, "currency": "USD" });
        advance_ok(&mut m, payload.clone());
        assert_eq!(m.data("commit"), Some(&payload));
    }

    #[test]
    fn retreat_requires_opt_in() {
        let mut m = machine();
        advance_ok(&mut m, json!({}));

        // kyc opts in; stepping back keeps commit's data.
        m.retreat().unwrap();
        let view = m.view();
        assert_eq!(view.current_index, 0);
        assert_eq!(view.status, WizardStatus::Idle);
        assert!(m.data("commit").is_some());

        // commit does not opt in.
        let err = m.retreat().unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition(_)));
    }

    #[test]
    fn retreat_is_rejected_while_submitting_and_when_complete() {
        let mut m = machine();
        let ticket = m.begin().unwrap();
        assert!(m.retreat().is_err());
        m.resolve(ticket, Ok(json!({}))).unwrap();

        for _ in 0..3 {
            advance_ok(&mut m, json!({}));
        }
        assert!(m.is_complete());
        assert!(m.retreat().is_err());
    }

    #[test]
    fn reset_restores_the_post_construction_view() {
        let mut m = machine();
        let initial = m.view();

        advance_ok(&mut m, json!({"amount": 1}));
        advance_ok(&mut m, json!({"name": "x"}));
        m.reset();

        assert_eq!(m.view(), initial);
        assert!(m.data("commit").is_none());

        // Reset is also legal mid-submission and from terminal state.
        let _ = m.begin().unwrap();
        m.reset();
        assert_eq!(m.view(), initial);
    }

    #[test]
    fn stale_ticket_after_reset_is_a_no_op() {
        let mut m = machine();
        let ticket = m.begin().unwrap();
        m.reset();

        let err = m.resolve(ticket, Ok(json!({"late": true}))).unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition(_)));

        let view = m.view();
        assert_eq!(view.current_index, 0);
        assert_eq!(view.status, WizardStatus::Idle);
        assert!(m.data("commit").is_none());
    }

    #[test]
    fn double_resolve_is_rejected() {
        let mut m = machine();
        let ticket = m.begin().unwrap();
        m.resolve(ticket, Ok(json!({}))).unwrap();

        let err = m.resolve(ticket, Ok(json!({}))).unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition(_)));
        assert_eq!(m.view().current_index, 1);
    }

    #[test]
    fn begin_after_completion_is_rejected() {
        let mut m = machine();
        for _ in 0..4 {
            advance_ok(&mut m, json!({}));
        }
        let err = m.begin().unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition(_)));
    }
}
