use std::sync::Arc;

use tracing::info;

use super::error::{Result, WizardError};
use super::executor::{StepExecutor, StepPayload};
use super::machine::{SubmitTicket, WizardMachine, WizardView};
use super::step::{StepDefinition, StepSet};

/// Callback run after every state change with the fresh view.
pub type Listener = Box<dyn Fn(&WizardView) + Send>;

/// Handle for a registered listener; pass back to
/// [`Wizard::unsubscribe`] to release it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Owns one flow: the state machine, the executor it submits through, and
/// the host-facing notification surface.
pub struct Wizard {
    machine: WizardMachine,
    executor: Arc<dyn StepExecutor>,
    listeners: Vec<(u64, Listener)>,
    next_subscription: u64,
    completion: Option<Box<dyn FnOnce() + Send>>,
}

impl std::fmt::Debug for Wizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wizard")
            .field("listeners", &self.listeners.len())
            .field("next_subscription", &self.next_subscription)
            .field("completion", &self.completion.is_some())
            .finish_non_exhaustive()
    }
}

impl Wizard {
    pub fn new(steps: Vec<StepDefinition>, executor: Arc<dyn StepExecutor>) -> Result<Self> {
        let steps = StepSet::new(steps)?;
        Ok(Self {
            machine: WizardMachine::new(steps),
            executor,
            listeners: Vec::new(),
            next_subscription: 0,
            completion: None,
        })
    }

    /// Register the completion callback. It runs exactly once, the first
    /// time the flow enters `Complete`; `reset` does not re-arm it.
    pub fn on_complete(&mut self, callback: impl FnOnce() + Send + 'static) {
        self.completion = Some(Box::new(callback));
    }

    pub fn subscribe(&mut self, listener: impl Fn(&WizardView) + Send + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(key, _)| *key != id.0);
    }

    pub fn view(&self) -> WizardView {
        self.machine.view()
    }

    pub fn machine(&self) -> &WizardMachine {
        &self.machine
    }

    pub fn executor(&self) -> Arc<dyn StepExecutor> {
        Arc::clone(&self.executor)
    }

    /// Split form of [`advance`](Self::advance): move into `Submitting` and
    /// hand back the ticket plus the step to execute. Hosts that run the
    /// executor on a spawned task pair this with [`finish`](Self::finish).
    pub fn begin(&mut self) -> Result<(SubmitTicket, StepDefinition)> {
        let ticket = self.machine.begin()?;
        let step = self
            .machine
            .current_step()
            .cloned()
            .ok_or_else(|| WizardError::InvalidTransition("no active step".to_string()))?;
        self.notify();
        Ok((ticket, step))
    }

    /// Apply an executor outcome delivered out of band. Stale tickets are
    /// rejected before any listener runs, so outcomes landing after a
    /// reset or teardown stay invisible to the host.
    pub fn finish(
        &mut self,
        ticket: SubmitTicket,
        outcome: std::result::Result<StepPayload, super::error::ExecutionError>,
    ) -> Result<WizardView> {
        self.machine.resolve(ticket, outcome)?;
        self.notify();
        self.fire_completion();
        Ok(self.machine.view())
    }

    /// Submit the current step: begin, run the executor, apply the outcome.
    ///
    /// On executor failure the machine records the error (recoverable via
    /// another `advance` or `reset`) and this returns
    /// [`WizardError::Execution`]. Misuse — submitting while in flight or
    /// after completion — returns [`WizardError::InvalidTransition`] with
    /// no state change.
    pub async fn advance(&mut self, payload: StepPayload) -> Result<WizardView> {
        let (ticket, step) = self.begin()?;
        let executor = Arc::clone(&self.executor);
        let outcome = executor.execute(&step, &payload).await;
        let error = outcome.as_ref().err().cloned();

        let view = self.finish(ticket, outcome)?;
        match error {
            Some(e) => Err(WizardError::Execution(e)),
            None => Ok(view),
        }
    }

    /// Step back by one where the current step allows it.
    pub fn retreat(&mut self) -> Result<WizardView> {
        self.machine.retreat()?;
        self.notify();
        Ok(self.machine.view())
    }

    /// Return to the freshly-constructed state, discarding collected data.
    pub fn reset(&mut self) -> WizardView {
        self.machine.reset();
        self.notify();
        self.machine.view()
    }

    fn notify(&self) {
        let view = self.machine.view();
        for (_, listener) in &self.listeners {
            listener(&view);
        }
    }

    fn fire_completion(&mut self) {
        if self.machine.is_complete() {
            if let Some(callback) = self.completion.take() {
                info!("flow completion callback fired");
                callback();
            }
        }
    }
}
