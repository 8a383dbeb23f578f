//! Linear transactional wizard engine.
//!
//! A flow is an ordered, validated set of steps driven through a small
//! state machine: `Idle -> Submitting -> { next step's Idle | Error }`,
//! with the final step's success entering the terminal `Complete` status.
//! Each submission runs through an injected [`StepExecutor`], the seam a
//! production host replaces with a real backend call.

mod controller;
mod error;
mod executor;
mod machine;
mod progress;
mod step;

pub use controller::{Listener, SubscriptionId, Wizard};
pub use error::{ExecutionError, Result, WizardError};
pub use executor::{Deadline, ScriptedExecutor, SimulatedExecutor, StepExecutor, StepPayload};
pub use machine::{SubmitTicket, WizardMachine, WizardStatus, WizardView};
pub use progress::{report, StepPhase, StepReport};
pub use step::{StepDefinition, StepSet};
