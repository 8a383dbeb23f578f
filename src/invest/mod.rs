mod app;
mod config;
mod error;
pub mod ui;
mod widgets;

pub use app::{ConfirmAction, FlowMessage, InvestApp, Message, PanelFocus};
pub use config::InvestConfig;
pub use error::InvestError;
pub use widgets::StatusBarState;

use crate::wizard::StepDefinition;

/// The stages of the investment flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    Commit,
    Kyc,
    Signing,
    Wire,
}

impl FlowStep {
    pub const ALL: [FlowStep; 4] = [
        FlowStep::Commit,
        FlowStep::Kyc,
        FlowStep::Signing,
        FlowStep::Wire,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FlowStep::Commit => "commit",
            FlowStep::Kyc => "kyc",
            FlowStep::Signing => "signing",
            FlowStep::Wire => "wire",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlowStep::Commit => "Commit",
            FlowStep::Kyc => "Identity",
            FlowStep::Signing => "Signing",
            FlowStep::Wire => "Wire",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|step| step.id() == id)
    }
}

/// Step definitions backing the flow wizard. Identity and signing can be
/// revisited; the commitment is the entry point and the wire confirmation
/// is one-way.
pub fn flow_steps() -> Vec<StepDefinition> {
    FlowStep::ALL
        .iter()
        .enumerate()
        .map(|(order, step)| {
            let definition = StepDefinition::new(step.id(), step.label(), order);
            match step {
                FlowStep::Kyc | FlowStep::Signing => definition.with_retreat(),
                FlowStep::Commit | FlowStep::Wire => definition,
            }
        })
        .collect()
}

/// Render a whole-unit amount with thousands separators.
pub(crate) fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_steps_are_contiguous_and_typed() {
        let steps = flow_steps();
        assert_eq!(steps.len(), 4);
        for (idx, step) in steps.iter().enumerate() {
            assert_eq!(step.order, idx);
            assert!(FlowStep::from_id(&step.id).is_some());
        }
        assert!(!steps[0].allow_retreat);
        assert!(steps[1].allow_retreat);
        assert!(steps[2].allow_retreat);
        assert!(!steps[3].allow_retreat);
    }

    #[test]
    fn amounts_format_with_separators() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(950), "950");
        assert_eq!(format_amount(25_000), "25,000");
        assert_eq!(format_amount(5_000_000), "5,000,000");
    }
}
