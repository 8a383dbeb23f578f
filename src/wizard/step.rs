use super::error::{Result, WizardError};

/// One stage of a linear flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    /// Stable identifier, unique within a step set.
    pub id: String,
    /// Short display name.
    pub label: String,
    /// Position in the sequence, 0-indexed and contiguous.
    pub order: usize,
    /// Whether the flow may navigate backward while on this step.
    /// Off by default; one-way stages (a wire confirmation, say) stay off.
    pub allow_retreat: bool,
}

impl StepDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, order: usize) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            order,
            allow_retreat: false,
        }
    }

    pub fn with_retreat(mut self) -> Self {
        self.allow_retreat = true;
        self
    }
}

/// Validated, ordered collection of step definitions.
///
/// Construction is the only place malformed input can surface; once a
/// `StepSet` exists, every index in `0..len` resolves to a step.
#[derive(Debug, Clone)]
pub struct StepSet {
    steps: Vec<StepDefinition>,
}

impl StepSet {
    pub fn new(mut steps: Vec<StepDefinition>) -> Result<Self> {
        if steps.is_empty() {
            return Err(WizardError::Validation("no steps defined".to_string()));
        }

        steps.sort_by_key(|s| s.order);

        for (expected, step) in steps.iter().enumerate() {
            if step.order != expected {
                return Err(WizardError::Validation(format!(
                    "step '{}' has order {}, expected contiguous order {}",
                    step.id, step.order, expected
                )));
            }
        }

        for (idx, step) in steps.iter().enumerate() {
            if steps[..idx].iter().any(|s| s.id == step.id) {
                return Err(WizardError::Validation(format!(
                    "duplicate step id '{}'",
                    step.id
                )));
            }
        }

        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, order: usize) -> StepDefinition {
        StepDefinition::new(id, id.to_uppercase(), order)
    }

    #[test]
    fn contiguous_orders_are_accepted() {
        let set = StepSet::new(vec![step("b", 1), step("a", 0), step("c", 2)]).unwrap();
        let ids: Vec<&str> = set.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = StepSet::new(Vec::new()).unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
    }

    #[test]
    fn gap_in_orders_is_rejected() {
        let err = StepSet::new(vec![step("a", 0), step("b", 2)]).unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
    }

    #[test]
    fn duplicate_order_is_rejected() {
        let err = StepSet::new(vec![step("a", 0), step("b", 0)]).unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let err = StepSet::new(vec![step("a", 0), step("a", 1)]).unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
    }

    #[test]
    fn retreat_defaults_off() {
        assert!(!step("a", 0).allow_retreat);
        assert!(step("a", 0).with_retreat().allow_retreat);
    }
}
