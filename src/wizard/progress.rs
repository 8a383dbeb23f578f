use super::step::StepSet;

/// Where a step stands relative to the flow's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Completed,
    Current,
    Upcoming,
}

/// Read-only projection of one step for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub id: String,
    pub label: String,
    pub phase: StepPhase,
}

/// Derive the per-step view from the step set and the flow's index.
///
/// Pure and recomputed on every read; an index of `steps.len()` (the
/// terminal sentinel) marks every step completed.
pub fn report(steps: &StepSet, current_index: usize) -> Vec<StepReport> {
    steps
        .iter()
        .map(|step| {
            let phase = if step.order < current_index {
                StepPhase::Completed
            } else if step.order == current_index {
                StepPhase::Current
            } else {
                StepPhase::Upcoming
            };
            StepReport {
                id: step.id.clone(),
                label: step.label.clone(),
                phase,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::step::StepDefinition;

    fn three_steps() -> StepSet {
        StepSet::new(vec![
            StepDefinition::new("a", "A", 0),
            StepDefinition::new("b", "B", 1),
            StepDefinition::new("c", "C", 2),
        ])
        .unwrap()
    }

    #[test]
    fn phases_track_the_index() {
        let steps = three_steps();
        let cases = [
            (0, [StepPhase::Current, StepPhase::Upcoming, StepPhase::Upcoming]),
            (1, [StepPhase::Completed, StepPhase::Current, StepPhase::Upcoming]),
            (2, [StepPhase::Completed, StepPhase::Completed, StepPhase::Current]),
            (3, [StepPhase::Completed, StepPhase::Completed, StepPhase::Completed]),
        ];

        for (index, expected) in cases {
            let phases: Vec<StepPhase> = report(&steps, index).iter().map(|r| r.phase).collect();
            assert_eq!(phases, expected, "at index {index}");
        }
    }

    #[test]
    fn report_carries_ids_and_labels() {
        let steps = three_steps();
        let reports = report(&steps, 1);
        assert_eq!(reports[0].id, "a");
        assert_eq!(reports[1].label, "B");
    }
}
