use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use vantage_utils::wizard::{
    ExecutionError, ScriptedExecutor, SimulatedExecutor, StepDefinition, StepExecutor, StepPhase,
    Wizard, WizardError, WizardStatus,
};

fn four_steps() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new("commit", "Commit", 0),
        StepDefinition::new("kyc", "Identity", 1).with_retreat(),
        StepDefinition::new("signing", "Signing", 2).with_retreat(),
        StepDefinition::new("wire", "Wire", 3),
    ]
}

#[tokio::test]
async fn full_flow_completes_with_every_step_resolved() {
    let mut wizard = Wizard::new(four_steps(), Arc::new(SimulatedExecutor::instant())).unwrap();

    let payloads = [
        json!({"amount": 50_000, "currency": "USD"}),
        json!({"legal_name": "Ada Quinn", "tax_reference": "QX-4411"}),
        json!({"initials": "AQ", "agreed": true}),
        json!({"reference": "VG-260808", "confirmed": true}),
    ];

    for (idx, payload) in payloads.iter().enumerate() {
        let view = wizard.advance(payload.clone()).await.unwrap();
        assert_eq!(view.current_index, idx + 1);
    }

    let view = wizard.view();
    assert_eq!(view.status, WizardStatus::Complete);
    assert!(view
        .progress
        .iter()
        .all(|report| report.phase == StepPhase::Completed));

    // Every payload round-tripped into the committed data.
    for (payload, step) in payloads.iter().zip(["commit", "kyc", "signing", "wire"]) {
        assert_eq!(wizard.machine().data(step), Some(payload));
    }
}

#[tokio::test]
async fn wire_rejection_blocks_then_retry_completes() {
    let executor = Arc::new(ScriptedExecutor::new(Duration::ZERO));
    executor.fail_next(
        "wire",
        ExecutionError::Rejected("wire instructions were declined".to_string()),
    );
    let mut wizard = Wizard::new(four_steps(), executor).unwrap();

    for _ in 0..3 {
        wizard.advance(json!({})).await.unwrap();
    }

    let err = wizard.advance(json!({"confirmed": true})).await.unwrap_err();
    assert!(matches!(err, WizardError::Execution(_)));

    let view = wizard.view();
    assert_eq!(view.status, WizardStatus::Error);
    assert_eq!(view.current_index, 3);
    assert_eq!(
        view.last_error,
        Some(ExecutionError::Rejected(
            "wire instructions were declined".to_string()
        ))
    );

    let view = wizard.advance(json!({"confirmed": true})).await.unwrap();
    assert_eq!(view.status, WizardStatus::Complete);
    assert!(view.last_error.is_none());
}

#[tokio::test]
async fn retreat_from_identity_keeps_the_commitment() {
    let mut wizard = Wizard::new(four_steps(), Arc::new(SimulatedExecutor::instant())).unwrap();
    let commitment = json!({"amount": 25_000, "currency": "USD"});
    wizard.advance(commitment.clone()).await.unwrap();
    assert_eq!(wizard.view().current_index, 1);

    let view = wizard.retreat().unwrap();
    assert_eq!(view.current_index, 0);
    assert_eq!(view.status, WizardStatus::Idle);
    assert_eq!(wizard.machine().data("commit"), Some(&commitment));
}

#[tokio::test]
async fn outcome_after_teardown_is_inert() {
    let mut wizard = Wizard::new(
        four_steps(),
        Arc::new(SimulatedExecutor::new(Duration::from_millis(20))),
    )
    .unwrap();

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    wizard.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // Host-style submission: spawn the executor, deliver the outcome
    // through a channel.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (ticket, step) = wizard.begin().unwrap();
    let executor = wizard.executor();
    let task = tokio::spawn(async move {
        let outcome = executor.execute(&step, &json!({"amount": 1})).await;
        let _ = tx.send((ticket, outcome));
    });

    // The host tears the flow down while the submission is in flight.
    wizard.reset();
    let fired_before = notified.load(Ordering::SeqCst);

    let (ticket, outcome) = rx.recv().await.unwrap();
    task.await.unwrap();

    // The late outcome is rejected without mutating or notifying.
    let err = wizard.finish(ticket, outcome).unwrap_err();
    assert!(matches!(err, WizardError::InvalidTransition(_)));
    assert_eq!(notified.load(Ordering::SeqCst), fired_before);

    let view = wizard.view();
    assert_eq!(view.current_index, 0);
    assert_eq!(view.status, WizardStatus::Idle);
    assert!(wizard.machine().data("commit").is_none());
}

#[tokio::test]
async fn dropped_host_leaves_the_executor_task_harmless() {
    let mut wizard = Wizard::new(
        four_steps(),
        Arc::new(SimulatedExecutor::new(Duration::from_millis(10))),
    )
    .unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    let (ticket, step) = wizard.begin().unwrap();
    let executor = wizard.executor();
    let task = tokio::spawn(async move {
        let outcome = executor.execute(&step, &json!({})).await;
        let _ = tx.send((ticket, outcome));
    });

    // Drop the receiver and the wizard: the pending submission has nowhere
    // to land, and the spawned task must finish cleanly anyway.
    drop(rx);
    drop(wizard);
    task.await.unwrap();
}

#[tokio::test]
async fn completion_fires_through_the_split_api_too() {
    let mut wizard = Wizard::new(four_steps(), Arc::new(SimulatedExecutor::instant())).unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    wizard.on_complete(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    for _ in 0..4 {
        let (ticket, step) = wizard.begin().unwrap();
        let outcome = wizard.executor().execute(&step, &json!({})).await;
        wizard.finish(ticket, outcome).unwrap();
    }

    assert_eq!(wizard.view().status, WizardStatus::Complete);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
