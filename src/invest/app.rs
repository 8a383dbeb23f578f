use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

use crate::input::{parse_command, Command, EditMode, InputBuffer};
use crate::ui::Theme;
use crate::wizard::{
    Deadline, ExecutionError, ScriptedExecutor, StepExecutor, StepPayload, SubmitTicket, Wizard,
    WizardError, WizardStatus, WizardView,
};

use super::config::{ExecutorConfig, InvestConfig};
use super::widgets::StatusBarState;
use super::{flow_steps, format_amount, FlowStep};

/// Outcome of a spawned step submission, delivered back to the app loop.
#[derive(Debug)]
pub enum FlowMessage {
    Resolved {
        ticket: SubmitTicket,
        outcome: Result<StepPayload, ExecutionError>,
    },
}

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Intro screen, before the flow starts.
    Welcome,
    /// Step sidebar plus the active step's content.
    Flow,
}

/// Message displayed in the message panel.
pub struct Message {
    pub text: String,
    pub is_error: bool,
}

/// Confirm dialog state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Restart,
    Quit,
}

/// Host shell for the investment flow: owns the wizard, the form buffers,
/// and the modal input state; spawns step submissions and applies their
/// outcomes when they arrive.
pub struct InvestApp {
    pub config: InvestConfig,
    pub theme: Theme,

    wizard: Wizard,

    // Modal input state
    pub mode: EditMode,
    pub command_line: InputBuffer,

    pub panel_focus: PanelFocus,
    pub focused_field: usize,

    // Form fields
    pub amount: InputBuffer,
    pub legal_name: InputBuffer,
    pub tax_reference: InputBuffer,
    pub initials: InputBuffer,

    // Overlays and messaging
    pub message: Option<Message>,
    pub confirm_action: Option<ConfirmAction>,
    pub show_help: bool,
    pub should_exit: bool,

    pub status_bar: StatusBarState,

    /// Display reference quoted in the wire instructions.
    pub wire_reference: String,

    spinner_frame: usize,

    outcome_tx: mpsc::UnboundedSender<FlowMessage>,
}

impl InvestApp {
    pub fn new(
        config: InvestConfig,
        outcome_tx: mpsc::UnboundedSender<FlowMessage>,
    ) -> crate::wizard::Result<Self> {
        let executor = build_executor(&config.executor);
        let mut wizard = Wizard::new(flow_steps(), executor)?;
        wizard.on_complete(|| info!("investment flow complete"));

        let wire_reference = format!("VG-{}", chrono::Local::now().format("%y%m%d-%H%M"));

        Ok(Self {
            config,
            theme: Theme::default(),
            wizard,
            mode: EditMode::Normal,
            command_line: InputBuffer::new(),
            panel_focus: PanelFocus::Welcome,
            focused_field: 0,
            amount: InputBuffer::new(),
            legal_name: InputBuffer::new(),
            tax_reference: InputBuffer::masked(),
            initials: InputBuffer::new(),
            message: None,
            confirm_action: None,
            show_help: false,
            should_exit: false,
            status_bar: StatusBarState::welcome(),
            wire_reference,
            spinner_frame: 0,
            outcome_tx,
        })
    }

    /// Fresh snapshot of the flow for rendering. Recomputed on every read.
    pub fn view(&self) -> WizardView {
        self.wizard.view()
    }

    /// The step the flow is on, or None once complete.
    pub fn current_step(&self) -> Option<FlowStep> {
        self.wizard
            .machine()
            .current_step()
            .and_then(|s| FlowStep::from_id(&s.id))
    }

    /// Payload committed for a step, if it has resolved.
    pub fn committed(&self, step: FlowStep) -> Option<&StepPayload> {
        self.wizard.machine().data(step.id())
    }

    pub fn is_submitting(&self) -> bool {
        self.wizard.machine().status() == WizardStatus::Submitting
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
        SPINNER[self.spinner_frame]
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Clear message on any key (unless a submission is in flight)
        if self.message.is_some() && !self.is_submitting() {
            self.message = None;
        }

        if let Some(action) = self.confirm_action {
            self.handle_confirm_key(key, action);
            self.update_status_bar();
            return;
        }

        if self.show_help {
            if key.code == KeyCode::Esc || key.code == KeyCode::Char('q') {
                self.show_help = false;
            }
            self.update_status_bar();
            return;
        }

        // Don't handle input while a submission is in flight
        if self.is_submitting() {
            return;
        }

        match self.mode {
            EditMode::Normal => self.handle_normal_mode(key),
            EditMode::Insert => self.handle_insert_mode(key),
            EditMode::Command => self.handle_command_mode(key),
        }

        self.update_status_bar();
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.confirm_action = Some(ConfirmAction::Quit);
            return;
        }

        match key.code {
            KeyCode::Char(':') => {
                self.mode = EditMode::Command;
                self.command_line.clear();
            }

            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => {
                self.focus_next_field();
            }
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => {
                self.focus_previous_field();
            }

            KeyCode::Char('i') | KeyCode::Char('a') => {
                if self.panel_focus == PanelFocus::Flow && self.field_count() > 0 {
                    self.mode = EditMode::Insert;
                }
            }

            KeyCode::Enter => match self.panel_focus {
                PanelFocus::Welcome => self.start_flow(),
                PanelFocus::Flow => self.submit_current_step(),
            },

            KeyCode::Char('?') | KeyCode::F(1) => {
                self.show_help = true;
            }

            _ => {}
        }
    }

    fn handle_insert_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = EditMode::Normal;
            }
            KeyCode::Enter => {
                if self.focused_field + 1 < self.field_count() {
                    self.focused_field += 1;
                } else {
                    self.mode = EditMode::Normal;
                    self.submit_current_step();
                }
            }
            KeyCode::Tab => {
                self.focus_next_field();
            }
            KeyCode::BackTab => {
                self.focus_previous_field();
            }
            KeyCode::Backspace => {
                if let Some(buffer) = self.focused_buffer() {
                    buffer.backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(buffer) = self.focused_buffer() {
                    buffer.delete();
                }
            }
            KeyCode::Left => {
                if let Some(buffer) = self.focused_buffer() {
                    buffer.move_left();
                }
            }
            KeyCode::Right => {
                if let Some(buffer) = self.focused_buffer() {
                    buffer.move_right();
                }
            }
            KeyCode::Home => {
                if let Some(buffer) = self.focused_buffer() {
                    buffer.move_start();
                }
            }
            KeyCode::End => {
                if let Some(buffer) = self.focused_buffer() {
                    buffer.move_end();
                }
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    if c == 'u' {
                        if let Some(buffer) = self.focused_buffer() {
                            buffer.clear();
                        }
                    }
                } else if let Some(buffer) = self.focused_buffer() {
                    buffer.insert(c);
                }
            }
            _ => {}
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = EditMode::Normal;
                self.command_line.clear();
            }
            KeyCode::Enter => {
                let line = self.command_line.content().to_string();
                self.mode = EditMode::Normal;
                self.command_line.clear();
                self.execute_command(&line);
            }
            KeyCode::Backspace => {
                if self.command_line.is_empty() {
                    self.mode = EditMode::Normal;
                } else {
                    self.command_line.backspace();
                }
            }
            KeyCode::Char(c) => {
                self.command_line.insert(c);
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, action: ConfirmAction) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.confirm_action = None;
                match action {
                    ConfirmAction::Restart => self.restart_flow(),
                    ConfirmAction::Quit => self.should_exit = true,
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_action = None;
            }
            _ => {}
        }
    }

    fn execute_command(&mut self, line: &str) {
        match parse_command(line) {
            Ok(Command::Submit) => {
                if self.panel_focus == PanelFocus::Welcome {
                    self.start_flow();
                } else {
                    self.submit_current_step();
                }
            }
            Ok(Command::Back) => self.step_back(),
            Ok(Command::Restart) => self.confirm_action = Some(ConfirmAction::Restart),
            Ok(Command::Quit) => self.confirm_action = Some(ConfirmAction::Quit),
            Ok(Command::Help) => self.show_help = true,
            Err(e) => self.set_error(e.to_string()),
        }
    }

    fn start_flow(&mut self) {
        self.panel_focus = PanelFocus::Flow;
        self.focused_field = 0;
        // Commit starts with the amount field ready to type
        self.mode = EditMode::Insert;
    }

    fn restart_flow(&mut self) {
        self.wizard.reset();
        self.amount.clear();
        self.legal_name.clear();
        self.tax_reference.clear();
        self.initials.clear();
        self.focused_field = 0;
        self.mode = EditMode::Normal;
        self.panel_focus = PanelFocus::Welcome;
        self.message = None;
    }

    fn step_back(&mut self) {
        match self.wizard.retreat() {
            Ok(_) => {
                self.focused_field = 0;
                self.set_info("Stepped back. Earlier entries are kept.".to_string());
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Validate the current step's form and hand the submission to the
    /// executor on a spawned task. The outcome comes back as a
    /// [`FlowMessage`] through the app loop.
    fn submit_current_step(&mut self) {
        let Some(step) = self.current_step() else {
            return;
        };
        let Some(payload) = self.build_payload(step) else {
            return;
        };

        match self.wizard.begin() {
            Ok((ticket, definition)) => {
                let executor = self.wizard.executor();
                let tx = self.outcome_tx.clone();
                tokio::spawn(async move {
                    let outcome = executor.execute(&definition, &payload).await;
                    // Send fails only when the app loop is gone; the
                    // outcome is then moot.
                    let _ = tx.send(FlowMessage::Resolved { ticket, outcome });
                });
            }
            // Double submit while in flight is a quiet no-op
            Err(WizardError::InvalidTransition(_)) => {}
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Apply a submission outcome. Outcomes from before a restart carry a
    /// stale ticket and are dropped by the wizard.
    pub fn handle_message(&mut self, message: FlowMessage) {
        let FlowMessage::Resolved { ticket, outcome } = message;
        let failed = outcome.is_err();

        match self.wizard.finish(ticket, outcome) {
            Ok(view) => {
                if view.status == WizardStatus::Complete {
                    let text = self.config.completion.message.clone();
                    self.set_info(text);
                } else if failed {
                    if let Some(error) = view.last_error {
                        self.set_error(error.to_string());
                    }
                } else {
                    self.focused_field = 0;
                }
            }
            Err(_) => {}
        }
        self.update_status_bar();
    }

    /// Number of editable fields on the current step.
    pub fn field_count(&self) -> usize {
        match self.current_step() {
            Some(FlowStep::Commit) => 1,
            Some(FlowStep::Kyc) => 2,
            Some(FlowStep::Signing) => 1,
            Some(FlowStep::Wire) | None => 0,
        }
    }

    fn focus_next_field(&mut self) {
        if self.focused_field + 1 < self.field_count() {
            self.focused_field += 1;
        }
    }

    fn focus_previous_field(&mut self) {
        self.focused_field = self.focused_field.saturating_sub(1);
    }

    fn focused_buffer(&mut self) -> Option<&mut InputBuffer> {
        match (self.current_step()?, self.focused_field) {
            (FlowStep::Commit, 0) => Some(&mut self.amount),
            (FlowStep::Kyc, 0) => Some(&mut self.legal_name),
            (FlowStep::Kyc, 1) => Some(&mut self.tax_reference),
            (FlowStep::Signing, 0) => Some(&mut self.initials),
            _ => None,
        }
    }

    fn build_payload(&mut self, step: FlowStep) -> Option<StepPayload> {
        match step {
            FlowStep::Commit => {
                let raw = self.amount.content().replace([',', '_', ' '], "");
                let amount: u64 = match raw.parse() {
                    Ok(n) => n,
                    Err(_) => {
                        self.set_error("Enter a whole commitment amount.".to_string());
                        return None;
                    }
                };
                let min = self.config.flow.min_commitment;
                let max = self.config.flow.max_commitment;
                let currency = self.config.flow.currency.clone();
                if amount < min || amount > max {
                    self.set_error(format!(
                        "Commitments are accepted between {} and {} {}.",
                        format_amount(min),
                        format_amount(max),
                        currency
                    ));
                    return None;
                }
                Some(json!({
                    "amount": amount,
                    "currency": currency,
                }))
            }
            FlowStep::Kyc => {
                let name = self.legal_name.content().trim().to_string();
                if name.is_empty() {
                    self.set_error("Legal name is required.".to_string());
                    return None;
                }
                let tax = self.tax_reference.content().trim().to_string();
                if tax.len() < 4 {
                    self.set_error("Tax reference looks too short.".to_string());
                    return None;
                }
                Some(json!({
                    "legal_name": name,
                    "tax_reference": tax,
                }))
            }
            FlowStep::Signing => {
                let initials = self.initials.content().trim().to_uppercase();
                if initials.is_empty() || initials.len() > 4 {
                    self.set_error("Sign with your initials (1-4 letters).".to_string());
                    return None;
                }
                if !initials.chars().all(|c| c.is_alphabetic()) {
                    self.set_error("Initials may only contain letters.".to_string());
                    return None;
                }
                Some(json!({
                    "initials": initials,
                    "agreed": true,
                }))
            }
            FlowStep::Wire => Some(json!({
                "reference": self.wire_reference,
                "confirmed": true,
            })),
        }
    }

    pub fn set_error(&mut self, text: String) {
        self.message = Some(Message {
            text,
            is_error: true,
        });
    }

    pub fn set_info(&mut self, text: String) {
        self.message = Some(Message {
            text,
            is_error: false,
        });
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 4;
        self.update_status_bar();
    }

    /// Keep the status bar hints in sync with the screen.
    pub fn update_status_bar(&mut self) {
        if self.is_submitting() {
            self.status_bar = StatusBarState::submitting();
            return;
        }

        if self.mode == EditMode::Command {
            self.status_bar = StatusBarState::command_mode();
            return;
        }

        if self.panel_focus == PanelFocus::Welcome {
            self.status_bar = StatusBarState::welcome();
            return;
        }

        let view = self.view();
        self.status_bar = match view.status {
            WizardStatus::Complete => StatusBarState::complete(),
            WizardStatus::Error => StatusBarState::retry(),
            _ => match self.current_step() {
                Some(FlowStep::Wire) => StatusBarState::confirm_step(),
                _ if self.mode == EditMode::Insert => StatusBarState::form_insert(),
                _ => StatusBarState::form_normal(),
            },
        };
    }
}

fn rejection_for(id: &str) -> ExecutionError {
    let reason = match FlowStep::from_id(id) {
        Some(FlowStep::Commit) => "commitment could not be reserved",
        Some(FlowStep::Kyc) => "identity verification failed",
        Some(FlowStep::Signing) => "signature could not be recorded",
        Some(FlowStep::Wire) => "wire instructions were declined",
        None => "submission rejected",
    };
    ExecutionError::Rejected(reason.to_string())
}

fn build_executor(config: &ExecutorConfig) -> Arc<dyn StepExecutor> {
    let scripted = ScriptedExecutor::new(config.delay());
    for id in &config.fail_once {
        scripted.fail_next(id.clone(), rejection_for(id));
    }

    match config.timeout() {
        Some(limit) => Arc::new(Deadline::new(scripted, limit)),
        None => Arc::new(scripted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> (InvestApp, mpsc::UnboundedReceiver<FlowMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut config = InvestConfig::default();
        config.executor.delay_ms = 0;
        (InvestApp::new(config, tx).unwrap(), rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_into(app: &mut InvestApp, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn enter_on_welcome_starts_the_flow_in_insert_mode() {
        let (mut app, _rx) = app();
        assert_eq!(app.panel_focus, PanelFocus::Welcome);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.panel_focus, PanelFocus::Flow);
        assert_eq!(app.mode, EditMode::Insert);
        assert_eq!(app.current_step(), Some(FlowStep::Commit));
    }

    #[tokio::test]
    async fn commit_amount_is_validated_before_submission() {
        let (mut app, mut rx) = app();
        app.handle_key(key(KeyCode::Enter));

        type_into(&mut app, "12");
        app.handle_key(key(KeyCode::Enter));

        // Below the minimum: rejected locally, nothing spawned.
        assert!(app.message.as_ref().is_some_and(|m| m.is_error));
        assert!(rx.try_recv().is_err());
        assert!(!app.is_submitting());
    }

    #[tokio::test]
    async fn valid_commit_submits_and_resolves() {
        let (mut app, mut rx) = app();
        app.handle_key(key(KeyCode::Enter));

        type_into(&mut app, "50,000");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.is_submitting());

        let message = rx.recv().await.unwrap();
        app.handle_message(message);

        assert_eq!(app.current_step(), Some(FlowStep::Kyc));
        assert_eq!(
            app.committed(FlowStep::Commit),
            Some(&json!({"amount": 50_000, "currency": "USD"}))
        );
    }

    #[tokio::test]
    async fn scripted_failure_keeps_the_step_and_retries() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut config = InvestConfig::default();
        config.executor.delay_ms = 0;
        config.executor.fail_once = vec!["commit".to_string()];
        let mut app = InvestApp::new(config, tx).unwrap();

        app.handle_key(key(KeyCode::Enter));
        type_into(&mut app, "30000");
        app.handle_key(key(KeyCode::Enter));

        let message = rx.recv().await.unwrap();
        app.handle_message(message);
        assert_eq!(app.view().status, WizardStatus::Error);
        assert_eq!(app.current_step(), Some(FlowStep::Commit));
        assert!(app.message.as_ref().is_some_and(|m| m.is_error));

        // Retry with the same entry succeeds.
        app.handle_key(key(KeyCode::Enter));
        let message = rx.recv().await.unwrap();
        app.handle_message(message);
        assert_eq!(app.current_step(), Some(FlowStep::Kyc));
    }

    #[tokio::test]
    async fn restart_discards_a_pending_outcome() {
        let (mut app, mut rx) = app();
        app.handle_key(key(KeyCode::Enter));
        type_into(&mut app, "50000");
        app.handle_key(key(KeyCode::Enter));

        // Restart while the submission is still in flight.
        app.restart_flow();
        assert_eq!(app.panel_focus, PanelFocus::Welcome);

        let message = rx.recv().await.unwrap();
        app.handle_message(message);

        // The stale outcome did not advance the fresh flow.
        let view = app.view();
        assert_eq!(view.current_index, 0);
        assert_eq!(view.status, WizardStatus::Idle);
        assert!(app.committed(FlowStep::Commit).is_none());
    }

    #[tokio::test]
    async fn second_enter_while_submitting_is_ignored() {
        let (mut app, mut rx) = app();
        app.handle_key(key(KeyCode::Enter));
        type_into(&mut app, "50000");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.is_submitting());

        // Double-click: input while in flight is dropped.
        app.handle_key(key(KeyCode::Enter));

        let message = rx.recv().await.unwrap();
        app.handle_message(message);
        assert_eq!(app.view().current_index, 1);
        assert!(rx.try_recv().is_err());
    }
}
