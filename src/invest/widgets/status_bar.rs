/// Dynamic status bar hints, updated by the app as the screen changes.
#[derive(Debug, Clone, Default)]
pub struct StatusBarState {
    pub left_hint: String,
    pub right_hint: String,
}

impl StatusBarState {
    pub fn welcome() -> Self {
        Self {
            left_hint: String::new(),
            right_hint: "Enter: begin".to_string(),
        }
    }

    pub fn form_normal() -> Self {
        Self {
            left_hint: "j/k: fields  i: edit".to_string(),
            right_hint: "Enter: submit  :help".to_string(),
        }
    }

    pub fn form_insert() -> Self {
        Self {
            left_hint: "Type to enter text".to_string(),
            right_hint: "Esc: normal  Tab: next field".to_string(),
        }
    }

    pub fn confirm_step() -> Self {
        Self {
            left_hint: "Review the instructions".to_string(),
            right_hint: "Enter: confirm  :help".to_string(),
        }
    }

    pub fn submitting() -> Self {
        Self {
            left_hint: "Submitting...".to_string(),
            right_hint: String::new(),
        }
    }

    pub fn retry() -> Self {
        Self {
            left_hint: "Submission failed".to_string(),
            right_hint: "Enter: retry  :restart".to_string(),
        }
    }

    pub fn complete() -> Self {
        Self {
            left_hint: "Flow complete".to_string(),
            right_hint: ":quit to exit  :restart to run again".to_string(),
        }
    }

    pub fn command_mode() -> Self {
        Self {
            left_hint: String::new(),
            right_hint: "Enter: run  Esc: cancel".to_string(),
        }
    }
}
