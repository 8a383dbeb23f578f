/// Modal input state for the flow screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Navigation and actions.
    #[default]
    Normal,
    /// Typing into the focused field.
    Insert,
    /// Building a `:` command.
    Command,
}

impl EditMode {
    pub fn label(&self) -> &'static str {
        match self {
            EditMode::Normal => "NORMAL",
            EditMode::Insert => "INSERT",
            EditMode::Command => "COMMAND",
        }
    }
}
