use thiserror::Error;

/// A `:` command entered on a flow screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Submit,
    Back,
    Restart,
    Quit,
    Help,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
}

pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    match input.trim().to_lowercase().as_str() {
        "submit" | "next" | "s" | "n" => Ok(Command::Submit),
        "back" | "b" => Ok(Command::Back),
        "restart" | "reset" => Ok(Command::Restart),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "help" | "h" | "?" => Ok(Command::Help),
        "" => Err(CommandError::Unknown("empty command".to_string())),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
