#![forbid(unsafe_code)]

use std::process::{Command, Stdio};

use crate::error::TodoError;
use crate::notify::Notifier;

/// Runs `<command> <title> <body>`, e.g. `notify-send`.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    pub command: String,
}

impl CommandNotifier {
    #[must_use]
    pub fn new(command: String) -> Self {
        Self { command }
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), TodoError> {
        let status = match Command::new(&self.command)
            .args([title, body])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) => status,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TodoError::NotificationDenied(format!(
                    "{} was not found in PATH",
                    self.command
                )));
            }
            Err(e) => {
                return Err(TodoError::Other(format!(
                    "failed to run {}: {e}",
                    self.command
                )));
            }
        };
        if status.success() {
            Ok(())
        } else {
            Err(TodoError::NotificationDenied(format!(
                "{} exited with code {code}",
                self.command,
                code = status.code().unwrap_or(1)
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_command_is_reported_as_denied() {
        let n = CommandNotifier::new("todotui-no-such-notifier".to_owned());
        assert!(matches!(
            n.notify("Task added", "x"),
            Err(TodoError::NotificationDenied(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_decides_success() {
        assert!(CommandNotifier::new("true".to_owned()).notify("a", "b").is_ok());
        assert!(matches!(
            CommandNotifier::new("false".to_owned()).notify("a", "b"),
            Err(TodoError::NotificationDenied(_))
        ));
    }
}
