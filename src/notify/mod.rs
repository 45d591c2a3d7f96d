#![forbid(unsafe_code)]

pub mod command;

use crate::config::NotifyConfig;
use crate::error::TodoError;
use crate::task::model::Task;

pub use command::CommandNotifier;

pub const TASK_ADDED_TITLE: &str = "Task added";

pub trait Notifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), TodoError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _body: &str) -> Result<(), TodoError> {
        Ok(())
    }
}

#[must_use]
pub fn from_config(cfg: &NotifyConfig) -> Box<dyn Notifier> {
    if cfg.enabled && !cfg.command.trim().is_empty() {
        Box::new(CommandNotifier::new(cfg.command.clone()))
    } else {
        Box::new(NoopNotifier)
    }
}

/// Announces a freshly added task. Denied or failing notifications are not
/// surfaced to the user.
pub fn task_added(notifier: &dyn Notifier, task: &Task) {
    if let Err(e) = notifier.notify(TASK_ADDED_TITLE, &task.text) {
        tracing::debug!(id = %task.id, error = %e, "notification not shown");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::task::model::{Category, Priority, TaskId};

    #[derive(Default)]
    struct Recording {
        sent: RefCell<Vec<(String, String)>>,
        deny: bool,
    }

    impl Notifier for Recording {
        fn notify(&self, title: &str, body: &str) -> Result<(), TodoError> {
            if self.deny {
                return Err(TodoError::NotificationDenied("denied".to_owned()));
            }
            self.sent
                .borrow_mut()
                .push((title.to_owned(), body.to_owned()));
            Ok(())
        }
    }

    fn task() -> Task {
        Task {
            id: TaskId(1),
            text: "Buy milk".to_owned(),
            priority: Priority::Medium,
            date: None,
            category: Category::Errand,
            completed: false,
        }
    }

    #[test]
    fn task_added_sends_title_and_text() {
        let n = Recording::default();
        task_added(&n, &task());
        assert_eq!(
            n.sent.borrow().as_slice(),
            &[("Task added".to_owned(), "Buy milk".to_owned())]
        );
    }

    #[test]
    fn denied_notifications_are_swallowed() {
        let n = Recording {
            deny: true,
            ..Recording::default()
        };
        task_added(&n, &task());
        assert!(n.sent.borrow().is_empty());
    }

    #[test]
    fn disabled_config_yields_noop() {
        let cfg = NotifyConfig {
            enabled: false,
            command: "definitely-not-a-real-notifier".to_owned(),
        };
        assert!(from_config(&cfg).notify("t", "b").is_ok());
    }
}
