#![forbid(unsafe_code)]

use time::Date;

use crate::task::model::{Category, Priority, Task};
use crate::task::storage::Slot;
use crate::task::store::TaskStore;

/// Pending entry form. Survives between adds the way a form on screen does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub priority: Priority,
    pub date: Option<Date>,
    pub category: Category,
}

impl TaskDraft {
    /// A voice transcript replaces whatever text was typed.
    pub fn set_transcript(&mut self, transcript: &str) {
        if !transcript.is_empty() {
            self.text = transcript.to_owned();
        }
    }

    /// Adds the draft to `store`. On success the text and date are cleared and
    /// the category resets; the priority is kept for the next entry.
    pub fn submit<S: Slot>(&mut self, store: &mut TaskStore<S>) -> anyhow::Result<Option<Task>> {
        let added = store.add(&self.text, self.priority, self.date, self.category)?;
        if added.is_some() {
            self.text.clear();
            self.date = None;
            self.category = Category::default();
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::storage::MemorySlot;
    use time::macros::date;

    #[test]
    fn submit_resets_everything_but_priority() {
        let mut store = TaskStore::open(MemorySlot::new());
        let mut draft = TaskDraft {
            text: "Call bank".to_owned(),
            priority: Priority::High,
            date: Some(date!(2025 - 03 - 04)),
            category: Category::Personal,
        };

        let task = draft.submit(&mut store).unwrap().expect("added");
        assert_eq!(task.text, "Call bank");
        assert_eq!(task.date, Some(date!(2025 - 03 - 04)));

        assert!(draft.text.is_empty());
        assert_eq!(draft.date, None);
        assert_eq!(draft.category, Category::Work);
        assert_eq!(draft.priority, Priority::High);
    }

    #[test]
    fn blank_draft_is_kept_as_is() {
        let mut store = TaskStore::open(MemorySlot::new());
        let mut draft = TaskDraft {
            text: "   ".to_owned(),
            category: Category::Errand,
            ..TaskDraft::default()
        };
        assert!(draft.submit(&mut store).unwrap().is_none());
        assert_eq!(draft.category, Category::Errand);
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn transcript_replaces_text() {
        let mut draft = TaskDraft {
            text: "typed".to_owned(),
            ..TaskDraft::default()
        };
        draft.set_transcript("water the plants");
        assert_eq!(draft.text, "water the plants");
        draft.set_transcript("");
        assert_eq!(draft.text, "water the plants");
    }
}
