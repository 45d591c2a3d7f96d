#![forbid(unsafe_code)]

use time::{Date, OffsetDateTime};

use crate::task::list::TaskList;
use crate::task::model::{Category, Filter, Priority, Task, TaskId};
use crate::task::storage::Slot;

/// Read-only copy of the list taken at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub revision: u64,
    pub filter: Filter,
}

/// Task list mirrored to a storage slot after every mutation.
#[derive(Debug)]
pub struct TaskStore<S: Slot> {
    list: TaskList,
    slot: S,
    revision: u64,
}

impl<S: Slot> TaskStore<S> {
    /// Loads the slot. Missing, unreadable or malformed content yields an
    /// empty list.
    pub fn open(slot: S) -> Self {
        let list = match slot.read() {
            Ok(Some(raw)) => decode(&raw, &slot.describe()),
            Ok(None) => TaskList::new(),
            Err(e) => {
                tracing::warn!(slot = %slot.describe(), error = %e, "failed to read task slot, starting empty");
                TaskList::new()
            }
        };
        tracing::debug!(slot = %slot.describe(), tasks = list.len(), "loaded task list");
        Self {
            list,
            slot,
            revision: 0,
        }
    }

    #[must_use]
    pub fn list(&self) -> &TaskList {
        &self.list
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        self.list.tasks()
    }

    #[must_use]
    pub fn slot(&self) -> &S {
        &self.slot
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn add(
        &mut self,
        text: &str,
        priority: Priority,
        date: Option<Date>,
        category: Category,
    ) -> anyhow::Result<Option<Task>> {
        let Some(task) = self
            .list
            .add(text, priority, date, category, now_millis())
            .cloned()
        else {
            return Ok(None);
        };
        tracing::debug!(id = %task.id, "task added");
        self.save()?;
        Ok(Some(task))
    }

    pub fn toggle_completed(&mut self, id: TaskId) -> anyhow::Result<bool> {
        let changed = self.list.toggle_completed(id);
        self.save()?;
        Ok(changed)
    }

    pub fn remove(&mut self, id: TaskId) -> anyhow::Result<bool> {
        let removed = self.list.remove(id);
        self.save()?;
        Ok(removed)
    }

    pub fn clear_completed(&mut self) -> anyhow::Result<usize> {
        let removed = self.list.clear_completed();
        self.save()?;
        Ok(removed)
    }

    pub fn reorder(&mut self, from: usize, to: Option<usize>) -> anyhow::Result<bool> {
        if to.is_none() {
            return Ok(false);
        }
        let moved = self.list.reorder(from, to);
        self.save()?;
        Ok(moved)
    }

    pub fn filter(&self, filter: Filter) -> Vec<&Task> {
        self.list.filter(filter).collect()
    }

    #[must_use]
    pub fn snapshot(&self, filter: Filter) -> Snapshot {
        Snapshot {
            tasks: self.list.filter(filter).cloned().collect(),
            revision: self.revision,
            filter,
        }
    }

    fn save(&mut self) -> anyhow::Result<()> {
        let data = serde_json::to_string(self.list.tasks())?;
        self.slot.write(&data)?;
        self.revision += 1;
        Ok(())
    }
}

fn decode(raw: &str, slot: &str) -> TaskList {
    if raw.trim().is_empty() {
        return TaskList::new();
    }
    match serde_json::from_str::<Vec<Task>>(raw) {
        Ok(tasks) => {
            let (list, dropped) = TaskList::from_tasks(tasks);
            if dropped > 0 {
                tracing::warn!(slot, dropped, "dropped tasks with duplicate ids");
            }
            list
        }
        Err(e) => {
            tracing::warn!(slot, error = %e, "task slot is malformed, starting empty");
            TaskList::new()
        }
    }
}

fn now_millis() -> u64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}
