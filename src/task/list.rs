#![forbid(unsafe_code)]

use std::collections::HashSet;

use time::Date;

use crate::task::model::{Category, Filter, Priority, Task, TaskId};

/// Ordered task sequence, newest first. Ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from decoded tasks, dropping later duplicates of an id.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> (Self, usize) {
        let before = tasks.len();
        let mut seen = HashSet::with_capacity(before);
        let tasks: Vec<Task> = tasks.into_iter().filter(|t| seen.insert(t.id)).collect();
        let dropped = before - tasks.len();
        (Self { tasks }, dropped)
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Prepends a new task. Whitespace-only text is ignored.
    pub fn add(
        &mut self,
        text: &str,
        priority: Priority,
        date: Option<Date>,
        category: Category,
        now_ms: u64,
    ) -> Option<&Task> {
        if text.trim().is_empty() {
            return None;
        }
        let task = Task {
            id: self.next_id(now_ms),
            text: text.to_owned(),
            priority,
            date,
            category,
            completed: false,
        };
        self.tasks.insert(0, task);
        self.tasks.first()
    }

    pub fn toggle_completed(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.completed = !task.completed;
        true
    }

    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        before - self.tasks.len()
    }

    /// Moves the task at `from` to `to`. A destination past the end places the
    /// task last; `None` or an out-of-range `from` leaves the list untouched.
    pub fn reorder(&mut self, from: usize, to: Option<usize>) -> bool {
        let Some(to) = to else {
            return false;
        };
        if from >= self.tasks.len() {
            return false;
        }
        let task = self.tasks.remove(from);
        let to = to.min(self.tasks.len());
        self.tasks.insert(to, task);
        true
    }

    pub fn filter(&self, filter: Filter) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |t| filter.matches(t))
    }

    /// Positions in the full sequence of the tasks visible under `filter`.
    #[must_use]
    pub fn view_positions(&self, filter: Filter) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter_map(|(i, t)| filter.matches(t).then_some(i))
            .collect()
    }

    #[must_use]
    pub fn count(&self, filter: Filter) -> usize {
        self.filter(filter).count()
    }

    fn next_id(&self, now_ms: u64) -> TaskId {
        let max = self.tasks.iter().map(|t| t.id.0).max();
        match max {
            Some(max) if now_ms <= max => TaskId(max + 1),
            _ => TaskId(now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &TaskList) -> Vec<u64> {
        list.tasks().iter().map(|t| t.id.0).collect()
    }

    fn seeded(n: u64) -> TaskList {
        let mut list = TaskList::new();
        for i in 0..n {
            list.add(
                &format!("task {i}"),
                Priority::Medium,
                None,
                Category::Work,
                1000 + i,
            );
        }
        list
    }

    #[test]
    fn add_prepends_and_skips_blank_text() {
        let mut list = TaskList::new();
        assert!(list.add("first", Priority::Low, None, Category::Work, 10).is_some());
        assert!(list.add("   ", Priority::Low, None, Category::Work, 11).is_none());
        assert!(list.add("", Priority::Low, None, Category::Work, 12).is_none());
        assert!(list.add("second", Priority::High, None, Category::Personal, 13).is_some());

        assert_eq!(list.len(), 2);
        assert_eq!(list.tasks()[0].text, "second");
        assert_eq!(list.tasks()[1].text, "first");
    }

    #[test]
    fn ids_increase_when_the_clock_stalls() {
        let mut list = TaskList::new();
        for _ in 0..3 {
            list.add("same ms", Priority::Medium, None, Category::Work, 500);
        }
        assert_eq!(ids(&list), vec![502, 501, 500]);

        // Clock going backwards still yields a fresh id.
        list.add("earlier", Priority::Medium, None, Category::Work, 10);
        assert_eq!(list.tasks()[0].id, TaskId(503));
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut list = seeded(2);
        let id = list.tasks()[1].id;
        assert!(list.toggle_completed(id));
        assert!(list.get(id).unwrap().completed);
        assert!(list.toggle_completed(id));
        assert!(!list.get(id).unwrap().completed);
        assert!(!list.toggle_completed(TaskId(42)));
    }

    #[test]
    fn remove_twice_is_a_noop() {
        let mut list = seeded(3);
        let id = list.tasks()[1].id;
        assert!(list.remove(id));
        let after_first = list.clone();
        assert!(!list.remove(id));
        assert_eq!(list, after_first);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn clear_completed_keeps_active_order() {
        let mut list = seeded(4);
        let done = [list.tasks()[0].id, list.tasks()[2].id];
        for id in done {
            list.toggle_completed(id);
        }
        assert_eq!(list.clear_completed(), 2);
        assert_eq!(ids(&list), vec![1002, 1000]);
        assert_eq!(list.clear_completed(), 0);
    }

    #[test]
    fn reorder_moves_and_preserves_ids() {
        let mut list = seeded(4);
        assert_eq!(ids(&list), vec![1003, 1002, 1001, 1000]);

        assert!(list.reorder(0, Some(2)));
        assert_eq!(ids(&list), vec![1002, 1001, 1003, 1000]);

        assert!(list.reorder(3, Some(0)));
        assert_eq!(ids(&list), vec![1000, 1002, 1001, 1003]);

        assert!(list.reorder(1, Some(99)));
        assert_eq!(ids(&list), vec![1000, 1001, 1003, 1002]);

        let mut sorted = ids(&list);
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1000, 1001, 1002, 1003]);
    }

    #[test]
    fn reorder_without_destination_or_source_is_ignored() {
        let mut list = seeded(3);
        let before = list.clone();
        assert!(!list.reorder(1, None));
        assert!(!list.reorder(7, Some(0)));
        assert_eq!(list, before);
    }

    #[test]
    fn active_and_completed_partition_all() {
        let mut list = seeded(5);
        for i in [0, 3] {
            let id = list.tasks()[i].id;
            list.toggle_completed(id);
        }

        let all: HashSet<TaskId> = list.filter(Filter::All).map(|t| t.id).collect();
        let active: HashSet<TaskId> = list.filter(Filter::Active).map(|t| t.id).collect();
        let done: HashSet<TaskId> = list.filter(Filter::Completed).map(|t| t.id).collect();

        assert!(active.is_disjoint(&done));
        assert_eq!(active.union(&done).copied().collect::<HashSet<_>>(), all);
        assert_eq!(list.count(Filter::Completed), 2);
        assert_eq!(list.view_positions(Filter::Completed), vec![0, 3]);
        assert_eq!(list.view_positions(Filter::Active), vec![1, 2, 4]);
    }

    #[test]
    fn from_tasks_drops_duplicate_ids() {
        let list = seeded(2);
        let mut tasks = list.tasks().to_vec();
        tasks.push(tasks[0].clone());
        let (list, dropped) = TaskList::from_tasks(tasks);
        assert_eq!(dropped, 1);
        assert_eq!(list.len(), 2);
    }
}
