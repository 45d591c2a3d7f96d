#![forbid(unsafe_code)]

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, Widget as _};

use crate::task::model::{Filter, Priority, Task};
use crate::task::store::Snapshot;

const WIDTHS: [Constraint; 5] = [
    Constraint::Length(3),
    Constraint::Min(12),
    Constraint::Length(6),
    Constraint::Length(10),
    Constraint::Length(8),
];

#[must_use]
pub fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::Low => Style::default().fg(Color::Green),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::High => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

#[must_use]
pub fn checkbox(task: &Task, icons: bool) -> &'static str {
    match (task.completed, icons) {
        (true, true) => "✔",
        (false, true) => "○",
        (true, false) => "[x]",
        (false, false) => "[ ]",
    }
}

#[must_use]
pub fn list_title(filter: Filter, shown: usize) -> String {
    format!(" To-Do - {filter} ({shown}) ")
}

/// The task list widget shared by the TUI and the PDF snapshot.
pub fn task_table<'a>(tasks: impl IntoIterator<Item = &'a Task>, icons: bool, title: String) -> Table<'a> {
    let headers = Row::new(vec!["", "TASK", "PRIO", "DATE", "CATEGORY"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = tasks.into_iter().map(|t| {
        let text_style = if t.completed {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(checkbox(t, icons)),
            Cell::from(t.text.as_str()).style(text_style),
            Cell::from(t.priority.label()).style(priority_style(t.priority)),
            Cell::from(t.date_string()),
            Cell::from(t.category.label()).style(Style::default().fg(Color::Gray)),
        ])
    });

    Table::new(rows, WIDTHS)
        .header(headers)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ")
}

/// Draws the snapshot off-screen and returns the rendered rows as text.
#[must_use]
pub fn render_snapshot(snapshot: &Snapshot, width: u16) -> Vec<String> {
    // Borders plus the header row.
    let rows = u16::try_from(snapshot.tasks.len()).unwrap_or(u16::MAX - 3);
    let height = rows.saturating_add(3);
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);

    let title = list_title(snapshot.filter, snapshot.tasks.len());
    task_table(&snapshot.tasks, false, title).render(area, &mut buf);

    (0..height)
        .map(|y| {
            let line: String = (0..width)
                .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()))
                .collect();
            line.trim_end().to_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::model::{Category, TaskId};

    fn task(id: u64, text: &str, completed: bool) -> Task {
        Task {
            id: TaskId(id),
            text: text.to_owned(),
            priority: Priority::Low,
            date: None,
            category: Category::Personal,
            completed,
        }
    }

    #[test]
    fn snapshot_has_border_header_and_one_row_per_task() {
        let snap = Snapshot {
            tasks: vec![task(2, "Walk dog", true), task(1, "Read book", false)],
            revision: 4,
            filter: Filter::All,
        };
        let lines = render_snapshot(&snap, 60);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("To-Do - All (2)"));
        assert!(lines[1].contains("TASK"));
        assert!(lines[2].contains("[x]") && lines[2].contains("Walk dog"));
        assert!(lines[3].contains("[ ]") && lines[3].contains("Read book"));
        assert!(lines[3].contains("Personal"));
    }

    #[test]
    fn empty_snapshot_still_renders_frame() {
        let snap = Snapshot {
            tasks: Vec::new(),
            revision: 0,
            filter: Filter::Completed,
        };
        let lines = render_snapshot(&snap, 40);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Completed (0)"));
    }
}
