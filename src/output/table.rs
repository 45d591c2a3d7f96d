#![forbid(unsafe_code)]

use std::io;

use crate::task::model::Task;

/// Plain aligned text table for non-interactive output.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cols: impl IntoIterator<Item = impl Into<String>>) {
        self.rows.push(cols.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        self.write_to(&mut out)
    }

    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let w = cell.chars().count();
                match widths.get_mut(i) {
                    Some(cur) => *cur = (*cur).max(w),
                    None => widths.push(w),
                }
            }
        }

        writeln!(out, "{}", format_row(&self.headers, &widths))?;
        for row in &self.rows {
            writeln!(out, "{}", format_row(row, &widths))?;
        }
        Ok(())
    }
}

/// `#` is the 1-based list position, the handle `mv` takes.
pub fn task_table<'a>(tasks: impl IntoIterator<Item = (usize, &'a Task)>) -> Table {
    let mut table = Table::new(["#", "ID", "DONE", "TASK", "PRIORITY", "DATE", "CATEGORY"]);
    for (pos, t) in tasks {
        table.row([
            (pos + 1).to_string(),
            t.id.to_string(),
            if t.completed { "x" } else { " " }.to_owned(),
            t.text.clone(),
            t.priority.label().to_owned(),
            t.date_string(),
            t.category.label().to_owned(),
        ]);
    }
    table
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    let last = row.len().saturating_sub(1);
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        // No trailing padding on the last column.
        if i < last {
            let w = widths.get(i).copied().unwrap_or(0);
            let pad = w.saturating_sub(cell.chars().count());
            out.extend(std::iter::repeat_n(' ', pad));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::model::{Category, Priority, TaskId};

    fn render(table: &Table) -> String {
        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn columns_are_aligned() {
        let mut t = Table::new(["A", "LONGER"]);
        t.row(["wide cell", "x"]);
        t.row(["é", "y"]);
        assert_eq!(render(&t), "A          LONGER\nwide cell  x\né          y\n");
    }

    #[test]
    fn task_rows_use_one_based_positions() {
        let task = Task {
            id: TaskId(42),
            text: "Buy milk".to_owned(),
            priority: Priority::High,
            date: None,
            category: Category::Errand,
            completed: true,
        };
        let table = task_table([(2, &task)]);
        let out = render(&table);
        let line = out.lines().nth(1).unwrap();
        assert!(line.starts_with("3  42  x"));
        assert!(line.contains("Buy milk"));
        assert!(line.ends_with("Errand"));
    }
}
