#![forbid(unsafe_code)]

use std::io;

use crate::task::model::Task;

pub const HEADERS: [&str; 5] = ["Text", "Priority", "Date", "Category", "Done"];

/// One row per task, in list order.
pub fn write_csv(tasks: &[Task], out: impl io::Write) -> anyhow::Result<()> {
    let mut wtr = ::csv::Writer::from_writer(out);
    wtr.write_record(HEADERS)?;
    for t in tasks {
        let date = t.date_string();
        let done = if t.completed { "true" } else { "false" };
        wtr.write_record([
            t.text.as_str(),
            t.priority.label(),
            date.as_str(),
            t.category.label(),
            done,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
