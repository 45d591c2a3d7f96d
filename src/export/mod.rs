#![forbid(unsafe_code)]

pub mod csv;
pub mod pdf;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::ExportConfig;
use crate::task::store::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
        }
    }

    #[must_use]
    pub fn default_file(self, cfg: &ExportConfig) -> &str {
        match self {
            ExportFormat::Csv => &cfg.csv_file,
            ExportFormat::Pdf => &cfg.pdf_file,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub tasks: usize,
    pub revision: u64,
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported {} task(s) to {} ({})",
            self.tasks,
            self.path.display(),
            self.format
        )
    }
}

/// Writes `snapshot` to `path`, creating parent directories as needed.
pub fn export_to_path(
    snapshot: &Snapshot,
    format: ExportFormat,
    path: &Path,
) -> anyhow::Result<ExportReport> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    match format {
        ExportFormat::Csv => csv::write_csv(&snapshot.tasks, &mut out)?,
        ExportFormat::Pdf => pdf::write_pdf(snapshot, &mut out)?,
    }
    out.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(
        format = format.label(),
        path = %path.display(),
        tasks = snapshot.tasks.len(),
        revision = snapshot.revision,
        "export finished"
    );
    Ok(ExportReport {
        format,
        path: path.to_path_buf(),
        tasks: snapshot.tasks.len(),
        revision: snapshot.revision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::model::{Category, Filter, Priority, Task, TaskId};

    fn snapshot() -> Snapshot {
        Snapshot {
            tasks: vec![Task {
                id: TaskId(7),
                text: "Ship it".to_owned(),
                priority: Priority::High,
                date: None,
                category: Category::Work,
                completed: true,
            }],
            revision: 3,
            filter: Filter::All,
        }
    }

    #[test]
    fn writes_both_formats_into_nested_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");

        let csv_path = dir.path().join("out/tasks.csv");
        let report = export_to_path(&snapshot(), ExportFormat::Csv, &csv_path).unwrap();
        assert_eq!(report.tasks, 1);
        assert_eq!(report.revision, 3);
        let raw = std::fs::read_to_string(&csv_path).unwrap();
        assert!(raw.contains("Ship it,High,,Work,true"));

        let pdf_path = dir.path().join("out/tasks.pdf");
        export_to_path(&snapshot(), ExportFormat::Pdf, &pdf_path).unwrap();
        let bytes = std::fs::read(&pdf_path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
