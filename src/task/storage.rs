#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::{self, StorageConfig};

/// A single named location holding the whole encoded task list.
pub trait Slot {
    fn read(&self) -> anyhow::Result<Option<String>>;
    fn write(&mut self, data: &str) -> anyhow::Result<()>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
    name: String,
}

impl FileSlot {
    pub fn new(dir: PathBuf, name: &str) -> anyhow::Result<Self> {
        validate_slot_name(name)?;
        Ok(Self {
            dir,
            name: name.to_owned(),
        })
    }

    pub fn from_config(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let dir = config::expand_path(&cfg.data_dir)?;
        Self::new(dir, &cfg.slot)
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name))
    }

    fn ensure_dir(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create data dir {}", self.dir.display()))
    }
}

impl Slot for FileSlot {
    fn read(&self) -> anyhow::Result<Option<String>> {
        let path = self.path();
        match std::fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn write(&mut self, data: &str) -> anyhow::Result<()> {
        self.ensure_dir()?;
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, data.as_bytes())
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to rename {} -> {}", tmp.display(), path.display()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path().to_string_lossy().to_string()
    }
}

/// In-process slot, used for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    data: Option<String>,
    writes: usize,
}

impl MemorySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            writes: 0,
        }
    }

    #[must_use]
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> anyhow::Result<Option<String>> {
        Ok(self.data.clone())
    }

    fn write(&mut self, data: &str) -> anyhow::Result<()> {
        self.data = Some(data.to_owned());
        self.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_owned()
    }
}

pub(crate) fn validate_slot_name(name: &str) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("storage slot name is required");
    }
    if name.contains('/') || name.contains('\\') {
        anyhow::bail!("invalid slot name '{name}': must not contain path separators");
    }
    if name.contains("..") {
        anyhow::bail!("invalid slot name '{name}': must not contain '..'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_slot_missing_file_reads_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let slot = FileSlot::new(dir.path().join("nested"), "tasks").unwrap();
        assert!(slot.read().unwrap().is_none());
    }

    #[test]
    fn file_slot_write_creates_dir_and_replaces_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut slot = FileSlot::new(dir.path().join("data"), "tasks").unwrap();
        slot.write("[1]").unwrap();
        slot.write("[2]").unwrap();
        assert_eq!(slot.read().unwrap().as_deref(), Some("[2]"));
        assert!(slot.path().ends_with("data/tasks.json"));
        assert!(!slot.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn slot_names_are_validated() {
        let dir = PathBuf::from("/tmp");
        assert!(FileSlot::new(dir.clone(), "").is_err());
        assert!(FileSlot::new(dir.clone(), "a/b").is_err());
        assert!(FileSlot::new(dir.clone(), "..x").is_err());
        assert!(FileSlot::new(dir, "tasks-work").is_ok());
    }
}
