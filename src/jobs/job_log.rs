use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only plain-text log owned by one job.
#[derive(Debug, Clone)]
pub struct JobLog {
    path: PathBuf,
}

impl JobLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, lines: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        Ok(())
    }

    /// Appends and reports failures through tracing; jobs never fail on log I/O.
    pub fn write(&self, lines: &[String]) {
        if let Err(e) = self.append(lines) {
            tracing::error!("Could not write to {}: {}", self.path.display(), e);
        }
    }
}

/// `[YYYY-mm-dd HH:MM:SS]`
pub fn bracketed(now: &DateTime<Local>) -> String {
    format!("[{}]", plain(now))
}

/// `YYYY-mm-dd HH:MM:SS`
pub fn plain(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn appends_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let log = JobLog::new(dir.path().join("nested").join("job.txt"));
        log.append(&["first".to_string()]).unwrap();
        log.append(&["second".to_string(), "third".to_string()]).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content, "first\nsecond\nthird\n");
    }

    #[test]
    fn timestamp_formats() {
        let now = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(plain(&now), "2025-03-07 09:05:01");
        assert_eq!(bracketed(&now), "[2025-03-07 09:05:01]");
    }
}
