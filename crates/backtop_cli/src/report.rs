//! Report output model for scenario runs.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path};

use anyhow::{bail, Context, Result};
use backtop_control::DetectionSnapshot;
use serde::Serialize;

/// Report status for a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// Machine-readable result of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    pub elapsed_ms: u64,
    /// What the control last applied
    pub snapshot: Option<DetectionSnapshot>,
}

impl ScenarioReport {
    pub fn passed(elapsed_ms: u64, snapshot: Option<DetectionSnapshot>) -> Self {
        Self {
            status: ReportStatus::Passed,
            failed_step_index: None,
            assertion: None,
            message: None,
            elapsed_ms,
            snapshot,
        }
    }

    pub fn failed(
        assertion: &str,
        failed_step_index: usize,
        message: String,
        elapsed_ms: u64,
        snapshot: Option<DetectionSnapshot>,
    ) -> Self {
        Self {
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            assertion: Some(assertion.to_string()),
            message: Some(message),
            elapsed_ms,
            snapshot,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ReportStatus::Failed
    }

    /// Save the report as pretty JSON, creating parent directories.
    ///
    /// Only paths inside the working directory are accepted.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        ensure_contained(path)?;
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let mut file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_to_writer(&mut file)
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

fn ensure_contained(path: &Path) -> Result<()> {
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                bail!("report path {} leaves the working directory", path.display())
            }
            Component::RootDir | Component::Prefix(_) => {
                bail!("report path {} must be relative", path.display())
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_escaping_report_paths() {
        let report = ScenarioReport::passed(0, None);
        assert!(report.write_to_path(Path::new("/tmp/report.json")).is_err());
        let err = report.write_to_path(Path::new("out/../../report.json")).unwrap_err();
        assert!(err.to_string().contains("leaves the working directory"));
    }

    #[test]
    fn failed_report_serializes_details() {
        let report =
            ScenarioReport::failed("assert_visible", 3, "control hidden".into(), 650, None);
        let mut out = Vec::new();
        report.write_to_writer(&mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["failed_step_index"], 3);
        assert_eq!(value["assertion"], "assert_visible");
        assert_eq!(value["elapsed_ms"], 650);
        assert!(report.is_failed());
    }
}
