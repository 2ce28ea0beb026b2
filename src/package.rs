//! Writes converted models into the output pack directory.
//!
//! Layout under the output directory:
//! - `models/entity/{namespace}/{model}.geo.json`
//! - `attachables/{namespace}/{model}.json`
//! - `textures/{namespace}/...` (copied sources)
//! - `conversion_report.json`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::pipeline::{ModelReport, ReportEntry};

pub const REPORT_FILE: &str = "conversion_report.json";

pub struct PackageWriter {
    output_dir: PathBuf,
}

impl PackageWriter {
    /// Create the output directory. Failing here is fatal for the run.
    pub fn create(output_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
        info!("Writing package to {}", output_dir.display());
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write one model's files. I/O problems are appended to the report's
    /// notes and never stop the batch.
    pub fn write_model(&self, report: &mut ModelReport) {
        let stem = report.model.stem_path().to_string();
        let namespace = report.model.namespace().to_string();

        if let Some(geometry) = &report.geometry {
            let path = self
                .output_dir
                .join("models/entity")
                .join(&namespace)
                .join(format!("{stem}.geo.json"));
            let written = geometry
                .to_json_pretty()
                .map_err(|e| e.to_string())
                .and_then(|json| write_file(&path, json.as_bytes()));
            if let Err(e) = written {
                report.notes.push(format!("failed to write geometry: {e}"));
            }
        }

        if let Some(attachable) = &report.attachable {
            let path = self
                .output_dir
                .join("attachables")
                .join(&namespace)
                .join(format!("{stem}.json"));
            let written = attachable
                .to_json_pretty()
                .map_err(|e| e.to_string())
                .and_then(|json| write_file(&path, json.as_bytes()));
            if let Err(e) = written {
                report.notes.push(format!("failed to write attachable: {e}"));
            }
        }

        for copy in &report.copies {
            let target = self.output_dir.join(&copy.destination);
            let copied = target
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|_| fs::copy(&copy.source, &target));
            match copied {
                Ok(bytes) => debug!("Copied {} ({} bytes)", target.display(), bytes),
                Err(e) => {
                    warn!("Failed to copy {}: {}", copy.source.display(), e);
                    report.notes.push(format!(
                        "failed to copy {} to {}: {}",
                        copy.source.display(),
                        copy.destination.display(),
                        e
                    ));
                }
            }
        }
    }

    /// Write the per-model summary. Failing here is fatal for the run.
    pub fn write_report(&self, reports: &[ModelReport]) -> anyhow::Result<PathBuf> {
        let entries: Vec<ReportEntry> = reports.iter().map(ReportEntry::from).collect();
        let path = self.output_dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote report for {} models to {}", reports.len(), path.display());
        Ok(path)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
    }
    fs::write(path, bytes).map_err(|e| format!("{}: {}", path.display(), e))
}
